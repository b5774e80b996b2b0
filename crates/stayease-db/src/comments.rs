//! Database operations for the `comments` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub public_id: Uuid,
    pub property_id: Uuid,
    pub account_id: Option<Uuid>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Newest comments first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_comments(
    pool: &PgPool,
    property_id: Uuid,
    limit: i64,
) -> Result<Vec<CommentRow>, DbError> {
    let rows = sqlx::query_as::<_, CommentRow>(
        "SELECT id, public_id, property_id, account_id, body, created_at \
         FROM comments \
         WHERE property_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(property_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_comment(
    pool: &PgPool,
    property_id: Uuid,
    account_id: Option<Uuid>,
    body: &str,
) -> Result<CommentRow, DbError> {
    let row = sqlx::query_as::<_, CommentRow>(
        "INSERT INTO comments (public_id, property_id, account_id, body) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, public_id, property_id, account_id, body, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(property_id)
    .bind(account_id)
    .bind(body)
    .fetch_one(pool)
    .await?;
    Ok(row)
}
