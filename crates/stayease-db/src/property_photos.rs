//! Database operations for the `property_photos` blob table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Photo metadata without the blob.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PropertyPhotoRow {
    pub id: i64,
    pub public_id: Uuid,
    pub label: String,
    pub content_type: String,
    pub byte_size: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PhotoImage {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Stores a new photo blob and returns its metadata.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_photo(
    pool: &PgPool,
    label: &str,
    content_type: &str,
    data: &[u8],
) -> Result<PropertyPhotoRow, DbError> {
    // data.len() is bounded by the 5 MiB upload limit before reaching here.
    let byte_size = i32::try_from(data.len()).unwrap_or(i32::MAX);
    let row = sqlx::query_as::<_, PropertyPhotoRow>(
        "INSERT INTO property_photos (public_id, label, content_type, data, byte_size) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, public_id, label, content_type, byte_size, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(label)
    .bind(content_type)
    .bind(data)
    .bind(byte_size)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Replaces a photo's label. Returns `None` when no photo has that id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_photo_label(
    pool: &PgPool,
    public_id: Uuid,
    label: &str,
) -> Result<Option<PropertyPhotoRow>, DbError> {
    let row = sqlx::query_as::<_, PropertyPhotoRow>(
        "UPDATE property_photos \
         SET label = $2, updated_at = NOW() \
         WHERE public_id = $1 \
         RETURNING id, public_id, label, content_type, byte_size, created_at, updated_at",
    )
    .bind(public_id)
    .bind(label)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_photo_image(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<Option<PhotoImage>, DbError> {
    let row = sqlx::query_as::<_, PhotoImage>(
        "SELECT content_type, data FROM property_photos WHERE public_id = $1",
    )
    .bind(public_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_photo_label(pool: &PgPool, public_id: Uuid) -> Result<Option<String>, DbError> {
    let label = sqlx::query_scalar::<_, String>(
        "SELECT label FROM property_photos WHERE public_id = $1",
    )
    .bind(public_id)
    .fetch_optional(pool)
    .await?;

    Ok(label)
}

/// Deletes every photo whose id is in `public_ids` in a single statement.
///
/// Unknown ids are ignored. Returns the number of rows removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_photos(pool: &PgPool, public_ids: &[Uuid]) -> Result<u64, DbError> {
    if public_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query("DELETE FROM property_photos WHERE public_id = ANY($1)")
        .bind(public_ids)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_photos(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM property_photos")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
