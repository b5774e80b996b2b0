//! Database operations for the `properties` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{types::Json, PgPool};
use stayease_core::PropertyPhotos;
use uuid::Uuid;

use crate::DbError;

const PROPERTY_COLUMNS: &str = "id, public_id, name, location, price, property_type, tags, \
     owner_id, property_photos, status, view_count, interested_count, interested_applicants, \
     available_at, created_at, updated_at";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `properties` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PropertyRow {
    pub id: i64,
    pub public_id: Uuid,
    pub name: String,
    pub location: String,
    pub price: Decimal,
    pub property_type: Option<String>,
    pub tags: Vec<String>,
    pub owner_id: Option<Uuid>,
    pub property_photos: Json<PropertyPhotos>,
    pub status: String,
    pub view_count: i32,
    pub interested_count: i32,
    pub interested_applicants: Vec<Uuid>,
    pub available_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProperty<'a> {
    pub name: &'a str,
    pub location: &'a str,
    pub price: Decimal,
    pub property_type: Option<&'a str>,
    pub tags: &'a [String],
    pub owner_id: Option<Uuid>,
    pub property_photos: &'a PropertyPhotos,
    pub status: &'a str,
    pub available_at: Option<DateTime<Utc>>,
}

/// Listing filters. `None` fields are not applied.
#[derive(Debug, Clone, Default)]
pub struct PropertyListFilters<'a> {
    pub location: Option<&'a str>,
    pub property_type: Option<&'a str>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub tag: Option<&'a str>,
    pub status: Option<&'a str>,
    pub limit: i64,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns properties matching `filters`, newest first.
///
/// `location` matches as a case-insensitive substring.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_properties(
    pool: &PgPool,
    filters: PropertyListFilters<'_>,
) -> Result<Vec<PropertyRow>, DbError> {
    let sql = format!(
        "SELECT {PROPERTY_COLUMNS} \
         FROM properties \
         WHERE ($1::TEXT IS NULL OR location ILIKE '%' || $1 || '%') \
           AND ($2::TEXT IS NULL OR property_type = $2) \
           AND ($3::NUMERIC IS NULL OR price >= $3) \
           AND ($4::NUMERIC IS NULL OR price <= $4) \
           AND ($5::TEXT IS NULL OR $5 = ANY(tags)) \
           AND ($6::TEXT IS NULL OR status = $6) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $7"
    );

    let rows = sqlx::query_as::<_, PropertyRow>(&sql)
        .bind(filters.location)
        .bind(filters.property_type)
        .bind(filters.min_price)
        .bind(filters.max_price)
        .bind(filters.tag)
        .bind(filters.status)
        .bind(filters.limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_property(pool: &PgPool, public_id: Uuid) -> Result<Option<PropertyRow>, DbError> {
    let sql = format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE public_id = $1");
    let row = sqlx::query_as::<_, PropertyRow>(&sql)
        .bind(public_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Bumps `view_count` and returns the updated row, or `None` if missing.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn increment_view_count(
    pool: &PgPool,
    public_id: Uuid,
) -> Result<Option<PropertyRow>, DbError> {
    let sql = format!(
        "UPDATE properties SET view_count = view_count + 1 \
         WHERE public_id = $1 \
         RETURNING {PROPERTY_COLUMNS}"
    );
    let row = sqlx::query_as::<_, PropertyRow>(&sql)
        .bind(public_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Inserts a property and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including the status check constraint).
pub async fn create_property(
    pool: &PgPool,
    property: &NewProperty<'_>,
) -> Result<PropertyRow, DbError> {
    let sql = format!(
        "INSERT INTO properties \
             (public_id, name, location, price, property_type, tags, owner_id, \
              property_photos, status, available_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {PROPERTY_COLUMNS}"
    );
    let row = sqlx::query_as::<_, PropertyRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(property.name)
        .bind(property.location)
        .bind(property.price)
        .bind(property.property_type)
        .bind(property.tags)
        .bind(property.owner_id)
        .bind(Json(property.property_photos))
        .bind(property.status)
        .bind(property.available_at)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn update_property_status(
    pool: &PgPool,
    public_id: Uuid,
    status: &str,
) -> Result<Option<PropertyRow>, DbError> {
    let sql = format!(
        "UPDATE properties SET status = $2, updated_at = NOW() \
         WHERE public_id = $1 \
         RETURNING {PROPERTY_COLUMNS}"
    );
    let row = sqlx::query_as::<_, PropertyRow>(&sql)
        .bind(public_id)
        .bind(status)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Properties whose `available_at` lies in `[start, end)`, earliest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_properties_available_between(
    pool: &PgPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<PropertyRow>, DbError> {
    let sql = format!(
        "SELECT {PROPERTY_COLUMNS} \
         FROM properties \
         WHERE available_at >= $1 AND available_at < $2 \
         ORDER BY available_at, id"
    );
    let rows = sqlx::query_as::<_, PropertyRow>(&sql)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_properties(pool: &PgPool) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM properties")
        .fetch_one(pool)
        .await?;
    Ok(count)
}
