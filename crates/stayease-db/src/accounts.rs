//! Database operations for the `accounts` table and the saved/interested links.

use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};
use stayease_core::SocialLinks;
use uuid::Uuid;

use crate::DbError;

const ACCOUNT_COLUMNS: &str = "id, public_id, email, display_name, first_name, last_name, \
     phone, bio, social_links, saved_properties, interested_properties, is_owner, \
     created_at, updated_at";

/// A row from the `accounts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub id: i64,
    pub public_id: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub social_links: Json<SocialLinks>,
    pub saved_properties: Vec<Uuid>,
    pub interested_properties: Vec<Uuid>,
    pub is_owner: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountEmailRow {
    pub public_id: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

/// Sparse profile write. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct AccountProfileUpdate<'a> {
    pub email: Option<&'a str>,
    pub display_name: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub social_links: Option<&'a SocialLinks>,
    pub is_owner: Option<bool>,
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_account(pool: &PgPool, public_id: Uuid) -> Result<Option<AccountRow>, DbError> {
    let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE public_id = $1");
    let row = sqlx::query_as::<_, AccountRow>(&sql)
        .bind(public_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Creates the account if absent, otherwise applies the non-`None` fields.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_account(
    pool: &PgPool,
    public_id: Uuid,
    update: &AccountProfileUpdate<'_>,
) -> Result<AccountRow, DbError> {
    let sql = format!(
        "INSERT INTO accounts \
             (public_id, email, display_name, first_name, last_name, phone, bio, \
              social_links, is_owner) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, '{{}}'::jsonb), COALESCE($9, false)) \
         ON CONFLICT (public_id) DO UPDATE SET \
             email        = COALESCE($2, accounts.email), \
             display_name = COALESCE($3, accounts.display_name), \
             first_name   = COALESCE($4, accounts.first_name), \
             last_name    = COALESCE($5, accounts.last_name), \
             phone        = COALESCE($6, accounts.phone), \
             bio          = COALESCE($7, accounts.bio), \
             social_links = COALESCE($8, accounts.social_links), \
             is_owner     = COALESCE($9, accounts.is_owner), \
             updated_at   = NOW() \
         RETURNING {ACCOUNT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, AccountRow>(&sql)
        .bind(public_id)
        .bind(update.email)
        .bind(update.display_name)
        .bind(update.first_name)
        .bind(update.last_name)
        .bind(update.phone)
        .bind(update.bio)
        .bind(update.social_links.map(Json))
        .bind(update.is_owner)
        .fetch_one(pool)
        .await?;
    Ok(row)
}

/// Email and display name for the given account ids. Ids with no account are absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_account_emails(
    pool: &PgPool,
    public_ids: &[Uuid],
) -> Result<Vec<AccountEmailRow>, DbError> {
    if public_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query_as::<_, AccountEmailRow>(
        "SELECT public_id, email, display_name FROM accounts WHERE public_id = ANY($1)",
    )
    .bind(public_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Adds `property_id` to the account's saved list if not already present.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the account does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn add_saved_property(
    pool: &PgPool,
    account_id: Uuid,
    property_id: Uuid,
) -> Result<AccountRow, DbError> {
    let sql = format!(
        "UPDATE accounts \
         SET saved_properties = CASE WHEN $2 = ANY(saved_properties) THEN saved_properties \
                                     ELSE array_append(saved_properties, $2) END, \
             updated_at = NOW() \
         WHERE public_id = $1 \
         RETURNING {ACCOUNT_COLUMNS}"
    );
    sqlx::query_as::<_, AccountRow>(&sql)
        .bind(account_id)
        .bind(property_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if the account does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn remove_saved_property(
    pool: &PgPool,
    account_id: Uuid,
    property_id: Uuid,
) -> Result<AccountRow, DbError> {
    let sql = format!(
        "UPDATE accounts \
         SET saved_properties = array_remove(saved_properties, $2), updated_at = NOW() \
         WHERE public_id = $1 \
         RETURNING {ACCOUNT_COLUMNS}"
    );
    sqlx::query_as::<_, AccountRow>(&sql)
        .bind(account_id)
        .bind(property_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Records interest on both sides: the account's `interested_properties` and
/// the property's `interested_applicants`/`interested_count`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if either the account or the property does
/// not exist (nothing is written), or [`DbError::Sqlx`] on query failure.
pub async fn add_interest(
    pool: &PgPool,
    account_id: Uuid,
    property_id: Uuid,
) -> Result<AccountRow, DbError> {
    let mut tx = pool.begin().await?;

    let sql = format!(
        "UPDATE accounts \
         SET interested_properties = CASE WHEN $2 = ANY(interested_properties) \
                                          THEN interested_properties \
                                          ELSE array_append(interested_properties, $2) END, \
             updated_at = NOW() \
         WHERE public_id = $1 \
         RETURNING {ACCOUNT_COLUMNS}"
    );
    let Some(account) = sqlx::query_as::<_, AccountRow>(&sql)
        .bind(account_id)
        .bind(property_id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        return Err(DbError::NotFound);
    };

    let updated = sqlx::query(
        "UPDATE properties \
         SET interested_applicants = CASE WHEN $2 = ANY(interested_applicants) \
                                          THEN interested_applicants \
                                          ELSE array_append(interested_applicants, $2) END, \
             updated_at = NOW() \
         WHERE public_id = $1",
    )
    .bind(property_id)
    .bind(account_id)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    sync_interested_count(&mut tx, property_id).await?;
    tx.commit().await?;
    Ok(account)
}

/// Reverses [`add_interest`]. Missing links are a no-op.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the account does not exist, or
/// [`DbError::Sqlx`] on query failure.
pub async fn remove_interest(
    pool: &PgPool,
    account_id: Uuid,
    property_id: Uuid,
) -> Result<AccountRow, DbError> {
    let mut tx = pool.begin().await?;

    let sql = format!(
        "UPDATE accounts \
         SET interested_properties = array_remove(interested_properties, $2), \
             updated_at = NOW() \
         WHERE public_id = $1 \
         RETURNING {ACCOUNT_COLUMNS}"
    );
    let Some(account) = sqlx::query_as::<_, AccountRow>(&sql)
        .bind(account_id)
        .bind(property_id)
        .fetch_optional(&mut *tx)
        .await?
    else {
        return Err(DbError::NotFound);
    };

    sqlx::query(
        "UPDATE properties \
         SET interested_applicants = array_remove(interested_applicants, $2), \
             updated_at = NOW() \
         WHERE public_id = $1",
    )
    .bind(property_id)
    .bind(account_id)
    .execute(&mut *tx)
    .await?;

    sync_interested_count(&mut tx, property_id).await?;
    tx.commit().await?;
    Ok(account)
}

async fn sync_interested_count(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    property_id: Uuid,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE properties \
         SET interested_count = COALESCE(cardinality(interested_applicants), 0) \
         WHERE public_id = $1",
    )
    .bind(property_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
