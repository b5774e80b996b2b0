//! Query tests against a migrated scratch database (`DATABASE_URL` required).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use stayease_core::PropertyPhotos;
use stayease_db::{AccountProfileUpdate, DbError, NewProperty, PropertyListFilters};
use uuid::Uuid;

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

async fn seed_property(
    pool: &sqlx::PgPool,
    name: &str,
    location: &str,
    price: i64,
    status: &str,
    available_at: Option<DateTime<Utc>>,
) -> Uuid {
    let photos = PropertyPhotos::default();
    let tags = vec!["wifi".to_string()];
    stayease_db::create_property(
        pool,
        &NewProperty {
            name,
            location,
            price: Decimal::new(price, 0),
            property_type: Some("dormitory"),
            tags: &tags,
            owner_id: None,
            property_photos: &photos,
            status,
            available_at,
        },
    )
    .await
    .expect("create property")
    .public_id
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_properties_applies_filters(pool: sqlx::PgPool) {
    seed_property(&pool, "Maple Dorm", "Quezon City", 4500, "active", None).await;
    seed_property(&pool, "Pine Flat", "Makati", 12000, "active", None).await;
    seed_property(&pool, "Oak Loft", "Quezon City", 9000, "pending", None).await;

    let rows = stayease_db::list_properties(
        &pool,
        PropertyListFilters {
            location: Some("quezon"),
            status: Some("active"),
            limit: 50,
            ..PropertyListFilters::default()
        },
    )
    .await
    .expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Maple Dorm");

    let rows = stayease_db::list_properties(
        &pool,
        PropertyListFilters {
            min_price: Some(Decimal::new(5000, 0)),
            max_price: Some(Decimal::new(10000, 0)),
            tag: Some("wifi"),
            limit: 50,
            ..PropertyListFilters::default()
        },
    )
    .await
    .expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Oak Loft");
}

#[sqlx::test(migrations = "../../migrations")]
async fn available_between_is_half_open(pool: sqlx::PgPool) {
    seed_property(&pool, "Start", "A", 1, "active", Some(at("2026-03-13T00:00:00Z"))).await;
    seed_property(&pool, "Late", "A", 1, "active", Some(at("2026-03-13T23:59:59Z"))).await;
    seed_property(&pool, "Next", "A", 1, "active", Some(at("2026-03-14T00:00:00Z"))).await;
    seed_property(&pool, "Before", "A", 1, "active", Some(at("2026-03-12T23:59:59Z"))).await;
    seed_property(&pool, "Undated", "A", 1, "active", None).await;

    let rows = stayease_db::list_properties_available_between(
        &pool,
        at("2026-03-13T00:00:00Z"),
        at("2026-03-14T00:00:00Z"),
    )
    .await
    .expect("query");

    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Start", "Late"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn interest_updates_both_sides(pool: sqlx::PgPool) {
    let property_id = seed_property(&pool, "Maple Dorm", "QC", 4500, "active", None).await;
    let account_id = Uuid::new_v4();
    stayease_db::upsert_account(
        &pool,
        account_id,
        &AccountProfileUpdate {
            email: Some("renter@stayease.test"),
            ..AccountProfileUpdate::default()
        },
    )
    .await
    .expect("upsert account");

    let account = stayease_db::add_interest(&pool, account_id, property_id)
        .await
        .expect("add interest");
    assert_eq!(account.interested_properties, vec![property_id]);

    // second call is idempotent
    stayease_db::add_interest(&pool, account_id, property_id)
        .await
        .expect("add interest again");

    let property = stayease_db::get_property(&pool, property_id)
        .await
        .expect("get")
        .expect("exists");
    assert_eq!(property.interested_applicants, vec![account_id]);
    assert_eq!(property.interested_count, 1);

    stayease_db::remove_interest(&pool, account_id, property_id)
        .await
        .expect("remove interest");
    let property = stayease_db::get_property(&pool, property_id)
        .await
        .expect("get")
        .expect("exists");
    assert!(property.interested_applicants.is_empty());
    assert_eq!(property.interested_count, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn interest_on_missing_property_writes_nothing(pool: sqlx::PgPool) {
    let account_id = Uuid::new_v4();
    stayease_db::upsert_account(&pool, account_id, &AccountProfileUpdate::default())
        .await
        .expect("upsert account");

    let result = stayease_db::add_interest(&pool, account_id, Uuid::new_v4()).await;
    assert!(matches!(result, Err(DbError::NotFound)));

    let account = stayease_db::get_account(&pool, account_id)
        .await
        .expect("get")
        .expect("exists");
    assert!(account.interested_properties.is_empty(), "transaction rolled back");
}

#[sqlx::test(migrations = "../../migrations")]
async fn upsert_account_keeps_unspecified_fields(pool: sqlx::PgPool) {
    let account_id = Uuid::new_v4();
    stayease_db::upsert_account(
        &pool,
        account_id,
        &AccountProfileUpdate {
            email: Some("first@stayease.test"),
            display_name: Some("First"),
            is_owner: Some(true),
            ..AccountProfileUpdate::default()
        },
    )
    .await
    .expect("insert");

    let row = stayease_db::upsert_account(
        &pool,
        account_id,
        &AccountProfileUpdate {
            display_name: Some("Renamed"),
            ..AccountProfileUpdate::default()
        },
    )
    .await
    .expect("update");

    assert_eq!(row.email.as_deref(), Some("first@stayease.test"));
    assert_eq!(row.display_name.as_deref(), Some("Renamed"));
    assert!(row.is_owner);
}

#[sqlx::test(migrations = "../../migrations")]
async fn delete_photos_removes_only_listed_ids(pool: sqlx::PgPool) {
    let a = stayease_db::insert_photo(&pool, "front", "image/jpeg", b"aaa")
        .await
        .expect("insert a");
    let b = stayease_db::insert_photo(&pool, "back", "image/png", b"bbb")
        .await
        .expect("insert b");

    let deleted = stayease_db::delete_photos(&pool, &[a.public_id, Uuid::new_v4()])
        .await
        .expect("delete");
    assert_eq!(deleted, 1);
    assert!(stayease_db::get_photo_image(&pool, a.public_id)
        .await
        .expect("get a")
        .is_none());
    assert_eq!(
        stayease_db::get_photo_label(&pool, b.public_id)
            .await
            .expect("get b")
            .as_deref(),
        Some("back")
    );
    assert_eq!(stayease_db::count_photos(&pool).await.expect("count"), 1);
}
