use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stayease_core::SocialLinks;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, parse_public_id, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct AccountItem {
    id: Uuid,
    email: Option<String>,
    display_name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    bio: Option<String>,
    social_links: SocialLinks,
    saved_properties: Vec<Uuid>,
    interested_properties: Vec<Uuid>,
    is_owner: bool,
    updated_at: DateTime<Utc>,
}

impl From<stayease_db::AccountRow> for AccountItem {
    fn from(row: stayease_db::AccountRow) -> Self {
        Self {
            id: row.public_id,
            email: row.email,
            display_name: row.display_name,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            bio: row.bio,
            social_links: row.social_links.0,
            saved_properties: row.saved_properties,
            interested_properties: row.interested_properties,
            is_owner: row.is_owner,
            updated_at: row.updated_at,
        }
    }
}

/// Sparse profile update; absent fields keep their stored value.
#[derive(Debug, Deserialize)]
pub(super) struct AccountUpdateRequest {
    email: Option<String>,
    display_name: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    bio: Option<String>,
    social_links: Option<SocialLinks>,
    is_owner: Option<bool>,
}

type AccountResponse = Result<Json<ApiResponse<AccountItem>>, ApiError>;

fn parse_link_ids(
    req_id: &RequestId,
    account: &str,
    property: &str,
) -> Result<(Uuid, Uuid), ApiError> {
    Ok((
        parse_public_id(req_id, account)?,
        parse_public_id(req_id, property)?,
    ))
}

fn respond(
    req_id: RequestId,
    result: Result<stayease_db::AccountRow, stayease_db::DbError>,
) -> AccountResponse {
    let row = result.map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse::new(AccountItem::from(row), req_id.0)))
}

pub(super) async fn get_account(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> AccountResponse {
    let public_id = parse_public_id(&req_id, &id)?;

    let row = stayease_db::get_account(&state.pool, public_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id, format!("account {public_id} not found")))?;

    Ok(Json(ApiResponse::new(AccountItem::from(row), req_id.0)))
}

/// Creates the account on first write.
pub(super) async fn update_account(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    body: Result<Json<AccountUpdateRequest>, JsonRejection>,
) -> AccountResponse {
    let public_id = parse_public_id(&req_id, &id)?;
    let Json(body) = body.map_err(|e| ApiError::bad_request(&req_id, e.body_text()))?;

    let email = body.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
    if let Some(email) = email {
        stayease_mail::validate_address(email)
            .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;
    }

    let update = stayease_db::AccountProfileUpdate {
        email,
        display_name: body.display_name.as_deref(),
        first_name: body.first_name.as_deref(),
        last_name: body.last_name.as_deref(),
        phone: body.phone.as_deref(),
        bio: body.bio.as_deref(),
        social_links: body.social_links.as_ref(),
        is_owner: body.is_owner,
    };
    let result = stayease_db::upsert_account(&state.pool, public_id, &update).await;
    respond(req_id, result)
}

pub(super) async fn save_property(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((id, property_id)): Path<(String, String)>,
) -> AccountResponse {
    let (account, property) = parse_link_ids(&req_id, &id, &property_id)?;
    let result = stayease_db::add_saved_property(&state.pool, account, property).await;
    respond(req_id, result)
}

pub(super) async fn unsave_property(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((id, property_id)): Path<(String, String)>,
) -> AccountResponse {
    let (account, property) = parse_link_ids(&req_id, &id, &property_id)?;
    let result = stayease_db::remove_saved_property(&state.pool, account, property).await;
    respond(req_id, result)
}

pub(super) async fn add_interest(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((id, property_id)): Path<(String, String)>,
) -> AccountResponse {
    let (account, property) = parse_link_ids(&req_id, &id, &property_id)?;
    let result = stayease_db::add_interest(&state.pool, account, property).await;
    if result.is_ok() {
        tracing::info!(account = %account, property = %property, "accounts: interest registered");
    }
    respond(req_id, result)
}

pub(super) async fn remove_interest(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((id, property_id)): Path<(String, String)>,
) -> AccountResponse {
    let (account, property) = parse_link_ids(&req_id, &id, &property_id)?;
    let result = stayease_db::remove_interest(&state.pool, account, property).await;
    respond(req_id, result)
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::build_app;
    use crate::test_support::{lazy_pool, seed_account, seed_property, state};

    fn request(method: &str, uri: &str, body: Option<&serde_json::Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request")
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json parse")
    }

    #[tokio::test]
    async fn malformed_account_id_is_bad_request() {
        let app = build_app(state(lazy_pool()));
        let response = app
            .oneshot(request("GET", "/api/accounts/42", None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn put_creates_then_updates_profile(pool: sqlx::PgPool) {
        let id = uuid::Uuid::new_v4();
        let app = build_app(state(pool));

        let response = app
            .clone()
            .oneshot(request(
                "PUT",
                &format!("/api/accounts/{id}"),
                Some(&serde_json::json!({
                    "email": "renter@stayease.test",
                    "display_name": "Jo",
                    "social_links": { "facebook": "https://facebook.com/jo" },
                })),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(request(
                "PUT",
                &format!("/api/accounts/{id}"),
                Some(&serde_json::json!({ "bio": "Grad student" })),
            ))
            .await
            .expect("response");
        let json = json_body(response).await;
        assert_eq!(json["data"]["email"], "renter@stayease.test");
        assert_eq!(json["data"]["bio"], "Grad student");
        assert_eq!(
            json["data"]["social_links"]["facebook"],
            "https://facebook.com/jo"
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn put_rejects_invalid_email(pool: sqlx::PgPool) {
        let app = build_app(state(pool));
        let response = app
            .oneshot(request(
                "PUT",
                &format!("/api/accounts/{}", uuid::Uuid::new_v4()),
                Some(&serde_json::json!({ "email": "nope" })),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn interest_toggles_both_sides(pool: sqlx::PgPool) {
        let account = seed_account(&pool, Some("renter@stayease.test"), None).await;
        let property = seed_property(&pool, "Maple Dorm", None).await;
        let app = build_app(state(pool.clone()));
        let uri = format!("/api/accounts/{account}/interested/{property}");

        let response = app
            .clone()
            .oneshot(request("POST", &uri, None))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(
            json["data"]["interested_properties"],
            serde_json::json!([property.to_string()])
        );

        let row = stayease_db::get_property(&pool, property)
            .await
            .expect("query")
            .expect("property");
        assert_eq!(row.interested_count, 1);

        app.oneshot(request("DELETE", &uri, None))
            .await
            .expect("response");
        let row = stayease_db::get_property(&pool, property)
            .await
            .expect("query")
            .expect("property");
        assert_eq!(row.interested_count, 0);
        assert!(row.interested_applicants.is_empty());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn saving_for_missing_account_is_404(pool: sqlx::PgPool) {
        let property = seed_property(&pool, "Maple Dorm", None).await;
        let app = build_app(state(pool));
        let response = app
            .oneshot(request(
                "POST",
                &format!("/api/accounts/{}/saved/{property}", uuid::Uuid::new_v4()),
                None,
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
