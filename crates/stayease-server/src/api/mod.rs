mod accounts;
mod email;
mod photos;
mod properties;
mod system;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use stayease_mail::Mailer;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::health::SystemHealthService;
use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};
use crate::notifier::NotifierConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub mailer: Arc<dyn Mailer>,
    pub health: Arc<SystemHealthService>,
    pub notifier: NotifierConfig,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Error body: `{message, error, request_id}` where `error` is a stable code.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
    pub error: String,
    pub request_id: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

#[derive(Debug, Serialize)]
struct StoreConnectivity {
    connected: bool,
    property_count: i64,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            error: code.into(),
            request_id: request_id.into(),
        }
    }

    pub(super) fn bad_request(request_id: &RequestId, message: impl Into<String>) -> Self {
        Self::new(request_id.0.clone(), "bad_request", message)
    }

    pub(super) fn not_found(request_id: &RequestId, message: impl Into<String>) -> Self {
        Self::new(request_id.0.clone(), "not_found", message)
    }

    fn status(&self) -> StatusCode {
        match self.error.as_str() {
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "not_found" => StatusCode::NOT_FOUND,
            "conflict" => StatusCode::CONFLICT,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            "service_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn map_db_error(request_id: String, error: &stayease_db::DbError) -> ApiError {
    if matches!(error, stayease_db::DbError::NotFound) {
        return ApiError::new(request_id, "not_found", "resource not found");
    }
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

/// Parse a path id, answering 400 when it is not a UUID.
pub(super) fn parse_public_id(request_id: &RequestId, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::bad_request(request_id, format!("invalid id: {raw}")))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/property-photos/upload", photos::upload_route())
        .route(
            "/api/property-photos/bulk-delete",
            delete(photos::bulk_delete_photos),
        )
        .route("/api/property-photos/{id}", put(photos::update_photo_label))
        .route("/api/property-photos/{id}/image", get(photos::get_photo_image))
        .route("/api/property-photos/{id}/label", get(photos::get_photo_label))
        .route("/api/email/nodemailer/send", post(email::send_email))
        .route("/api/email/test", get(email::send_test_email))
        .route("/api/email/test-to/{email}", get(email::send_test_email_to))
        .route(
            "/api/properties",
            get(properties::list_properties).post(properties::create_property),
        )
        .route("/api/properties/{id}", get(properties::get_property))
        .route(
            "/api/properties/{id}/status",
            patch(properties::update_property_status),
        )
        .route(
            "/api/properties/{id}/photos",
            get(properties::list_property_photos),
        )
        .route(
            "/api/properties/{id}/comments",
            get(properties::list_comments).post(properties::create_comment),
        )
        .route(
            "/api/accounts/{id}",
            get(accounts::get_account).put(accounts::update_account),
        )
        .route(
            "/api/accounts/{id}/saved/{property_id}",
            post(accounts::save_property).delete(accounts::unsave_property),
        )
        .route(
            "/api/accounts/{id}/interested/{property_id}",
            post(accounts::add_interest).delete(accounts::remove_interest),
        )
        .route("/api/availability-check", get(system::run_availability_check))
        .route("/api/system/health", get(system::system_health))
        .route("/api/system/logs", get(system::list_system_logs))
}

pub fn build_app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(health))
        .route("/api/test-firebase", get(test_document_store));

    Router::new()
        .merge(public_routes)
        .merge(api_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match stayease_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

/// Connectivity probe for the primary document store.
async fn test_document_store(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<StoreConnectivity>>, ApiError> {
    let property_count = stayease_db::count_properties(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "document store connectivity test failed");
            ApiError::new(
                req_id.0.clone(),
                "service_unavailable",
                "document store unreachable",
            )
        })?;

    Ok(Json(ApiResponse::new(
        StoreConnectivity {
            connected: true,
            property_count,
        },
        req_id.0,
    )))
}
