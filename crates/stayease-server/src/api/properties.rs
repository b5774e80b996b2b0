//! Listing reads and writes.
//!
//! - `GET /api/properties`: filtered listing
//! - `POST /api/properties`: create a listing
//! - `GET /api/properties/{id}`: detail; counts a view
//! - `PATCH /api/properties/{id}/status`: moderation status
//! - `GET /api/properties/{id}/photos`: resolved photo URLs
//! - `GET|POST /api/properties/{id}/comments`

use std::str::FromStr;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stayease_core::{PropertyPhotos, PropertyStatus};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, parse_public_id, ApiError, ApiResponse, AppState};

const MAX_COMMENT_CHARS: usize = 2000;

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct PropertyItem {
    id: Uuid,
    name: String,
    location: String,
    price: Decimal,
    property_type: Option<String>,
    tags: Vec<String>,
    owner_id: Option<Uuid>,
    photo_urls: Vec<String>,
    status: String,
    view_count: i32,
    interested_count: i32,
    available_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<stayease_db::PropertyRow> for PropertyItem {
    fn from(row: stayease_db::PropertyRow) -> Self {
        Self {
            photo_urls: row.property_photos.0.resolve_urls(""),
            id: row.public_id,
            name: row.name,
            location: row.location,
            price: row.price,
            property_type: row.property_type,
            tags: row.tags,
            owner_id: row.owner_id,
            status: row.status,
            view_count: row.view_count,
            interested_count: row.interested_count,
            available_at: row.available_at,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PropertyQuery {
    location: Option<String>,
    property_type: Option<String>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
    tag: Option<String>,
    status: Option<String>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreatePropertyRequest {
    name: String,
    location: String,
    price: Decimal,
    property_type: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    owner_id: Option<Uuid>,
    #[serde(default)]
    property_photos: PropertyPhotos,
    status: Option<String>,
    available_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StatusUpdate {
    status: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PropertyPhotoUrls {
    id: Uuid,
    photo_urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct CommentItem {
    id: Uuid,
    property_id: Uuid,
    account_id: Option<Uuid>,
    body: String,
    created_at: DateTime<Utc>,
}

impl From<stayease_db::CommentRow> for CommentItem {
    fn from(row: stayease_db::CommentRow) -> Self {
        Self {
            id: row.public_id,
            property_id: row.property_id,
            account_id: row.account_id,
            body: row.body,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CommentQuery {
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateCommentRequest {
    body: String,
    account_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_status(req_id: &RequestId, raw: &str) -> Result<PropertyStatus, ApiError> {
    PropertyStatus::from_str(raw)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))
}

async fn resolve_property(
    state: &AppState,
    req_id: &RequestId,
    public_id: Uuid,
) -> Result<stayease_db::PropertyRow, ApiError> {
    stayease_db::get_property(&state.pool, public_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(req_id, format!("property {public_id} not found")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub(super) async fn list_properties(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PropertyQuery>,
) -> Result<Json<ApiResponse<Vec<PropertyItem>>>, ApiError> {
    let status = parse_status(&req_id, query.status.as_deref().unwrap_or("active"))?;

    let rows = stayease_db::list_properties(
        &state.pool,
        stayease_db::PropertyListFilters {
            location: query.location.as_deref().filter(|s| !s.trim().is_empty()),
            property_type: query.property_type.as_deref(),
            min_price: query.min_price,
            max_price: query.max_price,
            tag: query.tag.as_deref(),
            status: Some(status.as_str()),
            limit: normalize_limit(query.limit),
        },
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(PropertyItem::from).collect();
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn get_property(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PropertyItem>>, ApiError> {
    let public_id = parse_public_id(&req_id, &id)?;

    let row = stayease_db::increment_view_count(&state.pool, public_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id, format!("property {public_id} not found")))?;

    Ok(Json(ApiResponse::new(PropertyItem::from(row), req_id.0)))
}

pub(super) async fn create_property(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<CreatePropertyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<PropertyItem>>), ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(&req_id, e.body_text()))?;
    let rid = &req_id.0;

    let name = body.name.trim();
    if name.is_empty() || name.chars().count() > 200 {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "name must be 1-200 characters",
        ));
    }
    let location = body.location.trim();
    if location.is_empty() {
        return Err(ApiError::new(rid, "validation_error", "location is required"));
    }
    if body.price < Decimal::ZERO {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "price must not be negative",
        ));
    }
    let status = parse_status(&req_id, body.status.as_deref().unwrap_or("pending"))?;
    let tags: Vec<String> = body
        .tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let row = stayease_db::create_property(
        &state.pool,
        &stayease_db::NewProperty {
            name,
            location,
            price: body.price,
            property_type: body.property_type.as_deref(),
            tags: &tags,
            owner_id: body.owner_id,
            property_photos: &body.property_photos,
            status: status.as_str(),
            available_at: body.available_at,
        },
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    tracing::info!(property = %row.public_id, status = %row.status, "properties: created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(PropertyItem::from(row), req_id.0)),
    ))
}

pub(super) async fn update_property_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    body: Result<Json<StatusUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<PropertyItem>>, ApiError> {
    let public_id = parse_public_id(&req_id, &id)?;
    let Json(update) = body.map_err(|e| ApiError::bad_request(&req_id, e.body_text()))?;
    let status = parse_status(&req_id, &update.status)?;

    let row = stayease_db::update_property_status(&state.pool, public_id, status.as_str())
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id, format!("property {public_id} not found")))?;

    tracing::info!(property = %public_id, status = %status, "properties: status changed");
    Ok(Json(ApiResponse::new(PropertyItem::from(row), req_id.0)))
}

pub(super) async fn list_property_photos(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PropertyPhotoUrls>>, ApiError> {
    let public_id = parse_public_id(&req_id, &id)?;
    let row = resolve_property(&state, &req_id, public_id).await?;

    Ok(Json(ApiResponse::new(
        PropertyPhotoUrls {
            id: row.public_id,
            photo_urls: row.property_photos.0.resolve_urls(""),
        },
        req_id.0,
    )))
}

pub(super) async fn list_comments(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Query(query): Query<CommentQuery>,
) -> Result<Json<ApiResponse<Vec<CommentItem>>>, ApiError> {
    let public_id = parse_public_id(&req_id, &id)?;

    let rows = stayease_db::list_comments(&state.pool, public_id, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(CommentItem::from).collect();
    Ok(Json(ApiResponse::new(data, req_id.0)))
}

pub(super) async fn create_comment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    body: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<CommentItem>>), ApiError> {
    let public_id = parse_public_id(&req_id, &id)?;
    let Json(body) = body.map_err(|e| ApiError::bad_request(&req_id, e.body_text()))?;

    let text = body.body.trim();
    if text.is_empty() || text.chars().count() > MAX_COMMENT_CHARS {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("comment must be 1-{MAX_COMMENT_CHARS} characters"),
        ));
    }

    resolve_property(&state, &req_id, public_id).await?;

    let row = stayease_db::insert_comment(&state.pool, public_id, body.account_id, text)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(CommentItem::from(row), req_id.0)),
    ))
}

#[cfg(test)]
#[path = "properties_test.rs"]
mod tests;
