//! Binary property-photo store.

use axum::{
    body::Bytes,
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        rejection::JsonRejection,
        DefaultBodyLimit, Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{post, MethodRouter},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use stayease_core::{validate_photo_content_type, validate_photo_size, CoreError, MAX_PHOTO_BYTES};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, parse_public_id, ApiError, ApiResponse, AppState};

/// Room for multipart framing and the label part on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Debug, Serialize)]
pub(super) struct UploadedPhoto {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
pub(super) struct LabelUpdate {
    label: String,
}

#[derive(Debug, Serialize)]
pub(super) struct PhotoLabel {
    id: Uuid,
    label: String,
}

#[derive(Debug, Serialize)]
pub(super) struct BulkDeleteResult {
    #[serde(rename = "deletedCount")]
    deleted_count: u64,
}

pub(super) fn upload_route() -> MethodRouter<AppState> {
    post(upload_photo).layer(DefaultBodyLimit::max(
        MAX_PHOTO_BYTES + MULTIPART_OVERHEAD_BYTES,
    ))
}

fn multipart_error(req_id: &RequestId, error: &MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(
            req_id.0.clone(),
            "payload_too_large",
            format!("photo exceeds the {MAX_PHOTO_BYTES} byte limit"),
        );
    }
    ApiError::bad_request(req_id, error.body_text())
}

fn upload_rule_error(req_id: &RequestId, error: &CoreError) -> ApiError {
    let code = match error {
        CoreError::PhotoTooLarge { .. } => "payload_too_large",
        _ => "bad_request",
    };
    ApiError::new(req_id.0.clone(), code, error.to_string())
}

pub(super) async fn upload_photo(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ApiResponse<UploadedPhoto>>), ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(&req_id, e.body_text()))?;

    let mut label: Option<String> = None;
    let mut file_name: Option<String> = None;
    let mut photo: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&req_id, &e))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("photo") => {
                let content_type = field.content_type().map(str::to_owned);
                validate_photo_content_type(content_type.as_deref())
                    .map_err(|e| upload_rule_error(&req_id, &e))?;
                file_name = field.file_name().map(str::to_owned);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(&req_id, &e))?;
                validate_photo_size(data.len()).map_err(|e| upload_rule_error(&req_id, &e))?;
                photo = Some((content_type.unwrap_or_default(), data));
            }
            Some("label") => {
                label = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| multipart_error(&req_id, &e))?,
                );
            }
            _ => {}
        }
    }

    let Some((content_type, data)) = photo else {
        return Err(ApiError::bad_request(&req_id, "no photo uploaded"));
    };
    let label = label.or(file_name).unwrap_or_default();

    let row = stayease_db::insert_photo(&state.pool, label.trim(), &content_type, &data)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(photo = %row.public_id, bytes = row.byte_size, "photos: stored upload");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(UploadedPhoto { id: row.public_id }, req_id.0)),
    ))
}

pub(super) async fn update_photo_label(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    body: Result<Json<LabelUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<PhotoLabel>>, ApiError> {
    let public_id = parse_public_id(&req_id, &id)?;
    let Json(update) = body.map_err(|e| ApiError::bad_request(&req_id, e.body_text()))?;

    let row = stayease_db::update_photo_label(&state.pool, public_id, update.label.trim())
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id, "photo not found"))?;

    Ok(Json(ApiResponse::new(
        PhotoLabel {
            id: row.public_id,
            label: row.label,
        },
        req_id.0,
    )))
}

/// Raw image bytes. Always served as `image/jpeg`, whatever was uploaded.
pub(super) async fn get_photo_image(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let public_id = parse_public_id(&req_id, &id)?;

    let image = stayease_db::get_photo_image(&state.pool, public_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id, "photo not found"))?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], image.data).into_response())
}

pub(super) async fn get_photo_label(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PhotoLabel>>, ApiError> {
    let public_id = parse_public_id(&req_id, &id)?;

    let label = stayease_db::get_photo_label(&state.pool, public_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| ApiError::not_found(&req_id, "photo not found"))?;

    Ok(Json(ApiResponse::new(
        PhotoLabel {
            id: public_id,
            label,
        },
        req_id.0,
    )))
}

/// Validate `{"photoIds": [...]}` into UUIDs.
///
/// The body is taken as raw JSON so a missing or non-array `photoIds`
/// produces the same 400 as a malformed id.
fn parse_photo_ids(req_id: &RequestId, body: &serde_json::Value) -> Result<Vec<Uuid>, ApiError> {
    let Some(items) = body.get("photoIds").and_then(serde_json::Value::as_array) else {
        return Err(ApiError::bad_request(req_id, "photoIds must be an array"));
    };

    items
        .iter()
        .map(|item| {
            item.as_str()
                .and_then(|s| Uuid::parse_str(s.trim()).ok())
                .ok_or_else(|| ApiError::bad_request(req_id, format!("invalid photo id: {item}")))
        })
        .collect()
}

pub(super) async fn bulk_delete_photos(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<ApiResponse<BulkDeleteResult>>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::bad_request(&req_id, e.body_text()))?;
    let ids = parse_photo_ids(&req_id, &body)?;

    let deleted_count = stayease_db::delete_photos(&state.pool, &ids)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    tracing::info!(requested = ids.len(), deleted = deleted_count, "photos: bulk delete");

    Ok(Json(ApiResponse::new(
        BulkDeleteResult { deleted_count },
        req_id.0,
    )))
}

#[cfg(test)]
#[path = "photos_test.rs"]
mod tests;
