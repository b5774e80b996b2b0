use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::health::SystemHealthReport;
use crate::middleware::RequestId;
use crate::notifier::{run_availability_sweep, SweepReport};

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct LogQuery {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct SystemLogItem {
    id: i64,
    level: String,
    source: String,
    message: String,
    context: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

/// Run the availability sweep now instead of waiting for the daily job.
pub(super) async fn run_availability_check(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SweepReport>>, ApiError> {
    tracing::info!("notifier: manual availability check requested");
    let report = run_availability_sweep(
        &state.pool,
        state.mailer.as_ref(),
        &state.notifier,
        Utc::now(),
    )
    .await
    .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(report, req_id.0)))
}

/// Always 200; the report itself carries the overall status.
pub(super) async fn system_health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SystemHealthReport>> {
    let report = state.health.check_all(&state.pool).await;
    Json(ApiResponse::new(report, req_id.0))
}

pub(super) async fn list_system_logs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LogQuery>,
) -> Result<Json<ApiResponse<Vec<SystemLogItem>>>, ApiError> {
    let rows = stayease_db::list_recent_logs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| SystemLogItem {
            id: row.id,
            level: row.level,
            source: row.source,
            message: row.message,
            context: row.context,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
