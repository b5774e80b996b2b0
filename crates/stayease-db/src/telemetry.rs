//! Dashboard telemetry: status checks, performance samples, system logs,
//! and overall health snapshots.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewStatusCheck<'a> {
    pub service: &'a str,
    pub status: &'a str,
    pub latency_ms: Option<i64>,
    pub breaker_state: &'a str,
    pub error_message: Option<&'a str>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SystemLogRow {
    pub id: i64,
    pub level: String,
    pub source: String,
    pub message: String,
    pub context: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_status_check(pool: &PgPool, check: &NewStatusCheck<'_>) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO system_status_checks \
             (service, status, latency_ms, breaker_state, error_message) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(check.service)
    .bind(check.status)
    .bind(check.latency_ms)
    .bind(check.breaker_state)
    .bind(check.error_message)
    .execute(pool)
    .await?;
    Ok(())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_performance_metric(
    pool: &PgPool,
    metric_name: &str,
    value: f64,
    unit: &str,
) -> Result<(), DbError> {
    sqlx::query("INSERT INTO performance_metrics (metric_name, value, unit) VALUES ($1, $2, $3)")
        .bind(metric_name)
        .bind(value)
        .bind(unit)
        .execute(pool)
        .await?;
    Ok(())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_system_log(
    pool: &PgPool,
    level: LogLevel,
    source: &str,
    message: &str,
    context: Option<&serde_json::Value>,
) -> Result<(), DbError> {
    sqlx::query("INSERT INTO system_logs (level, source, message, context) VALUES ($1, $2, $3, $4)")
        .bind(level.as_str())
        .bind(source)
        .bind(message)
        .bind(context)
        .execute(pool)
        .await?;
    Ok(())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_system_health(
    pool: &PgPool,
    overall_status: &str,
    services: &serde_json::Value,
) -> Result<(), DbError> {
    sqlx::query("INSERT INTO system_health (overall_status, services) VALUES ($1, $2)")
        .bind(overall_status)
        .bind(services)
        .execute(pool)
        .await?;
    Ok(())
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_logs(pool: &PgPool, limit: i64) -> Result<Vec<SystemLogRow>, DbError> {
    let rows = sqlx::query_as::<_, SystemLogRow>(
        "SELECT id, level, source, message, context, created_at \
         FROM system_logs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
