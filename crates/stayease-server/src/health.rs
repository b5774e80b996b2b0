//! Dashboard health checks gated by per-target circuit breakers.
//!
//! Each check runs behind its own [`CircuitBreaker`]. The breaker lock is
//! taken only to acquire and to record the outcome; it is never held while
//! the checked operation runs.

use std::future::Future;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use stayease_core::{BreakerState, CircuitBreaker, HealthConfig};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct HealthSettings {
    /// Target of the `api` check; the check is skipped when unset.
    pub api_url: Option<String>,
    pub failure_threshold: u32,
    pub reset_timeout: Duration,
    pub request_timeout: Duration,
}

impl HealthSettings {
    #[must_use]
    pub fn from_config(config: &HealthConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            failure_threshold: config.failure_threshold,
            reset_timeout: Duration::from_secs(config.reset_timeout_secs),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BreakerError<E> {
    #[error("circuit breaker is open")]
    Open,
    #[error("{0}")]
    Inner(E),
}

/// A [`CircuitBreaker`] shared between concurrent callers.
#[derive(Debug)]
pub struct GuardedBreaker {
    inner: Mutex<CircuitBreaker>,
}

impl GuardedBreaker {
    #[must_use]
    pub fn new(failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(CircuitBreaker::new(failure_threshold, reset_timeout)),
        }
    }

    pub async fn state(&self) -> BreakerState {
        self.inner.lock().await.state(Instant::now())
    }

    /// Run `op` if the breaker admits it and record the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`BreakerError::Open`] without running `op` while the
    /// breaker is open, otherwise [`BreakerError::Inner`] with the
    /// operation's own error.
    pub async fn call<T, E, F, Fut>(&self, op: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let admitted = self.inner.lock().await.try_acquire(Instant::now());
        if !admitted {
            return Err(BreakerError::Open);
        }

        match op().await {
            Ok(value) => {
                self.inner.lock().await.record_success();
                Ok(value)
            }
            Err(e) => {
                self.inner.lock().await.record_failure(Instant::now());
                Err(BreakerError::Inner(e))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Healthy,
    Unhealthy,
    CircuitOpen,
    Skipped,
}

impl CheckStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CheckStatus::Healthy => "healthy",
            CheckStatus::Unhealthy => "unhealthy",
            CheckStatus::CircuitOpen => "circuit_open",
            CheckStatus::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Healthy,
    Degraded,
    Down,
}

impl OverallStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OverallStatus::Healthy => "healthy",
            OverallStatus::Degraded => "degraded",
            OverallStatus::Down => "down",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceCheck {
    pub service: &'static str,
    pub status: CheckStatus,
    pub latency_ms: Option<i64>,
    pub breaker_state: BreakerState,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemHealthReport {
    pub overall_status: OverallStatus,
    pub services: Vec<ServiceCheck>,
    pub checked_at: DateTime<Utc>,
}

/// Skipped checks do not count. No counted checks means healthy.
#[must_use]
pub fn overall_status(checks: &[ServiceCheck]) -> OverallStatus {
    let counted: Vec<_> = checks
        .iter()
        .filter(|c| c.status != CheckStatus::Skipped)
        .collect();
    let healthy = counted
        .iter()
        .filter(|c| c.status == CheckStatus::Healthy)
        .count();

    if healthy == counted.len() {
        OverallStatus::Healthy
    } else if healthy == 0 {
        OverallStatus::Down
    } else {
        OverallStatus::Degraded
    }
}

pub struct SystemHealthService {
    database: GuardedBreaker,
    photo_store: GuardedBreaker,
    api: GuardedBreaker,
    api_url: Option<String>,
    request_timeout: Duration,
    client: reqwest::Client,
}

impl SystemHealthService {
    #[must_use]
    pub fn new(settings: &HealthSettings) -> Self {
        let breaker = || GuardedBreaker::new(settings.failure_threshold, settings.reset_timeout);
        Self {
            database: breaker(),
            photo_store: breaker(),
            api: breaker(),
            api_url: settings.api_url.clone(),
            request_timeout: settings.request_timeout,
            client: reqwest::Client::new(),
        }
    }

    pub async fn check_database(&self, pool: &PgPool) -> ServiceCheck {
        run_check("database", &self.database, || stayease_db::health_check(pool)).await
    }

    pub async fn check_photo_store(&self, pool: &PgPool) -> ServiceCheck {
        run_check("photo_store", &self.photo_store, || async {
            stayease_db::count_photos(pool).await.map(|_| ())
        })
        .await
    }

    pub async fn check_api(&self) -> ServiceCheck {
        let Some(url) = self.api_url.as_deref() else {
            return ServiceCheck {
                service: "api",
                status: CheckStatus::Skipped,
                latency_ms: None,
                breaker_state: self.api.state().await,
                error: None,
            };
        };

        run_check("api", &self.api, || async {
            self.client
                .get(url)
                .timeout(self.request_timeout)
                .send()
                .await?
                .error_for_status()
                .map(|_| ())
        })
        .await
    }

    /// Run every check, persist the results, and return the report.
    ///
    /// Telemetry writes are best effort; a failed write is logged and the
    /// report is still returned.
    pub async fn check_all(&self, pool: &PgPool) -> SystemHealthReport {
        let (database, photo_store, api) = tokio::join!(
            self.check_database(pool),
            self.check_photo_store(pool),
            self.check_api()
        );
        let services = vec![database, photo_store, api];
        let report = SystemHealthReport {
            overall_status: overall_status(&services),
            services,
            checked_at: Utc::now(),
        };

        record_report(pool, &report).await;

        tracing::info!(
            status = report.overall_status.as_str(),
            "health: checks complete"
        );
        report
    }
}

async fn run_check<E, F, Fut>(
    service: &'static str,
    breaker: &GuardedBreaker,
    op: F,
) -> ServiceCheck
where
    E: std::fmt::Display,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let started = Instant::now();
    let result = breaker.call(op).await;
    let latency_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);
    let breaker_state = breaker.state().await;

    let (status, latency_ms, error) = match result {
        Ok(()) => (CheckStatus::Healthy, Some(latency_ms), None),
        Err(BreakerError::Open) => (
            CheckStatus::CircuitOpen,
            None,
            Some("circuit breaker is open".to_string()),
        ),
        Err(BreakerError::Inner(e)) => (CheckStatus::Unhealthy, Some(latency_ms), Some(e.to_string())),
    };

    ServiceCheck {
        service,
        status,
        latency_ms,
        breaker_state,
        error,
    }
}

async fn record_report(pool: &PgPool, report: &SystemHealthReport) {
    for check in &report.services {
        record_check(pool, check).await;
    }

    let services = match serde_json::to_value(&report.services) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "health: failed to serialize report");
            return;
        }
    };
    if let Err(e) =
        stayease_db::insert_system_health(pool, report.overall_status.as_str(), &services).await
    {
        tracing::warn!(error = %e, "health: failed to store system health");
    }
}

async fn record_check(pool: &PgPool, check: &ServiceCheck) {
    let row = stayease_db::NewStatusCheck {
        service: check.service,
        status: check.status.as_str(),
        latency_ms: check.latency_ms,
        breaker_state: check.breaker_state.as_str(),
        error_message: check.error.as_deref(),
    };
    if let Err(e) = stayease_db::insert_status_check(pool, &row).await {
        tracing::warn!(service = check.service, error = %e, "health: failed to store status check");
    }

    if let Some(latency_ms) = check.latency_ms {
        #[allow(clippy::cast_precision_loss)]
        let value = latency_ms as f64;
        let metric = format!("{}_latency", check.service);
        if let Err(e) = stayease_db::insert_performance_metric(pool, &metric, value, "ms").await {
            tracing::warn!(service = check.service, error = %e, "health: failed to store metric");
        }
    }

    let level = match check.status {
        CheckStatus::Unhealthy => stayease_db::LogLevel::Error,
        CheckStatus::CircuitOpen => stayease_db::LogLevel::Warn,
        CheckStatus::Healthy | CheckStatus::Skipped => return,
    };
    let message = format!("{} check {}", check.service, check.status.as_str());
    let context = serde_json::json!({
        "service": check.service,
        "breaker_state": check.breaker_state,
        "error": check.error,
    });
    if let Err(e) = stayease_db::insert_system_log(pool, level, "health", &message, Some(&context)).await {
        tracing::warn!(service = check.service, error = %e, "health: failed to store system log");
    }
}

#[cfg(test)]
#[path = "health_test.rs"]
mod tests;
