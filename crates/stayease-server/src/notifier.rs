//! Daily availability sweep.
//!
//! Finds listings that open `lead_days` from today (UTC) and emails every
//! interested renter with a resolvable address. Sends are sequential and
//! never retried; running the sweep twice on one day sends twice.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use stayease_core::AvailabilityWindow;
use stayease_mail::{templates, Mailer};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Front-end origin used to build listing links.
    pub app_url: String,
    pub lead_days: u32,
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SweepReport {
    pub window_start: Option<DateTime<Utc>>,
    pub window_end: Option<DateTime<Utc>>,
    pub properties_matched: usize,
    /// Matched listings with nobody interested.
    pub properties_skipped: usize,
    pub emails_sent: usize,
    pub recipients_without_email: usize,
    pub failures: usize,
}

/// Run one sweep for the day `config.lead_days` after `now`.
///
/// # Errors
///
/// Returns [`stayease_db::DbError`] only when the property query fails.
/// Account lookups and sends are best effort: failures are logged and
/// counted in the report.
pub async fn run_availability_sweep(
    pool: &PgPool,
    mailer: &dyn Mailer,
    config: &NotifierConfig,
    now: DateTime<Utc>,
) -> Result<SweepReport, stayease_db::DbError> {
    let window = AvailabilityWindow::days_ahead(now, config.lead_days);
    let mut report = SweepReport {
        window_start: Some(window.start),
        window_end: Some(window.end),
        ..SweepReport::default()
    };

    let properties =
        stayease_db::list_properties_available_between(pool, window.start, window.end).await?;
    report.properties_matched = properties.len();

    tracing::info!(
        count = properties.len(),
        window_start = %window.start,
        "notifier: properties becoming available"
    );

    for property in &properties {
        if property.interested_applicants.is_empty() {
            report.properties_skipped += 1;
            continue;
        }
        notify_property(pool, mailer, config, property, &mut report).await;
    }

    tracing::info!(
        sent = report.emails_sent,
        failures = report.failures,
        without_email = report.recipients_without_email,
        "notifier: sweep complete"
    );
    Ok(report)
}

async fn notify_property(
    pool: &PgPool,
    mailer: &dyn Mailer,
    config: &NotifierConfig,
    property: &stayease_db::PropertyRow,
    report: &mut SweepReport,
) {
    let Some(available_at) = property.available_at else {
        return;
    };

    let accounts =
        match stayease_db::list_account_emails(pool, &property.interested_applicants).await {
            Ok(rows) => rows
                .into_iter()
                .map(|row| (row.public_id, row))
                .collect::<HashMap<Uuid, _>>(),
            Err(e) => {
                tracing::error!(
                    property = %property.public_id,
                    error = %e,
                    "notifier: failed to load interested accounts"
                );
                report.failures += property.interested_applicants.len();
                return;
            }
        };

    let property_url = format!(
        "{}/properties/{}",
        config.app_url.trim_end_matches('/'),
        property.public_id
    );

    for applicant in &property.interested_applicants {
        let Some(email) = accounts
            .get(applicant)
            .and_then(|a| a.email.as_deref())
            .map(str::trim)
            .filter(|e| !e.is_empty())
        else {
            report.recipients_without_email += 1;
            continue;
        };

        let recipient_name = accounts.get(applicant).and_then(|a| a.display_name.as_deref());
        let message = templates::availability_notice(
            email,
            &templates::AvailabilityNotice {
                recipient_name,
                property_name: &property.name,
                location: &property.location,
                available_at,
                property_url: &property_url,
            },
        );

        match mailer.send(&message).await {
            Ok(()) => {
                report.emails_sent += 1;
                tracing::info!(property = %property.public_id, to = %email, "notifier: sent");
            }
            Err(e) => {
                report.failures += 1;
                tracing::error!(
                    property = %property.public_id,
                    to = %email,
                    error = %e,
                    "notifier: send failed"
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "notifier_test.rs"]
mod tests;
