//! Target-day window for the availability notifier.

use chrono::{DateTime, Days, NaiveTime, TimeDelta, TimeZone, Utc};

/// Largest lead accepted from configuration.
pub const MAX_LEAD_DAYS: u32 = 365;

/// A half-open UTC range `[start, end)` covering one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AvailabilityWindow {
    /// The UTC calendar day `lead_days` after the date of `now`.
    ///
    /// `lead_days` is capped at [`MAX_LEAD_DAYS`]. A window that would run
    /// past the representable range ends at [`DateTime::<Utc>::MAX_UTC`].
    #[must_use]
    pub fn days_ahead(now: DateTime<Utc>, lead_days: u32) -> Self {
        let lead = Days::new(u64::from(lead_days.min(MAX_LEAD_DAYS)));
        let target = now
            .date_naive()
            .checked_add_days(lead)
            .unwrap_or(chrono::NaiveDate::MAX);
        let start = Utc.from_utc_datetime(&target.and_time(NaiveTime::MIN));
        let end = start
            .checked_add_signed(TimeDelta::days(1))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { start, end }
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }

    /// Window bounds as Unix seconds, inclusive start and exclusive end.
    #[must_use]
    pub fn as_unix_seconds(&self) -> (i64, i64) {
        (self.start.timestamp(), self.end.timestamp())
    }
}
