//! Three-state circuit breaker used to gate dashboard health checks.
//!
//! The breaker is a plain state machine: callers pass the current
//! [`Instant`] so transitions are deterministic under test.

use std::time::{Duration, Instant};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        }
    }
}

impl std::fmt::Display for BreakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-threshold breaker: opens after `failure_threshold` consecutive
/// failures and allows one probe once `reset_timeout` has elapsed.
///
/// While that probe is outstanding every other caller is rejected. A probe
/// that never reports back stops blocking once another `reset_timeout`
/// has passed.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    reset_timeout: Duration,
    state: BreakerState,
    failure_count: u32,
    last_failure: Option<Instant>,
    probe_started: Option<Instant>,
}

impl CircuitBreaker {
    /// A threshold of zero is treated as one.
    #[must_use]
    pub fn new(failure_threshold: u32, reset_timeout: Duration) -> Self {
        Self {
            failure_threshold: failure_threshold.max(1),
            reset_timeout,
            state: BreakerState::Closed,
            failure_count: 0,
            last_failure: None,
            probe_started: None,
        }
    }

    /// Current state as observed at `now`.
    ///
    /// An open breaker whose timeout has elapsed reports `HalfOpen` without
    /// mutating itself; [`CircuitBreaker::try_acquire`] performs the transition.
    #[must_use]
    pub fn state(&self, now: Instant) -> BreakerState {
        if self.state == BreakerState::Open && self.reset_due(now) {
            BreakerState::HalfOpen
        } else {
            self.state
        }
    }

    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    #[must_use]
    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    /// Returns `true` if a call may run now.
    ///
    /// Moves an open breaker to half-open once the reset timeout has elapsed
    /// since the last failure and admits exactly one probe there.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        match self.state {
            BreakerState::Closed => true,
            BreakerState::HalfOpen if self.probe_outstanding(now) => false,
            BreakerState::HalfOpen => {
                self.probe_started = Some(now);
                true
            }
            BreakerState::Open if self.reset_due(now) => {
                self.state = BreakerState::HalfOpen;
                self.probe_started = Some(now);
                true
            }
            BreakerState::Open => false,
        }
    }

    pub fn record_success(&mut self) {
        self.failure_count = 0;
        self.probe_started = None;
        self.state = BreakerState::Closed;
    }

    pub fn record_failure(&mut self, now: Instant) {
        self.failure_count = self.failure_count.saturating_add(1);
        self.last_failure = Some(now);
        self.probe_started = None;

        if self.state == BreakerState::HalfOpen || self.failure_count >= self.failure_threshold {
            self.state = BreakerState::Open;
        }
    }

    fn reset_due(&self, now: Instant) -> bool {
        self.last_failure
            .is_some_and(|at| now.saturating_duration_since(at) >= self.reset_timeout)
    }

    fn probe_outstanding(&self, now: Instant) -> bool {
        self.probe_started
            .is_some_and(|at| now.saturating_duration_since(at) < self.reset_timeout)
    }
}
