//! StayEase HTTP service: photo store, listings, email, dashboard health,
//! and the scheduled availability notifier.

pub mod api;
pub mod health;
pub mod middleware;
pub mod notifier;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{build_app, AppState};
pub use health::SystemHealthService;
pub use notifier::{run_availability_sweep, NotifierConfig, SweepReport};
