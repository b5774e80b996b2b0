//! Offline tests for pool configuration and row types.
//! These tests do not require a live database connection.

use stayease_core::{AppConfig, Environment, HealthConfig};
use stayease_db::{PoolConfig, PropertyListFilters};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        email: None,
        app_url: "http://localhost:5173".to_string(),
        availability_cron: "0 0 8 * * *".to_string(),
        availability_lead_days: 3,
        health: HealthConfig {
            cron: "0 */5 * * * *".to_string(),
            api_url: None,
            failure_threshold: 3,
            reset_timeout_secs: 60,
            request_timeout_secs: 5,
        },
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn property_list_filters_default_applies_nothing() {
    let filters = PropertyListFilters::default();
    assert!(filters.location.is_none());
    assert!(filters.status.is_none());
    assert!(filters.min_price.is_none());
    assert_eq!(filters.limit, 0);
}
