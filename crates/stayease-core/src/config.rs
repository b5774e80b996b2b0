use crate::app_config::{AppConfig, EmailConfig, Environment, HealthConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars,
/// so binaries do not need to load it themselves.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the process environment so they
/// can be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("STAYEASE_ENV", "development"))?;

    let port = parse_u32("PORT", "5000")?;
    let bind_raw = or_default("STAYEASE_BIND_ADDR", &format!("0.0.0.0:{port}"));
    let bind_addr = bind_raw
        .parse::<SocketAddr>()
        .map_err(|e| invalid("STAYEASE_BIND_ADDR", e.to_string()))?;

    let log_level = or_default("STAYEASE_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("STAYEASE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("STAYEASE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("STAYEASE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    if db_min_connections > db_max_connections {
        return Err(invalid(
            "STAYEASE_DB_MIN_CONNECTIONS",
            format!("{db_min_connections} exceeds STAYEASE_DB_MAX_CONNECTIONS ({db_max_connections})"),
        ));
    }

    let email = match (optional("EMAIL_USER"), optional("EMAIL_PASSWORD")) {
        (Some(user), Some(password)) => Some(EmailConfig {
            user,
            password,
            smtp_host: or_default("EMAIL_SMTP_HOST", "smtp.gmail.com"),
            from_name: or_default("EMAIL_FROM_NAME", "StayEase"),
        }),
        (None, None) if env != Environment::Production => None,
        (None, None) => return Err(ConfigError::MissingEnvVar("EMAIL_USER".to_string())),
        (Some(_), None) => return Err(ConfigError::MissingEnvVar("EMAIL_PASSWORD".to_string())),
        (None, Some(_)) => return Err(ConfigError::MissingEnvVar("EMAIL_USER".to_string())),
    };

    let app_url = or_default("STAYEASE_APP_URL", "http://localhost:5173")
        .trim_end_matches('/')
        .to_string();

    let availability_cron = or_default("AVAILABILITY_CRON", "0 0 8 * * *");
    let availability_lead_days = parse_u32("AVAILABILITY_LEAD_DAYS", "3")?;
    if availability_lead_days > crate::MAX_LEAD_DAYS {
        return Err(invalid(
            "AVAILABILITY_LEAD_DAYS",
            format!("must be at most {}", crate::MAX_LEAD_DAYS),
        ));
    }

    let failure_threshold = parse_u32("HEALTH_FAILURE_THRESHOLD", "3")?;
    if failure_threshold == 0 {
        return Err(invalid(
            "HEALTH_FAILURE_THRESHOLD",
            "must be at least 1".to_string(),
        ));
    }

    let health = HealthConfig {
        cron: or_default("HEALTH_CHECK_CRON", "0 */5 * * * *"),
        api_url: optional("HEALTH_API_URL"),
        failure_threshold,
        reset_timeout_secs: parse_u64("HEALTH_RESET_TIMEOUT_SECS", "60")?,
        request_timeout_secs: parse_u64("HEALTH_REQUEST_TIMEOUT_SECS", "5")?,
    };

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        email,
        app_url,
        availability_cron,
        availability_lead_days,
        health,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for unrecognized values.
pub(crate) fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "development" | "dev" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" | "prod" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STAYEASE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
