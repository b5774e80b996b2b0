use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// SMTP credentials and sender identity for outgoing mail.
#[derive(Clone)]
pub struct EmailConfig {
    pub user: String,
    pub password: String,
    pub smtp_host: String,
    pub from_name: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("user", &self.user)
            .field("password", &"[redacted]")
            .field("smtp_host", &self.smtp_host)
            .field("from_name", &self.from_name)
            .finish()
    }
}

/// Settings for the dashboard health checks and their breakers.
#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub cron: String,
    pub api_url: Option<String>,
    pub failure_threshold: u32,
    pub reset_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub email: Option<EmailConfig>,
    pub app_url: String,
    pub availability_cron: String,
    pub availability_lead_days: u32,
    pub health: HealthConfig,
}

impl AppConfig {
    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self.env, Environment::Development)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("email", &self.email)
            .field("app_url", &self.app_url)
            .field("availability_cron", &self.availability_cron)
            .field("availability_lead_days", &self.availability_lead_days)
            .field("health", &self.health)
            .finish()
    }
}
