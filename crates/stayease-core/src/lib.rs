pub mod app_config;
pub mod availability;
pub mod breaker;
pub mod config;
pub mod properties;
pub mod uploads;

pub use app_config::{AppConfig, EmailConfig, Environment, HealthConfig};
pub use availability::{AvailabilityWindow, MAX_LEAD_DAYS};
pub use breaker::{BreakerState, CircuitBreaker};
pub use config::{load_app_config, load_app_config_from_env};
pub use properties::{PictureUrl, PropertyPhotos, PropertyStatus, SocialLinks};
pub use uploads::{validate_photo_content_type, validate_photo_size, MAX_PHOTO_BYTES};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid property status: {0}")]
    InvalidPropertyStatus(String),
    #[error("unsupported media type: {0}; only image uploads are allowed")]
    UnsupportedMediaType(String),
    #[error("photo is {size} bytes; the limit is {limit} bytes")]
    PhotoTooLarge { size: usize, limit: usize },
    #[error("photo upload is empty")]
    EmptyPhoto,
}
