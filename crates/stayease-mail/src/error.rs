use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    /// No SMTP credentials were configured for this process.
    #[error("email transport is not configured")]
    NotConfigured,

    #[error("invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    /// The message could not be assembled (headers, body parts).
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),

    /// Connection, authentication, or delivery failure from the SMTP server.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}
