//! Outgoing email for StayEase: the [`Mailer`] seam, an SMTP transport,
//! and the message templates the server sends.

mod error;
mod smtp;
pub mod templates;

use async_trait::async_trait;

pub use error::MailError;
pub use smtp::SmtpMailer;

/// A rendered message ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;

    /// The configured sender address, used as the target of self-test mails.
    fn sender_address(&self) -> Option<&str>;
}

/// Stand-in used when no SMTP credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        tracing::warn!(to = %email.to, subject = %email.subject, "mail: transport disabled; message dropped");
        Err(MailError::NotConfigured)
    }

    fn sender_address(&self) -> Option<&str> {
        None
    }
}

/// Validate a recipient address without sending anything.
///
/// # Errors
///
/// Returns [`MailError::InvalidAddress`] when `raw` is not a valid mailbox.
pub fn validate_address(raw: &str) -> Result<(), MailError> {
    raw.trim()
        .parse::<lettre::message::Mailbox>()
        .map(|_| ())
        .map_err(|e| MailError::InvalidAddress {
            address: raw.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_address_accepts_plain_and_named_mailboxes() {
        assert!(validate_address("renter@stayease.test").is_ok());
        assert!(validate_address("Jo Renter <renter@stayease.test>").is_ok());
    }

    #[test]
    fn validate_address_rejects_garbage() {
        assert!(matches!(
            validate_address("not-an-email"),
            Err(MailError::InvalidAddress { .. })
        ));
    }

    #[tokio::test]
    async fn disabled_mailer_refuses_to_send() {
        let email = OutgoingEmail {
            to: "renter@stayease.test".to_string(),
            subject: "hi".to_string(),
            text: "body".to_string(),
            html: None,
        };
        assert!(matches!(
            DisabledMailer.send(&email).await,
            Err(MailError::NotConfigured)
        ));
        assert!(DisabledMailer.sender_address().is_none());
    }
}
