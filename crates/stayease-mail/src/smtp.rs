use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use stayease_core::EmailConfig;

use crate::{MailError, Mailer, OutgoingEmail};

/// SMTP relay transport (implicit TLS) authenticated with the account
/// password from `EMAIL_PASSWORD`.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    sender: String,
}

impl SmtpMailer {
    /// # Errors
    ///
    /// Returns [`MailError::InvalidAddress`] if `EMAIL_USER` is not a valid
    /// address, or [`MailError::Smtp`] if the relay cannot be configured.
    pub fn from_config(config: &EmailConfig) -> Result<Self, MailError> {
        let address = config
            .user
            .parse::<lettre::Address>()
            .map_err(|e| MailError::InvalidAddress {
                address: config.user.clone(),
                reason: e.to_string(),
            })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: Mailbox::new(Some(config.from_name.clone()), address),
            sender: config.user.clone(),
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, MailError> {
        let to = email
            .to
            .trim()
            .parse::<Mailbox>()
            .map_err(|e| MailError::InvalidAddress {
                address: email.to.clone(),
                reason: e.to_string(),
            })?;

        let builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone());

        let message = match &email.html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                html.clone(),
            ))?,
            None => builder.singlepart(SinglePart::plain(email.text.clone()))?,
        };
        Ok(message)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = self.build_message(email)?;
        let response = self.transport.send(message).await?;
        tracing::debug!(
            to = %email.to,
            code = %response.code(),
            "mail: message accepted by relay"
        );
        Ok(())
    }

    fn sender_address(&self) -> Option<&str> {
        Some(&self.sender)
    }
}
