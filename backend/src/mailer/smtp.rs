use super::ReportTransport;
use crate::config::SmtpConfig;
use crate::error::MailerError;
use futures::future::BoxFuture;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

/// STARTTLS relay with optional credentials, pooled by lettre.
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpRelay {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailerError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| MailerError::Internal(format!("Invalid SMTP relay {}: {}", config.host, e)))?
            .port(config.port)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));

        match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
            }
            _ => log::warn!("SMTP credentials not set, connecting to {} unauthenticated", config.host),
        }

        log::info!("SMTP relay {}:{} (STARTTLS)", config.host, config.port);
        Ok(Self { transport: builder.build() })
    }
}

impl ReportTransport for SmtpRelay {
    fn deliver(&self, message: Message) -> BoxFuture<'_, Result<(), MailerError>> {
        Box::pin(async move {
            let response = self
                .transport
                .send(message)
                .await
                .map_err(|e| MailerError::Delivery(e.to_string()))?;
            log::debug!("SMTP relay answered {}", response.code());
            Ok(())
        })
    }
}
