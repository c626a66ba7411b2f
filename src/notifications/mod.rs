//! Outbound notifications: SMS gateway and SMTP mail.
//!
//! Both clients are best-effort. Disabled mode (the default) logs the
//! message instead of sending, which is also what the test harness relies
//! on. A failed send never rolls back the database state that triggered it.

use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::{MailConfig, SmsConfig};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("SMS gateway error: {0}")]
    Sms(String),
    #[error("Mail transport error: {0}")]
    Mail(String),
}

#[derive(Serialize)]
struct SmsPayload<'a> {
    to: &'a str,
    text: &'a str,
    sender: &'a str,
}

/// HTTP client for the FDI-style messaging gateway.
#[derive(Clone, Debug)]
pub struct SmsClient {
    http: reqwest::Client,
    config: SmsConfig,
}

impl SmsClient {
    pub fn new(config: SmsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    #[instrument(skip(self, text))]
    pub async fn send_sms(&self, to: &str, text: &str) -> Result<(), NotificationError> {
        if !self.config.enabled {
            info!(to, text, "sms disabled; logging instead of sending");
            return Ok(());
        }

        let url = format!("{}/mt/single", self.config.gateway_url.trim_end_matches('/'));
        let payload = SmsPayload {
            to,
            text,
            sender: &self.config.sender_id,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Sms(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotificationError::Sms(format!(
                "gateway returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// SMTP mailer for password-reset messages.
#[derive(Clone)]
pub struct Mailer {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    config: MailConfig,
}

impl Mailer {
    pub fn new(config: MailConfig) -> Result<Self, NotificationError> {
        let transport = if config.enabled {
            let creds = Credentials::new(config.username.clone(), config.password.clone());
            let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                .map_err(|e| NotificationError::Mail(e.to_string()))?
                .port(config.smtp_port)
                .credentials(creds)
                .build();
            Some(transport)
        } else {
            None
        };

        Ok(Self { transport, config })
    }

    #[instrument(skip(self, token))]
    pub async fn send_password_reset(
        &self,
        to: &str,
        token: &str,
    ) -> Result<(), NotificationError> {
        let Some(transport) = &self.transport else {
            info!(to, "mail disabled; logging password reset instead of sending");
            return Ok(());
        };

        let body = format!(
            "A password reset was requested for your account.\n\n\
             Reset token: {}\n\n\
             The token expires in 30 minutes. If you did not request this, ignore this message.",
            token
        );

        let email = Message::builder()
            .from(
                self.config
                    .from_address
                    .parse()
                    .map_err(|e| NotificationError::Mail(format!("invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| NotificationError::Mail(format!("invalid to address: {}", e)))?)
            .subject("Password reset")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| NotificationError::Mail(e.to_string()))?;

        transport
            .send(email)
            .await
            .map_err(|e| NotificationError::Mail(e.to_string()))?;

        Ok(())
    }
}

/// Bundle handed to the event processor.
pub struct Notifier {
    pub sms: SmsClient,
    pub mailer: Mailer,
}

impl Notifier {
    pub fn new(sms: SmsClient, mailer: Mailer) -> Self {
        Self { sms, mailer }
    }
}
