use crate::config::SmtpConfig;
use crate::models::Report;
use crate::plugins::traits::NotifierPlugin;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use lettre::message::{header, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

const CHANNEL: &str = "email";

/// Port that speaks TLS from the first byte; every other port upgrades with STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    pub fn new(config: &SmtpConfig, timeout: Duration) -> Result<Self> {
        let username = required(&config.username, "username")?;
        let password = required(&config.password, "password")?;
        let from_address = required(&config.from_address, "from_address")?;
        let to_address = required(&config.to_address, "to_address")?;

        let from: Mailbox = format!("{} <{}>", config.from_name, from_address)
            .parse()
            .map_err(|e| AppError::notify(CHANNEL, format!("Invalid from address: {}", e)))?;
        let to: Mailbox = to_address
            .parse()
            .map_err(|e| AppError::notify(CHANNEL, format!("Invalid to address: {}", e)))?;

        let credentials = Credentials::new(username.to_string(), password.to_string());

        let builder = if !config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        } else if config.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| AppError::notify(CHANNEL, e))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| AppError::notify(CHANNEL, e))?
        };

        let mailer = builder
            .port(config.port)
            .credentials(credentials)
            .timeout(Some(timeout))
            .build();

        Ok(Self { mailer, from, to })
    }

    fn build_message(&self, report: &Report) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(report.subject.clone())
            .header(header::ContentType::TEXT_PLAIN)
            .body(report.body.clone())
            .map_err(|e| AppError::notify(CHANNEL, e))
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::notify(CHANNEL, format!("Missing {}", name)))
}

#[async_trait]
impl NotifierPlugin for EmailNotifier {
    fn name(&self) -> &str {
        "Email Notifier"
    }

    fn plugin_type(&self) -> &str {
        CHANNEL
    }

    async fn send(&self, report: &Report) -> Result<()> {
        let message = self.build_message(report)?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| AppError::notify(CHANNEL, e))?;

        tracing::debug!("Email delivered to {}", self.to);
        Ok(())
    }
}
