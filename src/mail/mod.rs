//! Outbound email.
//!
//! [`Mailer`] is the seam between services and the mail transport. Services
//! never send directly; they return [`EmailMessage`]s as follow-ups that the
//! dispatcher delivers in the background.

mod log_mailer;
mod smtp;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::config::MailConfig;

pub use log_mailer::LogMailer;
pub use smtp::SmtpMailer;

/// Error type for email delivery failures.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),

    #[error("Mail configuration error: {0}")]
    Config(String),
}

/// A single HTML email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

impl EmailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html: html.into(),
        }
    }
}

/// Escape text for interpolation into an HTML email body.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Transport identifier for logs
    fn transport(&self) -> &'static str;

    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Create a mailer from configuration.
///
/// Falls back to [`LogMailer`] when mail is disabled or the SMTP transport
/// cannot be built.
pub fn create_mailer(config: &MailConfig) -> Arc<dyn Mailer> {
    if !config.enabled {
        tracing::info!(transport = "log", "Mail disabled, emails will only be logged");
        return Arc::new(LogMailer);
    }

    match SmtpMailer::new(config) {
        Ok(mailer) => {
            tracing::info!(
                transport = "smtp",
                host = %config.smtp_host,
                port = config.smtp_port,
                "Creating SMTP mailer"
            );
            Arc::new(mailer)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to build SMTP mailer, falling back to log mailer");
            Arc::new(LogMailer)
        }
    }
}
