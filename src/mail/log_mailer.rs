use async_trait::async_trait;

use super::{EmailMessage, MailError, Mailer};

/// Logs outgoing email instead of sending it. Used when mail is disabled.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    fn transport(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Mail disabled, dropping email"
        );
        Ok(())
    }
}
