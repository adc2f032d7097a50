use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::mail::{EmailMessage, Mailer};
use crate::metrics::FollowUpMetrics;

/// Side effect that runs after an operation has committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    Email(EmailMessage),
}

impl FollowUp {
    pub fn kind(&self) -> &'static str {
        match self {
            FollowUp::Email(_) => "email",
        }
    }
}

/// Operation result plus the follow-ups it queued.
///
/// The operation has already succeeded; follow-ups are best effort and their
/// failure never changes the result.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub value: T,
    pub follow_ups: Vec<FollowUp>,
}

impl<T> Outcome<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            follow_ups: Vec::new(),
        }
    }

    pub fn with_email(mut self, message: EmailMessage) -> Self {
        self.follow_ups.push(FollowUp::Email(message));
        self
    }
}

/// Runs follow-ups on the Tokio runtime, detached from the request.
#[derive(Clone)]
pub struct FollowUpDispatcher {
    mailer: Arc<dyn Mailer>,
}

impl FollowUpDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Hand off an outcome's follow-ups and return its value.
    pub fn complete<T>(&self, outcome: Outcome<T>) -> T {
        self.dispatch(outcome.follow_ups);
        outcome.value
    }

    /// Spawn one task per follow-up. Handles are returned for callers that
    /// want to wait; request handlers drop them.
    pub fn dispatch(&self, follow_ups: Vec<FollowUp>) -> Vec<JoinHandle<()>> {
        follow_ups
            .into_iter()
            .map(|follow_up| {
                let dispatcher = self.clone();
                tokio::spawn(async move { dispatcher.deliver(follow_up).await })
            })
            .collect()
    }

    /// Run a single follow-up. Failures are logged and counted only.
    pub async fn deliver(&self, follow_up: FollowUp) {
        let kind = follow_up.kind();
        match follow_up {
            FollowUp::Email(message) => match self.mailer.send(&message).await {
                Ok(()) => FollowUpMetrics::record_sent(kind),
                Err(e) => {
                    FollowUpMetrics::record_failed(kind);
                    tracing::warn!(
                        error = %e,
                        to = %message.to,
                        subject = %message.subject,
                        transport = self.mailer.transport(),
                        "Follow-up email failed"
                    );
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::MailError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        fn transport(&self) -> &'static str {
            "recording"
        }

        async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
            if self.fail {
                return Err(MailError::Build("smtp down".to_string()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_dispatch_sends_each_email() {
        let mailer = Arc::new(RecordingMailer::default());
        let dispatcher = FollowUpDispatcher::new(mailer.clone());

        let outcome = Outcome::new(42)
            .with_email(EmailMessage::new("a@example.com", "One", "<p>1</p>"))
            .with_email(EmailMessage::new("b@example.com", "Two", "<p>2</p>"));
        let follow_ups = outcome.follow_ups.clone();

        for handle in dispatcher.dispatch(follow_ups) {
            handle.await.unwrap();
        }
        assert_eq!(mailer.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_delivery_does_not_affect_value() {
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..Default::default()
        });
        let dispatcher = FollowUpDispatcher::new(mailer.clone());

        let outcome =
            Outcome::new("done").with_email(EmailMessage::new("a@example.com", "Hi", "<p>hi</p>"));
        assert_eq!(dispatcher.complete(outcome), "done");

        dispatcher
            .deliver(FollowUp::Email(EmailMessage::new("b@example.com", "Hi", "")))
            .await;
        assert!(mailer.sent.lock().unwrap().is_empty());
    }
}
