use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::mail::{escape_html, EmailMessage};
use crate::tasks::Outcome;

use super::store::{ContactRepository, ContactStoreError};
use super::types::{Contact, ContactInput};

#[derive(Clone)]
pub struct ContactService {
    repository: Arc<dyn ContactRepository>,
    /// Where new submissions are forwarded
    admin_inbox: Option<String>,
}

impl ContactService {
    pub fn new(repository: Arc<dyn ContactRepository>, admin_inbox: Option<String>) -> Self {
        Self {
            repository,
            admin_inbox,
        }
    }

    /// Store a submission, notify the admin inbox and auto-reply to the sender.
    pub async fn create_contact(&self, input: ContactInput) -> Result<Outcome<Contact>> {
        input.validate()?;

        let contact = Contact {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            email: input.email.trim().to_string(),
            country: input.country.trim().to_string(),
            message: input.message,
            created_at: Utc::now(),
        };

        self.repository
            .insert(&contact)
            .await
            .map_err(store_error("create contact"))?;

        tracing::info!(contact_id = %contact.id, "Contact message received");

        let name = escape_html(&contact.name);
        let mut outcome = Outcome::new(contact.clone());

        match &self.admin_inbox {
            Some(inbox) => {
                let html = format!(
                    "<h2>New Contact Submission</h2>\
                     <p><strong>Name:</strong> {name}</p>\
                     <p><strong>Email:</strong> {email}</p>\
                     <p><strong>Country:</strong> {country}</p>\
                     <p><strong>Message:</strong><br/>{message}</p>",
                    email = escape_html(&contact.email),
                    country = escape_html(&contact.country),
                    message = escape_html(&contact.message),
                );
                outcome = outcome.with_email(EmailMessage::new(
                    inbox,
                    format!("New Contact Message from {}", contact.name),
                    html,
                ));
            }
            None => tracing::warn!("No admin inbox configured, contact notification skipped"),
        }

        let reply = format!(
            "<h2>Hi {name},</h2>\
             <p>Thank you for reaching out!</p>\
             <p>We have received your message and our team will get back to you within 24-48 hours.</p>\
             <p>Best regards,</p>\
             <p><strong>EverLetter Team</strong></p>"
        );
        outcome = outcome.with_email(EmailMessage::new(
            &contact.email,
            "Thank you for contacting us!",
            reply,
        ));

        Ok(outcome)
    }

    pub async fn list_contacts(&self) -> Result<Vec<Contact>> {
        self.repository
            .list()
            .await
            .map_err(store_error("get contacts"))
    }

    pub async fn delete_contact(&self, id: Uuid) -> Result<Contact> {
        self.repository
            .delete(id)
            .await
            .map_err(store_error("delete contact"))?
            .ok_or_else(|| AppError::NotFound("Contact not found".to_string()))
    }
}

fn store_error(action: &'static str) -> impl FnOnce(ContactStoreError) -> AppError {
    move |err| AppError::upstream(action)(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::memory_store::MemoryContactStore;
    use crate::tasks::FollowUp;

    fn input() -> ContactInput {
        ContactInput {
            name: "Ada <script>".to_string(),
            email: "ada@example.com".to_string(),
            country: "UK".to_string(),
            message: "Hello there".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_queues_admin_and_reply() {
        let svc = ContactService::new(
            Arc::new(MemoryContactStore::new()),
            Some("inbox@everletter.dev".to_string()),
        );
        let outcome = svc.create_contact(input()).await.unwrap();

        let recipients: Vec<&str> = outcome
            .follow_ups
            .iter()
            .map(|f| match f {
                FollowUp::Email(m) => m.to.as_str(),
            })
            .collect();
        assert_eq!(recipients, vec!["inbox@everletter.dev", "ada@example.com"]);

        let FollowUp::Email(admin) = &outcome.follow_ups[0];
        assert!(admin.html.contains("Ada &lt;script&gt;"));
        assert_eq!(svc.list_contacts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_without_inbox_only_reply() {
        let svc = ContactService::new(Arc::new(MemoryContactStore::new()), None);
        let outcome = svc.create_contact(input()).await.unwrap();
        assert_eq!(outcome.follow_ups.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_contact() {
        let svc = ContactService::new(Arc::new(MemoryContactStore::new()), None);
        let contact = svc.create_contact(input()).await.unwrap().value;
        assert_eq!(svc.delete_contact(contact.id).await.unwrap().id, contact.id);
        assert!(matches!(
            svc.delete_contact(contact.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
