use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::store::{ContactRepository, ContactStoreError};
use super::types::Contact;

#[derive(Default)]
pub struct MemoryContactStore {
    contacts: DashMap<Uuid, Contact>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContactRepository for MemoryContactStore {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, contact: &Contact) -> Result<(), ContactStoreError> {
        self.contacts.insert(contact.id, contact.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Contact>, ContactStoreError> {
        Ok(self.contacts.remove(&id).map(|(_, contact)| contact))
    }

    async fn list(&self) -> Result<Vec<Contact>, ContactStoreError> {
        let mut contacts: Vec<Contact> = self.contacts.iter().map(|e| e.value().clone()).collect();
        contacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(contacts)
    }
}
