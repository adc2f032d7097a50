//! In-memory account storage using DashMap.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use super::store::{UserRepository, UserStoreError};
use super::types::{ApiKey, User};

pub struct MemoryUserStore {
    users: DashMap<Uuid, User>,
    api_keys: DashMap<Uuid, ApiKey>,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            api_keys: DashMap::new(),
        }
    }

    /// API keys issued to a user
    pub fn api_keys_for(&self, user_id: Uuid) -> Vec<ApiKey> {
        self.api_keys
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl UserRepository for MemoryUserStore {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, user: &User) -> Result<(), UserStoreError> {
        if self.users.iter().any(|entry| entry.email == user.email) {
            return Err(UserStoreError::DuplicateEmail(user.email.clone()));
        }
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<bool, UserStoreError> {
        match self.users.get_mut(&user.id) {
            Some(mut existing) => {
                existing.name = user.name.clone();
                existing.role = user.role;
                existing.has_website_permission = user.has_website_permission;
                existing.is_banned = user.is_banned;
                existing.email_verified = user.email_verified;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, UserStoreError> {
        let removed = self.users.remove(&id).is_some();
        if removed {
            self.api_keys.retain(|_, key| key.user_id != id);
        }
        Ok(removed)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserStoreError> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> Result<Vec<User>, UserStoreError> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn count(&self) -> Result<u64, UserStoreError> {
        Ok(self.users.len() as u64)
    }

    async fn insert_api_key(&self, key: &ApiKey) -> Result<(), UserStoreError> {
        self.api_keys.insert(key.id, key.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use chrono::Utc;

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: email.to_string(),
            role: Role::User,
            has_website_permission: false,
            is_banned: false,
            email_verified: false,
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryUserStore::new();
        store.insert(&user("a@example.com")).await.unwrap();
        assert!(matches!(
            store.insert(&user("a@example.com")).await,
            Err(UserStoreError::DuplicateEmail(_))
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_credentials() {
        let store = MemoryUserStore::new();
        let original = user("b@example.com");
        store.insert(&original).await.unwrap();

        let mut changed = original.clone();
        changed.is_banned = true;
        changed.password_hash = "other".to_string();
        assert!(store.update(&changed).await.unwrap());

        let stored = store.find_by_id(original.id).await.unwrap().unwrap();
        assert!(stored.is_banned);
        assert_eq!(stored.password_hash, "hash");
    }

    #[tokio::test]
    async fn test_delete_drops_api_keys() {
        let store = MemoryUserStore::new();
        let u = user("c@example.com");
        store.insert(&u).await.unwrap();
        store
            .insert_api_key(&ApiKey {
                id: Uuid::new_v4(),
                key: "k".to_string(),
                user_id: u.id,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        assert!(store.delete(u.id).await.unwrap());
        assert!(store.api_keys_for(u.id).is_empty());
        assert!(!store.delete(u.id).await.unwrap());
    }
}
