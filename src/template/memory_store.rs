//! In-memory template storage using DashMap.
//!
//! Records are lost on restart. Used for development and tests.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use super::store::{DeleteOutcome, TemplateRepository, TemplateStoreError};
use super::types::{Template, TemplateFlag};

/// In-memory template storage keyed by id
pub struct MemoryTemplateStore {
    templates: DashMap<Uuid, Template>,
}

impl Default for MemoryTemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self {
            templates: DashMap::new(),
        }
    }

    fn slug_taken(&self, slug: &str, except: Uuid) -> bool {
        self.templates
            .iter()
            .any(|entry| entry.slug == slug && entry.id != except)
    }
}

#[async_trait]
impl TemplateRepository for MemoryTemplateStore {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, template: &Template) -> Result<(), TemplateStoreError> {
        if self.slug_taken(&template.slug, template.id) {
            return Err(TemplateStoreError::DuplicateSlug(template.slug.clone()));
        }
        self.templates.insert(template.id, template.clone());
        Ok(())
    }

    async fn replace(&self, template: &Template) -> Result<bool, TemplateStoreError> {
        if self.slug_taken(&template.slug, template.id) {
            return Err(TemplateStoreError::DuplicateSlug(template.slug.clone()));
        }

        match self.templates.get_mut(&template.id) {
            Some(mut existing) => {
                let created_at = existing.created_at;
                *existing = Template {
                    created_at,
                    ..template.clone()
                };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_unpublished(&self, id: Uuid) -> Result<DeleteOutcome, TemplateStoreError> {
        if let Some((_, removed)) = self.templates.remove_if(&id, |_, t| !t.is_published) {
            return Ok(DeleteOutcome::Deleted(removed));
        }

        if self.templates.contains_key(&id) {
            Ok(DeleteOutcome::Published)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }

    async fn toggle(
        &self,
        id: Uuid,
        flag: TemplateFlag,
    ) -> Result<Option<Template>, TemplateStoreError> {
        Ok(self.templates.get_mut(&id).map(|mut template| {
            match flag {
                TemplateFlag::ProOnly => template.pro_only = !template.pro_only,
                TemplateFlag::Published => template.is_published = !template.is_published,
            }
            template.updated_at = Utc::now();
            template.clone()
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Template>, TemplateStoreError> {
        Ok(self.templates.get(&id).map(|t| t.clone()))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Template>, TemplateStoreError> {
        Ok(self
            .templates
            .iter()
            .find(|entry| entry.slug == slug)
            .map(|entry| entry.value().clone()))
    }

    async fn list(&self) -> Result<Vec<Template>, TemplateStoreError> {
        let mut templates: Vec<Template> = self
            .templates
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        templates.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(templates)
    }

    async fn count(&self) -> Result<u64, TemplateStoreError> {
        Ok(self.templates.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn template(slug: &str, published: bool) -> Template {
        let now = Utc::now();
        Template {
            id: Uuid::new_v4(),
            name: slug.to_string(),
            slug: slug.to_string(),
            html: "<p>{{name}}</p>".to_string(),
            category: None,
            thumbnail: None,
            pro_only: false,
            is_published: published,
            variables: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_slug() {
        let store = MemoryTemplateStore::new();
        store.insert(&template("welcome", false)).await.unwrap();

        let result = store.insert(&template("welcome", false)).await;
        assert!(matches!(result, Err(TemplateStoreError::DuplicateSlug(_))));
    }

    #[tokio::test]
    async fn test_delete_guarded_by_publish_state() {
        let store = MemoryTemplateStore::new();
        let published = template("live", true);
        let draft = template("draft", false);
        store.insert(&published).await.unwrap();
        store.insert(&draft).await.unwrap();

        assert_eq!(
            store.delete_unpublished(published.id).await.unwrap(),
            DeleteOutcome::Published
        );
        assert!(matches!(
            store.delete_unpublished(draft.id).await.unwrap(),
            DeleteOutcome::Deleted(t) if t.id == draft.id
        ));
        assert_eq!(
            store.delete_unpublished(draft.id).await.unwrap(),
            DeleteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_toggle_flips_flag() {
        let store = MemoryTemplateStore::new();
        let t = template("promo", false);
        store.insert(&t).await.unwrap();

        let toggled = store.toggle(t.id, TemplateFlag::ProOnly).await.unwrap().unwrap();
        assert!(toggled.pro_only);
        let toggled = store.toggle(t.id, TemplateFlag::ProOnly).await.unwrap().unwrap();
        assert!(!toggled.pro_only);

        assert!(store
            .toggle(Uuid::new_v4(), TemplateFlag::Published)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryTemplateStore::new();
        let mut older = template("older", false);
        older.created_at = Utc::now() - Duration::hours(1);
        let newer = template("newer", false);
        store.insert(&older).await.unwrap();
        store.insert(&newer).await.unwrap();

        let list = store.list().await.unwrap();
        assert_eq!(list[0].slug, "newer");
        assert_eq!(list[1].slug, "older");
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_replace_keeps_created_at() {
        let store = MemoryTemplateStore::new();
        let original = template("keep", false);
        store.insert(&original).await.unwrap();

        let mut changed = original.clone();
        changed.name = "Renamed".to_string();
        changed.created_at = Utc::now() + Duration::days(1);
        assert!(store.replace(&changed).await.unwrap());

        let stored = store.find_by_slug("keep").await.unwrap().unwrap();
        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.created_at, original.created_at);

        assert!(!store.replace(&template("ghost", false)).await.unwrap());
    }
}
