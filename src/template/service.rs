//! Template lifecycle with author access control

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::Actor;
use crate::error::{AppError, Result};
use crate::metrics::TemplateMetrics;

use super::store::{DeleteOutcome, TemplateRepository, TemplateStoreError};
use super::substitution::substitute;
use super::types::{
    RenderedTemplate, Template, TemplateFlag, TemplateInput, TemplateSummary, TemplateVariable,
    UpdateTemplateInput,
};

const NOT_FOUND: &str = "Template not found";

/// Template authoring and lookup operations
#[derive(Clone)]
pub struct TemplateService {
    repository: Arc<dyn TemplateRepository>,
}

impl TemplateService {
    pub fn new(repository: Arc<dyn TemplateRepository>) -> Self {
        Self { repository }
    }

    pub fn backend_type(&self) -> &'static str {
        self.repository.backend_type()
    }

    /// Create a new template. Any non-USER role may author templates.
    pub async fn create_template(&self, actor: &Actor, input: TemplateInput) -> Result<Template> {
        if !actor.role.is_staff() {
            return Err(AppError::Unauthorized(
                "You are not authorized to create a template".to_string(),
            ));
        }
        input.validate()?;

        let template = input.into_template(Uuid::new_v4(), Utc::now());
        self.repository
            .insert(&template)
            .await
            .map_err(store_error("create template"))?;

        TemplateMetrics::record_mutation("create");
        tracing::info!(
            template_id = %template.id,
            slug = %template.slug,
            actor_id = %actor.id,
            "Template created"
        );

        Ok(template)
    }

    /// Overwrite every author-supplied field of an existing template.
    ///
    /// Omitted optional fields become absent and omitted flags become false.
    pub async fn update_template(
        &self,
        actor: &Actor,
        input: UpdateTemplateInput,
    ) -> Result<Template> {
        if !actor.role.is_staff() {
            return Err(AppError::Unauthorized(
                "You are not authorized to update a template".to_string(),
            ));
        }
        input.fields.validate()?;

        let existing = self
            .repository
            .find_by_id(input.id)
            .await
            .map_err(store_error("update template"))?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

        let template = input.fields.into_template(existing.id, existing.created_at);
        let replaced = self
            .repository
            .replace(&template)
            .await
            .map_err(store_error("update template"))?;

        // Deleted between the lookup and the write
        if !replaced {
            return Err(AppError::NotFound(NOT_FOUND.to_string()));
        }

        TemplateMetrics::record_mutation("update");
        tracing::info!(template_id = %template.id, actor_id = %actor.id, "Template updated");

        Ok(template)
    }

    /// Delete an unpublished template and return it.
    pub async fn delete_template(&self, id: Uuid) -> Result<Template> {
        let outcome = self
            .repository
            .delete_unpublished(id)
            .await
            .map_err(store_error("delete template"))?;

        match outcome {
            DeleteOutcome::Deleted(template) => {
                TemplateMetrics::record_mutation("delete");
                tracing::info!(template_id = %id, "Template deleted");
                Ok(template)
            }
            DeleteOutcome::NotFound => Err(AppError::NotFound(NOT_FOUND.to_string())),
            DeleteOutcome::Published => Err(AppError::Conflict(
                "Template is published. You can't delete it.".to_string(),
            )),
        }
    }

    pub async fn toggle_pro(&self, id: Uuid) -> Result<Template> {
        self.toggle(id, TemplateFlag::ProOnly).await
    }

    pub async fn toggle_publish(&self, id: Uuid) -> Result<Template> {
        self.toggle(id, TemplateFlag::Published).await
    }

    async fn toggle(&self, id: Uuid, flag: TemplateFlag) -> Result<Template> {
        let template = self
            .repository
            .toggle(id, flag)
            .await
            .map_err(store_error("update template"))?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

        TemplateMetrics::record_mutation(flag.as_str());
        tracing::info!(
            template_id = %id,
            pro_only = template.pro_only,
            is_published = template.is_published,
            "Template flag toggled"
        );

        Ok(template)
    }

    /// Full records for authoring, newest first.
    pub async fn get_all_templates(&self) -> Result<Vec<Template>> {
        self.repository
            .list()
            .await
            .map_err(store_error("get templates"))
    }

    /// Narrow projections of templates the public API may expose, newest first.
    pub async fn get_public_templates(&self) -> Result<Vec<TemplateSummary>> {
        let templates = self
            .repository
            .list()
            .await
            .map_err(store_error("get templates"))?;

        Ok(templates
            .iter()
            .filter(|t| !t.pro_only)
            .map(Template::summary)
            .collect())
    }

    pub async fn get_template_by_id(&self, id: Uuid) -> Result<Option<TemplateSummary>> {
        let template = self
            .repository
            .find_by_id(id)
            .await
            .map_err(store_error("get template"))?;

        Ok(template.as_ref().map(Template::summary))
    }

    pub async fn get_template_by_slug(&self, slug: &str) -> Result<Option<TemplateSummary>> {
        let template = self
            .repository
            .find_by_slug(slug)
            .await
            .map_err(store_error("get template by slug"))?;

        Ok(template.as_ref().map(Template::summary))
    }

    /// Look up a template for the public API: missing is `NotFound`, pro-only
    /// is `Forbidden`.
    pub async fn get_public_template(&self, slug: &str) -> Result<TemplateSummary> {
        let template = self
            .get_template_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;

        if template.pro_only {
            return Err(AppError::Forbidden(
                "Template is pro you cant access it".to_string(),
            ));
        }

        Ok(template)
    }

    /// Render a public template with caller-supplied variables.
    pub async fn render_public(
        &self,
        slug: &str,
        variables: &[TemplateVariable],
    ) -> Result<RenderedTemplate> {
        let template = self.get_public_template(slug).await?;
        let html = substitute(&template.html, variables);
        TemplateMetrics::record_rendered(html.len());

        Ok(RenderedTemplate {
            slug: template.slug,
            name: template.name,
            html,
        })
    }

    pub async fn count(&self) -> Result<u64> {
        self.repository
            .count()
            .await
            .map_err(store_error("count templates"))
    }
}

fn store_error(action: &'static str) -> impl FnOnce(TemplateStoreError) -> AppError {
    move |err| match err {
        TemplateStoreError::DuplicateSlug(slug) => {
            AppError::Conflict(format!("A template with slug '{}' already exists", slug))
        }
        other => AppError::upstream(action)(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::template::memory_store::MemoryTemplateStore;
    use crate::template::types::TemplateVariableDef;

    fn service() -> TemplateService {
        TemplateService::new(Arc::new(MemoryTemplateStore::new()))
    }

    fn actor(role: Role) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role,
            is_banned: false,
            has_website_permission: true,
        }
    }

    fn input(slug: &str) -> TemplateInput {
        TemplateInput {
            name: "Welcome".to_string(),
            slug: slug.to_string(),
            html: "<p>Hi {{name}}</p>".to_string(),
            category: Some("onboarding".to_string()),
            thumbnail: Some("https://cdn.example.com/welcome.png".to_string()),
            pro_only: false,
            is_published: false,
            variables: vec![TemplateVariableDef {
                key: "name".to_string(),
                default_value: "there".to_string(),
            }],
        }
    }

    fn render_var(key: &str, value: &str) -> TemplateVariable {
        TemplateVariable {
            key: key.to_string(),
            value: Some(value.to_string()),
        }
    }

    #[tokio::test]
    async fn test_user_cannot_create_or_update() {
        let svc = service();
        let result = svc.create_template(&actor(Role::User), input("welcome")).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));

        let created = svc
            .create_template(&actor(Role::Admin), input("welcome"))
            .await
            .unwrap();
        let update = UpdateTemplateInput {
            id: created.id,
            fields: input("welcome"),
        };
        let result = svc.update_template(&actor(Role::User), update).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_create_requires_name_and_html() {
        let svc = service();
        let mut bad = input("welcome");
        bad.html = String::new();
        let result = svc.create_template(&actor(Role::SuperAdmin), bad).await;
        assert!(matches!(result, Err(AppError::Validation(msg)) if msg == "Name and HTML are required"));
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let svc = service();
        svc.create_template(&actor(Role::Admin), input("welcome"))
            .await
            .unwrap();
        let result = svc.create_template(&actor(Role::Admin), input("welcome")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_overwrites_all_fields() {
        let svc = service();
        let created = svc
            .create_template(&actor(Role::Admin), input("welcome"))
            .await
            .unwrap();

        let mut fields = input("welcome-v2");
        fields.name = "Welcome v2".to_string();
        fields.category = None;
        fields.thumbnail = None;
        let updated = svc
            .update_template(
                &actor(Role::SuperAdmin),
                UpdateTemplateInput {
                    id: created.id,
                    fields,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Welcome v2");
        assert_eq!(updated.slug, "welcome-v2");
        assert_eq!(updated.category, None);
        assert_eq!(updated.thumbnail, None);
        assert_eq!(updated.created_at, created.created_at);
        assert!(svc.get_template_by_slug("welcome").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_unknown_id_not_found() {
        let svc = service();
        let result = svc
            .update_template(
                &actor(Role::Admin),
                UpdateTemplateInput {
                    id: Uuid::new_v4(),
                    fields: input("welcome"),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_published_template_cannot_be_deleted() {
        let svc = service();
        let created = svc
            .create_template(&actor(Role::Admin), input("welcome"))
            .await
            .unwrap();
        svc.toggle_publish(created.id).await.unwrap();

        let result = svc.delete_template(created.id).await;
        assert!(matches!(
            result,
            Err(AppError::Conflict(msg)) if msg == "Template is published. You can't delete it."
        ));

        svc.toggle_publish(created.id).await.unwrap();
        let deleted = svc.delete_template(created.id).await.unwrap();
        assert_eq!(deleted.id, created.id);

        let result = svc.delete_template(created.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_toggle_unknown_not_found() {
        let svc = service();
        assert!(matches!(
            svc.toggle_pro(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_render_public_template() {
        let svc = service();
        svc.create_template(&actor(Role::Admin), input("welcome"))
            .await
            .unwrap();

        let rendered = svc
            .render_public("welcome", &[render_var("name", "Sam")])
            .await
            .unwrap();
        assert_eq!(rendered.html, "<p>Hi Sam</p>");
        assert_eq!(rendered.name, "Welcome");
        assert_eq!(rendered.slug, "welcome");
    }

    #[tokio::test]
    async fn test_pro_template_forbidden_on_public_paths() {
        let svc = service();
        let created = svc
            .create_template(&actor(Role::Admin), input("promo"))
            .await
            .unwrap();
        svc.toggle_pro(created.id).await.unwrap();

        assert!(matches!(
            svc.render_public("promo", &[render_var("name", "Sam")]).await,
            Err(AppError::Forbidden(msg)) if msg == "Template is pro you cant access it"
        ));
        assert!(matches!(
            svc.get_public_template("promo").await,
            Err(AppError::Forbidden(_))
        ));
        assert!(svc.get_public_templates().await.unwrap().is_empty());
        assert_eq!(svc.get_all_templates().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_slug_not_found() {
        let svc = service();
        assert!(matches!(
            svc.render_public("nope", &[]).await,
            Err(AppError::NotFound(msg)) if msg == "Template not found"
        ));
    }
}
