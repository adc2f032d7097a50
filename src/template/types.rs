//! Template types and validation

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

use super::substitution::extract_placeholders;

/// Maximum slug length
pub const MAX_SLUG_LENGTH: usize = 128;

/// Maximum template name length
pub const MAX_NAME_LENGTH: usize = 256;

/// A declared template variable with its default value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariableDef {
    pub key: String,
    #[serde(default)]
    pub default_value: String,
}

/// A caller-supplied `{key, value}` pair used when rendering.
///
/// A missing `key` deserializes to an empty string and is skipped by the
/// substitution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVariable {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl TemplateVariable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }
}

/// An HTML email template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: Uuid,

    pub name: String,

    /// Globally unique, URL-safe public lookup key
    pub slug: String,

    /// HTML body with `{{key}}` placeholders
    pub html: String,

    pub category: Option<String>,

    pub thumbnail: Option<String>,

    /// Excluded from the unauthenticated public API
    pub pro_only: bool,

    pub is_published: bool,

    pub variables: Vec<TemplateVariableDef>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Template {
    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            id: self.id,
            name: self.name.clone(),
            html: self.html.clone(),
            slug: self.slug.clone(),
            pro_only: self.pro_only,
        }
    }
}

/// Narrow projection returned by public lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: Uuid,
    pub name: String,
    pub html: String,
    pub slug: String,
    pub pro_only: bool,
}

/// Result of rendering a template with caller-supplied variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedTemplate {
    pub slug: String,
    pub name: String,
    pub html: String,
}

/// Author-supplied template fields
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub html: String,
    pub category: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub pro_only: bool,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub variables: Vec<TemplateVariableDef>,
}

impl TemplateInput {
    /// Validate author input before it reaches the store.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() || self.html.trim().is_empty() {
            return Err(AppError::Validation(
                "Name and HTML are required".to_string(),
            ));
        }

        if self.name.len() > MAX_NAME_LENGTH {
            return Err(AppError::Validation(format!(
                "Name must be at most {} characters",
                MAX_NAME_LENGTH
            )));
        }

        validate_slug(&self.slug)?;

        let placeholders = extract_placeholders(&self.html);
        let mut keys = HashSet::new();
        for variable in &self.variables {
            if variable.key.trim().is_empty() {
                return Err(AppError::Validation(
                    "Variable keys must not be empty".to_string(),
                ));
            }
            if !keys.insert(variable.key.as_str()) {
                return Err(AppError::Validation(format!(
                    "Duplicate variable key: {}",
                    variable.key
                )));
            }
            if !placeholders.contains(&variable.key) {
                return Err(AppError::Validation(format!(
                    "Variable {} is not used in the template HTML",
                    variable.key
                )));
            }
        }

        Ok(())
    }

    /// Build a new record, normalizing blank optional fields to absent.
    pub fn into_template(self, id: Uuid, created_at: DateTime<Utc>) -> Template {
        Template {
            id,
            name: self.name.trim().to_string(),
            slug: self.slug,
            html: self.html,
            category: non_blank(self.category),
            thumbnail: non_blank(self.thumbnail),
            pro_only: self.pro_only,
            is_published: self.is_published,
            variables: self.variables,
            created_at,
            updated_at: Utc::now(),
        }
    }
}

/// Full-field overwrite of an existing template
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTemplateInput {
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: TemplateInput,
}

/// Slugs are 1-128 chars of lowercase ASCII letters, digits and single dashes.
pub fn validate_slug(slug: &str) -> Result<(), AppError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LENGTH {
        return Err(AppError::Validation(format!(
            "Slug must be 1-{} characters",
            MAX_SLUG_LENGTH
        )));
    }

    let valid_chars = slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if !valid_chars || slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return Err(AppError::Validation(
            "Slug must contain only lowercase letters, digits and single dashes".to_string(),
        ));
    }

    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Boolean gates that can be flipped in place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFlag {
    ProOnly,
    Published,
}

impl TemplateFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateFlag::ProOnly => "toggle_pro",
            TemplateFlag::Published => "toggle_publish",
        }
    }
}

/// Response for listing templates
#[derive(Debug, Serialize)]
pub struct TemplateListResponse<T> {
    pub data: Vec<T>,
    pub total: usize,
}
