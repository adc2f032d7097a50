use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Maximum length of a contact message
pub const MAX_MESSAGE_LENGTH: usize = 5000;

/// A message submitted through the public contact form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub country: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub message: String,
}

impl ContactInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.country.trim().is_empty()
            || self.message.trim().is_empty()
        {
            return Err(AppError::Validation(
                "Name, email, country and message are required".to_string(),
            ));
        }
        if !self.email.contains('@') {
            return Err(AppError::Validation("A valid email is required".to_string()));
        }
        if self.message.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(AppError::Validation(format!(
                "Message must be at most {} characters",
                MAX_MESSAGE_LENGTH
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_required() {
        let input = ContactInput {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            country: "UK".to_string(),
            message: String::new(),
        };
        assert!(matches!(input.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_message_length_capped() {
        let input = ContactInput {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            country: "UK".to_string(),
            message: "x".repeat(MAX_MESSAGE_LENGTH + 1),
        };
        assert!(input.validate().is_err());
    }
}
