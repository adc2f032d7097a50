use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub is_banned: bool,
    #[serde(default)]
    pub has_website_permission: bool,
}

impl Claims {
    /// Unsigned claims; `JwtIssuer::issue` fills in the timestamps.
    pub fn new(
        sub: Uuid,
        email: impl Into<String>,
        role: Role,
        is_banned: bool,
        has_website_permission: bool,
    ) -> Self {
        Self {
            sub,
            exp: 0,
            iat: 0,
            iss: None,
            aud: None,
            email: email.into(),
            role,
            is_banned,
            has_website_permission,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp < now
    }
}
