use serde::Serialize;
use uuid::Uuid;

use super::{Claims, Role};

/// The authenticated identity attempting an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
    pub is_banned: bool,
    pub has_website_permission: bool,
}

impl Actor {
    /// Banned or permission-revoked accounts may not use the dashboard at all.
    pub fn has_dashboard_access(&self) -> bool {
        !self.is_banned && self.has_website_permission
    }
}

impl From<&Claims> for Actor {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
            is_banned: claims.is_banned,
            has_website_permission: claims.has_website_permission,
        }
    }
}
