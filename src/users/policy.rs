//! Who may change whom.
//!
//! Checks run in a fixed order so that a USER actor is always `Unauthorized`
//! and targeting yourself is always `InvalidOperation`, whatever else is true
//! about the request:
//!
//! 1. actor is USER
//! 2. actor targets itself
//! 3. role change to the role the target already has
//! 4. delete by anyone but SUPERADMIN
//! 5. ADMIN acting on a SUPERADMIN
//! 6. ADMIN promoting to SUPERADMIN

use crate::auth::{Actor, Role};
use crate::error::AppError;

use super::types::User;

/// A privileged action on another account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    ToggleBan,
    TogglePermission,
    ChangeRole(Role),
    Delete,
}

impl UserAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserAction::ToggleBan => "toggle_ban",
            UserAction::TogglePermission => "toggle_permission",
            UserAction::ChangeRole(_) => "change_role",
            UserAction::Delete => "delete",
        }
    }

    fn not_staff_message(&self) -> &'static str {
        match self {
            UserAction::ToggleBan => "You are not authorized to modify ban status.",
            UserAction::TogglePermission => {
                "You are not authorized to modify website permissions."
            }
            UserAction::ChangeRole(_) => "You are not authorized to change roles.",
            UserAction::Delete => "Only Super Admin can delete users.",
        }
    }

    fn self_target_message(&self) -> &'static str {
        match self {
            UserAction::ToggleBan => "You cannot ban yourself.",
            UserAction::TogglePermission => "You cannot change your own permission.",
            UserAction::ChangeRole(_) => "You cannot change your own role.",
            UserAction::Delete => "You cannot delete yourself.",
        }
    }

    fn protected_target_message(&self) -> &'static str {
        match self {
            UserAction::ToggleBan => "Admins cannot ban a Super Admin.",
            UserAction::TogglePermission => "Admins cannot change Super Admin permissions.",
            UserAction::ChangeRole(_) => "Admins cannot change SuperAdmin role.",
            UserAction::Delete => "Only Super Admin can delete users.",
        }
    }
}

/// Decide whether `actor` may perform `action` on `target`.
pub fn authorize(actor: &Actor, target: &User, action: UserAction) -> Result<(), AppError> {
    if actor.role == Role::User {
        return Err(AppError::Unauthorized(action.not_staff_message().to_string()));
    }

    if actor.id == target.id {
        return Err(AppError::InvalidOperation(
            action.self_target_message().to_string(),
        ));
    }

    if let UserAction::ChangeRole(new_role) = action {
        if new_role == target.role {
            return Err(AppError::NoOp("User already has this role.".to_string()));
        }
    }

    if action == UserAction::Delete && actor.role != Role::SuperAdmin {
        return Err(AppError::Unauthorized(
            "Only Super Admin can delete users.".to_string(),
        ));
    }

    if actor.role == Role::Admin && target.role == Role::SuperAdmin {
        return Err(AppError::Unauthorized(
            action.protected_target_message().to_string(),
        ));
    }

    if actor.role == Role::Admin && action == UserAction::ChangeRole(Role::SuperAdmin) {
        return Err(AppError::Unauthorized(
            "Admins cannot promote to SuperAdmin.".to_string(),
        ));
    }

    Ok(())
}
