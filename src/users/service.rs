use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::{
    hash_password, validate_password_strength, verify_password, Actor, Claims, JwtIssuer, Role,
};
use crate::config::AdminConfig;
use crate::error::{AppError, Result};
use crate::mail::EmailMessage;
use crate::tasks::Outcome;

use super::api_keys::generate_api_key;
use super::policy::{authorize, UserAction};
use super::store::{UserRepository, UserStoreError};
use super::types::{ApiKey, Session, SignInRequest, SignUpRequest, User};

const USER_NOT_FOUND: &str = "User not found.";
const WELCOME_SUBJECT: &str = "Welcome to the EverLetter platform";

/// Account lifecycle and moderation
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    issuer: Arc<JwtIssuer>,
    admin: AdminConfig,
    public_url: String,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        issuer: Arc<JwtIssuer>,
        admin: AdminConfig,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            issuer,
            admin,
            public_url: public_url.into(),
        }
    }

    fn sign_in_url(&self) -> String {
        format!("{}/sign-in", self.public_url.trim_end_matches('/'))
    }

    /// Create an account. Allowlisted addresses become SUPERADMIN with
    /// website permission; everyone else waits for approval.
    pub async fn register(&self, request: SignUpRequest) -> Result<Outcome<User>> {
        let name = request.name.trim().to_string();
        let email = normalize_email(&request.email);

        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        if !is_plausible_email(&email) {
            return Err(AppError::Validation("A valid email is required".to_string()));
        }
        validate_password_strength(&request.password)?;

        let is_admin = self.admin.is_admin_email(&email);
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            role: if is_admin { Role::SuperAdmin } else { Role::User },
            has_website_permission: is_admin,
            is_banned: false,
            email_verified: false,
            password_hash: hash_password(&request.password)?,
            created_at: Utc::now(),
        };

        self.repository
            .insert(&user)
            .await
            .map_err(store_error("create account"))?;

        tracing::info!(user_id = %user.id, role = %user.role, "Account registered");

        let welcome = if is_admin {
            format!(
                "You have been granted superadmin access to the platform. Please login to the \
                 platform to continue. <a href=\"{}\">Login</a>",
                self.sign_in_url()
            )
        } else {
            "Welcome to the EverLetter platform. Please wait for the admin to approve your \
             request."
                .to_string()
        };
        let email = EmailMessage::new(&user.email, WELCOME_SUBJECT, welcome);

        Ok(Outcome::new(user).with_email(email))
    }

    /// Verify credentials and issue a session token.
    pub async fn authenticate(&self, request: SignInRequest) -> Result<Session> {
        let email = normalize_email(&request.email);
        let user = self
            .repository
            .find_by_email(&email)
            .await
            .map_err(store_error("sign in"))?;

        let user = match user {
            Some(user) if verify_password(&request.password, &user.password_hash) => user,
            _ => {
                tracing::debug!("Sign-in rejected");
                return Err(AppError::Unauthorized(
                    "Invalid email or password".to_string(),
                ));
            }
        };

        let claims = Claims::new(
            user.id,
            user.email.as_str(),
            user.role,
            user.is_banned,
            user.has_website_permission,
        );
        let token = self.issuer.issue(claims)?;

        tracing::info!(user_id = %user.id, "Session issued");
        Ok(Session { token, user })
    }

    /// Current state of an account as an acting identity.
    pub async fn load_actor(&self, id: Uuid) -> Result<Actor> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(store_error("load account"))?
            .map(|user| user.actor())
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.repository
            .list()
            .await
            .map_err(store_error("get users"))
    }

    pub async fn count(&self) -> Result<u64> {
        self.repository
            .count()
            .await
            .map_err(store_error("count users"))
    }

    async fn target(&self, id: Uuid) -> Result<User> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(store_error("load user"))?
            .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))
    }

    async fn save(&self, user: &User, action: &'static str) -> Result<()> {
        let updated = self
            .repository
            .update(user)
            .await
            .map_err(store_error(action))?;
        if !updated {
            return Err(AppError::NotFound(USER_NOT_FOUND.to_string()));
        }
        Ok(())
    }

    pub async fn toggle_ban(&self, actor: &Actor, id: Uuid) -> Result<Outcome<User>> {
        let mut user = self.target(id).await?;
        authorize(actor, &user, UserAction::ToggleBan)?;

        user.is_banned = !user.is_banned;
        self.save(&user, "toggle ban user").await?;

        tracing::info!(
            user_id = %id,
            actor_id = %actor.id,
            is_banned = user.is_banned,
            "Ban status changed"
        );

        let email = EmailMessage::new(
            &user.email,
            "Account Ban Status Updated",
            format!(
                "Your account has been {}.",
                if user.is_banned { "banned" } else { "unbanned" }
            ),
        );
        Ok(Outcome::new(user).with_email(email))
    }

    pub async fn toggle_website_permission(
        &self,
        actor: &Actor,
        id: Uuid,
    ) -> Result<Outcome<User>> {
        let mut user = self.target(id).await?;
        authorize(actor, &user, UserAction::TogglePermission)?;

        user.has_website_permission = !user.has_website_permission;
        self.save(&user, "toggle permission").await?;

        tracing::info!(
            user_id = %id,
            actor_id = %actor.id,
            has_website_permission = user.has_website_permission,
            "Website permission changed"
        );

        let email = EmailMessage::new(
            &user.email,
            "Website Permission Updated",
            format!(
                "Your website permission has been {}.<br>Login: <a href=\"{url}\">{url}</a>",
                if user.has_website_permission { "granted" } else { "revoked" },
                url = self.sign_in_url()
            ),
        );
        Ok(Outcome::new(user).with_email(email))
    }

    pub async fn change_role(&self, actor: &Actor, id: Uuid, role: Role) -> Result<User> {
        let mut user = self.target(id).await?;
        authorize(actor, &user, UserAction::ChangeRole(role))?;

        let previous = user.role;
        user.role = role;
        self.save(&user, "change user role").await?;

        tracing::info!(
            user_id = %id,
            actor_id = %actor.id,
            from = %previous,
            to = %role,
            "Role changed"
        );
        Ok(user)
    }

    pub async fn delete_user(&self, actor: &Actor, id: Uuid) -> Result<User> {
        let user = self.target(id).await?;
        authorize(actor, &user, UserAction::Delete)?;

        let deleted = self
            .repository
            .delete(id)
            .await
            .map_err(store_error("delete user"))?;
        if !deleted {
            return Err(AppError::NotFound(USER_NOT_FOUND.to_string()));
        }

        tracing::info!(user_id = %id, actor_id = %actor.id, "User deleted");
        Ok(user)
    }

    /// Issue a new API key for the acting account.
    pub async fn generate_api_key(&self, actor: &Actor) -> Result<ApiKey> {
        let key = ApiKey {
            id: Uuid::new_v4(),
            key: generate_api_key(),
            user_id: actor.id,
            created_at: Utc::now(),
        };

        self.repository
            .insert_api_key(&key)
            .await
            .map_err(store_error("generate API key"))?;

        tracing::info!(user_id = %actor.id, key_id = %key.id, "API key generated");
        Ok(key)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

fn store_error(action: &'static str) -> impl FnOnce(UserStoreError) -> AppError {
    move |err| match err {
        UserStoreError::DuplicateEmail(_) => {
            AppError::Conflict("An account with this email already exists".to_string())
        }
        other => AppError::upstream(action)(other),
    }
}
