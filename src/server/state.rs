use std::sync::Arc;
use std::time::Instant;

use crate::auth::{JwtIssuer, JwtValidator};
use crate::billing::{
    create_billing_repository, BillingRepository, PaymentGateway, PaymentTracker, RazorpayGateway,
};
use crate::config::Settings;
use crate::contact::{create_contact_repository, ContactRepository, ContactService};
use crate::error::{AppError, Result};
use crate::mail::{create_mailer, Mailer};
use crate::postgres::PostgresPool;
use crate::tasks::FollowUpDispatcher;
use crate::template::{create_template_repository, TemplateRepository, TemplateService};
use crate::users::{create_user_repository, UserRepository, UserService};

/// Storage backends and external collaborators the services are built on.
pub struct StateParts {
    pub templates: Arc<dyn TemplateRepository>,
    pub users: Arc<dyn UserRepository>,
    pub billing: Arc<dyn BillingRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn Mailer>,
}

impl StateParts {
    /// Repositories chosen by `database.backend`, the Razorpay gateway and
    /// the configured mailer.
    pub fn from_settings(
        settings: &Settings,
        postgres_pool: Option<Arc<PostgresPool>>,
    ) -> Result<Self> {
        let gateway = RazorpayGateway::new(&settings.gateway).map_err(|e| {
            AppError::Configuration(format!("Failed to build payment gateway client: {}", e))
        })?;

        Ok(Self {
            templates: create_template_repository(&settings.database, postgres_pool.clone()),
            users: create_user_repository(&settings.database, postgres_pool.clone()),
            billing: create_billing_repository(&settings.database, postgres_pool.clone()),
            contacts: create_contact_repository(&settings.database, postgres_pool),
            gateway: Arc::new(gateway),
            mailer: create_mailer(&settings.mail),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub jwt_validator: Arc<JwtValidator>,
    pub templates: TemplateService,
    pub users: UserService,
    pub billing: PaymentTracker,
    pub contacts: ContactService,
    pub follow_ups: FollowUpDispatcher,
    pub postgres_pool: Option<Arc<PostgresPool>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(settings: Settings, postgres_pool: Option<Arc<PostgresPool>>) -> Result<Self> {
        let parts = StateParts::from_settings(&settings, postgres_pool.clone())?;
        let mut state = Self::from_parts(settings, parts);
        state.postgres_pool = postgres_pool;
        Ok(state)
    }

    pub fn from_parts(settings: Settings, parts: StateParts) -> Self {
        let jwt_validator = Arc::new(JwtValidator::new(&settings.jwt));
        let jwt_issuer = Arc::new(JwtIssuer::new(&settings.jwt));

        let users = UserService::new(
            parts.users.clone(),
            jwt_issuer,
            settings.admin.clone(),
            settings.server.public_url.clone(),
        );
        let billing = PaymentTracker::new(
            parts.gateway,
            parts.billing,
            parts.users,
            settings.gateway.clone(),
        );
        let admin_inbox = settings
            .mail
            .from_address
            .clone()
            .or_else(|| settings.mail.username.clone());

        Self {
            jwt_validator,
            templates: TemplateService::new(parts.templates),
            users,
            billing,
            contacts: ContactService::new(parts.contacts, admin_inbox),
            follow_ups: FollowUpDispatcher::new(parts.mailer),
            postgres_pool: None,
            start_time: Instant::now(),
            settings: Arc::new(settings),
        }
    }
}
