//! Shared fixtures for integration tests: memory stores, a scripted payment
//! gateway and a mailer that records instead of sending.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use uuid::Uuid;

use everletter_service::auth::{hash_password, Claims, JwtIssuer, Role};
use everletter_service::billing::{
    compute_signature, GatewayError, GatewayOrder, GatewayOrderRequest, GatewayPayment,
    MemoryBillingStore, PaymentGateway,
};
use everletter_service::config::{
    AdminConfig, DatabaseConfig, GatewayConfig, JwtConfig, MailConfig, OtelConfig, ServerConfig,
    Settings,
};
use everletter_service::contact::MemoryContactStore;
use everletter_service::mail::{EmailMessage, MailError, Mailer};
use everletter_service::server::{create_app, AppState, StateParts};
use everletter_service::template::MemoryTemplateStore;
use everletter_service::users::{MemoryUserStore, User, UserRepository};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const GATEWAY_KEY_ID: &str = "rzp_test_key";
pub const GATEWAY_SECRET: &str = "rzp_test_secret";
pub const ADMIN_EMAIL: &str = "owner@everletter.dev";
pub const PASSWORD: &str = "correct-horse!";

pub fn test_settings() -> Settings {
    Settings {
        server: ServerConfig::default(),
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            issuer: None,
            audience: None,
            session_ttl_seconds: 3600,
        },
        database: DatabaseConfig::default(),
        gateway: GatewayConfig {
            key_id: Some(GATEWAY_KEY_ID.to_string()),
            key_secret: Some(GATEWAY_SECRET.to_string()),
            ..GatewayConfig::default()
        },
        mail: MailConfig {
            from_address: Some("inbox@everletter.dev".to_string()),
            ..MailConfig::default()
        },
        admin: AdminConfig {
            emails: vec![ADMIN_EMAIL.to_string()],
        },
        otel: OtelConfig::default(),
    }
}

/// Gateway double. Orders get sequential ids; payments resolve to whatever
/// order the test settled them against.
#[derive(Default)]
pub struct FakeGateway {
    next_order: AtomicU64,
    payments: Mutex<HashMap<String, String>>,
    orders: Mutex<Vec<GatewayOrderRequest>>,
    /// Reject order creation with this description
    pub reject_orders: Mutex<Option<String>>,
    /// Report a different amount than requested
    pub amount_skew: Mutex<i64>,
}

impl FakeGateway {
    pub fn settle(&self, payment_id: &str, order_id: &str) {
        self.payments
            .lock()
            .unwrap()
            .insert(payment_id.to_string(), order_id.to_string());
    }

    pub fn orders(&self) -> Vec<GatewayOrderRequest> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrder, GatewayError> {
        if let Some(description) = self.reject_orders.lock().unwrap().clone() {
            return Err(GatewayError::Api {
                status: 400,
                description,
            });
        }

        self.orders.lock().unwrap().push(request.clone());
        let n = self.next_order.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(GatewayOrder {
            id: format!("order_{}", n),
            amount: request.amount + *self.amount_skew.lock().unwrap(),
            currency: request.currency.clone(),
        })
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        match self.payments.lock().unwrap().get(payment_id) {
            Some(order_id) => Ok(GatewayPayment {
                id: payment_id.to_string(),
                order_id: Some(order_id.clone()),
            }),
            None => Err(GatewayError::Api {
                status: 400,
                description: "The id provided does not exist".to_string(),
            }),
        }
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn transport(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Follow-ups run on spawned tasks; give them a moment to land.
pub async fn wait_for_mail(mailer: &RecordingMailer, count: usize) -> Vec<EmailMessage> {
    for _ in 0..100 {
        let sent = mailer.sent();
        if sent.len() >= count {
            return sent;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    mailer.sent()
}

pub fn valid_signature(order_id: &str, payment_id: &str) -> String {
    compute_signature(GATEWAY_SECRET, order_id, payment_id)
}

/// Application wired to memory stores with handles kept for assertions.
pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub users: Arc<MemoryUserStore>,
    pub billing: Arc<MemoryBillingStore>,
    pub gateway: Arc<FakeGateway>,
    pub mailer: Arc<RecordingMailer>,
    issuer: JwtIssuer,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let users = Arc::new(MemoryUserStore::new());
        let billing = Arc::new(MemoryBillingStore::new());
        let gateway = Arc::new(FakeGateway::default());
        let mailer = Arc::new(RecordingMailer::default());
        let issuer = JwtIssuer::new(&settings.jwt);

        let parts = StateParts {
            templates: Arc::new(MemoryTemplateStore::new()),
            users: users.clone(),
            billing: billing.clone(),
            contacts: Arc::new(MemoryContactStore::new()),
            gateway: gateway.clone(),
            mailer: mailer.clone(),
        };
        let state = AppState::from_parts(settings, parts);
        let router = create_app(state.clone());

        Self {
            state,
            router,
            users,
            billing,
            gateway,
            mailer,
            issuer,
        }
    }

    /// Store an account directly, bypassing sign-up.
    pub async fn seed_user(&self, email: &str, role: Role) -> User {
        let user = User {
            id: Uuid::new_v4(),
            name: email.split('@').next().unwrap_or("user").to_string(),
            email: email.to_string(),
            role,
            has_website_permission: true,
            is_banned: false,
            email_verified: true,
            password_hash: hash_password(PASSWORD).unwrap(),
            created_at: Utc::now(),
        };
        self.users.insert(&user).await.unwrap();
        user
    }

    pub fn token_for(&self, user: &User) -> String {
        let claims = Claims::new(
            user.id,
            user.email.as_str(),
            user.role,
            user.is_banned,
            user.has_website_permission,
        );
        self.issuer.issue(claims).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        use tower::ServiceExt;
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}
