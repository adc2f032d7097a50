use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL used in links sent by email
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    /// Session token lifetime in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Storage backend: "memory" or "postgres"
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u32,
    #[serde(default)]
    pub run_migrations: bool,
}

/// Payment gateway credentials. Both keys must be present before any
/// checkout or verification runs.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub key_id: Option<String>,
    pub key_secret: Option<String>,
    #[serde(default = "default_gateway_url")]
    pub base_url: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_gateway_timeout")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminConfig {
    /// Sign-ups with these addresses are promoted to SUPERADMIN
    #[serde(default)]
    pub emails: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
    /// Emit log lines as JSON instead of the human-readable format
    #[serde(default)]
    pub json_logs: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_public_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_session_ttl() -> u64 {
    7 * 24 * 3600 // 7 days
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_database_url() -> String {
    "postgres://localhost:5432/everletter".to_string()
}

fn default_pool_size() -> u32 {
    10
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_idle_timeout() -> u32 {
    600
}

fn default_gateway_url() -> String {
    "https://api.razorpay.com/v1".to_string()
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_gateway_timeout() -> u64 {
    15
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "everletter-service".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

const MULTI_WORD_KEYS: &[(&str, &str)] = &[
    ("SERVER_PUBLIC_URL", "server.public_url"),
    ("JWT_SESSION_TTL_SECONDS", "jwt.session_ttl_seconds"),
    ("DATABASE_POOL_SIZE", "database.pool_size"),
    ("DATABASE_CONNECT_TIMEOUT_SECONDS", "database.connect_timeout_seconds"),
    ("DATABASE_IDLE_TIMEOUT_SECONDS", "database.idle_timeout_seconds"),
    ("DATABASE_RUN_MIGRATIONS", "database.run_migrations"),
    ("GATEWAY_KEY_ID", "gateway.key_id"),
    ("GATEWAY_KEY_SECRET", "gateway.key_secret"),
    ("GATEWAY_BASE_URL", "gateway.base_url"),
    ("GATEWAY_REQUEST_TIMEOUT_SECONDS", "gateway.request_timeout_seconds"),
    ("MAIL_SMTP_HOST", "mail.smtp_host"),
    ("MAIL_SMTP_PORT", "mail.smtp_port"),
    ("MAIL_FROM_ADDRESS", "mail.from_address"),
    ("OTEL_SERVICE_NAME", "otel.service_name"),
    ("OTEL_SAMPLING_RATIO", "otel.sampling_ratio"),
    ("OTEL_JSON_LOGS", "otel.json_logs"),
];

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.backend", "memory")?
            .set_default("gateway.currency", "INR")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // SERVER_PORT, JWT_SECRET, GATEWAY_KEY_ID, ADMIN_EMAILS, etc.
            .add_source(
                Environment::default()
                    .separator("_")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("admin.emails"),
            );

        // The "_" separator splits multi-word keys, so map those explicitly
        for (var, key) in MULTI_WORD_KEYS {
            builder = builder.set_override_option(*key, env::var(var).ok())?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl GatewayConfig {
    /// Returns `(key_id, key_secret)` when both are configured and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.key_id.as_deref(), self.key_secret.as_deref()) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id, secret))
            }
            _ => None,
        }
    }
}

impl AdminConfig {
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.emails
            .iter()
            .any(|e| e.trim().eq_ignore_ascii_case(email.trim()))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: default_public_url(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_database_url(),
            pool_size: default_pool_size(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
            run_migrations: false,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            key_id: None,
            key_secret: None,
            base_url: default_gateway_url(),
            currency: default_currency(),
            request_timeout_seconds: default_gateway_timeout(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: None,
            password: None,
            from_address: None,
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
            json_logs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);

        let database = DatabaseConfig::default();
        assert_eq!(database.backend, "memory");
        assert!(!database.run_migrations);
    }

    #[test]
    fn test_gateway_credentials_require_both_keys() {
        let mut gateway = GatewayConfig::default();
        assert!(gateway.credentials().is_none());

        gateway.key_id = Some("rzp_test_123".to_string());
        assert!(gateway.credentials().is_none());

        gateway.key_secret = Some(String::new());
        assert!(gateway.credentials().is_none());

        gateway.key_secret = Some("shh".to_string());
        assert_eq!(gateway.credentials(), Some(("rzp_test_123", "shh")));
    }

    #[test]
    fn test_admin_allowlist_match() {
        let admin = AdminConfig {
            emails: vec!["owner@everletter.dev".to_string(), " ops@everletter.dev".to_string()],
        };

        assert!(admin.is_admin_email("owner@everletter.dev"));
        assert!(admin.is_admin_email("OPS@everletter.dev"));
        assert!(!admin.is_admin_email("someone@else.dev"));
    }
}
