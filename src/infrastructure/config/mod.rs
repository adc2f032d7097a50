mod settings;

pub use settings::{
    AdminConfig, DatabaseConfig, GatewayConfig, JwtConfig, MailConfig, OtelConfig, ServerConfig,
    Settings,
};
