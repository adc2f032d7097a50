use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::config::JwtConfig;
use crate::error::AppError;

use super::Claims;

pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(config: &JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::default();

        if let Some(ref issuer) = config.issuer {
            validation.set_issuer(&[issuer]);
        }

        if let Some(ref audience) = config.audience {
            validation.set_audience(&[audience]);
        }

        Self {
            decoding_key,
            validation,
        }
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

/// Mints session tokens after sign-in.
pub struct JwtIssuer {
    encoding_key: EncodingKey,
    ttl_seconds: i64,
    issuer: Option<String>,
    audience: Option<String>,
}

impl JwtIssuer {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            ttl_seconds: config.session_ttl_seconds as i64,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }

    /// Fill in `iat`/`exp` and sign the claims.
    pub fn issue(&self, mut claims: Claims) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp();
        claims.iat = now;
        claims.exp = now + self.ttl_seconds;
        claims.iss = self.issuer.clone();
        claims.aud = self.audience.clone();

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign session token");
            AppError::Upstream("Failed to create session. Please try again later.".to_string())
        })
    }
}
