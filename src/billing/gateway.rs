//! Payment gateway client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GatewayConfig;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway answered with an error body. `description` is the
    /// gateway's own explanation and is safe to show to the payer.
    #[error("{description}")]
    Api { status: u16, description: String },

    #[error("Invalid response from gateway: {0}")]
    InvalidResponse(String),
}

/// Order creation parameters. `amount` is in sub-units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GatewayOrderRequest {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewayPayment {
    pub id: String,
    pub order_id: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: &GatewayOrderRequest)
        -> Result<GatewayOrder, GatewayError>;

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError>;
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    description: Option<String>,
    code: Option<String>,
}

/// Razorpay REST client using HTTP basic auth with the key id and secret.
pub struct RazorpayGateway {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    /// Missing credentials are not an error here; checkout operations check
    /// them before calling the gateway.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: &GatewayConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone().unwrap_or_default(),
            key_secret: config.key_secret.clone().unwrap_or_default(),
        }
    }

    async fn parse<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let description = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| {
                    tracing::warn!(
                        status = status.as_u16(),
                        code = envelope.error.code.as_deref().unwrap_or("unknown"),
                        "Gateway rejected request"
                    );
                    envelope.error.description
                })
                .unwrap_or_else(|| format!("Gateway returned status {}", status.as_u16()));

            return Err(GatewayError::Api {
                status: status.as_u16(),
                description,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        request: &GatewayOrderRequest,
    ) -> Result<GatewayOrder, GatewayError> {
        let response = self
            .client
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(request)
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn fetch_payment(&self, payment_id: &str) -> Result<GatewayPayment, GatewayError> {
        let response = self
            .client
            .get(format!("{}/payments/{}", self.base_url, payment_id))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await?;

        Self::parse(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_envelope_parses_description() {
        let body = r#"{"error":{"code":"BAD_REQUEST_ERROR","description":"The amount must be atleast INR 1.00","field":"amount"}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap();
        assert_eq!(
            envelope.error.description.as_deref(),
            Some("The amount must be atleast INR 1.00")
        );
    }

    #[test]
    fn test_api_error_displays_description() {
        let err = GatewayError::Api {
            status: 400,
            description: "The id provided does not exist".to_string(),
        };
        assert_eq!(err.to_string(), "The id provided does not exist");
    }

    #[test]
    fn test_order_request_shape() {
        let mut notes = HashMap::new();
        notes.insert("plan".to_string(), "pro".to_string());
        let request = GatewayOrderRequest {
            amount: 99_900,
            currency: "INR".to_string(),
            receipt: "receipt_1".to_string(),
            notes,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["amount"], 99_900);
        assert_eq!(json["notes"]["plan"], "pro");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = GatewayConfig {
            base_url: "https://api.razorpay.com/v1/".to_string(),
            ..Default::default()
        };
        let gateway = RazorpayGateway::with_client(&config, Client::new());
        assert_eq!(gateway.base_url, "https://api.razorpay.com/v1");
    }
}
