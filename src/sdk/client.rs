use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::template::{RenderedTemplate, TemplateSummary, TemplateVariable};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum SdkError {
    /// The server answered with a non-success status
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl SdkError {
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::Api { status, .. } => Some(*status),
            SdkError::Network(_) => None,
        }
    }
}

#[derive(Serialize)]
struct RenderRequest<'a> {
    variables: &'a [TemplateVariable],
}

#[derive(Deserialize)]
struct ListEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for rendering and reading published templates.
#[derive(Debug, Clone)]
pub struct EverLetterClient {
    client: Client,
    base_url: String,
}

impl EverLetterClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SdkError> {
        let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /api/templates/{slug}/render
    pub async fn render_template(
        &self,
        slug: &str,
        variables: &[TemplateVariable],
    ) -> Result<RenderedTemplate, SdkError> {
        let response = self
            .client
            .post(format!("{}/api/templates/{}/render", self.base_url, slug))
            .json(&RenderRequest { variables })
            .send()
            .await?;

        read_json(response, "Failed to render template").await
    }

    /// GET /api/templates/{slug}
    pub async fn get_template(&self, slug: &str) -> Result<TemplateSummary, SdkError> {
        let response = self
            .client
            .get(format!("{}/api/templates/{}", self.base_url, slug))
            .send()
            .await?;

        read_json(response, "Template not found").await
    }

    /// GET /api/templates
    pub async fn get_templates(&self) -> Result<Vec<TemplateSummary>, SdkError> {
        let response = self
            .client
            .get(format!("{}/api/templates", self.base_url))
            .send()
            .await?;

        let envelope: ListEnvelope<TemplateSummary> =
            read_json(response, "Failed to get templates").await?;
        Ok(envelope.data)
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T, SdkError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body, fallback))
}

/// Prefer the server's `message` field, else the per-call fallback.
fn api_error(status: StatusCode, body: &str, fallback: &str) -> SdkError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());

    SdkError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_uses_server_message() {
        let err = api_error(
            StatusCode::FORBIDDEN,
            r#"{"message":"Template is pro you cant access it","code":"FORBIDDEN"}"#,
            "Template not found",
        );
        assert_eq!(err.status(), Some(403));
        assert!(matches!(
            err,
            SdkError::Api { ref message, .. } if message == "Template is pro you cant access it"
        ));
    }

    #[test]
    fn test_api_error_falls_back_on_unreadable_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>", "Failed to get templates");
        assert!(matches!(
            err,
            SdkError::Api { status: 502, ref message } if message == "Failed to get templates"
        ));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = EverLetterClient::with_client("http://localhost:8080/", Client::new());
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_render_request_shape() {
        let variables = vec![TemplateVariable::new("name", "Sam")];
        let json = serde_json::to_value(RenderRequest { variables: &variables }).unwrap();
        assert_eq!(json["variables"][0]["key"], "name");
        assert_eq!(json["variables"][0]["value"], "Sam");
    }
}
