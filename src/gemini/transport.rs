use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::{
    config::GeminiConfig,
    error::{BabyFaceError, Result},
    models::GenerateContentRequest,
};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Status and body of one `generateContent` exchange, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request to the generation service.
#[async_trait]
pub trait ContentTransport: Send + Sync {
    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<RawResponse>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl HttpTransport {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config.api_key()?.to_string();
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BabyFaceError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ContentTransport for HttpTransport {
    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<RawResponse> {
        let body = serde_json::to_vec(request)?;
        log::debug!("POST {} ({} bytes)", self.endpoint, body.len());

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                log::error!("Gemini request failed before a response arrived: {}", e);
                BabyFaceError::TransportError(e.to_string())
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        if !(200..300).contains(&status) {
            log::error!("Gemini API error response ({}): {}", status, body);
        }

        Ok(RawResponse { status, body })
    }
}
