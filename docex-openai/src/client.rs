use std::time::Duration;

use async_trait::async_trait;
use docex::extraction::{GatewayError, LlmGateway, LlmRequest, LlmResponse};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::OpenAiError;
use crate::types::{output_text_from_response, ResponsesRequest};

/// Environment variable holding the API key.
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV_VAR: &str = "OPENAI_BASE_URL";
/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Gateway over the OpenAI Responses API.
#[derive(Clone)]
pub struct OpenAiGateway {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiGateway")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl OpenAiGateway {
    /// Creates a gateway for the public API with a 300 second timeout.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(300),
        }
    }

    /// Creates a gateway from `OPENAI_API_KEY` and, if set, `OPENAI_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns `OpenAiError::MissingApiKey` when the key is unset or empty.
    pub fn from_env() -> Result<Self, OpenAiError> {
        let api_key = std::env::var(API_KEY_ENV_VAR)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(OpenAiError::MissingApiKey(API_KEY_ENV_VAR))?;

        let gateway = Self::new(api_key);
        Ok(match std::env::var(BASE_URL_ENV_VAR) {
            Ok(url) if !url.trim().is_empty() => gateway.with_base_url(url),
            _ => gateway,
        })
    }

    /// Overrides the API base URL (e.g. for a compatible proxy).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The endpoint prompts are posted to.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/responses", self.base_url)
    }

    /// Posts one prompt and returns the output text.
    ///
    /// # Errors
    ///
    /// Returns `OpenAiError::Http` on transport failure, `OpenAiError::Api` on a
    /// non-success status and `OpenAiError::Decode` on a malformed body.
    pub async fn respond(&self, request: &LlmRequest) -> Result<String, OpenAiError> {
        let body = ResponsesRequest {
            model: &request.model,
            input: &request.prompt,
            temperature: request.temperature,
        };

        debug!(model = %request.model, endpoint = %self.endpoint(), "[OpenAI] Sending request");
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            warn!(status = %status, "[OpenAI] Non-success status");
            return Err(OpenAiError::Api {
                status: status.as_u16(),
                body: text,
            });
        }

        let val: Value =
            serde_json::from_str(&text).map_err(|e| OpenAiError::Decode(e.to_string()))?;
        Ok(output_text_from_response(&val))
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, GatewayError> {
        let output_text = self.respond(request).await?;
        Ok(LlmResponse { output_text })
    }
}
