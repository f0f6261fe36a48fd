use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::{debug, instrument};

use super::types::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use crate::domain::models::AiConfig;
use crate::domain::ports::{LlmClient, LlmError};
use crate::infrastructure::logging::scrub_secrets;

/// Configuration for the Gemini HTTP client
#[derive(Clone)]
pub struct GeminiClientConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GeminiClientConfig {
    pub fn from_ai_config(config: &AiConfig, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

impl std::fmt::Debug for GeminiClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// HTTP client for the Gemini `generateContent` API
///
/// One attempt per call; callers decide what a failure means.
pub struct GeminiClient {
    http_client: ReqwestClient,
    config: GeminiClientConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiClientConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::NotConfigured("Gemini API key is empty".to_string()));
        }

        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| LlmError::NotConfigured(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn network_error(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            return LlmError::Timeout(self.config.timeout_secs);
        }
        // Request URLs carry the key as a query parameter
        LlmError::Network(scrub_secrets(&err.without_url().to_string()))
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip(self, prompt), fields(model = %self.config.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateContentRequest::from_prompt(prompt);

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.network_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            let message = scrub_secrets(&message);
            debug!(status = status.as_u16(), %message, "Gemini API returned an error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        let text = parsed.text().ok_or(LlmError::EmptyResponse)?;
        debug!(response_len = text.len(), "Gemini response received");
        Ok(text)
    }
}
