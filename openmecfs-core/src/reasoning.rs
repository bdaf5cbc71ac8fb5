//! Reasoning-service client.
//!
//! Speaks the OpenAI chat-completions format, which also covers Azure,
//! Ollama, vLLM, and other compatible endpoints. The adapter returns the
//! raw response text; defensive parsing lives in [`crate::extraction`].
//! There is no automatic retry loop — a fresh call is a new attempt.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ReasoningConfig;
use crate::error::UpstreamError;

const SERVICE: &str = "reasoning";

/// A single structured-extraction request.
#[derive(Debug, Clone)]
pub struct ReasoningRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Ask the endpoint for a JSON object response where supported.
    pub json_output: bool,
}

/// Trait for reasoning providers.
#[async_trait]
pub trait ReasoningProvider: Send + Sync {
    /// Issue the request and return the raw text of the first choice.
    async fn complete(&self, request: ReasoningRequest) -> Result<String, UpstreamError>;

    fn model_name(&self) -> &str;
}

/// OpenAI-compatible reasoning provider.
pub struct OpenAiReasoningProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl OpenAiReasoningProvider {
    /// Create a provider from configuration, resolving the API key from
    /// the configured environment variable.
    pub fn from_config(config: &ReasoningConfig) -> Result<Self, UpstreamError> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| UpstreamError::Auth {
            service: SERVICE,
            message: format!("env var '{}' not set", config.api_key_env),
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::Request {
                service: SERVICE,
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://api.openai.com/v1".into()),
            api_key,
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn map_transport_error(&self, e: reqwest::Error) -> UpstreamError {
        if e.is_timeout() {
            UpstreamError::Timeout {
                service: SERVICE,
                timeout_secs: self.timeout_secs,
            }
        } else {
            UpstreamError::Request {
                service: SERVICE,
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl ReasoningProvider for OpenAiReasoningProvider {
    async fn complete(&self, request: ReasoningRequest) -> Result<String, UpstreamError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": request.user_prompt},
            ],
            "max_tokens": request.max_output_tokens,
            "temperature": request.temperature,
        });
        if request.json_output {
            body["response_format"] = json!({"type": "json_object"});
        }

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }

        let payload: Value = resp.json().await.map_err(|e| self.map_transport_error(e))?;
        let content = payload
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| UpstreamError::MalformedResponse {
                service: SERVICE,
                message: "no message content in first choice".into(),
            })?;

        Ok(content.to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// In-process provider returning queued responses, for tests.
pub struct MockReasoningProvider {
    responses: std::sync::Mutex<Vec<String>>,
}

impl MockReasoningProvider {
    pub fn new() -> Self {
        Self {
            responses: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// A provider that always returns the given text.
    pub fn with_response(text: &str) -> Self {
        let provider = Self::new();
        for _ in 0..20 {
            provider.queue_response(text);
        }
        provider
    }

    /// Queue a response for the next `complete` call (LIFO).
    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push(text.to_string());
    }
}

impl Default for MockReasoningProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReasoningProvider for MockReasoningProvider {
    async fn complete(&self, _request: ReasoningRequest) -> Result<String, UpstreamError> {
        self.responses
            .lock()
            .unwrap()
            .pop()
            .ok_or(UpstreamError::Request {
                service: SERVICE,
                message: "mock has no queued responses".into(),
            })
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Create a reasoning provider from configuration.
pub fn create_provider(
    config: &ReasoningConfig,
) -> Result<Arc<dyn ReasoningProvider>, UpstreamError> {
    Ok(Arc::new(OpenAiReasoningProvider::from_config(config)?))
}
