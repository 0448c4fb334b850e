//! Ollama (local) inference engine
//!
//! `/api/chat`를 non-streaming 모드로 호출합니다.
//! 일시적 실패는 `with_retry`로 재시도하고, 최종 실패는 `Error::Inference`로 변환됩니다.

use crate::engine::{GenerationOptions, InferenceEngine};
use crate::error::ProviderError;
use crate::retry::{with_retry, RetryConfig};
use async_trait::async_trait;
use localhost_foundation::config::{AgentSettings, ProviderSettings};
use localhost_foundation::{Message, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_TIMEOUT_SECS: u64 = 600; // Longer timeout for local models
const PING_TIMEOUT_SECS: u64 = 5;

/// Ollama engine for local models
pub struct OllamaEngine {
    client: Client,
    base_url: String,
    model: String,
    options: GenerationOptions,
    retry: RetryConfig,
}

impl OllamaEngine {
    /// Create a new Ollama engine with default settings
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            options: GenerationOptions::default(),
            retry: RetryConfig::default(),
        })
    }

    /// Build from the merged configuration
    pub fn from_settings(provider: &ProviderSettings, agent: &AgentSettings) -> Result<Self> {
        Ok(Self::new(&provider.base_url, &provider.model)?
            .with_timeout(Duration::from_secs(provider.timeout_secs))?
            .with_options(GenerationOptions::from_settings(agent, provider))
            .with_retry(RetryConfig::from(&provider.retry)))
    }

    /// Set custom timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(timeout)?;
        Ok(self)
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url)
    }

    /// Check if Ollama server is running
    pub async fn ping(&self) -> bool {
        self.client
            .get(self.tags_url())
            .timeout(Duration::from_secs(PING_TIMEOUT_SECS))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// List available models
    pub async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        let response = self
            .client
            .get(self.tags_url())
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_http_status(status, &body));
        }

        #[derive(Deserialize)]
        struct TagsResponse {
            models: Vec<ModelEntry>,
        }

        #[derive(Deserialize)]
        struct ModelEntry {
            name: String,
        }

        let tags: TagsResponse = response.json().await.map_err(ProviderError::from_reqwest)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    fn build_request(&self, history: &[Message]) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            messages: history.iter().map(OllamaMessage::from).collect(),
            stream: false,
            options: OllamaOptions {
                temperature: self.options.temperature,
                num_predict: self.options.max_tokens,
            },
        }
    }

    async fn chat_once(&self, request: &OllamaRequest) -> std::result::Result<String, ProviderError> {
        let response = self
            .client
            .post(self.chat_url())
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                404 => ProviderError::ModelNotFound(format!(
                    "Model '{}' not found. Run 'ollama pull {}' first.",
                    self.model, self.model
                )),
                _ => ProviderError::from_http_status(status, &body),
            });
        }

        let api_response: OllamaResponse =
            response.json().await.map_err(ProviderError::from_reqwest)?;

        debug!(
            model = %self.model,
            prompt_tokens = api_response.prompt_eval_count.unwrap_or(0),
            output_tokens = api_response.eval_count.unwrap_or(0),
            done = api_response.done,
            "ollama chat completed"
        );

        Ok(api_response.message.content)
    }
}

fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)).into())
}

#[async_trait]
impl InferenceEngine for OllamaEngine {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, history: &[Message]) -> Result<String> {
        let request = self.build_request(history);
        info!(model = %self.model, messages = history.len(), "requesting completion");

        let text = with_retry(&self.retry, "ollama chat", || self.chat_once(&request)).await?;
        Ok(text)
    }
}

// ============================================================================
// Ollama API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl From<&Message> for OllamaMessage {
    fn from(msg: &Message) -> Self {
        OllamaMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }
    }
}
