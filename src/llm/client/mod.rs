//! LLM client for document summarization.
//!
//! Supports Ollama API for local LLM inference.

mod config;
mod prompts;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use config::LlmConfig;
pub use prompts::DEFAULT_SUMMARY_PROMPT;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Failed to connect to LLM service
    #[error("Connection error: {0}")]
    Connection(String),
    /// API returned an error
    #[error("API error: {0}")]
    Api(String),
    /// Failed to parse response
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Sampling options forwarded to the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

/// A single non-streaming generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    /// Output format constraint ("json"); omitted when empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub options: GenerateOptions,
}

impl GenerateRequest {
    /// Build a request for `prompt` from the configured model and sampling.
    pub fn from_config(config: &LlmConfig, prompt: String) -> Self {
        let format = Some(config.format.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        Self {
            model: config.model.clone(),
            prompt,
            format,
            options: GenerateOptions {
                temperature: config.temperature,
                top_k: config.top_k,
                top_p: config.top_p,
            },
        }
    }
}

/// Text generation backend.
///
/// Implementations are shared across concurrent summarization tasks and must
/// treat each request independently.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a completion and return the raw response text.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError>;
}

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    #[serde(flatten)]
    request: &'a GenerateRequest,
    stream: bool,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// HTTP client for an Ollama server.
pub struct OllamaClient {
    endpoint: String,
    client: Client,
}

impl OllamaClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// List available models.
    pub async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.endpoint);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LlmError::Api(format!("HTTP {}", resp.status())));
        }

        #[derive(Deserialize)]
        struct TagsResponse {
            models: Vec<ModelInfo>,
        }

        #[derive(Deserialize)]
        struct ModelInfo {
            name: String,
        }

        let tags: TagsResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[async_trait]
impl LlmBackend for OllamaClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        let body = OllamaRequest {
            request,
            stream: false,
        };

        debug!("Calling {} with {} prompt chars", request.model, request.prompt.len());
        let url = format!("{}/api/generate", self.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let ollama_resp: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(ollama_resp.response)
    }
}
