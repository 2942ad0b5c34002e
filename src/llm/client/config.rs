//! LLM client configuration.

use serde::{Deserialize, Serialize};

use super::prompts::DEFAULT_SUMMARY_PROMPT;

/// Configuration for the Ollama backend (the `ollama` config section).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model to use for summarization
    pub model: String,
    /// Temperature for generation (0.0 - 2.0)
    pub temperature: f32,
    /// Top-k sampling cutoff
    pub top_k: u32,
    /// Nucleus sampling cutoff (0.0 - 1.0)
    pub top_p: f32,
    /// Response format passed through to the model ("json" or empty)
    #[serde(default, alias = "response_format")]
    pub format: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Custom prompt for summary generation (uses {content} placeholder)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_prompt: Option<String>,
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

impl LlmConfig {
    /// Config for `model` with the endpoint and sampling defaults.
    pub fn new(model: &str) -> Self {
        Self {
            endpoint: default_endpoint(),
            model: model.to_string(),
            temperature: 0.3,
            top_k: 40,
            top_p: 0.9,
            format: String::new(),
            timeout_secs: default_timeout_secs(),
            summary_prompt: None,
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `OLLAMA_HOST`: API endpoint, with or without scheme
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = std::env::var("OLLAMA_HOST") {
            let host = host.trim().trim_end_matches('/');
            if !host.is_empty() {
                self.endpoint = if host.starts_with("http://") || host.starts_with("https://") {
                    host.to_string()
                } else {
                    format!("http://{}", host)
                };
            }
        }
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// Check sampling parameter ranges.
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Ollama model cannot be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 2.0".to_string());
        }
        if self.top_k < 1 {
            return Err("Top K must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.top_p) {
            return Err("Top P must be between 0.0 and 1.0".to_string());
        }
        Ok(())
    }

    /// Whether structured JSON output was requested.
    pub fn wants_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    /// Get the summary prompt, using custom or default.
    pub fn get_summary_prompt(&self) -> &str {
        self.summary_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SUMMARY_PROMPT)
    }
}
