//! Document summarization through an LLM backend.

use std::sync::{Arc, LazyLock};

use futures::future::join_all;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, error};

use crate::llm::{GenerateRequest, LlmBackend, LlmConfig, LlmError, OllamaClient};

/// Returned instead of calling the model when there is nothing to summarize.
pub const NO_TEXT_SUMMARY: &str = "No text available for summarization";

/// Prefix of the summary returned when the backend call fails.
pub const SUMMARY_ERROR_PREFIX: &str = "Error generating summary: ";

static THINK_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());

static THINKING_TRANSCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Thinking.*?done thinking\.").unwrap()
});

#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error(transparent)]
    Backend(#[from] LlmError),
}

/// Turns extracted document text into a plain-text summary.
pub struct Summarizer {
    backend: Arc<dyn LlmBackend>,
    config: LlmConfig,
}

impl Summarizer {
    pub fn new(backend: Arc<dyn LlmBackend>, config: LlmConfig) -> Self {
        Self { backend, config }
    }

    /// Summarizer backed by the Ollama server in `config`.
    pub fn ollama(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = OllamaClient::new(config)?;
        Ok(Self::new(Arc::new(client), config.clone()))
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn build_prompt(&self, text: &str) -> String {
        self.config.get_summary_prompt().replace("{content}", text)
    }

    /// Summarize `text`, surfacing backend failures.
    pub async fn try_summarize(&self, text: &str) -> Result<String, SummarizationError> {
        if text.trim().is_empty() {
            return Ok(NO_TEXT_SUMMARY.to_string());
        }

        let request = GenerateRequest::from_config(&self.config, self.build_prompt(text));
        let raw = self.backend.generate(&request).await?;
        debug!("Model returned {} chars", raw.len());
        Ok(clean_reasoning(&raw))
    }

    /// Summarize `text`; a backend failure becomes an error message string.
    pub async fn summarize(&self, text: &str) -> String {
        match self.try_summarize(text).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("Summary generation failed: {}", e);
                format!("{}{}", SUMMARY_ERROR_PREFIX, e)
            }
        }
    }

    /// Summarize all texts concurrently; output order matches input order.
    pub async fn summarize_many(&self, texts: &[String]) -> Vec<String> {
        join_all(texts.iter().map(|text| self.summarize(text))).await
    }
}

/// Strip `<think>` blocks and "Thinking... done thinking." transcripts that
/// reasoning models prepend to their answer.
pub fn clean_reasoning(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if !lower.contains("thinking") && !lower.contains("<think>") {
        return raw.to_string();
    }

    let without_blocks = THINK_BLOCK.replace_all(raw, "");
    THINKING_TRANSCRIPT
        .replace_all(&without_blocks, "")
        .trim()
        .to_string()
}
