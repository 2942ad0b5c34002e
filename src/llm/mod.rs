//! LLM integration for document summarization.
//!
//! Uses a local LLM (via Ollama) to summarize extracted document text.

mod client;

pub use client::{
    GenerateOptions, GenerateRequest, LlmBackend, LlmConfig, LlmError, OllamaClient,
    DEFAULT_SUMMARY_PROMPT,
};
