//! scansum - scanned PDF OCR and summarization pipeline.
//!
//! Rasterizes each page of a folder of scanned PDFs, extracts text with
//! Tesseract, scores the extraction confidence, asks a local LLM for a
//! summary and writes a JSON report per run.

// Model types use `from_str` methods that return Option<Self>,
// not Result<Self, Error> as std::str::FromStr requires.
#![allow(clippy::should_implement_trait)]

pub mod config;
pub mod llm;
pub mod models;
pub mod ocr;
pub mod services;
pub mod storage;
pub mod utils;
