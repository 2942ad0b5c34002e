//! Per-document OCR extraction result.

use serde::{Deserialize, Serialize};

use super::round2;

/// Method used to extract text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// OCR using Tesseract on preprocessed page renders.
    Tesseract,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Tesseract => "tesseract",
        }
    }
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Text and confidence extracted from one document.
///
/// Built once by [`OcrResult::from_pages`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    /// Method used for extraction.
    pub method: ExtractionMethod,
    /// Base name of the source file.
    pub file_name: String,
    /// Page-labelled text of every non-blank page.
    pub text: String,
    /// Number of rasterized pages, including pages that yielded no text.
    pub page_count: u32,
    /// Mean token confidence normalized to 0.0 - 1.0, two decimals.
    pub confidence: f64,
}

impl OcrResult {
    /// Assemble a result from the per-page texts (one entry per rasterized
    /// page, blank pages as empty strings) and the pooled token confidences.
    pub fn from_pages(
        method: ExtractionMethod,
        file_name: impl Into<String>,
        page_texts: &[String],
        confidences: &[i32],
    ) -> Self {
        Self {
            method,
            file_name: file_name.into(),
            text: format_page_texts(page_texts),
            page_count: page_texts.len() as u32,
            confidence: aggregate_confidence(confidences),
        }
    }

    /// Whether extraction produced any text at all.
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Mean of the token confidences (0-100 scale) scaled to 0.0 - 1.0 and
/// rounded to two decimals. Only tokens with a positive confidence count;
/// with none left the result is `0.0`.
pub fn aggregate_confidence(confidences: &[i32]) -> f64 {
    let kept: Vec<f64> = confidences
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| c as f64)
        .collect();

    if kept.is_empty() {
        return 0.0;
    }

    let mean = kept.iter().sum::<f64>() / kept.len() as f64;
    round2(mean / 100.0)
}

/// Join page texts into one block per non-blank page, each prefixed with its
/// 1-based page label.
pub fn format_page_texts(page_texts: &[String]) -> String {
    let mut full_text = String::new();
    for (i, text) in page_texts.iter().enumerate() {
        if !text.is_empty() {
            full_text.push_str(&format!("Page {}:\n{}\n\n", i + 1, text));
        }
    }
    full_text.trim().to_string()
}
