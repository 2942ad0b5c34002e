//! Confidence-filtered text extraction for a single page.

use image::GrayImage;

use super::backend::{OcrError, RecognizedToken, TextRecognizer};

/// Text recognized on one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageText {
    /// Kept tokens joined with single spaces.
    pub text: String,
    /// Confidences of the kept tokens only.
    pub confidences: Vec<i32>,
}

impl PageText {
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Run `recognizer` on a preprocessed page and keep only real text tokens.
pub fn extract_page_text(
    recognizer: &dyn TextRecognizer,
    image: &GrayImage,
) -> Result<PageText, OcrError> {
    let tokens = recognizer.recognize(image)?;
    Ok(collect_tokens(&tokens))
}

/// Drop tokens with confidence <= 0 (non-text regions) or no visible text,
/// then join the rest.
pub fn collect_tokens(tokens: &[RecognizedToken]) -> PageText {
    let mut words = Vec::new();
    let mut confidences = Vec::new();

    for token in tokens.iter().filter(|t| t.confidence > 0) {
        let word = token.text.trim();
        if word.is_empty() {
            continue;
        }
        words.push(word);
        confidences.push(token.confidence);
    }

    PageText {
        text: words.join(" ").trim().to_string(),
        confidences,
    }
}
