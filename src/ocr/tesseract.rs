//! Tesseract OCR backend implementation.
//!
//! Uses Tesseract OCR via command-line, asking for TSV output so every word
//! comes back with its confidence.

use std::process::Command;

use image::GrayImage;
use tempfile::TempDir;

use super::backend::{OcrError, RecognizedToken, TextRecognizer};
use super::model_utils::{check_binary, spawn_error, TESSERACT_NOT_FOUND};

/// Tesseract OCR recognizer.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    language: String,
}

impl TesseractRecognizer {
    /// Create a recognizer for a Tesseract language code (e.g. "eng", "spa").
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new("eng")
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn is_available(&self) -> bool {
        check_binary("tesseract")
    }

    fn availability_hint(&self) -> String {
        if !check_binary("tesseract") {
            "Tesseract not installed. Install with: apt install tesseract-ocr".to_string()
        } else {
            "Tesseract is available".to_string()
        }
    }

    fn recognize(&self, image: &GrayImage) -> Result<Vec<RecognizedToken>, OcrError> {
        let temp_dir = TempDir::new()?;
        let image_path = temp_dir.path().join("page.png");
        image.save(&image_path)?;

        let output = Command::new("tesseract")
            .arg(&image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .arg("tsv")
            .output()
            .map_err(|e| spawn_error(e, TESSERACT_NOT_FOUND))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::OcrFailed(format!(
                "tesseract failed: {}",
                stderr.trim()
            )));
        }

        parse_tsv(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse Tesseract TSV output into tokens.
///
/// Every data row is returned, including layout rows (conf `-1`, no text);
/// filtering is left to the caller. Fractional confidences are truncated.
pub fn parse_tsv(tsv: &str) -> Result<Vec<RecognizedToken>, OcrError> {
    let mut lines = tsv.lines();
    let header = lines
        .next()
        .ok_or_else(|| OcrError::OcrFailed("empty tesseract TSV output".to_string()))?;

    let columns: Vec<&str> = header.split('\t').collect();
    let column = |name: &str| {
        columns
            .iter()
            .position(|c| c.trim() == name)
            .ok_or_else(|| OcrError::OcrFailed(format!("TSV output has no '{}' column", name)))
    };
    let conf_idx = column("conf")?;
    let text_idx = column("text")?;

    let mut tokens = Vec::new();
    for line in lines.filter(|l| !l.trim().is_empty()) {
        let fields: Vec<&str> = line.split('\t').collect();
        let Some(conf) = fields.get(conf_idx) else {
            continue;
        };
        let confidence = conf
            .trim()
            .parse::<f64>()
            .map_err(|_| OcrError::OcrFailed(format!("invalid confidence value: {}", conf)))?;
        let text = fields.get(text_idx).copied().unwrap_or("");
        tokens.push(RecognizedToken::new(text, confidence.trunc() as i32));
    }

    Ok(tokens)
}
