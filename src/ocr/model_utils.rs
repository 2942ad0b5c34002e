//! Shared utilities for OCR backends.
//!
//! Provides common functionality for checking CLI tool availability and
//! mapping spawn failures onto [`OcrError`].

use super::backend::OcrError;

/// Hint shown when poppler's `pdftoppm` is missing.
pub const PDFTOPPM_NOT_FOUND: &str = "pdftoppm (install poppler-utils)";

/// Hint shown when `tesseract` is missing.
pub const TESSERACT_NOT_FOUND: &str = "tesseract (install tesseract-ocr)";

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Check if required tools are available.
pub fn check_tools() -> Vec<(String, bool)> {
    ["pdftoppm", "tesseract"]
        .iter()
        .map(|tool| (tool.to_string(), check_binary(tool)))
        .collect()
}

/// Map a spawn error, reporting a missing binary as [`OcrError::ToolNotFound`].
pub fn spawn_error(err: std::io::Error, tool_hint: &str) -> OcrError {
    if err.kind() == std::io::ErrorKind::NotFound {
        OcrError::ToolNotFound(tool_hint.to_string())
    } else {
        OcrError::Io(err)
    }
}
