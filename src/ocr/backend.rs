//! OCR backend abstraction.
//!
//! Splits document OCR into the two external steps it depends on:
//! - [`PageRasterizer`]: render every page of a PDF to an image
//! - [`TextRecognizer`]: detect word tokens with confidences on one image

use std::path::Path;

use image::{DynamicImage, GrayImage};
use thiserror::Error;

/// Errors from rasterization, preprocessing or recognition.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for OcrError {
    fn from(err: image::ImageError) -> Self {
        OcrError::ImageError(err.to_string())
    }
}

/// A word detected by the recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedToken {
    pub text: String,
    /// Recognition certainty on a 0-100 scale; non-positive for non-text regions.
    pub confidence: i32,
}

impl RecognizedToken {
    pub fn new(text: impl Into<String>, confidence: i32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Renders PDF pages to images.
pub trait PageRasterizer: Send + Sync {
    /// Render every page of `pdf_path`, in page order.
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>, OcrError>;
}

/// Recognizes word tokens on a preprocessed page image.
pub trait TextRecognizer: Send + Sync {
    /// Check if this recognizer's dependencies are installed.
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this recognizer available.
    fn availability_hint(&self) -> String;

    /// Detect tokens on `image`, in reading order.
    fn recognize(&self, image: &GrayImage) -> Result<Vec<RecognizedToken>, OcrError>;
}
