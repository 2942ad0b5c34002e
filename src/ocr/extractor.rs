//! Document-level OCR: rasterize, preprocess and recognize every page.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use super::backend::{OcrError, PageRasterizer, TextRecognizer};
use super::page::extract_page_text;
use super::pdf_utils::PdftoppmRasterizer;
use super::preprocess::preprocess_page;
use super::tesseract::TesseractRecognizer;
use crate::config::OcrSettings;
use crate::models::{ExtractionMethod, OcrResult};
use crate::utils::display_name;

/// Errors that can occur while extracting one document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("OCR extraction failed for {file}: {source}")]
    Document {
        file: String,
        #[source]
        source: OcrError,
    },

    #[error("OCR worker for {file} did not complete: {message}")]
    Worker { file: String, message: String },
}

impl ExtractionError {
    /// File name of the document that failed.
    pub fn file(&self) -> &str {
        match self {
            ExtractionError::Document { file, .. } | ExtractionError::Worker { file, .. } => file,
        }
    }
}

/// Anything that turns one document into an [`OcrResult`].
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<OcrResult, ExtractionError>;
}

/// OCR engine for scanned PDFs.
///
/// Pages of one document are processed sequentially; run several engines'
/// `extract` calls in parallel to process documents concurrently.
pub struct DocumentOcrEngine {
    rasterizer: Box<dyn PageRasterizer>,
    recognizer: Box<dyn TextRecognizer>,
}

impl DocumentOcrEngine {
    pub fn new(rasterizer: Box<dyn PageRasterizer>, recognizer: Box<dyn TextRecognizer>) -> Self {
        Self {
            rasterizer,
            recognizer,
        }
    }

    /// pdftoppm + Tesseract engine from config.
    pub fn tesseract(settings: &OcrSettings) -> Self {
        Self::new(
            Box::new(PdftoppmRasterizer::new(settings.zoom_factor)),
            Box::new(TesseractRecognizer::new(&settings.language)),
        )
    }

    pub fn recognizer(&self) -> &dyn TextRecognizer {
        self.recognizer.as_ref()
    }

    /// Per-page texts (blank pages kept as empty strings) and pooled confidences.
    fn extract_pages(&self, path: &Path) -> Result<(Vec<String>, Vec<i32>), OcrError> {
        let pages = self.rasterizer.rasterize(path)?;

        let mut page_texts = Vec::with_capacity(pages.len());
        let mut confidences = Vec::new();

        for (i, page) in pages.iter().enumerate() {
            let binary = preprocess_page(page)?;
            let page_text = extract_page_text(self.recognizer.as_ref(), &binary)?;
            debug!(
                "Page {} of {}: {} tokens kept",
                i + 1,
                path.display(),
                page_text.confidences.len()
            );
            confidences.extend_from_slice(&page_text.confidences);
            page_texts.push(page_text.text);
        }

        Ok((page_texts, confidences))
    }
}

impl DocumentExtractor for DocumentOcrEngine {
    fn extract(&self, path: &Path) -> Result<OcrResult, ExtractionError> {
        let file = display_name(path);
        let (page_texts, confidences) =
            self.extract_pages(path)
                .map_err(|source| ExtractionError::Document {
                    file: file.clone(),
                    source,
                })?;

        Ok(OcrResult::from_pages(
            ExtractionMethod::Tesseract,
            file,
            &page_texts,
            &confidences,
        ))
    }
}
