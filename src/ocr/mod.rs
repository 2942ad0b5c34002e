//! OCR and text extraction module.
//!
//! Extracts text from scanned PDFs using:
//! - pdftoppm (Poppler) to rasterize each page
//! - grayscale, median denoise and Otsu binarization to clean the render
//! - Tesseract OCR, keeping only tokens with a positive confidence
//!
//! [`DocumentOcrEngine`] drives the three steps for one document;
//! the batch coordinator in `services` runs it over many documents.

mod backend;
mod extractor;
mod model_utils;
mod page;
mod pdf_utils;
mod preprocess;
mod tesseract;

pub use backend::{OcrError, PageRasterizer, RecognizedToken, TextRecognizer};
pub use extractor::{DocumentExtractor, DocumentOcrEngine, ExtractionError};
pub use model_utils::{check_binary, check_tools};
pub use page::{collect_tokens, extract_page_text, PageText};
pub use pdf_utils::PdftoppmRasterizer;
pub use preprocess::{binarize, preprocess_page};
pub use tesseract::{parse_tsv, TesseractRecognizer};
