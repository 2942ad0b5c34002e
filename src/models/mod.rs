//! Value types passed between pipeline stages.

mod ocr_result;
mod processing;

pub use ocr_result::{aggregate_confidence, format_page_texts, ExtractionMethod, OcrResult};
pub use processing::{DatasetResults, ProcessingResult, PROCESSING_ERROR_SUMMARY};

/// Round to two decimal places, the precision used for every score and
/// duration in the report.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
