//! Per-document summarization result, the terminal report entry.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::{round2, OcrResult};

/// Summary recorded for a document whose summarization failed.
pub const PROCESSING_ERROR_SUMMARY: &str = "Error occurred during processing";

/// One entry of the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// File name of the summarized document.
    pub source_file: String,
    /// Failure description, `None` on success.
    pub error: Option<String>,
    /// Summary text, or [`PROCESSING_ERROR_SUMMARY`] on failure.
    pub summary: String,
    /// Confidence carried over from the OCR result.
    pub ocr_confidence: f64,
    /// ISO 8601 timestamp of completion in the configured timezone.
    pub processed_at: String,
    /// Wall-clock summarization time, two decimals.
    pub processing_time_seconds: f64,
}

impl ProcessingResult {
    /// Successful summarization of `ocr`.
    pub fn success<Tz: TimeZone>(
        ocr: &OcrResult,
        summary: String,
        started: &DateTime<Tz>,
        finished: &DateTime<Tz>,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            source_file: ocr.file_name.clone(),
            error: None,
            summary,
            ocr_confidence: ocr.confidence,
            processed_at: finished.to_rfc3339(),
            processing_time_seconds: elapsed_seconds(started, finished),
        }
    }

    /// Failed summarization of `ocr`.
    pub fn failure<Tz: TimeZone>(
        ocr: &OcrResult,
        error: impl Into<String>,
        started: &DateTime<Tz>,
        finished: &DateTime<Tz>,
    ) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            source_file: ocr.file_name.clone(),
            error: Some(error.into()),
            summary: PROCESSING_ERROR_SUMMARY.to_string(),
            ocr_confidence: ocr.confidence,
            processed_at: finished.to_rfc3339(),
            processing_time_seconds: elapsed_seconds(started, finished),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Results of a whole run, one entry per successfully extracted document.
pub type DatasetResults = Vec<ProcessingResult>;

fn elapsed_seconds<Tz: TimeZone>(started: &DateTime<Tz>, finished: &DateTime<Tz>) -> f64 {
    let elapsed = finished.clone().signed_duration_since(started.clone());
    let micros = elapsed.num_microseconds().unwrap_or(i64::MAX);
    round2(micros as f64 / 1_000_000.0)
}
