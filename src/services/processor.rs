//! Fans OCR results through the summarizer and builds the run report.

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use futures::future::join_all;
use tracing::{error, info, warn};

use super::summarizer::Summarizer;
use crate::config::ExtractionConfig;
use crate::models::{DatasetResults, OcrResult, ProcessingResult};

/// Summarizes every extracted document concurrently.
pub struct DatasetProcessor {
    summarizer: Arc<Summarizer>,
    timezone: Tz,
    extraction: ExtractionConfig,
}

impl DatasetProcessor {
    pub fn new(summarizer: Arc<Summarizer>, timezone: Tz, extraction: ExtractionConfig) -> Self {
        Self {
            summarizer,
            timezone,
            extraction,
        }
    }

    /// One [`ProcessingResult`] per document; a failed summary yields an error entry.
    pub async fn process(&self, ocr_results: Vec<OcrResult>) -> DatasetResults {
        info!("Summarizing {} documents", ocr_results.len());

        let handles = ocr_results.into_iter().map(|ocr| {
            let summarizer = self.summarizer.clone();
            let timezone = self.timezone;
            tokio::spawn(async move { process_one(&summarizer, timezone, ocr).await })
        });

        let mut results = Vec::new();
        for joined in join_all(handles).await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => error!("Summarization task aborted: {}", e),
            }
        }

        if self.summarizer.config().wants_json() {
            for result in results.iter().filter(|r| !r.is_error()) {
                self.check_required_fields(result);
            }
        }

        let failed = results.iter().filter(|r| r.is_error()).count();
        info!(
            "Summarized {} documents ({} failed)",
            results.len() - failed,
            failed
        );
        results
    }

    /// Warn when a JSON summary lacks any configured required field.
    fn check_required_fields(&self, result: &ProcessingResult) {
        match serde_json::from_str::<serde_json::Value>(&result.summary) {
            Ok(value) => {
                let missing = self.extraction.missing_fields(&value);
                if !missing.is_empty() {
                    warn!(
                        "Summary for {} is missing required fields: {}",
                        result.source_file,
                        missing.join(", ")
                    );
                }
            }
            Err(e) => warn!(
                "Summary for {} is not valid JSON: {}",
                result.source_file, e
            ),
        }
    }
}

async fn process_one(summarizer: &Summarizer, timezone: Tz, ocr: OcrResult) -> ProcessingResult {
    let started = Utc::now().with_timezone(&timezone);
    let outcome = summarizer.try_summarize(&ocr.text).await;
    let finished = Utc::now().with_timezone(&timezone);

    match outcome {
        Ok(summary) => ProcessingResult::success(&ocr, summary, &started, &finished),
        Err(e) => {
            error!("Error processing {}: {}", ocr.file_name, e);
            ProcessingResult::failure(&ocr, e.to_string(), &started, &finished)
        }
    }
}
