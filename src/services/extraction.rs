//! Batch OCR extraction over a bounded worker pool.
//!
//! Every document runs on the blocking thread pool; a semaphore caps how many
//! are in flight. One document failing never aborts the batch.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info, warn};

use crate::config::TestLimit;
use crate::models::OcrResult;
use crate::ocr::{DocumentExtractor, ExtractionError};
use crate::utils::display_name;

/// Events emitted during batch extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionEvent {
    /// Extraction started for `total` documents (after the test limit)
    Started { total: usize },
    /// A worker picked up a document
    DocumentStarted { file: String },
    /// Text extracted
    DocumentCompleted {
        file: String,
        page_count: u32,
        confidence: f64,
    },
    /// Document had no recognizable text
    DocumentSkipped { file: String },
    /// Extraction failed
    DocumentFailed { file: String, error: String },
    /// All documents finished
    Complete {
        succeeded: usize,
        skipped: usize,
        failed: usize,
    },
}

enum Outcome {
    Extracted(OcrResult),
    Skipped,
    Failed,
}

/// Runs a [`DocumentExtractor`] over a file set.
pub struct ExtractionCoordinator {
    extractor: Arc<dyn DocumentExtractor>,
    max_workers: usize,
    test_limit: Option<TestLimit>,
}

impl ExtractionCoordinator {
    pub fn new(extractor: Arc<dyn DocumentExtractor>, max_workers: usize) -> Self {
        Self {
            extractor,
            max_workers: max_workers.max(1),
            test_limit: None,
        }
    }

    pub fn with_test_limit(mut self, test_limit: Option<TestLimit>) -> Self {
        self.test_limit = test_limit;
        self
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Keep only the first N paths when a valid test limit is configured.
    ///
    /// An unusable limit is logged and ignored.
    pub fn apply_test_limit(&self, mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
        let Some(limit) = &self.test_limit else {
            return paths;
        };

        match limit.resolve() {
            Ok(n) => {
                if n < paths.len() {
                    info!("Test mode: processing first {} of {} files", n, paths.len());
                    paths.truncate(n);
                }
            }
            Err(reason) => {
                warn!("Ignoring test_limit: {}; processing all files", reason);
            }
        }
        paths
    }

    /// Extract text from every path, dropping failed and empty documents.
    ///
    /// Results come back in input order, minus the dropped documents.
    pub async fn extract_all(
        &self,
        paths: Vec<PathBuf>,
        event_tx: Option<mpsc::Sender<ExtractionEvent>>,
    ) -> Vec<OcrResult> {
        let paths = self.apply_test_limit(paths);
        emit(&event_tx, ExtractionEvent::Started { total: paths.len() }).await;

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut handles = Vec::with_capacity(paths.len());

        for path in paths {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!("Worker pool closed before {} was queued: {}", path.display(), e);
                    break;
                }
            };

            let extractor = self.extractor.clone();
            let event_tx = event_tx.clone();
            handles.push(tokio::spawn(async move {
                let file = display_name(&path);
                emit(&event_tx, ExtractionEvent::DocumentStarted { file: file.clone() }).await;

                let result = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    extractor.extract(&path)
                })
                .await
                .unwrap_or_else(|e| {
                    Err(ExtractionError::Worker {
                        file: file.clone(),
                        message: e.to_string(),
                    })
                });

                settle(&file, result, &event_tx).await
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        let (mut skipped, mut failed) = (0, 0);
        for handle in handles {
            match handle.await {
                Ok(Outcome::Extracted(result)) => results.push(result),
                Ok(Outcome::Skipped) => skipped += 1,
                Ok(Outcome::Failed) => failed += 1,
                Err(e) => {
                    error!("Extraction task aborted: {}", e);
                    failed += 1;
                }
            }
        }

        info!(
            "Extraction finished: {} extracted, {} without text, {} failed",
            results.len(),
            skipped,
            failed
        );
        emit(
            &event_tx,
            ExtractionEvent::Complete {
                succeeded: results.len(),
                skipped,
                failed,
            },
        )
        .await;

        results
    }
}

/// Log one document's outcome and report it as an event.
async fn settle(
    file: &str,
    result: Result<OcrResult, ExtractionError>,
    event_tx: &Option<mpsc::Sender<ExtractionEvent>>,
) -> Outcome {
    match result {
        Ok(ocr) if ocr.has_text() => {
            info!(
                "Extracted {} ({} pages, confidence {:.2})",
                file, ocr.page_count, ocr.confidence
            );
            emit(
                event_tx,
                ExtractionEvent::DocumentCompleted {
                    file: file.to_string(),
                    page_count: ocr.page_count,
                    confidence: ocr.confidence,
                },
            )
            .await;
            Outcome::Extracted(ocr)
        }
        Ok(ocr) => {
            warn!("No text extracted from {} ({} pages)", file, ocr.page_count);
            emit(
                event_tx,
                ExtractionEvent::DocumentSkipped {
                    file: file.to_string(),
                },
            )
            .await;
            Outcome::Skipped
        }
        Err(e) => {
            error!("Error processing {}: {}", file, e);
            emit(
                event_tx,
                ExtractionEvent::DocumentFailed {
                    file: file.to_string(),
                    error: e.to_string(),
                },
            )
            .await;
            Outcome::Failed
        }
    }
}

async fn emit(event_tx: &Option<mpsc::Sender<ExtractionEvent>>, event: ExtractionEvent) {
    if let Some(tx) = event_tx {
        let _ = tx.send(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExtractionMethod;
    use crate::ocr::OcrError;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Succeeds for every path except those named in `fail`, `blank` or `panic_on`.
    #[derive(Default)]
    struct MockExtractor {
        fail: Vec<&'static str>,
        panic_on: Vec<&'static str>,
        blank: Vec<&'static str>,
        seen: Mutex<Vec<PathBuf>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        delay: Option<Duration>,
    }

    impl DocumentExtractor for MockExtractor {
        fn extract(&self, path: &Path) -> Result<OcrResult, ExtractionError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            self.seen.lock().unwrap().push(path.to_path_buf());
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let file = display_name(path);
            if self.panic_on.iter().any(|f| *f == file) {
                panic!("tesseract crashed on {}", file);
            }
            if self.fail.iter().any(|f| *f == file) {
                return Err(ExtractionError::Document {
                    file,
                    source: OcrError::OcrFailed("corrupt PDF".to_string()),
                });
            }
            let text = if self.blank.iter().any(|f| *f == file) {
                String::new()
            } else {
                format!("Page 1:\ntext of {}", file)
            };
            Ok(OcrResult {
                method: ExtractionMethod::Tesseract,
                file_name: file,
                text,
                page_count: 1,
                confidence: 0.9,
            })
        }
    }

    fn paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("doc{}.pdf", i))).collect()
    }

    fn coordinator(extractor: Arc<MockExtractor>, workers: usize) -> ExtractionCoordinator {
        ExtractionCoordinator::new(extractor, workers)
    }

    #[tokio::test]
    async fn test_failed_document_is_dropped() {
        let extractor = Arc::new(MockExtractor {
            fail: vec!["doc3.pdf"],
            ..Default::default()
        });
        let results = coordinator(extractor, 3).extract_all(paths(6), None).await;

        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r.file_name != "doc3.pdf"));
    }

    #[tokio::test]
    async fn test_empty_text_is_skipped_with_event() {
        let extractor = Arc::new(MockExtractor {
            blank: vec!["doc1.pdf"],
            fail: vec!["doc2.pdf"],
            ..Default::default()
        });
        let (tx, mut rx) = mpsc::channel(64);
        let results = coordinator(extractor, 2)
            .extract_all(paths(4), Some(tx))
            .await;
        assert_eq!(results.len(), 2);

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.first(), Some(&ExtractionEvent::Started { total: 4 }));
        assert_eq!(
            events.last(),
            Some(&ExtractionEvent::Complete {
                succeeded: 2,
                skipped: 1,
                failed: 1
            })
        );
        assert!(events.contains(&ExtractionEvent::DocumentSkipped {
            file: "doc1.pdf".to_string()
        }));
        assert!(events
            .iter()
            .any(|e| matches!(e, ExtractionEvent::DocumentFailed { file, .. } if file == "doc2.pdf")));
    }

    #[tokio::test]
    async fn test_panicking_worker_is_counted_as_failed() {
        let extractor = Arc::new(MockExtractor {
            panic_on: vec!["doc1.pdf"],
            ..Default::default()
        });
        let (tx, mut rx) = mpsc::channel(64);
        let results = coordinator(extractor, 2)
            .extract_all(paths(3), Some(tx))
            .await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.file_name != "doc1.pdf"));

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events.last(),
            Some(&ExtractionEvent::Complete {
                succeeded: 2,
                skipped: 0,
                failed: 1
            })
        );
        assert!(events
            .iter()
            .any(|e| matches!(e, ExtractionEvent::DocumentFailed { file, .. } if file == "doc1.pdf")));
    }

    #[tokio::test]
    async fn test_limit_takes_first_n() {
        let extractor = Arc::new(MockExtractor::default());
        let results = coordinator(extractor.clone(), 4)
            .with_test_limit(Some(TestLimit::Number(2)))
            .extract_all(paths(10), None)
            .await;

        assert_eq!(results.len(), 2);
        let mut seen = extractor.seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, paths(2));
    }

    #[tokio::test]
    async fn test_invalid_limit_processes_everything() {
        for limit in [TestLimit::Number(0), TestLimit::Text("abc".to_string())] {
            let extractor = Arc::new(MockExtractor::default());
            let results = coordinator(extractor, 4)
                .with_test_limit(Some(limit))
                .extract_all(paths(10), None)
                .await;
            assert_eq!(results.len(), 10);
        }
    }

    #[test]
    fn test_apply_test_limit_larger_than_list() {
        let coordinator = coordinator(Arc::new(MockExtractor::default()), 1)
            .with_test_limit(Some(TestLimit::Text("50".to_string())));
        assert_eq!(coordinator.apply_test_limit(paths(3)).len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_bounded_by_max_workers() {
        let extractor = Arc::new(MockExtractor {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        });
        let results = coordinator(extractor.clone(), 2)
            .extract_all(paths(8), None)
            .await;

        assert_eq!(results.len(), 8);
        let peak = extractor.peak.load(Ordering::SeqCst);
        assert!(peak <= 2, "peak concurrency {} exceeded 2", peak);
        assert!(peak >= 1);
    }

    #[test]
    fn test_zero_workers_clamped() {
        let coordinator = coordinator(Arc::new(MockExtractor::default()), 0);
        assert_eq!(coordinator.max_workers(), 1);
    }
}
