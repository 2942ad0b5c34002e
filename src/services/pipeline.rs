//! End-to-end run: discover, extract, summarize, save.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::extraction::{ExtractionCoordinator, ExtractionEvent};
use super::processor::DatasetProcessor;
use super::summarizer::Summarizer;
use crate::config::AppConfig;
use crate::models::DatasetResults;
use crate::ocr::{DocumentExtractor, DocumentOcrEngine};
use crate::storage::write_report;
use crate::utils::{count_by_extension, find_files};

/// Counts from one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub extracted: usize,
    pub summarized: usize,
    pub failed: usize,
}

/// The batch pipeline, wired from one [`AppConfig`].
pub struct Pipeline {
    input_folder: PathBuf,
    output_file: PathBuf,
    supported_formats: Vec<String>,
    coordinator: ExtractionCoordinator,
    processor: DatasetProcessor,
}

impl Pipeline {
    /// Build the pipeline with explicit backends.
    pub fn new(
        config: &AppConfig,
        extractor: Arc<dyn DocumentExtractor>,
        summarizer: Arc<Summarizer>,
    ) -> anyhow::Result<Self> {
        let fp = &config.file_processing;
        let coordinator = ExtractionCoordinator::new(extractor, fp.max_concurrent_tasks)
            .with_test_limit(fp.test_limit.clone());
        let processor =
            DatasetProcessor::new(summarizer, config.timezone.tz()?, config.extraction.clone());

        Ok(Self {
            input_folder: config.resolve_path(&fp.input_folder),
            output_file: config.resolve_path(&fp.output_file),
            supported_formats: fp.supported_formats.clone(),
            coordinator,
            processor,
        })
    }

    /// pdftoppm + Tesseract extraction and Ollama summarization.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let extractor = Arc::new(DocumentOcrEngine::tesseract(&config.ocr));
        let summarizer = Summarizer::ollama(&config.ollama)
            .context("Failed to create Ollama client")?;
        Self::new(config, extractor, Arc::new(summarizer))
    }

    pub fn input_folder(&self) -> &Path {
        &self.input_folder
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    /// Run every stage and write the report.
    pub async fn run(
        &self,
        event_tx: Option<mpsc::Sender<ExtractionEvent>>,
    ) -> anyhow::Result<RunSummary> {
        let mut files = find_files(&self.input_folder, &self.supported_formats).with_context(
            || format!("Failed to scan input folder {}", self.input_folder.display()),
        )?;
        files.sort();

        for (ext, count) in count_by_extension(&files, &self.supported_formats) {
            info!("Detected {} .{} files", count, ext);
        }
        if files.is_empty() {
            warn!(
                "No supported files found in {}",
                self.input_folder.display()
            );
        }
        let discovered = files.len();

        let ocr_results = self.coordinator.extract_all(files, event_tx).await;
        info!("Extracted text from {} documents", ocr_results.len());
        let extracted = ocr_results.len();

        let results = self.processor.process(ocr_results).await;
        self.save_results(&results)?;

        let failed = results.iter().filter(|r| r.is_error()).count();
        Ok(RunSummary {
            discovered,
            extracted,
            summarized: results.len() - failed,
            failed,
        })
    }

    /// Write the report, overwriting any previous run.
    pub fn save_results(&self, results: &DatasetResults) -> anyhow::Result<()> {
        match write_report(&self.output_file, results) {
            Ok(()) => {
                info!(
                    "Saved {} results to {}",
                    results.len(),
                    self.output_file.display()
                );
                Ok(())
            }
            Err(e) => {
                error!("Error saving results: {}", e);
                Err(e).with_context(|| {
                    format!("Failed to write report {}", self.output_file.display())
                })
            }
        }
    }
}
