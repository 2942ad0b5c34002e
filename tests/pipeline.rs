//! End-to-end pipeline run with mock OCR and LLM backends.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::mpsc;

use scansum::config::AppConfig;
use scansum::llm::{GenerateRequest, LlmBackend, LlmError};
use scansum::models::{ExtractionMethod, OcrResult, PROCESSING_ERROR_SUMMARY};
use scansum::ocr::{DocumentExtractor, ExtractionError, OcrError};
use scansum::services::{ExtractionEvent, Pipeline, Summarizer};

/// Treats each "PDF" as a one-page document whose text is the file content.
struct FileTextExtractor;

impl DocumentExtractor for FileTextExtractor {
    fn extract(&self, path: &Path) -> Result<OcrResult, ExtractionError> {
        let file = path.file_name().unwrap().to_string_lossy().into_owned();
        let content = std::fs::read_to_string(path).map_err(|e| ExtractionError::Document {
            file: file.clone(),
            source: OcrError::Io(e),
        })?;
        if content.starts_with("corrupt") {
            return Err(ExtractionError::Document {
                file,
                source: OcrError::OcrFailed("pdftoppm failed to convert PDF".to_string()),
            });
        }
        let page = vec![content.trim().to_string()];
        let confidences = if content.trim().is_empty() { vec![] } else { vec![90] };
        Ok(OcrResult::from_pages(
            ExtractionMethod::Tesseract,
            file,
            &page,
            &confidences,
        ))
    }
}

#[derive(Default)]
struct EchoBackend {
    calls: AtomicUsize,
}

#[async_trait]
impl LlmBackend for EchoBackend {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if request.prompt.contains("model-crash") {
            return Err(LlmError::Api("HTTP 500".to_string()));
        }
        let last = request.prompt.lines().last().unwrap_or_default();
        Ok(format!("<think>\nreading\n</think>\nSummary: {}", last))
    }
}

fn config(input: &Path, output: &Path, test_limit: &str) -> AppConfig {
    let yaml = format!(
        r#"
file_processing:
  input_folder: {input}
  output_file: {output}
  supported_formats: [pdf]
  max_concurrent_tasks: 2
  test_limit: {test_limit}
ollama:
  model: llama3
  temperature: 0.3
  top_k: 40
  top_p: 0.9
  summary_prompt: "Summarize:\n{{content}}"
extraction:
  required_fields: [summary]
logging:
  level: INFO
  format: full
timezone:
  name: America/Argentina/Buenos_Aires
"#,
        input = input.display(),
        output = output.display(),
        test_limit = test_limit,
    );
    let config = AppConfig::parse(&yaml, "yaml").unwrap();
    config.validate().unwrap();
    config
}

fn write_inputs(dir: &Path) {
    let nested = dir.join("2023");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(dir.join("res-001.pdf"), "Approves the budget").unwrap();
    std::fs::write(dir.join("res-002.PDF"), "model-crash").unwrap();
    std::fs::write(dir.join("res-003.pdf"), "corrupt").unwrap();
    std::fs::write(dir.join("res-004.pdf"), "   ").unwrap();
    std::fs::write(nested.join("res-005.pdf"), "Names a director").unwrap();
    std::fs::write(dir.join("notes.txt"), "not a document").unwrap();
}

#[tokio::test]
async fn test_full_run_writes_report() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("dataset");
    let output = temp.path().join("out").join("dataset.json");
    write_inputs(&input);

    let config = config(&input, &output, "null");
    let backend = Arc::new(EchoBackend::default());
    let summarizer = Summarizer::new(backend.clone(), config.ollama.clone());
    let pipeline = Pipeline::new(&config, Arc::new(FileTextExtractor), Arc::new(summarizer)).unwrap();

    let (tx, mut rx) = mpsc::channel(64);
    let summary = pipeline.run(Some(tx)).await.unwrap();

    assert_eq!(summary.discovered, 5);
    assert_eq!(summary.extracted, 3);
    assert_eq!(summary.summarized, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 3);

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(events.first(), Some(&ExtractionEvent::Started { total: 5 }));
    assert_eq!(
        events.last(),
        Some(&ExtractionEvent::Complete {
            succeeded: 3,
            skipped: 1,
            failed: 1
        })
    );

    let raw = std::fs::read_to_string(&output).unwrap();
    assert!(raw.starts_with("[\n    {"));
    let report: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entries = report.as_array().unwrap();
    assert_eq!(entries.len(), 3);

    let by_file = |name: &str| {
        entries
            .iter()
            .find(|e| e["source_file"] == name)
            .unwrap_or_else(|| panic!("{} missing from report", name))
    };

    let ok = by_file("res-001.pdf");
    assert!(ok["error"].is_null());
    assert_eq!(ok["summary"], "Summary: Approves the budget");
    assert_eq!(ok["ocr_confidence"], 0.9);
    assert!(ok["processed_at"].as_str().unwrap().ends_with("-03:00"));

    assert_eq!(by_file("res-005.pdf")["summary"], "Summary: Names a director");

    let failed = by_file("res-002.PDF");
    assert_eq!(failed["summary"], PROCESSING_ERROR_SUMMARY);
    assert!(failed["error"].as_str().unwrap().contains("HTTP 500"));

    assert!(entries.iter().all(|e| e["source_file"] != "res-003.pdf"));
    assert!(entries.iter().all(|e| e["source_file"] != "res-004.pdf"));
}

#[tokio::test]
async fn test_limit_and_overwrite() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("dataset");
    let output = temp.path().join("dataset.json");
    write_inputs(&input);
    std::fs::write(&output, "stale report from a previous run").unwrap();

    let config = config(&input, &output, "1");
    let summarizer = Summarizer::new(Arc::new(EchoBackend::default()), config.ollama.clone());
    let pipeline = Pipeline::new(&config, Arc::new(FileTextExtractor), Arc::new(summarizer)).unwrap();

    let summary = pipeline.run(None).await.unwrap();
    assert_eq!(summary.discovered, 5);
    assert_eq!(summary.extracted, 1);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let entries = report.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    // Sorted discovery order puts the nested folder first
    assert_eq!(entries[0]["source_file"], "res-005.pdf");
}

#[tokio::test]
async fn test_missing_input_folder_fails() {
    let temp = TempDir::new().unwrap();
    let config = config(&temp.path().join("absent"), &temp.path().join("out.json"), "null");
    let summarizer = Summarizer::new(Arc::new(EchoBackend::default()), config.ollama.clone());
    let pipeline = Pipeline::new(&config, Arc::new(FileTextExtractor), Arc::new(summarizer)).unwrap();

    assert!(pipeline.run(None).await.is_err());
    assert!(!temp.path().join("out.json").exists());
}
