//! The `run` command: the full OCR and summarization pipeline.

use std::path::PathBuf;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use scansum::config::{AppConfig, TestLimit};
use scansum::services::{ExtractionEvent, Pipeline};

pub async fn cmd_run(
    mut config: AppConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    limit: Option<i64>,
) -> anyhow::Result<()> {
    // Command-line paths are relative to the working directory, not the config file
    if let Some(input) = input {
        config.file_processing.input_folder = std::path::absolute(input)?;
    }
    if let Some(output) = output {
        config.file_processing.output_file = std::path::absolute(output)?;
    }
    if let Some(limit) = limit {
        config.file_processing.test_limit = Some(TestLimit::Number(limit));
    }

    let pipeline = Pipeline::from_config(&config)?;
    println!(
        "{} Processing documents in {} with {}",
        style("→").cyan(),
        pipeline.input_folder().display(),
        style(&config.ollama.model).bold()
    );

    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")?
        .progress_chars("█▓░");

    let (event_tx, event_rx) = mpsc::channel::<ExtractionEvent>(100);
    let event_handler = tokio::spawn(render_events(event_rx, bar_style));

    let summary = pipeline.run(Some(event_tx)).await;
    let _ = event_handler.await;
    let summary = summary?;

    if summary.discovered == 0 {
        println!("{} No documents to process", style("!").yellow());
    }
    println!(
        "{} Summarized {} documents, report written to {}",
        style("✓").green(),
        summary.summarized,
        pipeline.output_file().display()
    );
    if summary.failed > 0 {
        println!(
            "  {} {} summaries failed",
            style("!").yellow(),
            summary.failed
        );
    }

    Ok(())
}

/// Draw extraction progress until the coordinator drops its sender.
async fn render_events(mut event_rx: mpsc::Receiver<ExtractionEvent>, bar_style: ProgressStyle) {
    let mut progress: Option<ProgressBar> = None;

    while let Some(event) = event_rx.recv().await {
        match event {
            ExtractionEvent::Started { total } => {
                println!(
                    "{} Extracting text from {} documents",
                    style("→").cyan(),
                    total
                );
                let bar = ProgressBar::new(total as u64);
                bar.set_style(bar_style.clone());
                bar.set_message("Running OCR...");
                progress = Some(bar);
            }
            ExtractionEvent::DocumentStarted { file } => {
                if let Some(ref bar) = progress {
                    bar.set_message(file);
                }
            }
            ExtractionEvent::DocumentCompleted { .. } | ExtractionEvent::DocumentSkipped { .. } => {
                if let Some(ref bar) = progress {
                    bar.inc(1);
                }
            }
            ExtractionEvent::DocumentFailed { file, error } => {
                if let Some(ref bar) = progress {
                    bar.println(format!("  {} {}: {}", style("✗").red(), file, error));
                    bar.inc(1);
                }
            }
            ExtractionEvent::Complete {
                succeeded,
                skipped,
                failed,
            } => {
                if let Some(bar) = progress.take() {
                    bar.finish_and_clear();
                }
                println!(
                    "{} Extraction complete: {} documents with text",
                    style("✓").green(),
                    succeeded
                );
                if skipped > 0 {
                    println!(
                        "  {} {} documents had no recognizable text",
                        style("!").yellow(),
                        skipped
                    );
                }
                if failed > 0 {
                    println!("  {} {} documents failed", style("!").yellow(), failed);
                }
            }
        }
    }
}
