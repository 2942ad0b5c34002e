//! Service layer for the scansum pipeline.
//!
//! Batch logic lives here, separated from the CLI. Long-running stages
//! emit events for progress tracking.

mod extraction;
mod pipeline;
mod processor;
mod summarizer;

pub use extraction::{ExtractionCoordinator, ExtractionEvent};
pub use pipeline::{Pipeline, RunSummary};
pub use processor::DatasetProcessor;
pub use summarizer::{
    clean_reasoning, SummarizationError, Summarizer, NO_TEXT_SUMMARY, SUMMARY_ERROR_PREFIX,
};
