//! Storage helpers for the JSON report on disk.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::models::ProcessingResult;

/// Errors writing the report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error writing report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Write `results` as a UTF-8 JSON array indented with four spaces.
///
/// Parent directories are created; an existing file is overwritten.
pub fn write_report(path: &Path, results: &[ProcessingResult]) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    results.serialize(&mut serializer)?;
    buf.push(b'\n');

    std::fs::write(path, buf)?;
    Ok(())
}
