//! Document discovery on the local filesystem.

use std::path::{Path, PathBuf};

/// Base name of a path for logs and reports, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Whether `path` ends in `ext` (case-insensitive, leading dot optional).
pub fn has_extension(path: &Path, ext: &str) -> bool {
    let wanted = ext.trim().trim_start_matches('.');
    !wanted.is_empty()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case(wanted))
            .unwrap_or(false)
}

/// Recursively collect files under `root` whose extension is in `formats`.
///
/// Directory traversal order is filesystem-dependent; callers that need a
/// stable order should sort.
pub fn find_files(root: &Path, formats: &[String]) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if formats.iter().any(|ext| has_extension(&path, ext)) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

/// Number of `files` per configured extension, in `formats` order.
pub fn count_by_extension(files: &[PathBuf], formats: &[String]) -> Vec<(String, usize)> {
    formats
        .iter()
        .map(|ext| {
            let count = files.iter().filter(|f| has_extension(f, ext)).count();
            (ext.trim().trim_start_matches('.').to_lowercase(), count)
        })
        .collect()
}
