//! PDF-to-image conversion via poppler's pdftoppm.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tempfile::TempDir;

use super::backend::{OcrError, PageRasterizer};
use super::model_utils::{spawn_error, PDFTOPPM_NOT_FOUND};

/// Resolution PDF user space is defined at; a zoom of 1.0 renders at this DPI.
const PDF_BASE_DPI: f32 = 72.0;

/// Rasterizes whole documents with `pdftoppm`.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    zoom_factor: f32,
}

impl PdftoppmRasterizer {
    pub fn new(zoom_factor: f32) -> Self {
        Self { zoom_factor }
    }

    /// Render resolution for the configured zoom.
    pub fn dpi(&self) -> u32 {
        (PDF_BASE_DPI * self.zoom_factor).round().max(1.0) as u32
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl PageRasterizer for PdftoppmRasterizer {
    fn rasterize(&self, pdf_path: &Path) -> Result<Vec<DynamicImage>, OcrError> {
        let temp_dir = TempDir::new()?;
        let dpi = self.dpi().to_string();

        let output = Command::new("pdftoppm")
            .args(["-png", "-r", &dpi])
            .arg(pdf_path)
            .arg(temp_dir.path().join("page"))
            .output()
            .map_err(|e| spawn_error(e, PDFTOPPM_NOT_FOUND))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::OcrFailed(format!(
                "pdftoppm failed to convert PDF: {}",
                stderr.trim()
            )));
        }

        let images = list_page_images(temp_dir.path())?;
        if images.is_empty() {
            return Err(OcrError::OcrFailed(
                "No images generated from PDF".to_string(),
            ));
        }

        images
            .iter()
            .map(|path| image::open(path).map_err(OcrError::from))
            .collect()
    }
}

/// Find all page images generated by pdftoppm, in page order.
///
/// pdftoppm names files like page-01.png, page-02.png, etc. The padding width
/// is the same for every page of one run, so a lexical sort is page order.
pub fn list_page_images(dir: &Path) -> Result<Vec<PathBuf>, OcrError> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension().map(|ext| ext == "png").unwrap_or(false)
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with("page-"))
                    .unwrap_or(false)
        })
        .collect();

    images.sort();
    Ok(images)
}
