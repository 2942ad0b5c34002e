//! Page image preprocessing for OCR.
//!
//! Grayscale, denoise, then a global Otsu threshold so Tesseract sees clean
//! black text on a white background.

use image::{DynamicImage, GrayImage};
use imageproc::contrast::otsu_level;
use imageproc::filter::median_filter;

use super::backend::OcrError;

/// Median filter radius; 1 gives a 3x3 window, enough for scanner speckle.
const DENOISE_RADIUS: u32 = 1;

/// Convert a rendered page into a binarized image tuned for OCR.
pub fn preprocess_page(page: &DynamicImage) -> Result<GrayImage, OcrError> {
    if page.width() == 0 || page.height() == 0 {
        return Err(OcrError::ImageError(format!(
            "cannot preprocess a {}x{} image",
            page.width(),
            page.height()
        )));
    }

    let gray = page.to_luma8();
    let denoised = median_filter(&gray, DENOISE_RADIUS, DENOISE_RADIUS);
    let level = otsu_level(&denoised);
    Ok(binarize(&denoised, level))
}

/// Pixels above `level` become white, the rest black.
pub fn binarize(image: &GrayImage, level: u8) -> GrayImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = if pixel.0[0] > level { 255 } else { 0 };
    }
    out
}
