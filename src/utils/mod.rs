//! Image processing helpers for the scan path
//!
//! - Luminance extraction (RGB/RGBA to one byte per pixel)
//! - Binarization (hybrid local thresholds, global Otsu histogram)

pub mod binarization;
pub mod grayscale;
