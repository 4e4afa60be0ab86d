//! Helpers shared by the `qrmaster` binary and benchmarks

use crate::decoder::{DecodeReport, Decoder};
use crate::models::{BitMatrix, LuminanceFrame};
use crate::utils::binarization::{global_histogram_binarize, hybrid_binarize};
use image::GenericImageView;
use std::env;
use std::path::Path;

fn max_dim_from_env() -> Option<u32> {
    match env::var("QR_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Load an image file as a luminance frame.
///
/// Images larger than `QR_MAX_DIM` on either side are downscaled first.
pub fn load_frame<P: AsRef<Path>>(path: P) -> Result<LuminanceFrame, image::ImageError> {
    let img = image::open(path)?;
    let img = match max_dim_from_env() {
        Some(max_dim) => {
            let (w, h) = img.dimensions();
            if w.max(h) > max_dim {
                img.resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
            } else {
                img
            }
        }
        None => img,
    };
    Ok(LuminanceFrame::from(img.to_luma8()))
}

/// Decode a single image file with default settings
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Option<DecodeReport>, image::ImageError> {
    let frame = load_frame(path)?;
    Ok(Decoder::default().decode_with_report(&frame))
}

/// Summary statistics for luminance data.
#[derive(Debug, Clone, Copy)]
pub struct GrayStats {
    /// Minimum value.
    pub min: u8,
    /// Maximum value.
    pub max: u8,
    /// Average value.
    pub avg: u8,
}

/// Summary statistics for a binary matrix.
#[derive(Debug, Clone, Copy)]
pub struct BinaryStats {
    /// Count of black pixels.
    pub black_pixels: usize,
    /// Total pixels in the matrix.
    pub total_pixels: usize,
    /// Ratio of black pixels to total pixels.
    pub black_ratio: f64,
}

/// Compute min/max/avg for luminance values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    if gray.is_empty() {
        return GrayStats { min: 0, max: 0, avg: 0 };
    }
    GrayStats {
        min,
        max,
        avg: (sum / gray.len() as u64) as u8,
    }
}

/// Compute black pixel stats for a binary matrix.
pub fn binary_stats(binary: &BitMatrix) -> BinaryStats {
    let black = binary.count_black();
    let total = binary.width() * binary.height();
    let ratio = if total == 0 {
        0.0
    } else {
        black as f64 / total as f64
    };
    BinaryStats {
        black_pixels: black,
        total_pixels: total,
        black_ratio: ratio,
    }
}

/// Both binarization passes for a frame, in decoder order.
///
/// Returns `None` for a malformed frame.
pub fn binarize_both(frame: &LuminanceFrame, min_dynamic_range: u8) -> Option<(BitMatrix, BitMatrix)> {
    if !frame.is_valid() {
        return None;
    }
    let (w, h) = (frame.width(), frame.height());
    let gray = &frame.data()[..w * h];
    Some((
        hybrid_binarize(gray, w, h, min_dynamic_range),
        global_histogram_binarize(gray, w, h),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::generate_qr_image;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_png_path() -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX epoch")
            .as_nanos();
        let sequence = TEMP_FILE_COUNTER.fetch_add(1, Ordering::Relaxed);
        path.push(format!("qr_master_tools_{nanos}_{sequence}.png"));
        path
    }

    #[test]
    fn decode_file_round_trips_generated_png() {
        let path = temp_png_path();
        generate_qr_image("from disk", 256).unwrap().save(&path).unwrap();
        let report = decode_file(&path).unwrap().unwrap();
        assert_eq!(report.text, "from disk");
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(decode_file("/definitely/not/here.png").is_err());
    }

    #[test]
    fn stats_on_simple_data() {
        let stats = grayscale_stats(&[10, 20, 30]);
        assert_eq!((stats.min, stats.max, stats.avg), (10, 30, 20));
        assert_eq!(grayscale_stats(&[]).avg, 0);

        let matrix = BitMatrix::from_fn(4, 4, |x, _| x < 1);
        let b = binary_stats(&matrix);
        assert_eq!(b.black_pixels, 4);
        assert_eq!(b.total_pixels, 16);
        assert!((b.black_ratio - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn binarize_both_rejects_malformed() {
        assert!(binarize_both(&LuminanceFrame::new(10, 10, vec![0; 5]), 24).is_none());
        let (hybrid, global) = binarize_both(&LuminanceFrame::new(64, 64, vec![255; 64 * 64]), 24).unwrap();
        assert_eq!(hybrid.count_black() + global.count_black(), 0);
    }
}
