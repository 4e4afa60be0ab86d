//! Luminance to black/white conversion
//!
//! Two strategies, tried in this order by the decoder:
//! - `hybrid_binarize`: local thresholds from 8x8 block statistics
//!   smoothed over a 5x5 block neighbourhood. Copes with uneven lighting.
//! - `global_histogram_binarize`: one Otsu threshold over the whole frame.
//!   Handles small or low-texture frames the hybrid pass gives up on.

use crate::models::BitMatrix;

const BLOCK_SIZE_POWER: usize = 3;
const BLOCK_SIZE: usize = 1 << BLOCK_SIZE_POWER;
const BLOCK_AREA_POWER: usize = BLOCK_SIZE_POWER * 2;
/// Frames smaller than 5x5 blocks skip straight to the global threshold
const MINIMUM_DIMENSION: usize = BLOCK_SIZE * 5;

/// Binarize with per-block local thresholds.
///
/// Blocks whose luminance range is at or below `min_dynamic_range` are
/// treated as flat background rather than thresholded at their mean.
/// Frames under 40px on a side fall back to the global threshold.
pub fn hybrid_binarize(gray: &[u8], width: usize, height: usize, min_dynamic_range: u8) -> BitMatrix {
    if width < MINIMUM_DIMENSION || height < MINIMUM_DIMENSION {
        return global_histogram_binarize(gray, width, height);
    }

    let sub_width = width.div_ceil(BLOCK_SIZE);
    let sub_height = height.div_ceil(BLOCK_SIZE);
    let black_points = block_black_points(gray, width, height, sub_width, sub_height, min_dynamic_range);

    let mut binary = BitMatrix::new(width, height);
    let max_x = width - BLOCK_SIZE;
    let max_y = height - BLOCK_SIZE;

    for by in 0..sub_height {
        let y_offset = (by << BLOCK_SIZE_POWER).min(max_y);
        let top = by.clamp(2, sub_height - 3);
        for bx in 0..sub_width {
            let x_offset = (bx << BLOCK_SIZE_POWER).min(max_x);
            let left = bx.clamp(2, sub_width - 3);

            let mut sum = 0u32;
            for row in &black_points[top - 2..=top + 2] {
                sum += row[left - 2..=left + 2].iter().map(|&v| v as u32).sum::<u32>();
            }
            let threshold = (sum / 25) as u8;

            for y in y_offset..y_offset + BLOCK_SIZE {
                let row = &gray[y * width..(y + 1) * width];
                for x in x_offset..x_offset + BLOCK_SIZE {
                    if row[x] <= threshold {
                        binary.set(x, y, true);
                    }
                }
            }
        }
    }

    binary
}

/// Per-block black point: the block mean, or a darker estimate for flat blocks
fn block_black_points(
    gray: &[u8],
    width: usize,
    height: usize,
    sub_width: usize,
    sub_height: usize,
    min_dynamic_range: u8,
) -> Vec<Vec<u8>> {
    let max_x = width - BLOCK_SIZE;
    let max_y = height - BLOCK_SIZE;
    let mut points = vec![vec![0u8; sub_width]; sub_height];

    for by in 0..sub_height {
        let y_offset = (by << BLOCK_SIZE_POWER).min(max_y);
        for bx in 0..sub_width {
            let x_offset = (bx << BLOCK_SIZE_POWER).min(max_x);

            let mut sum = 0u32;
            let mut min = u8::MAX;
            let mut max = u8::MIN;
            for y in y_offset..y_offset + BLOCK_SIZE {
                let start = y * width + x_offset;
                for &pixel in &gray[start..start + BLOCK_SIZE] {
                    sum += pixel as u32;
                    min = min.min(pixel);
                    max = max.max(pixel);
                }
            }

            let mut average = (sum >> BLOCK_AREA_POWER) as u8;
            if max - min <= min_dynamic_range {
                // Flat block: assume background unless neighbours say it sits inside dark modules.
                average = min / 2;
                if by > 0 && bx > 0 {
                    let neighbours = (points[by - 1][bx] as u32
                        + 2 * points[by][bx - 1] as u32
                        + points[by - 1][bx - 1] as u32)
                        / 4;
                    if (min as u32) < neighbours {
                        average = neighbours as u8;
                    }
                }
            }
            points[by][bx] = average;
        }
    }

    points
}

/// Binarize with a single Otsu threshold computed from the frame histogram.
/// Returns a BitMatrix where true = black, false = white
pub fn global_histogram_binarize(gray: &[u8], width: usize, height: usize) -> BitMatrix {
    let pixels = &gray[..width * height];
    let threshold = otsu_threshold(&histogram(pixels));
    threshold_binarize(pixels, width, height, threshold)
}

fn histogram(gray: &[u8]) -> [u32; 256] {
    let mut histogram = [0u32; 256];
    for &pixel in gray {
        histogram[pixel as usize] += 1;
    }
    histogram
}

/// Otsu's optimal threshold: maximizes between-class variance
fn otsu_threshold(histogram: &[u32; 256]) -> u8 {
    let total: u64 = histogram.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return 128;
    }
    let total_sum: u64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &c)| i as u64 * c as u64)
        .sum();

    let mut class1_pixels = 0u64;
    let mut class1_sum = 0u64;
    let mut max_variance = 0.0f64;
    let mut optimal_threshold = 128u8;

    // Class 1 holds intensities strictly below `threshold`.
    for threshold in 1..=255usize {
        class1_pixels += histogram[threshold - 1] as u64;
        class1_sum += (threshold as u64 - 1) * histogram[threshold - 1] as u64;
        let class2_pixels = total - class1_pixels;
        if class1_pixels == 0 || class2_pixels == 0 {
            continue;
        }

        let class1_mean = class1_sum as f64 / class1_pixels as f64;
        let class2_mean = (total_sum - class1_sum) as f64 / class2_pixels as f64;
        let weight1 = class1_pixels as f64 / total as f64;
        let weight2 = class2_pixels as f64 / total as f64;
        let variance = weight1 * weight2 * (class1_mean - class2_mean).powi(2);

        if variance > max_variance {
            max_variance = variance;
            optimal_threshold = threshold as u8;
        }
    }

    optimal_threshold
}

/// Simple global threshold binarization: pixels below `threshold` are black
pub fn threshold_binarize(gray: &[u8], width: usize, height: usize, threshold: u8) -> BitMatrix {
    BitMatrix::from_fn(width, height, |x, y| gray[y * width + x] < threshold)
}
