/// Luminance extraction from packed color pixels
/// Y = 0.299*R + 0.587*G + 0.114*B
/// Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8
///
/// Frames at or above `PARALLEL_MIN_PIXELS` are converted row-parallel
/// with rayon; smaller ones stay on the calling thread.
use rayon::prelude::*;

/// Coefficients for luminance conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

/// Roughly a 720p frame; below this rayon overhead dominates
const PARALLEL_MIN_PIXELS: usize = 1280 * 720;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

fn convert_rows(src: &[u8], width: usize, height: usize, channels: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 {
        return gray;
    }

    let row_bytes = width * channels;
    let fill_row = |(y, row): (usize, &mut [u8])| {
        let src_row = &src[y * row_bytes..(y + 1) * row_bytes];
        for (out, px) in row.iter_mut().zip(src_row.chunks_exact(channels)) {
            *out = luma(px[0], px[1], px[2]);
        }
    };

    if width * height >= PARALLEL_MIN_PIXELS {
        gray.par_chunks_mut(width).enumerate().for_each(fill_row);
    } else {
        gray.chunks_mut(width).enumerate().for_each(fill_row);
    }

    gray
}

/// Convert packed RGB to luminance
///
/// # Panics
/// If `rgb` holds fewer than `width * height * 3` bytes.
pub fn rgb_to_luminance(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert_rows(rgb, width, height, 3)
}

/// Convert packed RGBA to luminance (ignores alpha channel)
///
/// # Panics
/// If `rgba` holds fewer than `width * height * 4` bytes.
pub fn rgba_to_luminance(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    convert_rows(rgba, width, height, 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_luminance() {
        // Pure white
        let gray = rgb_to_luminance(&[255, 255, 255], 1, 1);
        assert!(gray[0] >= 254);

        // Pure black
        let gray = rgb_to_luminance(&[0, 0, 0], 1, 1);
        assert_eq!(gray[0], 0);

        // Pure red sits strictly between
        let gray = rgb_to_luminance(&[255, 0, 0], 1, 1);
        assert!(gray[0] > 0 && gray[0] < 255);

        // Green dominates the weighting
        let gray = rgb_to_luminance(&[0, 255, 0], 1, 1);
        assert!(gray[0] > 100);

        let img = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        assert_eq!(rgb_to_luminance(&img, 2, 2).len(), 4);
    }

    #[test]
    fn test_rgba_ignores_alpha() {
        let opaque = rgba_to_luminance(&[255, 128, 64, 255], 1, 1);
        let clear = rgba_to_luminance(&[255, 128, 64, 0], 1, 1);
        assert_eq!(opaque, clear);
    }

    #[test]
    fn parallel_path_matches_scalar() {
        let (w, h) = (1280, 720);
        let rgb: Vec<u8> = (0..w * h * 3).map(|i| (i % 251) as u8).collect();
        let gray = rgb_to_luminance(&rgb, w, h);
        let idx = 640 * w + 17;
        let px = &rgb[idx * 3..idx * 3 + 3];
        assert_eq!(gray[idx], luma(px[0], px[1], px[2]));
    }
}
