//! Camera frame types
//!
//! A `LuminanceFrame` is the only thing the decoder looks at: one byte of
//! brightness per pixel, tightly packed. Camera planes usually carry row
//! padding, so `from_plane` strips it on the way in.

use crate::utils::grayscale::{rgb_to_luminance, rgba_to_luminance};
use image::GrayImage;

/// Single-plane luminance buffer owned for one decode attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LuminanceFrame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl LuminanceFrame {
    /// Wrap a tightly packed luminance buffer.
    ///
    /// The buffer is not validated here; the decoder rejects frames whose
    /// data is shorter than `width * height`.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }

    /// Copy a strided camera plane, dropping per-row padding.
    ///
    /// Returns `None` if `row_stride < width`, the plane is too short or the
    /// dimensions overflow `usize`.
    pub fn from_plane(width: usize, height: usize, row_stride: usize, plane: &[u8]) -> Option<Self> {
        if row_stride < width {
            return None;
        }
        let area = width.checked_mul(height)?;
        if height > 0 {
            let needed = row_stride.checked_mul(height - 1)?.checked_add(width)?;
            if plane.len() < needed {
                return None;
            }
        }
        if row_stride == width {
            return Some(Self::new(width, height, plane[..area].to_vec()));
        }

        let mut data = Vec::with_capacity(area);
        for row in plane.chunks(row_stride).take(height) {
            data.extend_from_slice(&row[..width]);
        }
        Some(Self::new(width, height, data))
    }

    /// Convert packed RGB pixels to a luminance frame
    pub fn from_rgb(width: usize, height: usize, rgb: &[u8]) -> Option<Self> {
        if width.checked_mul(height).and_then(|a| a.checked_mul(3)).is_none_or(|n| rgb.len() < n) {
            return None;
        }
        Some(Self::new(width, height, rgb_to_luminance(rgb, width, height)))
    }

    /// Convert packed RGBA pixels to a luminance frame (alpha ignored)
    pub fn from_rgba(width: usize, height: usize, rgba: &[u8]) -> Option<Self> {
        if width.checked_mul(height).and_then(|a| a.checked_mul(4)).is_none_or(|n| rgba.len() < n) {
            return None;
        }
        Some(Self::new(width, height, rgba_to_luminance(rgba, width, height)))
    }

    /// Frame width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw luminance bytes, row-major
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// True when the frame has pixels and a buffer large enough to hold them
    pub fn is_valid(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.width.checked_mul(self.height).is_some_and(|area| self.data.len() >= area)
    }

    /// Luminance plane limited to `width * height` bytes.
    ///
    /// Only meaningful on a valid frame; otherwise the whole buffer is returned.
    pub(crate) fn pixels(&self) -> &[u8] {
        match self.width.checked_mul(self.height) {
            Some(area) if area <= self.data.len() => &self.data[..area],
            _ => &self.data,
        }
    }
}

impl From<GrayImage> for LuminanceFrame {
    fn from(img: GrayImage) -> Self {
        let (w, h) = img.dimensions();
        Self::new(w as usize, h as usize, img.into_raw())
    }
}

impl From<&GrayImage> for LuminanceFrame {
    fn from(img: &GrayImage) -> Self {
        let (w, h) = img.dimensions();
        Self::new(w as usize, h as usize, img.as_raw().clone())
    }
}
