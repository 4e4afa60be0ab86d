//! Text to QR image
//!
//! The `qrcode` crate builds the module matrix; this module lays it out on
//! a square white canvas. The symbol plus its quiet zone is scaled by the
//! largest whole number of pixels per module that fits the requested size
//! and centered. If the symbol cannot fit at one pixel per module the
//! canvas grows to the symbol's natural size instead.

use crate::config::{EncoderConfig, MAX_SIZE};
use crate::error::{QrError, Result};
use crate::models::EncodeRequest;
use image::{GrayImage, Luma};
use qrcode::{Color, QrCode};
use tracing::{debug, warn};

const BLACK: Luma<u8> = Luma([0]);
const WHITE: Luma<u8> = Luma([255]);

/// Renders encode requests to grayscale images
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    /// Create an encoder with explicit settings
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Active settings
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode a request, or `None` if the content cannot be encoded.
    ///
    /// The failure is logged; callers only need to handle the missing image.
    pub fn encode(&self, request: &EncodeRequest) -> Option<GrayImage> {
        match self.try_encode(request) {
            Ok(img) => Some(img),
            Err(e) => {
                warn!("QR encode failed for {} bytes of input: {}", request.text().len(), e);
                None
            }
        }
    }

    /// Encode a request, returning the encoder's error on failure
    pub fn try_encode(&self, request: &EncodeRequest) -> Result<GrayImage> {
        let code = QrCode::with_error_correction_level(request.text().as_bytes(), self.config.ec_level.to_ec_level())
            .map_err(|e| QrError::Encode(e.to_string()))?;

        let img = render(&code, request.size(), self.config.quiet_zone)?;
        debug!(
            "encoded {} bytes as {}x{} modules into {}x{} px",
            request.text().len(),
            code.width(),
            code.width(),
            img.width(),
            img.height()
        );
        Ok(img)
    }
}

/// Lay the module matrix out on a `size`-wide square canvas.
///
/// The canvas never exceeds `MAX_SIZE`, whatever the quiet zone.
fn render(code: &QrCode, size: u32, quiet_zone: u32) -> Result<GrayImage> {
    let modules = code.width() as u32;
    let padded = quiet_zone
        .checked_mul(2)
        .and_then(|q| q.checked_add(modules))
        .filter(|&p| p <= MAX_SIZE)
        .ok_or_else(|| QrError::Encode(format!("quiet zone of {} modules does not fit", quiet_zone)))?;
    let output = size.max(padded);
    if output > MAX_SIZE {
        return Err(QrError::SizeTooLarge { size: output, max: MAX_SIZE });
    }
    let multiple = output / padded;
    let offset = (output - modules * multiple) / 2;

    let mut img = GrayImage::from_pixel(output, output, WHITE);
    for (i, color) in code.to_colors().into_iter().enumerate() {
        if color != Color::Dark {
            continue;
        }
        let mx = i as u32 % modules;
        let my = i as u32 / modules;
        let x0 = offset + mx * multiple;
        let y0 = offset + my * multiple;
        for y in y0..y0 + multiple {
            for x in x0..x0 + multiple {
                img.put_pixel(x, y, BLACK);
            }
        }
    }
    Ok(img)
}

/// Generate a QR image for `text` at `size` x `size` pixels with default settings.
///
/// Returns `None` for empty text or content the encoder rejects.
pub fn generate_qr_image(text: &str, size: u32) -> Option<GrayImage> {
    let request = EncodeRequest::new(text, size).ok()?;
    Encoder::default().encode(&request)
}
