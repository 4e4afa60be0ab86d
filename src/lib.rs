//! qr_master - QR code scanning and generation toolkit
//!
//! Two flows share one stateless boundary:
//! - **Generate**: text → [`EncodeRequest`] → black/white [`image::GrayImage`]
//! - **Scan**: camera frames → [`ScanSession`] worker → [`Decoder`] →
//!   [`ResultGate`] → one notification per new value
//!
//! Symbol encoding uses the `qrcode` crate and symbol location/decoding
//! uses `rqrr`. This crate supplies the luminance handling, the two-pass
//! binarization, latest-frame-only scheduling and duplicate suppression.
//!
//! # Example
//! ```
//! use qr_master::{LuminanceFrame, decode_frame, generate_qr_image};
//!
//! let img = generate_qr_image("https://example.com", 512).unwrap();
//! let text = decode_frame(&LuminanceFrame::from(img));
//! assert_eq!(text.as_deref(), Some("https://example.com"));
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Encoder/decoder settings and environment overrides
pub mod config;
/// Logging setup
pub mod debug;
/// Frame decoding with binarization fallback
pub mod decoder;
/// Text to image encoding
pub mod encoder;
/// Error types
pub mod error;
/// Duplicate-suppression gate
pub mod gate;
/// Core data structures (frames, bit matrices, encode requests)
pub mod models;
/// Screen state models
pub mod screens;
/// Background scan worker
pub mod session;
/// Image export for sharing
pub mod share;
/// CLI and benchmark helpers
pub mod tools;
/// Luminance and binarization helpers
pub mod utils;

pub use config::{DecoderConfig, EncoderConfig, ErrorCorrection};
pub use decoder::{BinarizerStage, DecodeReport, Decoder, decode_frame};
pub use encoder::{Encoder, generate_qr_image};
pub use error::{QrError, Result};
pub use gate::ResultGate;
pub use models::{BitMatrix, EncodeRequest, LuminanceFrame};
pub use screens::{CameraControl, GeneratorScreen, Notification, ResultAction, ScannerScreen};
pub use session::{FrameAnalyzer, ScanSession, SessionStats};
pub use share::{ShareHandle, export_png};
