//! Error types for qr_master
//!
//! The scan and encode paths report expected absence through `Option`.
//! These errors cover the edges where a caller needs to know why:
//! request validation, explicit encode attempts, file export and a
//! closed scan session.

use std::io;
use thiserror::Error;

/// Result type alias using QrError
pub type Result<T> = std::result::Result<T, QrError>;

/// Errors surfaced by qr_master
#[derive(Debug, Error)]
pub enum QrError {
    /// Encode request with no text
    #[error("Cannot encode empty content")]
    EmptyContent,

    /// Requested image edge larger than the encoder will allocate
    #[error("Image size {size} exceeds the {max}px limit")]
    SizeTooLarge {
        /// Requested edge in pixels
        size: u32,
        /// Largest accepted edge
        max: u32,
    },

    /// The QR encoder rejected the content (e.g. data too long)
    #[error("Encode error: {0}")]
    Encode(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Image load or PNG write error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Frame offered to a session that was already stopped
    #[error("Scan session is closed")]
    SessionClosed,

    /// Logging setup failure
    #[error("{0}")]
    Other(String),
}
