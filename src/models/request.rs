use crate::config::{DEFAULT_SIZE, MAX_SIZE};
use crate::error::{QrError, Result};

/// Text to encode plus the requested square edge in pixels.
///
/// Construction fails on empty text or a size above `MAX_SIZE`, so an
/// `EncodeRequest` never reaches the encoder without content or with an
/// edge it cannot allocate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeRequest {
    text: String,
    size: u32,
}

impl EncodeRequest {
    /// Create a request for `text` rendered at `size` x `size` pixels
    pub fn new(text: impl Into<String>, size: u32) -> Result<Self> {
        let text = text.into();
        if text.is_empty() {
            return Err(QrError::EmptyContent);
        }
        if size > MAX_SIZE {
            return Err(QrError::SizeTooLarge { size, max: MAX_SIZE });
        }
        Ok(Self { text, size })
    }

    /// Create a request at the default 512px size
    pub fn with_default_size(text: impl Into<String>) -> Result<Self> {
        Self::new(text, DEFAULT_SIZE)
    }

    /// Content to encode
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Requested edge length in pixels
    pub fn size(&self) -> u32 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_rejected() {
        assert!(matches!(EncodeRequest::new("", 256), Err(QrError::EmptyContent)));
        assert!(matches!(EncodeRequest::with_default_size(String::new()), Err(QrError::EmptyContent)));
    }

    #[test]
    fn oversized_edge_is_rejected() {
        assert!(EncodeRequest::new("x", MAX_SIZE).is_ok());
        assert!(matches!(
            EncodeRequest::new("x", u32::MAX),
            Err(QrError::SizeTooLarge { size: u32::MAX, max: MAX_SIZE })
        ));
    }

    #[test]
    fn whitespace_is_content() {
        let req = EncodeRequest::with_default_size(" ").unwrap();
        assert_eq!(req.text(), " ");
        assert_eq!(req.size(), 512);
    }
}
