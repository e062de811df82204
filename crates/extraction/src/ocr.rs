//! Local OCR port.
//!
//! The engine is synchronous, has no network dependency, and is treated as
//! always available. The production implementation wraps whatever OCR
//! runtime the host application ships.

use std::sync::Arc;

use thiserror::Error;

/// Raw OCR output.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutcome {
    pub text: String,
    /// Engine-reported confidence in `[0, 100]`.
    pub confidence: f64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("ocr failed: {0}")]
pub struct OcrError(pub String);

pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &[u8]) -> Result<OcrOutcome, OcrError>;
}

impl<E> OcrEngine for Arc<E>
where
    E: OcrEngine + ?Sized,
{
    fn recognize(&self, image: &[u8]) -> Result<OcrOutcome, OcrError> {
        (**self).recognize(image)
    }
}
