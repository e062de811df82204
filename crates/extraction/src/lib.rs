//! `procureiq-extraction` — vendor-quote document extraction.
//!
//! Converts scanned quote images/PDFs into structured line items via a
//! confidence-gated two-stage extraction: local OCR always runs; a hosted
//! vision/text model refines the result when available; a deterministic
//! regex pass is the floor when it is not. Every record moves through an
//! explicit status machine and is immutable once approved.

pub mod document;
pub mod ocr;
pub mod patterns;
pub mod pipeline;
pub mod record;
pub mod store;

pub use document::{QuoteDocument, QuoteLineItem};
pub use ocr::{OcrEngine, OcrError, OcrOutcome};
pub use patterns::extract_with_patterns;
pub use pipeline::{DocumentExtractionPipeline, ExtractionConfig};
pub use record::{ExtractionId, ExtractionMethod, ExtractionRecord, ExtractionStatus};
pub use store::ExtractionStore;
