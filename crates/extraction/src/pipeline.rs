//! The extraction pipeline.
//!
//! Route selection per document:
//! 1. Local OCR always runs first and yields `(raw_text, confidence)`.
//! 2. Low-confidence scans (`< vision_threshold`) go to the vision model
//!    when the capability is available; this is the primary path for bad
//!    scans.
//! 3. Otherwise the raw text is coerced into the structured schema by the
//!    text model when available.
//! 4. With no capability (or every model path failing), the deterministic
//!    pattern pass runs, with its confidence discounted.
//!
//! Any error mid-pipeline marks the record `Failed` with the captured
//! error; a record is never left partially extracted.

use chrono::Utc;
use serde_json::json;
use tracing::{debug, warn};

use procureiq_ai::{
    AiCapability, ImageRequest, TextRequest, parse_structured_response,
};
use procureiq_core::{AuditEntry, AuditSink, CompanyId, DomainError, DomainResult, UserId};

use crate::document::QuoteDocument;
use crate::ocr::OcrEngine;
use crate::patterns::extract_with_patterns;
use crate::record::{ExtractionId, ExtractionMethod, ExtractionRecord, ExtractionStatus};
use crate::store::ExtractionStore;

const STRUCTURED_SCHEMA_HINT: &str = r#"Respond with JSON only, using this shape:
{"vendor_name": string|null, "quote_number": string|null, "quote_date": string|null,
 "gstin": string|null,
 "line_items": [{"description": string, "quantity": number|null, "unit_price": number|null, "amount": number|null}],
 "subtotal": number|null, "gst_amount": number|null, "grand_total": number|null}"#;

/// Pipeline thresholds.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// OCR confidence (0..1) below which the vision model is preferred.
    pub vision_threshold: f64,
    /// Confidence assigned when the vision model parse succeeds.
    pub vision_confidence: f64,
    /// Multiplier applied to the OCR confidence on the pattern-only path.
    pub pattern_discount: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            vision_threshold: 0.70,
            vision_confidence: 0.85,
            pattern_discount: 0.5,
        }
    }
}

pub struct DocumentExtractionPipeline<S, O> {
    store: S,
    ocr: O,
    capability: std::sync::Arc<dyn AiCapability>,
    audit: std::sync::Arc<dyn AuditSink>,
    config: ExtractionConfig,
}

struct ExtractionOutcome {
    raw_text: String,
    document: QuoteDocument,
    confidence: f64,
    method: ExtractionMethod,
}

impl<S, O> DocumentExtractionPipeline<S, O>
where
    S: ExtractionStore,
    O: OcrEngine,
{
    pub fn new(
        store: S,
        ocr: O,
        capability: std::sync::Arc<dyn AiCapability>,
        audit: std::sync::Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            store,
            ocr,
            capability,
            audit,
            config: ExtractionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Create the `Pending` record for an uploaded document.
    pub fn register_upload(
        &self,
        company_id: CompanyId,
        source_file_ref: &str,
    ) -> DomainResult<ExtractionRecord> {
        if source_file_ref.is_empty() {
            return Err(DomainError::validation("source file reference is empty"));
        }
        let record = ExtractionRecord::new_pending(
            ExtractionId::generate(),
            company_id,
            source_file_ref,
            Utc::now(),
        );
        self.store.insert(record.clone())?;
        Ok(record)
    }

    /// Run the pipeline for a registered upload.
    ///
    /// Returns the persisted record; inspect `status` for the outcome. A
    /// record that could not be extracted by any path comes back `Failed`
    /// with the captured error.
    pub fn process_document(
        &self,
        company_id: CompanyId,
        id: ExtractionId,
        image: &[u8],
        mime_type: &str,
        actor_id: Option<UserId>,
    ) -> DomainResult<ExtractionRecord> {
        let mut record = self
            .store
            .get(company_id, id)?
            .ok_or(DomainError::NotFound)?;

        record.begin_processing(Utc::now())?;
        self.store.update(&record)?;

        match self.extract(image, mime_type) {
            Ok(outcome) => {
                record.complete(
                    outcome.raw_text,
                    outcome.document,
                    outcome.confidence,
                    outcome.method,
                    Utc::now(),
                )?;
                self.store.update(&record)?;
                self.audit.record(AuditEntry {
                    company_id,
                    actor_id,
                    action: "document.extracted".to_string(),
                    entity_type: "extraction".to_string(),
                    entity_id: record.id.to_string(),
                    metadata: json!({
                        "method": record.extraction_method,
                        "confidence": record.confidence,
                    }),
                    occurred_at: Utc::now(),
                });
            }
            Err(reason) => {
                warn!(extraction = %record.id, %reason, "extraction failed");
                record.fail(reason, Utc::now())?;
                self.store.update(&record)?;
            }
        }

        Ok(record)
    }

    /// Manual approval with corrections; the only mutation after `Extracted`.
    pub fn approve_extraction(
        &self,
        company_id: CompanyId,
        id: ExtractionId,
        corrected: QuoteDocument,
        actor_id: Option<UserId>,
    ) -> DomainResult<ExtractionRecord> {
        let mut record = self
            .store
            .get(company_id, id)?
            .ok_or(DomainError::NotFound)?;

        let was_approved = record.status == ExtractionStatus::Approved;
        record.approve(corrected, Utc::now())?;
        self.store.update(&record)?;

        if !was_approved {
            self.audit.record(AuditEntry {
                company_id,
                actor_id,
                action: "document.approved".to_string(),
                entity_type: "extraction".to_string(),
                entity_id: record.id.to_string(),
                metadata: serde_json::Value::Null,
                occurred_at: Utc::now(),
            });
        }
        Ok(record)
    }

    fn extract(&self, image: &[u8], mime_type: &str) -> Result<ExtractionOutcome, String> {
        let ocr = self.ocr.recognize(image).map_err(|e| e.to_string())?;
        let ocr_confidence = (ocr.confidence / 100.0).clamp(0.0, 1.0);

        // Stage 2: vision model for low-confidence scans.
        if ocr_confidence < self.config.vision_threshold && self.capability.is_available() {
            match self.extract_via_vision(image, mime_type) {
                Ok(document) => {
                    return Ok(ExtractionOutcome {
                        raw_text: ocr.text,
                        document,
                        confidence: self.config.vision_confidence,
                        method: ExtractionMethod::VisionFallback,
                    });
                }
                Err(reason) => {
                    debug!(%reason, "vision extraction failed, falling back to text path");
                }
            }
        }

        // Text coercion of the OCR output.
        if self.capability.is_available() {
            match self.extract_via_text(&ocr.text) {
                Ok(document) => {
                    return Ok(ExtractionOutcome {
                        raw_text: ocr.text,
                        document,
                        confidence: ocr_confidence,
                        method: ExtractionMethod::LocalOcr,
                    });
                }
                Err(reason) => {
                    debug!(%reason, "text coercion failed, falling back to patterns");
                }
            }
        }

        // Deterministic floor.
        let document = extract_with_patterns(&ocr.text);
        Ok(ExtractionOutcome {
            raw_text: ocr.text,
            document,
            confidence: ocr_confidence * self.config.pattern_discount,
            method: ExtractionMethod::LocalOcr,
        })
    }

    fn extract_via_vision(&self, image: &[u8], mime_type: &str) -> Result<QuoteDocument, String> {
        let raw = self
            .capability
            .analyze_image(&ImageRequest {
                feature: "extraction.vision".to_string(),
                prompt: format!(
                    "Extract the vendor quotation in this document image.\n{STRUCTURED_SCHEMA_HINT}"
                ),
                image: image.to_vec(),
                mime_type: mime_type.to_string(),
            })
            .map_err(|e| e.to_string())?;
        parse_structured_response::<QuoteDocument>(&raw).map_err(|e| e.to_string())
    }

    fn extract_via_text(&self, raw_text: &str) -> Result<QuoteDocument, String> {
        let raw = self
            .capability
            .generate_text(
                &TextRequest::new(
                    "extraction.coerce",
                    format!(
                        "Convert this OCR output of a vendor quotation into structured data.\n\
                         {STRUCTURED_SCHEMA_HINT}\n\nOCR text:\n{raw_text}"
                    ),
                )
                .with_system_prompt("You extract structured procurement data from noisy OCR text."),
            )
            .map_err(|e| e.to_string())?;
        parse_structured_response::<QuoteDocument>(&raw).map_err(|e| e.to_string())
    }
}
