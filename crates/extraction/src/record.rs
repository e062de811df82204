use chrono::{DateTime, Utc};
use procureiq_core::{CompanyId, DomainError, DomainResult, RecordId};
use serde::{Deserialize, Serialize};

use crate::document::QuoteDocument;

/// Extraction record identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionId(pub RecordId);

impl ExtractionId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(RecordId::new())
    }
}

impl core::fmt::Display for ExtractionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Extraction status lifecycle.
///
/// `Pending → Processing → {Extracted | Failed}`; `Approved` is reachable
/// only from `Extracted`, only manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    Pending,
    Processing,
    Extracted,
    Approved,
    Failed,
}

/// Which path produced the structured data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMethod {
    #[serde(rename = "local-ocr")]
    LocalOcr,
    #[serde(rename = "vision-fallback")]
    VisionFallback,
}

/// One document extraction, from upload to approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub id: ExtractionId,
    pub company_id: CompanyId,
    /// Opaque reference to the uploaded file (object key, path, …).
    pub source_file_ref: String,
    pub status: ExtractionStatus,
    pub raw_text: String,
    pub structured_data: QuoteDocument,
    /// Overall confidence in `[0, 1]`.
    pub confidence: f64,
    pub extraction_method: ExtractionMethod,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExtractionRecord {
    pub fn new_pending(
        id: ExtractionId,
        company_id: CompanyId,
        source_file_ref: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            company_id,
            source_file_ref: source_file_ref.into(),
            status: ExtractionStatus::Pending,
            raw_text: String::new(),
            structured_data: QuoteDocument::default(),
            confidence: 0.0,
            extraction_method: ExtractionMethod::LocalOcr,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn begin_processing(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        match self.status {
            ExtractionStatus::Pending | ExtractionStatus::Failed => {
                self.status = ExtractionStatus::Processing;
                self.error = None;
                self.updated_at = now;
                Ok(())
            }
            other => Err(DomainError::invalid_transition(format!(
                "cannot start processing an extraction in status {other:?}"
            ))),
        }
    }

    pub fn complete(
        &mut self,
        raw_text: String,
        structured_data: QuoteDocument,
        confidence: f64,
        method: ExtractionMethod,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.status != ExtractionStatus::Processing {
            return Err(DomainError::invalid_transition(format!(
                "cannot complete an extraction in status {:?}",
                self.status
            )));
        }
        self.raw_text = raw_text;
        self.structured_data = structured_data;
        self.confidence = confidence.clamp(0.0, 1.0);
        self.extraction_method = method;
        self.status = ExtractionStatus::Extracted;
        self.error = None;
        self.updated_at = now;
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != ExtractionStatus::Processing {
            return Err(DomainError::invalid_transition(format!(
                "cannot fail an extraction in status {:?}",
                self.status
            )));
        }
        self.status = ExtractionStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = now;
        Ok(())
    }

    /// Manual approval with caller-supplied corrections.
    ///
    /// The only mutation path after `Extracted`. Idempotent: approving an
    /// already-approved record with identical data is a no-op; any other
    /// write to an approved record is rejected.
    pub fn approve(&mut self, corrected: QuoteDocument, now: DateTime<Utc>) -> DomainResult<()> {
        match self.status {
            ExtractionStatus::Extracted => {
                self.structured_data = corrected;
                self.status = ExtractionStatus::Approved;
                self.updated_at = now;
                Ok(())
            }
            ExtractionStatus::Approved if self.structured_data == corrected => Ok(()),
            ExtractionStatus::Approved => Err(DomainError::invalid_transition(
                "approved extractions are immutable".to_string(),
            )),
            other => Err(DomainError::invalid_transition(format!(
                "cannot approve an extraction in status {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_record() -> ExtractionRecord {
        ExtractionRecord::new_pending(
            ExtractionId::generate(),
            CompanyId::new(),
            "uploads/quote-1.pdf",
            Utc::now(),
        )
    }

    fn extracted_record() -> ExtractionRecord {
        let mut record = test_record();
        record.begin_processing(Utc::now()).unwrap();
        record
            .complete(
                "raw".to_string(),
                QuoteDocument {
                    grand_total: Some(1180.0),
                    ..QuoteDocument::default()
                },
                0.8,
                ExtractionMethod::LocalOcr,
                Utc::now(),
            )
            .unwrap();
        record
    }

    #[test]
    fn pending_to_processing_to_extracted() {
        let record = extracted_record();
        assert_eq!(record.status, ExtractionStatus::Extracted);
        assert!(record.error.is_none());
    }

    #[test]
    fn cannot_complete_without_processing() {
        let mut record = test_record();
        let err = record
            .complete(
                "raw".to_string(),
                QuoteDocument::default(),
                0.5,
                ExtractionMethod::LocalOcr,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));
    }

    #[test]
    fn approve_is_idempotent_with_identical_data() {
        let mut record = extracted_record();
        let corrected = QuoteDocument {
            grand_total: Some(1200.0),
            ..QuoteDocument::default()
        };
        record.approve(corrected.clone(), Utc::now()).unwrap();
        assert_eq!(record.status, ExtractionStatus::Approved);

        // Same data again: no-op, still approved.
        record.approve(corrected.clone(), Utc::now()).unwrap();
        assert_eq!(record.structured_data, corrected);
    }

    #[test]
    fn approved_records_reject_different_data() {
        let mut record = extracted_record();
        record
            .approve(
                QuoteDocument {
                    grand_total: Some(1200.0),
                    ..QuoteDocument::default()
                },
                Utc::now(),
            )
            .unwrap();

        let err = record
            .approve(
                QuoteDocument {
                    grand_total: Some(999.0),
                    ..QuoteDocument::default()
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));
    }

    #[test]
    fn approve_unreachable_from_failed() {
        let mut record = test_record();
        record.begin_processing(Utc::now()).unwrap();
        record.fail("ocr crashed", Utc::now()).unwrap();

        let err = record
            .approve(QuoteDocument::default(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));
    }

    #[test]
    fn failed_records_can_be_reprocessed() {
        let mut record = test_record();
        record.begin_processing(Utc::now()).unwrap();
        record.fail("ocr crashed", Utc::now()).unwrap();
        record.begin_processing(Utc::now()).unwrap();
        assert_eq!(record.status, ExtractionStatus::Processing);
        assert!(record.error.is_none());
    }
}
