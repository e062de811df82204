use chrono::{DateTime, Utc};
use procureiq_core::{CompanyId, DomainError, DomainResult, RecordId};
use procureiq_procurement::VendorId;
use serde::{Deserialize, Serialize};

/// Negotiation session identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub RecordId);

impl SessionId {
    pub fn generate() -> Self {
        Self(RecordId::new())
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Message identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub RecordId);

impl MessageId {
    pub fn generate() -> Self {
        Self(RecordId::new())
    }
}

/// Session status. Created `Active`; every transition out of `Active` is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NegotiationStatus {
    Active,
    Accepted,
    Rejected,
    Expired,
}

impl NegotiationStatus {
    pub fn is_terminal(&self) -> bool {
        *self != NegotiationStatus::Active
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageRole {
    User,
    Vendor,
    AiSuggestion,
}

/// One message in a negotiation. Append-only; never mutated after
/// creation except for the user-edit bookkeeping fields set at creation
/// time by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationMessage {
    pub id: MessageId,
    pub session_ref: SessionId,
    pub role: MessageRole,
    pub content: String,
    pub is_ai_generated: bool,
    pub is_edited: bool,
    /// The generated draft before the user edited it, when `is_edited`.
    pub original_content: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A negotiation with one vendor over one price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationSession {
    pub id: SessionId,
    pub company_id: CompanyId,
    pub vendor_id: VendorId,
    pub current_price: f64,
    pub target_price: Option<f64>,
    /// Last price proposed by the suggestion engine; on acceptance this
    /// becomes the agreed final price.
    pub ai_suggested_price: Option<f64>,
    pub status: NegotiationStatus,
    pub messages: Vec<NegotiationMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NegotiationSession {
    pub fn new_active(
        id: SessionId,
        company_id: CompanyId,
        vendor_id: VendorId,
        current_price: f64,
        target_price: Option<f64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            company_id,
            vendor_id,
            current_price,
            target_price,
            ai_suggested_price: None,
            status: NegotiationStatus::Active,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn ensure_active(&self) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::invalid_transition(format!(
                "session is {:?} and accepts no further activity",
                self.status
            )));
        }
        Ok(())
    }

    /// Append a message. Rejected once the session left `Active`.
    pub fn append_message(
        &mut self,
        role: MessageRole,
        content: impl Into<String>,
        is_ai_generated: bool,
        now: DateTime<Utc>,
    ) -> DomainResult<NegotiationMessage> {
        self.ensure_active()?;
        let message = NegotiationMessage {
            id: MessageId::generate(),
            session_ref: self.id,
            role,
            content: content.into(),
            is_ai_generated,
            is_edited: false,
            original_content: None,
            created_at: now,
        };
        self.messages.push(message.clone());
        self.updated_at = now;
        Ok(message)
    }

    /// Transition out of `Active`. Terminal states accept nothing further.
    pub fn transition(&mut self, status: NegotiationStatus, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_active()?;
        if status == NegotiationStatus::Active {
            return Err(DomainError::invalid_transition(
                "session is already active".to_string(),
            ));
        }
        self.status = status;
        self.updated_at = now;
        Ok(())
    }
}
