//! Suggestion generation and session operations.

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use procureiq_ai::{AiCapability, TextRequest, parse_structured_response};
use procureiq_core::{AuditEntry, AuditSink, CompanyId, DomainError, DomainResult};
use procureiq_procurement::{ProcurementReader, VendorId};

use crate::cache::{SessionCache, SessionCacheConfig};
use crate::session::{
    MessageRole, NegotiationMessage, NegotiationSession, NegotiationStatus, SessionId,
};
use crate::store::SessionStore;

/// What the model is asked to return.
#[derive(Debug, Deserialize)]
struct SuggestionPayload {
    suggested_message: String,
    suggested_price: Option<f64>,
    strategy: String,
    confidence: f64,
}

/// A drafted counter-offer, already appended to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub message: NegotiationMessage,
    pub suggested_price: Option<f64>,
    pub strategy: String,
    pub confidence: f64,
    /// False when the deterministic fallback produced the draft.
    pub generated_by_model: bool,
}

#[derive(Debug, Clone)]
pub struct NegotiationConfig {
    /// Prior accepted sessions with the vendor included as precedent.
    pub precedent_limit: usize,
    /// Opening counter proposes `current × opening_discount` when no
    /// target price is set.
    pub opening_discount: f64,
    pub cache: SessionCacheConfig,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            precedent_limit: 5,
            opening_discount: 0.9,
            cache: SessionCacheConfig::default(),
        }
    }
}

pub struct NegotiationCopilot<S> {
    store: S,
    capability: std::sync::Arc<dyn AiCapability>,
    audit: std::sync::Arc<dyn AuditSink>,
    cache: SessionCache,
    config: NegotiationConfig,
}

impl<S> NegotiationCopilot<S>
where
    S: SessionStore + ProcurementReader,
{
    pub fn new(
        store: S,
        capability: std::sync::Arc<dyn AiCapability>,
        audit: std::sync::Arc<dyn AuditSink>,
    ) -> Self {
        Self::with_config(store, capability, audit, NegotiationConfig::default())
    }

    pub fn with_config(
        store: S,
        capability: std::sync::Arc<dyn AiCapability>,
        audit: std::sync::Arc<dyn AuditSink>,
        config: NegotiationConfig,
    ) -> Self {
        let cache = SessionCache::new(config.cache.clone());
        Self {
            store,
            capability,
            audit,
            cache,
            config,
        }
    }

    /// Open an `Active` session with a vendor.
    pub fn start_session(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
        current_price: f64,
        target_price: Option<f64>,
    ) -> DomainResult<NegotiationSession> {
        if current_price <= 0.0 {
            return Err(DomainError::validation("current price must be positive"));
        }
        if let Some(target) = target_price {
            if target <= 0.0 {
                return Err(DomainError::validation("target price must be positive"));
            }
        }
        self.store
            .vendor(company_id, vendor_id)?
            .ok_or(DomainError::NotFound)?;

        let session = NegotiationSession::new_active(
            SessionId::generate(),
            company_id,
            vendor_id,
            current_price,
            target_price,
            Utc::now(),
        );
        self.store.insert_session(session.clone())?;
        self.cache.put(session.clone());

        self.audit.record(AuditEntry {
            company_id,
            actor_id: None,
            action: "negotiation.started".to_string(),
            entity_type: "negotiation_session".to_string(),
            entity_id: session.id.to_string(),
            metadata: json!({ "vendor_id": vendor_id, "current_price": current_price }),
            occurred_at: Utc::now(),
        });
        Ok(session)
    }

    /// Append a user or vendor message. The suggestion engine appends its
    /// own messages; callers cannot forge `AiSuggestion` entries.
    pub fn add_message(
        &self,
        company_id: CompanyId,
        session_id: SessionId,
        role: MessageRole,
        content: &str,
    ) -> DomainResult<NegotiationMessage> {
        if role == MessageRole::AiSuggestion {
            return Err(DomainError::validation(
                "AI suggestions are appended by the copilot, not by callers",
            ));
        }
        if content.trim().is_empty() {
            return Err(DomainError::validation("message content is empty"));
        }

        let mut session = self.load_session(company_id, session_id)?;
        let message = session.append_message(role, content, false, Utc::now())?;
        self.store.update_session(&session)?;
        self.cache.put(session);
        Ok(message)
    }

    /// Draft the next counter-offer and append it to the session.
    ///
    /// Model path when the capability is available; deterministic
    /// heuristics on unavailability or any generation/parse failure.
    pub fn get_suggestion(
        &self,
        company_id: CompanyId,
        session_id: SessionId,
    ) -> DomainResult<Suggestion> {
        let mut session = self.load_session(company_id, session_id)?;
        session.ensure_active()?;

        let (payload, generated_by_model) = match self.model_suggestion(&session) {
            Some(payload) => (payload, true),
            None => (self.fallback_suggestion(&session), false),
        };

        let message = session.append_message(
            MessageRole::AiSuggestion,
            payload.suggested_message.clone(),
            true,
            Utc::now(),
        )?;
        if let Some(price) = payload.suggested_price {
            session.ai_suggested_price = Some(price);
        }
        self.store.update_session(&session)?;
        self.cache.put(session);

        self.audit.record(AuditEntry {
            company_id,
            actor_id: None,
            action: "negotiation.suggested".to_string(),
            entity_type: "negotiation_session".to_string(),
            entity_id: session_id.to_string(),
            metadata: json!({
                "strategy": payload.strategy,
                "generated_by_model": generated_by_model,
            }),
            occurred_at: Utc::now(),
        });

        Ok(Suggestion {
            message,
            suggested_price: payload.suggested_price,
            strategy: payload.strategy,
            confidence: payload.confidence,
            generated_by_model,
        })
    }

    /// Transition the session out of `Active`. Accepting may record the
    /// agreed final price.
    pub fn update_status(
        &self,
        company_id: CompanyId,
        session_id: SessionId,
        status: NegotiationStatus,
        agreed_price: Option<f64>,
    ) -> DomainResult<NegotiationSession> {
        let mut session = self.load_session(company_id, session_id)?;
        session.transition(status, Utc::now())?;
        if status == NegotiationStatus::Accepted {
            if let Some(price) = agreed_price {
                session.ai_suggested_price = Some(price);
            }
        }
        self.store.update_session(&session)?;
        // Terminal sessions have no live conversation to accelerate.
        self.cache.remove(session_id);

        self.audit.record(AuditEntry {
            company_id,
            actor_id: None,
            action: "negotiation.closed".to_string(),
            entity_type: "negotiation_session".to_string(),
            entity_id: session_id.to_string(),
            metadata: json!({ "status": status, "agreed_price": session.ai_suggested_price }),
            occurred_at: Utc::now(),
        });
        Ok(session)
    }

    fn load_session(
        &self,
        company_id: CompanyId,
        session_id: SessionId,
    ) -> DomainResult<NegotiationSession> {
        if let Some(session) = self.cache.get(session_id) {
            if session.company_id == company_id {
                return Ok(session);
            }
        }
        self.store
            .session(company_id, session_id)?
            .ok_or(DomainError::NotFound)
    }

    fn model_suggestion(&self, session: &NegotiationSession) -> Option<SuggestionPayload> {
        if !self.capability.is_available() {
            return None;
        }

        let prompt = match self.build_prompt(session) {
            Ok(prompt) => prompt,
            Err(err) => {
                debug!(%err, "precedent lookup failed, using fallback suggestion");
                return None;
            }
        };
        let raw = match self.capability.generate_text(
            &TextRequest::new("negotiation.suggestion", prompt).with_system_prompt(
                "You are a procurement negotiation assistant. Respond with JSON only: \
                 {\"suggested_message\": string, \"suggested_price\": number|null, \
                 \"strategy\": string, \"confidence\": number}",
            ),
        ) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(%err, "suggestion generation failed, using fallback");
                return None;
            }
        };

        match parse_structured_response::<SuggestionPayload>(&raw) {
            Ok(mut payload) => {
                payload.confidence = payload.confidence.clamp(0.0, 1.0);
                Some(payload)
            }
            Err(err) => {
                debug!(%err, "suggestion parse failed, using fallback");
                None
            }
        }
    }

    fn build_prompt(&self, session: &NegotiationSession) -> DomainResult<String> {
        let vendor_name = self
            .store
            .vendor(session.company_id, session.vendor_id)?
            .map(|v| v.name)
            .unwrap_or_else(|| "the vendor".to_string());

        let mut prompt = format!(
            "Negotiation with {vendor_name}.\nCurrent quoted price: {:.2}\n",
            session.current_price
        );
        if let Some(target) = session.target_price {
            prompt.push_str(&format!(
                "Target price: {target:.2} (gap {:+.1}%)\n",
                (target - session.current_price) / session.current_price * 100.0
            ));
        }

        let precedents = self.store.accepted_sessions_for_vendor(
            session.company_id,
            session.vendor_id,
            self.config.precedent_limit,
        )?;
        if !precedents.is_empty() {
            prompt.push_str("Previously accepted negotiations with this vendor:\n");
            for p in &precedents {
                let agreed = p.ai_suggested_price.unwrap_or(p.current_price);
                prompt.push_str(&format!("- started at {:.2}, agreed at {agreed:.2}\n", p.current_price));
            }
        }

        if session.messages.is_empty() {
            prompt.push_str("No messages yet; draft the opening counter-offer.\n");
        } else {
            prompt.push_str("Conversation so far:\n");
            for message in &session.messages {
                prompt.push_str(&format!("[{:?}] {}\n", message.role, message.content));
            }
        }
        Ok(prompt)
    }

    /// Deterministic heuristics: a fixed opening counter for an empty
    /// session, meet-in-the-middle afterwards. Both propose
    /// `target ?? current × opening_discount`.
    fn fallback_suggestion(&self, session: &NegotiationSession) -> SuggestionPayload {
        let proposed = session
            .target_price
            .unwrap_or(session.current_price * self.config.opening_discount);

        if session.messages.is_empty() {
            SuggestionPayload {
                suggested_message: format!(
                    "Thank you for the quotation. Based on our current budget and \
                     comparable market rates, could you revise the price to {proposed:.2}? \
                     We are ready to confirm the order promptly at that level.",
                ),
                suggested_price: Some(proposed),
                strategy: "initial counter-offer".to_string(),
                confidence: 0.6,
            }
        } else {
            SuggestionPayload {
                suggested_message: format!(
                    "We appreciate the discussion so far. To close this out, we propose \
                     meeting at {proposed:.2}, which we see as a fair middle ground given \
                     the volumes involved. Can we agree on that?",
                ),
                suggested_price: Some(proposed),
                strategy: "compromise".to_string(),
                confidence: 0.5,
            }
        }
    }
}
