use procureiq_core::{CompanyId, DomainError};
use procureiq_procurement::VendorId;
use procureiq_negotiation::copilot::NegotiationCopilot;
use procureiq_negotiation::session::{MessageRole, NegotiationStatus};
use procureiq_negotiation::store::SessionStore;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use procureiq_ai::{
        AiConfig, InMemoryUsageLog, LiveCapability, MockProvider, NullCapability,
    };
    use procureiq_core::NoopAuditSink;
    use procureiq_procurement::{Vendor, VendorStatus};
    use procureiq_store::InMemoryProcurementStore;

    fn store_with_vendor() -> (Arc<InMemoryProcurementStore>, CompanyId, VendorId) {
        let store = Arc::new(InMemoryProcurementStore::new());
        let company = CompanyId::new();
        let vendor_id = VendorId::generate();
        store.seed_vendor(Vendor {
            id: vendor_id,
            company_id: company,
            name: "ACME Industrial".to_string(),
            category: None,
            materials: vec![],
            status: VendorStatus::Active,
        });
        (store, company, vendor_id)
    }

    fn offline_copilot(
        store: Arc<InMemoryProcurementStore>,
    ) -> NegotiationCopilot<Arc<InMemoryProcurementStore>> {
        NegotiationCopilot::new(store, Arc::new(NullCapability), Arc::new(NoopAuditSink))
    }

    fn live_copilot(
        store: Arc<InMemoryProcurementStore>,
        provider: MockProvider,
    ) -> NegotiationCopilot<Arc<InMemoryProcurementStore>> {
        let capability = LiveCapability::new(
            AiConfig {
                api_key: Some("sk-test-0123456789abcdef".to_string()),
                ..AiConfig::default()
            },
            Arc::new(provider),
            Arc::new(InMemoryUsageLog::new()),
        );
        NegotiationCopilot::new(store, Arc::new(capability), Arc::new(NoopAuditSink))
    }

    #[test]
    fn opening_fallback_discounts_the_current_price() {
        let (store, company, vendor) = store_with_vendor();
        let copilot = offline_copilot(store);
        let session = copilot
            .start_session(company, vendor, 100_000.0, None)
            .unwrap();

        let suggestion = copilot.get_suggestion(company, session.id).unwrap();
        assert!(!suggestion.generated_by_model);
        assert_eq!(suggestion.strategy, "initial counter-offer");
        assert_eq!(suggestion.confidence, 0.6);
        assert_eq!(suggestion.suggested_price, Some(90_000.0));
        assert_eq!(suggestion.message.role, MessageRole::AiSuggestion);
    }

    #[test]
    fn later_fallback_compromises_at_the_target() {
        let (store, company, vendor) = store_with_vendor();
        let copilot = offline_copilot(store);
        let session = copilot
            .start_session(company, vendor, 100_000.0, Some(92_000.0))
            .unwrap();
        copilot
            .add_message(company, session.id, MessageRole::Vendor, "97k is our floor.")
            .unwrap();

        let suggestion = copilot.get_suggestion(company, session.id).unwrap();
        assert_eq!(suggestion.strategy, "compromise");
        assert_eq!(suggestion.confidence, 0.5);
        assert_eq!(suggestion.suggested_price, Some(92_000.0));
    }

    #[test]
    fn model_path_parses_and_records_the_price() {
        let (store, company, vendor) = store_with_vendor();
        let provider = MockProvider::replying(
            r#"```json
{"suggested_message": "We can meet at 94500 given the volumes.",
 "suggested_price": 94500.0, "strategy": "anchoring", "confidence": 0.8}
```"#,
        );
        let copilot = live_copilot(store.clone(), provider);
        let session = copilot
            .start_session(company, vendor, 100_000.0, Some(90_000.0))
            .unwrap();

        let suggestion = copilot.get_suggestion(company, session.id).unwrap();
        assert!(suggestion.generated_by_model);
        assert_eq!(suggestion.strategy, "anchoring");
        assert_eq!(suggestion.suggested_price, Some(94_500.0));

        let persisted = store.session(company, session.id).unwrap().unwrap();
        assert_eq!(persisted.ai_suggested_price, Some(94_500.0));
        assert_eq!(persisted.messages.len(), 1);
        assert!(persisted.messages[0].is_ai_generated);
    }

    #[test]
    fn unparseable_model_output_falls_back() {
        let (store, company, vendor) = store_with_vendor();
        let provider = MockProvider::replying("Happy to help! I'd suggest countering lower.");
        let copilot = live_copilot(store, provider);
        let session = copilot
            .start_session(company, vendor, 50_000.0, None)
            .unwrap();

        let suggestion = copilot.get_suggestion(company, session.id).unwrap();
        assert!(!suggestion.generated_by_model);
        assert_eq!(suggestion.strategy, "initial counter-offer");
        assert_eq!(suggestion.suggested_price, Some(45_000.0));
    }

    #[test]
    fn terminal_sessions_reject_everything() {
        let (store, company, vendor) = store_with_vendor();
        let copilot = offline_copilot(store);
        let session = copilot
            .start_session(company, vendor, 10_000.0, None)
            .unwrap();
        copilot
            .update_status(company, session.id, NegotiationStatus::Rejected, None)
            .unwrap();

        let err = copilot
            .add_message(company, session.id, MessageRole::User, "wait")
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));

        let err = copilot.get_suggestion(company, session.id).unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));

        let err = copilot
            .update_status(company, session.id, NegotiationStatus::Accepted, None)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidStateTransition(_)));
    }

    #[test]
    fn accepting_records_the_agreed_price() {
        let (store, company, vendor) = store_with_vendor();
        let copilot = offline_copilot(store.clone());
        let session = copilot
            .start_session(company, vendor, 10_000.0, Some(9_000.0))
            .unwrap();

        let closed = copilot
            .update_status(
                company,
                session.id,
                NegotiationStatus::Accepted,
                Some(9_400.0),
            )
            .unwrap();
        assert_eq!(closed.status, NegotiationStatus::Accepted);
        assert_eq!(closed.ai_suggested_price, Some(9_400.0));

        let persisted = store.session(company, session.id).unwrap().unwrap();
        assert_eq!(persisted.ai_suggested_price, Some(9_400.0));
    }

    #[test]
    fn durable_state_survives_cache_loss() {
        let (store, company, vendor) = store_with_vendor();
        let copilot = offline_copilot(store.clone());
        let session = copilot
            .start_session(company, vendor, 10_000.0, None)
            .unwrap();
        copilot
            .add_message(company, session.id, MessageRole::User, "Can you do better?")
            .unwrap();

        // Simulate cache eviction: a fresh copilot over the same store has
        // a cold cache.
        let rebuilt = offline_copilot(store.clone());
        let message = rebuilt
            .add_message(company, session.id, MessageRole::Vendor, "We can try.")
            .unwrap();
        assert_eq!(message.role, MessageRole::Vendor);

        let loaded = store.session(company, session.id).unwrap().unwrap();
        assert_eq!(loaded.messages.len(), 2);
    }

    #[test]
    fn callers_cannot_forge_ai_messages() {
        let (store, company, vendor) = store_with_vendor();
        let copilot = offline_copilot(store);
        let session = copilot
            .start_session(company, vendor, 10_000.0, None)
            .unwrap();

        let err = copilot
            .add_message(company, session.id, MessageRole::AiSuggestion, "trust me")
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn unknown_vendor_cannot_start_a_session() {
        let store = Arc::new(InMemoryProcurementStore::new());
        let copilot = offline_copilot(store);
        let err = copilot
            .start_session(CompanyId::new(), VendorId::generate(), 1_000.0, None)
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }
}
