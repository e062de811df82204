use std::sync::Arc;

use chrono::Utc;
use procureiq_core::{CompanyId, DomainError};
use procureiq_pricing::anomaly::{
    AnomalyConfig, AnomalySeverity, PriceAnomalyDetector, classify_deviation,
};
use procureiq_procurement::{Quote, QuoteId};

#[cfg(test)]
mod tests {
    use super::*;
    use procureiq_ai::NullCapability;
    use procureiq_core::NoopAuditSink;
    use procureiq_procurement::{QuoteStatus, Rfq, RfqId, VendorId};
    use procureiq_store::InMemoryProcurementStore;

    fn classify(deviation: f64) -> AnomalySeverity {
        classify_deviation(deviation, &AnomalyConfig::default())
    }

    #[test]
    fn severity_boundaries_are_exact() {
        assert_eq!(classify(10.0), AnomalySeverity::Normal);
        assert_eq!(classify(10.01), AnomalySeverity::High);
        assert_eq!(classify(25.0), AnomalySeverity::High);
        assert_eq!(classify(25.01), AnomalySeverity::ExtremelyHigh);
    }

    #[test]
    fn cheaper_quotes_are_normal() {
        assert_eq!(classify(-40.0), AnomalySeverity::Normal);
    }

    fn detector(
        store: Arc<InMemoryProcurementStore>,
    ) -> PriceAnomalyDetector<Arc<InMemoryProcurementStore>> {
        PriceAnomalyDetector::new(store, Arc::new(NullCapability), Arc::new(NoopAuditSink))
    }

    fn seed_quote(
        store: &InMemoryProcurementStore,
        company: CompanyId,
        rfq_id: RfqId,
        landed_cost: f64,
    ) -> QuoteId {
        let quote = Quote {
            id: QuoteId::generate(),
            company_id: company,
            rfq_id,
            vendor_id: VendorId::generate(),
            landed_cost,
            status: QuoteStatus::Submitted,
            submitted_at: Utc::now(),
        };
        let id = quote.id;
        store.seed_quote(quote);
        id
    }

    #[test]
    fn peer_average_drives_high_severity() {
        // 118640 against peers averaging 100300 is ~18.3% over: High.
        let store = Arc::new(InMemoryProcurementStore::new());
        let company = CompanyId::new();
        let rfq_id = RfqId::generate();
        store.seed_rfq(Rfq {
            id: rfq_id,
            company_id: company,
            item_ids: vec![],
            created_at: Utc::now(),
        });
        seed_quote(&store, company, rfq_id, 100_000.0);
        seed_quote(&store, company, rfq_id, 100_600.0);
        let suspect = seed_quote(&store, company, rfq_id, 118_640.0);

        let record = detector(store).detect(company, suspect).unwrap().unwrap();
        assert_eq!(record.severity, AnomalySeverity::High);
        assert!((record.expected_price - 100_300.0).abs() < 1e-9);
        assert!((record.deviation_pct - 18.2851).abs() < 0.001);
        assert!(!record.acknowledged);
    }

    #[test]
    fn normal_deviation_persists_nothing() {
        let store = Arc::new(InMemoryProcurementStore::new());
        let company = CompanyId::new();
        let rfq_id = RfqId::generate();
        store.seed_rfq(Rfq {
            id: rfq_id,
            company_id: company,
            item_ids: vec![],
            created_at: Utc::now(),
        });
        seed_quote(&store, company, rfq_id, 100_000.0);
        let suspect = seed_quote(&store, company, rfq_id, 105_000.0);

        assert!(detector(store).detect(company, suspect).unwrap().is_none());
    }

    #[test]
    fn lone_quote_on_multi_item_rfq_self_references() {
        let store = Arc::new(InMemoryProcurementStore::new());
        let company = CompanyId::new();
        let rfq_id = RfqId::generate();
        store.seed_rfq(Rfq {
            id: rfq_id,
            company_id: company,
            item_ids: vec![
                procureiq_procurement::ItemId::generate(),
                procureiq_procurement::ItemId::generate(),
            ],
            created_at: Utc::now(),
        });
        let suspect = seed_quote(&store, company, rfq_id, 500_000.0);

        // Expected collapses to the quote's own price: 0% deviation, Normal.
        assert!(detector(store).detect(company, suspect).unwrap().is_none());
    }

    #[test]
    fn acknowledge_is_one_way_and_idempotent() {
        let store = Arc::new(InMemoryProcurementStore::new());
        let company = CompanyId::new();
        let rfq_id = RfqId::generate();
        store.seed_rfq(Rfq {
            id: rfq_id,
            company_id: company,
            item_ids: vec![],
            created_at: Utc::now(),
        });
        seed_quote(&store, company, rfq_id, 100_000.0);
        let suspect = seed_quote(&store, company, rfq_id, 140_000.0);

        let detector = detector(store);
        let record = detector.detect(company, suspect).unwrap().unwrap();
        assert_eq!(record.severity, AnomalySeverity::ExtremelyHigh);

        let acked = detector.acknowledge(company, record.id).unwrap();
        assert!(acked.acknowledged);
        let again = detector.acknowledge(company, record.id).unwrap();
        assert!(again.acknowledged);
    }

    #[test]
    fn unknown_quote_is_not_found() {
        let store = Arc::new(InMemoryProcurementStore::new());
        let err = detector(store)
            .detect(CompanyId::new(), QuoteId::generate())
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }
}
