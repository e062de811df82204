//! Cross-engine integration: the whole intelligence subsystem running
//! against the in-memory store with no generative model configured.
//! Every engine must produce usable output purely from its deterministic
//! paths.

use std::sync::Arc;

use chrono::{Duration, Utc};

use procureiq_ai::{AiCapability, NullCapability};
use procureiq_core::{CompanyId, RecordId};
use procureiq_extraction::{
    DocumentExtractionPipeline, ExtractionStatus, OcrEngine, OcrError, OcrOutcome,
};
use procureiq_negotiation::{MessageRole, NegotiationCopilot, NegotiationStatus};
use procureiq_pricing::{AnomalySeverity, PriceAnomalyDetector, PriceForecastEngine, PriceTrend};
use procureiq_procurement::{
    Delivery, DeliveryId, Item, ItemId, PricePoint, PurchaseOrder, PurchaseOrderId,
    PurchaseOrderStatus, Quote, QuoteId, QuoteStatus, Rfq, RfqId, Vendor, VendorId, VendorStatus,
};
use procureiq_store::{InMemoryAuditLog, InMemoryProcurementStore};
use procureiq_vendors::{
    RecommendRequest, Urgency, VendorRecommendationRanker, VendorScoringEngine, VendorTier,
};

struct CannedOcr;

impl OcrEngine for CannedOcr {
    fn recognize(&self, _image: &[u8]) -> Result<OcrOutcome, OcrError> {
        Ok(OcrOutcome {
            text: "GSTIN: 27AAPFU0939F1ZV Quotation No: Q-77 Date: 05/08/2026 \
                   Subtotal Rs. 1,00,000.00 GST Rs. 18,000.00 Total Rs. 1,18,000.00"
                .to_string(),
            confidence: 88.0,
        })
    }
}

struct Fixture {
    store: Arc<InMemoryProcurementStore>,
    audit: Arc<InMemoryAuditLog>,
    capability: Arc<dyn AiCapability>,
    company: CompanyId,
    vendor: VendorId,
    item: ItemId,
    rfq: RfqId,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryProcurementStore::new());
    let company = CompanyId::new();
    let vendor = VendorId::generate();
    let item = ItemId::generate();
    let rfq = RfqId::generate();
    let now = Utc::now();

    store.seed_vendor(Vendor {
        id: vendor,
        company_id: company,
        name: "ACME Industrial".to_string(),
        category: Some("metals".to_string()),
        materials: vec!["mild steel".to_string()],
        status: VendorStatus::Active,
    });
    store.seed_item(Item {
        id: item,
        company_id: company,
        name: "mild steel rods".to_string(),
        category: Some("metals".to_string()),
    });
    store.seed_rfq(Rfq {
        id: rfq,
        company_id: company,
        item_ids: vec![item],
        created_at: now - Duration::days(20),
    });

    // A healthy trading history: approved quotes, on-time deliveries.
    for i in 0..4 {
        store.seed_quote(Quote {
            id: QuoteId::generate(),
            company_id: company,
            rfq_id: rfq,
            vendor_id: vendor,
            landed_cost: 100_000.0 + i as f64 * 400.0,
            status: QuoteStatus::Approved,
            submitted_at: now - Duration::days(19),
        });
        let order = PurchaseOrderId::generate();
        store.seed_order(PurchaseOrder {
            id: order,
            company_id: company,
            vendor_id: vendor,
            quote_id: None,
            status: PurchaseOrderStatus::Completed,
            created_at: now - Duration::days(15),
        });
        store.seed_delivery(Delivery {
            id: DeliveryId::new(RecordId::new()),
            company_id: company,
            vendor_id: vendor,
            order_id: order,
            expected_date: now - Duration::days(10),
            received_date: Some(now - Duration::days(9)),
            rejected: false,
        });
    }

    // Rising price history, one point a week.
    for (i, price) in [100.0, 102.0, 98.0, 105.0, 110.0].iter().enumerate() {
        store.seed_price_point(PricePoint {
            item_id: item,
            company_id: company,
            price: *price,
            recorded_at: now - Duration::days((5 - i as i64) * 7),
        });
    }

    Fixture {
        store,
        audit: Arc::new(InMemoryAuditLog::new()),
        capability: Arc::new(NullCapability),
        company,
        vendor,
        item,
        rfq,
    }
}

#[test]
fn the_subsystem_works_without_a_model() {
    let f = fixture();

    // 1. Vendor scoring: bulk recalculation over the single active vendor.
    let scoring = VendorScoringEngine::new(f.store.clone(), f.audit.clone());
    let scores = scoring.recalculate_all(f.company).unwrap();
    assert_eq!(scores.len(), 1);
    let score = &scores[0];
    assert_eq!(score.tier, VendorTier::A);
    assert_eq!(score.delivery_score, 100.0);
    assert_eq!(score.price_score, 100.0);

    // 2. Recommendation: the vendor has quoted the requested item.
    let ranker = VendorRecommendationRanker::new(
        f.store.clone(),
        VendorScoringEngine::new(f.store.clone(), f.audit.clone()),
        f.audit.clone(),
    );
    let recommendations = ranker
        .recommend(
            f.company,
            &RecommendRequest::for_items(vec![f.item]).with_urgency(Urgency::Medium),
        )
        .unwrap();
    assert_eq!(recommendations[0].vendor_ref, f.vendor);
    assert_eq!(recommendations[0].factors.relevance, 100.0);
    assert_eq!(recommendations[0].rank, 1);

    // 3. Anomaly: a fresh quote far above the peer average is flagged.
    let suspect = Quote {
        id: QuoteId::generate(),
        company_id: f.company,
        rfq_id: f.rfq,
        vendor_id: f.vendor,
        landed_cost: 130_000.0,
        status: QuoteStatus::Submitted,
        submitted_at: Utc::now(),
    };
    let suspect_id = suspect.id;
    f.store.seed_quote(suspect);
    let detector =
        PriceAnomalyDetector::new(f.store.clone(), f.capability.clone(), f.audit.clone());
    let anomaly = detector.detect(f.company, suspect_id).unwrap().unwrap();
    assert_eq!(anomaly.severity, AnomalySeverity::ExtremelyHigh);
    assert!(!anomaly.acknowledged);

    // 4. Forecast: the rising history projects upward.
    let forecaster = PriceForecastEngine::new(f.store.clone());
    let forecast = forecaster.forecast(f.company, f.item, 30).unwrap();
    assert_eq!(forecast.trend, PriceTrend::Up);
    assert!(forecast.confidence_pct >= 30.0 && forecast.confidence_pct <= 95.0);
    assert_eq!(f.store.forecast_count(f.company), 1);

    // 5. Negotiation: deterministic fallback end to end.
    let copilot =
        NegotiationCopilot::new(f.store.clone(), f.capability.clone(), f.audit.clone());
    let session = copilot
        .start_session(f.company, f.vendor, 130_000.0, Some(110_000.0))
        .unwrap();
    copilot
        .add_message(f.company, session.id, MessageRole::User, "Price is too high.")
        .unwrap();
    let suggestion = copilot.get_suggestion(f.company, session.id).unwrap();
    assert!(!suggestion.generated_by_model);
    assert_eq!(suggestion.suggested_price, Some(110_000.0));
    let closed = copilot
        .update_status(
            f.company,
            session.id,
            NegotiationStatus::Accepted,
            Some(112_000.0),
        )
        .unwrap();
    assert_eq!(closed.ai_suggested_price, Some(112_000.0));

    // 6. Extraction: pattern floor with discounted confidence.
    let pipeline = DocumentExtractionPipeline::new(
        f.store.clone(),
        CannedOcr,
        f.capability.clone(),
        f.audit.clone(),
    );
    let record = pipeline
        .register_upload(f.company, "uploads/quote.pdf")
        .unwrap();
    let record = pipeline
        .process_document(f.company, record.id, b"scan", "application/pdf", None)
        .unwrap();
    assert_eq!(record.status, ExtractionStatus::Extracted);
    assert!((record.confidence - 0.44).abs() < 1e-9);
    assert_eq!(
        record.structured_data.gstin.as_deref(),
        Some("27AAPFU0939F1ZV")
    );

    // Every state-changing operation left an audit trail entry.
    let actions: Vec<String> = f
        .audit
        .entries()
        .into_iter()
        .map(|e| e.action)
        .collect();
    for expected in [
        "vendor.score_calculated",
        "vendor.recommended",
        "price_anomaly.detected",
        "negotiation.started",
        "negotiation.suggested",
        "negotiation.closed",
        "document.extracted",
    ] {
        assert!(
            actions.iter().any(|a| a == expected),
            "missing audit action {expected}; saw {actions:?}"
        );
    }
}
