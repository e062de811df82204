use std::sync::Arc;

use chrono::{Duration, Utc};
use procureiq_core::{CompanyId, DomainError};
use procureiq_procurement::{ItemId, PricePoint};
use procureiq_pricing::forecast::{PriceForecastEngine, PriceTrend};
use procureiq_store::InMemoryProcurementStore;

    fn engine(
        store: Arc<InMemoryProcurementStore>,
    ) -> PriceForecastEngine<Arc<InMemoryProcurementStore>> {
        PriceForecastEngine::new(store)
    }

    fn seed_history(store: &InMemoryProcurementStore, company: CompanyId, prices: &[f64]) -> ItemId {
        let item_id = ItemId::generate();
        let start = Utc::now() - Duration::days(prices.len() as i64 * 7);
        for (i, &price) in prices.iter().enumerate() {
            store.seed_price_point(PricePoint {
                item_id,
                company_id: company,
                price,
                recorded_at: start + Duration::days(i as i64 * 7),
            });
        }
        item_id
    }

    #[test]
    fn sparse_history_short_circuits() {
        let store = Arc::new(InMemoryProcurementStore::new());
        let company = CompanyId::new();
        let item = seed_history(&store, company, &[250.0, 260.0]);

        let record = engine(store).forecast(company, item, 30).unwrap();
        assert_eq!(record.trend, PriceTrend::Stable);
        assert_eq!(record.confidence_pct, 30.0);
        assert_eq!(record.predicted_price, 260.0);
        assert_eq!(record.data_points_used, 2);
        assert!(record.explanation_factors[0].contains("insufficient data"));
    }

    #[test]
    fn rising_series_projects_upward() {
        // Worked example: [100, 102, 98, 105, 110] over 30 days.
        let store = Arc::new(InMemoryProcurementStore::new());
        let company = CompanyId::new();
        let item = seed_history(&store, company, &[100.0, 102.0, 98.0, 105.0, 110.0]);

        let record = engine(store).forecast(company, item, 30).unwrap();
        // slope 2.3, intercept 98.4, index 5 + ceil(30/7) = 10 → 121.4
        assert!((record.predicted_price - 121.4).abs() < 1e-9);
        assert_eq!(record.trend, PriceTrend::Up);
        // 0.7 - 0.2 (n < 10); volatility ≈ 4.6% adds no penalty.
        assert!((record.confidence_pct - 50.0).abs() < 1e-9);
        assert_eq!(record.data_points_used, 5);
    }

    #[test]
    fn interval_spreads_with_uncertainty() {
        let store = Arc::new(InMemoryProcurementStore::new());
        let company = CompanyId::new();
        let item = seed_history(&store, company, &[100.0, 102.0, 98.0, 105.0, 110.0]);

        let record = engine(store).forecast(company, item, 30).unwrap();
        // confidence 0.5 → ±25% band around the prediction.
        assert!((record.confidence_low - 121.4 * 0.75).abs() < 1e-9);
        assert!((record.confidence_high - 121.4 * 1.25).abs() < 1e-9);
    }

    #[test]
    fn projection_is_clamped_non_negative() {
        let store = Arc::new(InMemoryProcurementStore::new());
        let company = CompanyId::new();
        let item = seed_history(&store, company, &[90.0, 60.0, 30.0, 10.0]);

        let record = engine(store).forecast(company, item, 365).unwrap();
        assert_eq!(record.predicted_price, 0.0);
        assert_eq!(record.trend, PriceTrend::Down);
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let store = Arc::new(InMemoryProcurementStore::new());
        let company = CompanyId::new();
        let item = seed_history(&store, company, &[100.0, 101.0, 102.0]);

        let err = engine(store).forecast(company, item, 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn bulk_forecast_never_aborts_the_batch() {
        let store = Arc::new(InMemoryProcurementStore::new());
        let company = CompanyId::new();
        let good = seed_history(&store, company, &[100.0, 102.0, 104.0, 107.0]);
        let empty = ItemId::generate();

        let records = engine(store).forecast_many(company, &[good, empty], 30);
        assert_eq!(records.len(), 2);
        // The item with no history flat-lines at zero with floor confidence.
        assert_eq!(records[1].predicted_price, 0.0);
        assert_eq!(records[1].confidence_pct, 30.0);
    }
