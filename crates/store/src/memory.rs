//! The in-memory procurement store.
//!
//! One struct implementing every port the engine crates declare, keyed by
//! company for tenant isolation. `seed_*` methods load entity snapshots
//! for tests.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use procureiq_core::{CompanyId, DomainError, DomainResult};
use procureiq_extraction::{ExtractionId, ExtractionRecord, ExtractionStore};
use procureiq_negotiation::{NegotiationSession, NegotiationStatus, SessionId, SessionStore};
use procureiq_pricing::{
    AnomalyId, AnomalyStore, ForecastStore, PriceAnomalyRecord, PriceForecastRecord,
};
use procureiq_procurement::{
    Delivery, Item, ItemId, ProcurementReader, PurchaseOrder, PurchaseOrderId, PricePoint, Quote,
    QuoteId, Rfq, RfqId, Vendor, VendorId,
};
use procureiq_vendors::{
    RecommendationId, RecommendationRecord, RecommendationStore, ScoreStore, VendorScoreRecord,
};

fn poisoned() -> DomainError {
    DomainError::store("lock poisoned")
}

#[derive(Debug, Default)]
pub struct InMemoryProcurementStore {
    vendors: RwLock<HashMap<(CompanyId, VendorId), Vendor>>,
    items: RwLock<HashMap<(CompanyId, ItemId), Item>>,
    rfqs: RwLock<HashMap<(CompanyId, RfqId), Rfq>>,
    quotes: RwLock<HashMap<(CompanyId, QuoteId), Quote>>,
    orders: RwLock<HashMap<(CompanyId, PurchaseOrderId), PurchaseOrder>>,
    deliveries: RwLock<Vec<Delivery>>,
    price_points: RwLock<Vec<PricePoint>>,
    extractions: RwLock<HashMap<(CompanyId, ExtractionId), ExtractionRecord>>,
    anomalies: RwLock<HashMap<(CompanyId, AnomalyId), PriceAnomalyRecord>>,
    forecasts: RwLock<Vec<PriceForecastRecord>>,
    scores: RwLock<HashMap<(CompanyId, VendorId), VendorScoreRecord>>,
    recommendations: RwLock<HashMap<(CompanyId, RecommendationId), RecommendationRecord>>,
    sessions: RwLock<HashMap<(CompanyId, SessionId), NegotiationSession>>,
}

impl InMemoryProcurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_vendor(&self, vendor: Vendor) {
        if let Ok(mut map) = self.vendors.write() {
            map.insert((vendor.company_id, vendor.id), vendor);
        }
    }

    pub fn seed_item(&self, item: Item) {
        if let Ok(mut map) = self.items.write() {
            map.insert((item.company_id, item.id), item);
        }
    }

    pub fn seed_rfq(&self, rfq: Rfq) {
        if let Ok(mut map) = self.rfqs.write() {
            map.insert((rfq.company_id, rfq.id), rfq);
        }
    }

    pub fn seed_quote(&self, quote: Quote) {
        if let Ok(mut map) = self.quotes.write() {
            map.insert((quote.company_id, quote.id), quote);
        }
    }

    pub fn seed_order(&self, order: PurchaseOrder) {
        if let Ok(mut map) = self.orders.write() {
            map.insert((order.company_id, order.id), order);
        }
    }

    pub fn seed_delivery(&self, delivery: Delivery) {
        if let Ok(mut list) = self.deliveries.write() {
            list.push(delivery);
        }
    }

    pub fn seed_price_point(&self, point: PricePoint) {
        if let Ok(mut list) = self.price_points.write() {
            list.push(point);
        }
    }

    pub fn score_count(&self, company_id: CompanyId) -> usize {
        self.scores
            .read()
            .map(|m| m.keys().filter(|(c, _)| *c == company_id).count())
            .unwrap_or(0)
    }

    pub fn recommendation_count(&self, company_id: CompanyId) -> usize {
        self.recommendations
            .read()
            .map(|m| m.keys().filter(|(c, _)| *c == company_id).count())
            .unwrap_or(0)
    }

    pub fn anomaly_count(&self, company_id: CompanyId) -> usize {
        self.anomalies
            .read()
            .map(|m| m.keys().filter(|(c, _)| *c == company_id).count())
            .unwrap_or(0)
    }

    pub fn forecast_count(&self, company_id: CompanyId) -> usize {
        self.forecasts
            .read()
            .map(|list| list.iter().filter(|f| f.company_id == company_id).count())
            .unwrap_or(0)
    }
}

impl ProcurementReader for InMemoryProcurementStore {
    fn vendor(&self, company_id: CompanyId, id: VendorId) -> DomainResult<Option<Vendor>> {
        let map = self.vendors.read().map_err(|_| poisoned())?;
        Ok(map.get(&(company_id, id)).cloned())
    }

    fn active_vendors(&self, company_id: CompanyId) -> DomainResult<Vec<Vendor>> {
        let map = self.vendors.read().map_err(|_| poisoned())?;
        let mut vendors: Vec<Vendor> = map
            .values()
            .filter(|v| v.company_id == company_id && v.is_active())
            .cloned()
            .collect();
        // Deterministic iteration order for ranking tests.
        vendors.sort_by_key(|v| v.id);
        Ok(vendors)
    }

    fn item(&self, company_id: CompanyId, id: ItemId) -> DomainResult<Option<Item>> {
        let map = self.items.read().map_err(|_| poisoned())?;
        Ok(map.get(&(company_id, id)).cloned())
    }

    fn rfq(&self, company_id: CompanyId, id: RfqId) -> DomainResult<Option<Rfq>> {
        let map = self.rfqs.read().map_err(|_| poisoned())?;
        Ok(map.get(&(company_id, id)).cloned())
    }

    fn quote(&self, company_id: CompanyId, id: QuoteId) -> DomainResult<Option<Quote>> {
        let map = self.quotes.read().map_err(|_| poisoned())?;
        Ok(map.get(&(company_id, id)).cloned())
    }

    fn quotes_for_rfq(&self, company_id: CompanyId, rfq_id: RfqId) -> DomainResult<Vec<Quote>> {
        let map = self.quotes.read().map_err(|_| poisoned())?;
        let mut quotes: Vec<Quote> = map
            .values()
            .filter(|q| q.company_id == company_id && q.rfq_id == rfq_id)
            .cloned()
            .collect();
        quotes.sort_by_key(|q| q.id);
        Ok(quotes)
    }

    fn recent_quotes_for_vendor(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
        limit: usize,
    ) -> DomainResult<Vec<Quote>> {
        let map = self.quotes.read().map_err(|_| poisoned())?;
        let mut quotes: Vec<Quote> = map
            .values()
            .filter(|q| q.company_id == company_id && q.vendor_id == vendor_id)
            .cloned()
            .collect();
        quotes.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        quotes.truncate(limit);
        Ok(quotes)
    }

    fn recent_orders_for_vendor(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
        limit: usize,
    ) -> DomainResult<Vec<PurchaseOrder>> {
        let map = self.orders.read().map_err(|_| poisoned())?;
        let mut orders: Vec<PurchaseOrder> = map
            .values()
            .filter(|o| o.company_id == company_id && o.vendor_id == vendor_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders.truncate(limit);
        Ok(orders)
    }

    fn deliveries_for_vendor(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
    ) -> DomainResult<Vec<Delivery>> {
        let list = self.deliveries.read().map_err(|_| poisoned())?;
        Ok(list
            .iter()
            .filter(|d| d.company_id == company_id && d.vendor_id == vendor_id)
            .cloned()
            .collect())
    }

    fn price_window(
        &self,
        company_id: CompanyId,
        item_id: ItemId,
        limit: usize,
    ) -> DomainResult<Vec<PricePoint>> {
        let list = self.price_points.read().map_err(|_| poisoned())?;
        let mut points: Vec<PricePoint> = list
            .iter()
            .filter(|p| p.company_id == company_id && p.item_id == item_id)
            .cloned()
            .collect();
        // Most recent `limit`, handed back in chronological order.
        points.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        points.truncate(limit);
        points.reverse();
        Ok(points)
    }

    fn price_history_since(
        &self,
        company_id: CompanyId,
        item_id: ItemId,
        since: DateTime<Utc>,
    ) -> DomainResult<Vec<PricePoint>> {
        let list = self.price_points.read().map_err(|_| poisoned())?;
        let mut points: Vec<PricePoint> = list
            .iter()
            .filter(|p| {
                p.company_id == company_id && p.item_id == item_id && p.recorded_at >= since
            })
            .cloned()
            .collect();
        points.sort_by_key(|p| p.recorded_at);
        Ok(points)
    }
}

impl ExtractionStore for InMemoryProcurementStore {
    fn insert(&self, record: ExtractionRecord) -> DomainResult<()> {
        let mut map = self.extractions.write().map_err(|_| poisoned())?;
        let key = (record.company_id, record.id);
        if map.contains_key(&key) {
            return Err(DomainError::conflict("extraction record already exists"));
        }
        map.insert(key, record);
        Ok(())
    }

    fn get(
        &self,
        company_id: CompanyId,
        id: ExtractionId,
    ) -> DomainResult<Option<ExtractionRecord>> {
        let map = self.extractions.read().map_err(|_| poisoned())?;
        Ok(map.get(&(company_id, id)).cloned())
    }

    fn update(&self, record: &ExtractionRecord) -> DomainResult<()> {
        let mut map = self.extractions.write().map_err(|_| poisoned())?;
        let key = (record.company_id, record.id);
        if !map.contains_key(&key) {
            return Err(DomainError::NotFound);
        }
        map.insert(key, record.clone());
        Ok(())
    }
}

impl AnomalyStore for InMemoryProcurementStore {
    fn insert_anomaly(&self, record: PriceAnomalyRecord) -> DomainResult<()> {
        let mut map = self.anomalies.write().map_err(|_| poisoned())?;
        let key = (record.company_id, record.id);
        if map.contains_key(&key) {
            return Err(DomainError::conflict("anomaly record already exists"));
        }
        map.insert(key, record);
        Ok(())
    }

    fn anomaly(
        &self,
        company_id: CompanyId,
        id: AnomalyId,
    ) -> DomainResult<Option<PriceAnomalyRecord>> {
        let map = self.anomalies.read().map_err(|_| poisoned())?;
        Ok(map.get(&(company_id, id)).cloned())
    }

    fn update_anomaly(&self, record: &PriceAnomalyRecord) -> DomainResult<()> {
        let mut map = self.anomalies.write().map_err(|_| poisoned())?;
        let key = (record.company_id, record.id);
        if !map.contains_key(&key) {
            return Err(DomainError::NotFound);
        }
        map.insert(key, record.clone());
        Ok(())
    }
}

impl ForecastStore for InMemoryProcurementStore {
    fn insert_forecast(&self, record: PriceForecastRecord) -> DomainResult<()> {
        let mut list = self.forecasts.write().map_err(|_| poisoned())?;
        list.push(record);
        Ok(())
    }
}

impl ScoreStore for InMemoryProcurementStore {
    fn upsert_score(&self, record: VendorScoreRecord) -> DomainResult<()> {
        let mut map = self.scores.write().map_err(|_| poisoned())?;
        // Last-write-wins, keyed (vendor, company).
        map.insert((record.company_id, record.vendor_id), record);
        Ok(())
    }

    fn score(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
    ) -> DomainResult<Option<VendorScoreRecord>> {
        let map = self.scores.read().map_err(|_| poisoned())?;
        Ok(map.get(&(company_id, vendor_id)).cloned())
    }
}

impl RecommendationStore for InMemoryProcurementStore {
    fn insert_recommendations(&self, records: &[RecommendationRecord]) -> DomainResult<()> {
        let mut map = self.recommendations.write().map_err(|_| poisoned())?;
        for record in records {
            map.insert((record.company_id, record.id), record.clone());
        }
        Ok(())
    }

    fn recommendation(
        &self,
        company_id: CompanyId,
        id: RecommendationId,
    ) -> DomainResult<Option<RecommendationRecord>> {
        let map = self.recommendations.read().map_err(|_| poisoned())?;
        Ok(map.get(&(company_id, id)).cloned())
    }

    fn update_recommendation(&self, record: &RecommendationRecord) -> DomainResult<()> {
        let mut map = self.recommendations.write().map_err(|_| poisoned())?;
        let key = (record.company_id, record.id);
        if !map.contains_key(&key) {
            return Err(DomainError::NotFound);
        }
        map.insert(key, record.clone());
        Ok(())
    }
}

impl SessionStore for InMemoryProcurementStore {
    fn insert_session(&self, session: NegotiationSession) -> DomainResult<()> {
        let mut map = self.sessions.write().map_err(|_| poisoned())?;
        let key = (session.company_id, session.id);
        if map.contains_key(&key) {
            return Err(DomainError::conflict("negotiation session already exists"));
        }
        map.insert(key, session);
        Ok(())
    }

    fn session(
        &self,
        company_id: CompanyId,
        id: SessionId,
    ) -> DomainResult<Option<NegotiationSession>> {
        let map = self.sessions.read().map_err(|_| poisoned())?;
        Ok(map.get(&(company_id, id)).cloned())
    }

    fn update_session(&self, session: &NegotiationSession) -> DomainResult<()> {
        let mut map = self.sessions.write().map_err(|_| poisoned())?;
        let key = (session.company_id, session.id);
        if !map.contains_key(&key) {
            return Err(DomainError::NotFound);
        }
        map.insert(key, session.clone());
        Ok(())
    }

    fn accepted_sessions_for_vendor(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
        limit: usize,
    ) -> DomainResult<Vec<NegotiationSession>> {
        let map = self.sessions.read().map_err(|_| poisoned())?;
        let mut sessions: Vec<NegotiationSession> = map
            .values()
            .filter(|s| {
                s.company_id == company_id
                    && s.vendor_id == vendor_id
                    && s.status == NegotiationStatus::Accepted
            })
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        sessions.truncate(limit);
        Ok(sessions)
    }
}
