//! Vendor recommendation ranking.
//!
//! Per active vendor: a relevance grade (quoted the requested items → 100,
//! quoted the same category → 70, otherwise 30), the performance score
//! (fetched, or computed lazily when missing), and an urgency multiplier.
//! The top ten by final score are persisted for audit and returned.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use procureiq_core::{AuditEntry, AuditSink, CompanyId, DomainError, DomainResult, RecordId};
use procureiq_procurement::{Item, ItemId, ProcurementReader, Vendor, VendorId};

use crate::scoring::{ScoreStore, VendorScoreRecord, VendorScoringEngine};

/// Recommendation record identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationId(pub RecordId);

impl RecommendationId {
    pub fn generate() -> Self {
        Self(RecordId::new())
    }
}

impl core::fmt::Display for RecommendationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// How urgently the requested items are needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

/// A recommendation request.
#[derive(Debug, Clone)]
pub struct RecommendRequest {
    pub item_ids: Vec<ItemId>,
    pub quantity: Option<f64>,
    pub urgency: Urgency,
}

impl RecommendRequest {
    pub fn for_items(item_ids: Vec<ItemId>) -> Self {
        Self {
            item_ids,
            quantity: None,
            urgency: Urgency::default(),
        }
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }
}

/// The factor breakdown persisted with each recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationFactors {
    pub price_competitiveness: f64,
    pub delivery_reliability: f64,
    pub quality_record: f64,
    pub response_time: f64,
    pub relevance: f64,
}

/// One ranked recommendation, persisted for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub id: RecommendationId,
    pub company_id: CompanyId,
    /// Anchor item of the request (its first item).
    pub item_ref: ItemId,
    pub vendor_ref: VendorId,
    /// 1-based position in the ranked batch.
    pub rank: u32,
    pub score: f64,
    pub reason: String,
    pub factors: RecommendationFactors,
    /// Set later, once, by the caller that acted on the recommendation.
    pub is_selected: bool,
    pub created_at: chrono::DateTime<Utc>,
}

/// Persistence port for recommendation batches.
pub trait RecommendationStore: Send + Sync {
    fn insert_recommendations(&self, records: &[RecommendationRecord]) -> DomainResult<()>;

    fn recommendation(
        &self,
        company_id: CompanyId,
        id: RecommendationId,
    ) -> DomainResult<Option<RecommendationRecord>>;

    fn update_recommendation(&self, record: &RecommendationRecord) -> DomainResult<()>;
}

impl<S> RecommendationStore for Arc<S>
where
    S: RecommendationStore + ?Sized,
{
    fn insert_recommendations(&self, records: &[RecommendationRecord]) -> DomainResult<()> {
        (**self).insert_recommendations(records)
    }

    fn recommendation(
        &self,
        company_id: CompanyId,
        id: RecommendationId,
    ) -> DomainResult<Option<RecommendationRecord>> {
        (**self).recommendation(company_id, id)
    }

    fn update_recommendation(&self, record: &RecommendationRecord) -> DomainResult<()> {
        (**self).update_recommendation(record)
    }
}

#[derive(Debug, Clone)]
pub struct RecommendConfig {
    /// How many ranked vendors are persisted and returned.
    pub top_n: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self { top_n: 10 }
    }
}

pub struct VendorRecommendationRanker<S> {
    store: S,
    scoring: VendorScoringEngine<S>,
    audit: Arc<dyn AuditSink>,
    config: RecommendConfig,
}

impl<S> VendorRecommendationRanker<S>
where
    S: ProcurementReader + ScoreStore + RecommendationStore,
{
    pub fn new(store: S, scoring: VendorScoringEngine<S>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            store,
            scoring,
            audit,
            config: RecommendConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RecommendConfig) -> Self {
        self.config = config;
        self
    }

    /// Rank active vendors for the requested items and persist the top
    /// batch.
    pub fn recommend(
        &self,
        company_id: CompanyId,
        request: &RecommendRequest,
    ) -> DomainResult<Vec<RecommendationRecord>> {
        if request.item_ids.is_empty() {
            return Err(DomainError::validation("at least one item is required"));
        }
        let mut items = Vec::with_capacity(request.item_ids.len());
        for &item_id in &request.item_ids {
            items.push(
                self.store
                    .item(company_id, item_id)?
                    .ok_or(DomainError::NotFound)?,
            );
        }

        let mut candidates = Vec::new();
        for vendor in self.store.active_vendors(company_id)? {
            let relevance = self.relevance(company_id, &vendor, &items)?;
            let score = match self.store.score(company_id, vendor.id)? {
                Some(score) => score,
                None => self.scoring.calculate_score(company_id, vendor.id)?,
            };
            let multiplier = urgency_multiplier(request.urgency, &score);
            let final_score = (score.overall_score * 0.5 + relevance * 0.5) * multiplier;
            let reason = build_reason(&vendor, &items, relevance, &score, request.urgency);

            candidates.push(RecommendationRecord {
                id: RecommendationId::generate(),
                company_id,
                item_ref: request.item_ids[0],
                vendor_ref: vendor.id,
                rank: 0, // assigned after sorting
                score: final_score,
                reason,
                factors: RecommendationFactors {
                    price_competitiveness: score.price_score,
                    delivery_reliability: score.delivery_score,
                    quality_record: score.quality_score,
                    response_time: score.response_score,
                    relevance,
                },
                is_selected: false,
                created_at: Utc::now(),
            });
        }

        // Descending by score; ties break by vendor id so output is
        // deterministic for a given store state.
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.vendor_ref.cmp(&b.vendor_ref))
        });
        candidates.truncate(self.config.top_n);
        for (i, record) in candidates.iter_mut().enumerate() {
            record.rank = (i + 1) as u32;
        }

        self.store.insert_recommendations(&candidates)?;
        self.audit.record(AuditEntry {
            company_id,
            actor_id: None,
            action: "vendor.recommended".to_string(),
            entity_type: "recommendation".to_string(),
            entity_id: request.item_ids[0].to_string(),
            metadata: json!({
                "vendors_ranked": candidates.len(),
                "urgency": request.urgency,
            }),
            occurred_at: Utc::now(),
        });

        Ok(candidates)
    }

    /// Record that the caller acted on a recommendation. One-shot.
    pub fn mark_selected(
        &self,
        company_id: CompanyId,
        id: RecommendationId,
    ) -> DomainResult<RecommendationRecord> {
        let mut record = self
            .store
            .recommendation(company_id, id)?
            .ok_or(DomainError::NotFound)?;
        if record.is_selected {
            return Err(DomainError::conflict("recommendation already selected"));
        }
        record.is_selected = true;
        self.store.update_recommendation(&record)?;
        Ok(record)
    }

    /// 100 for a vendor that has quoted an RFQ containing a requested
    /// item, 70 for one that has quoted within a requested category, 30
    /// otherwise.
    fn relevance(
        &self,
        company_id: CompanyId,
        vendor: &Vendor,
        items: &[Item],
    ) -> DomainResult<f64> {
        let quotes = self
            .store
            .recent_quotes_for_vendor(company_id, vendor.id, 50)?;
        if quotes.is_empty() {
            return Ok(30.0);
        }

        let requested_ids: Vec<ItemId> = items.iter().map(|i| i.id).collect();
        let requested_categories: Vec<&str> = items
            .iter()
            .filter_map(|i| i.category.as_deref())
            .collect();

        let mut same_category = false;
        for quote in &quotes {
            let Some(rfq) = self.store.rfq(company_id, quote.rfq_id)? else {
                continue;
            };
            if rfq.item_ids.iter().any(|id| requested_ids.contains(id)) {
                return Ok(100.0);
            }
            if !same_category && !requested_categories.is_empty() {
                for &rfq_item in &rfq.item_ids {
                    if let Some(item) = self.store.item(company_id, rfq_item)? {
                        if item
                            .category
                            .as_deref()
                            .is_some_and(|c| requested_categories.contains(&c))
                        {
                            same_category = true;
                            break;
                        }
                    }
                }
            }
        }

        if same_category {
            Ok(70.0)
        } else {
            debug!(vendor = %vendor.id, "no quoting history overlaps the request");
            Ok(30.0)
        }
    }
}

/// High urgency favors fast movers, low urgency favors price, medium is
/// neutral.
fn urgency_multiplier(urgency: Urgency, score: &VendorScoreRecord) -> f64 {
    match urgency {
        Urgency::High => (score.response_score + score.delivery_score) / 200.0,
        Urgency::Low => score.price_score / 100.0,
        Urgency::Medium => 1.0,
    }
}

fn build_reason(
    vendor: &Vendor,
    items: &[Item],
    relevance: f64,
    score: &VendorScoreRecord,
    urgency: Urgency,
) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if relevance >= 100.0 {
        parts.push("has quoted the requested item(s) before");
    }
    if score.delivery_score >= 90.0 {
        parts.push("reliable delivery track record");
    }
    if score.price_score >= 80.0 {
        parts.push("high quote approval rate");
    }
    if score.quality_score >= 95.0 {
        parts.push("excellent quality record");
    }
    if urgency == Urgency::High && score.response_score >= 80.0 {
        parts.push("fast response times");
    }
    if items.iter().any(|item| vendor.supplies(&item.name)) {
        parts.push("supplies the requested materials");
    }

    if parts.is_empty() {
        "ranked by overall performance".to_string()
    } else {
        parts.join("; ")
    }
}
