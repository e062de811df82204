//! Vendor performance scoring.
//!
//! Five sub-scores in `[0, 100]` over the vendor's recent activity window,
//! blended into a weighted overall score and a coarse A/B/C tier. The
//! explanation is templated from fixed thresholds; this engine never calls
//! the generative model.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use procureiq_core::{
    AuditEntry, AuditSink, CompanyId, DomainError, DomainResult, mean, stddev_sample,
};
use procureiq_procurement::{Delivery, ProcurementReader, Quote, VendorId};

/// Coarse vendor quality bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VendorTier {
    A,
    B,
    C,
}

/// Tier boundaries are exact: 80.0 is an A, 79.999… is a B.
pub fn tier_for(overall_score: f64) -> VendorTier {
    if overall_score >= 80.0 {
        VendorTier::A
    } else if overall_score >= 60.0 {
        VendorTier::B
    } else {
        VendorTier::C
    }
}

/// Current performance score for a vendor. At most one per
/// (vendor, company); recalculation overwrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorScoreRecord {
    pub vendor_id: VendorId,
    pub company_id: CompanyId,
    pub overall_score: f64,
    pub tier: VendorTier,
    pub delivery_score: f64,
    pub price_score: f64,
    pub quality_score: f64,
    pub response_score: f64,
    pub consistency_score: f64,
    /// Observations the score was computed from.
    pub data_points: usize,
    pub explanation: String,
    /// Advisory freshness horizon; nothing expires mechanically, callers
    /// re-request calculation.
    pub valid_until: DateTime<Utc>,
    pub calculated_at: DateTime<Utc>,
}

/// Upsert-keyed persistence port for score records.
pub trait ScoreStore: Send + Sync {
    /// Last-write-wins upsert keyed by (vendor, company).
    fn upsert_score(&self, record: VendorScoreRecord) -> DomainResult<()>;

    fn score(&self, company_id: CompanyId, vendor_id: VendorId)
    -> DomainResult<Option<VendorScoreRecord>>;
}

impl<S> ScoreStore for Arc<S>
where
    S: ScoreStore + ?Sized,
{
    fn upsert_score(&self, record: VendorScoreRecord) -> DomainResult<()> {
        (**self).upsert_score(record)
    }

    fn score(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
    ) -> DomainResult<Option<VendorScoreRecord>> {
        (**self).score(company_id, vendor_id)
    }
}

/// Sub-score weights; must sum to 1.
#[derive(Debug, Clone)]
pub struct ScoreWeights {
    pub delivery: f64,
    pub price: f64,
    pub quality: f64,
    pub response: f64,
    pub consistency: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            delivery: 0.30,
            price: 0.25,
            quality: 0.25,
            response: 0.10,
            consistency: 0.10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Most recent quotes considered.
    pub quote_window: usize,
    /// Most recent purchase orders considered.
    pub order_window: usize,
    /// Days past the expected date a delivery still counts as on time.
    pub on_time_grace_days: i64,
    /// Response days assumed when the vendor has no quotes yet.
    pub default_response_days: f64,
    pub validity_days: i64,
    pub weights: ScoreWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            quote_window: 50,
            order_window: 50,
            on_time_grace_days: 2,
            default_response_days: 3.0,
            validity_days: 30,
            weights: ScoreWeights::default(),
        }
    }
}

pub struct VendorScoringEngine<S> {
    store: S,
    audit: Arc<dyn AuditSink>,
    config: ScoringConfig,
}

impl<S> VendorScoringEngine<S>
where
    S: ProcurementReader + ScoreStore,
{
    pub fn new(store: S, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            store,
            audit,
            config: ScoringConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScoringConfig) -> Self {
        self.config = config;
        self
    }

    /// Compute and upsert the vendor's score.
    pub fn calculate_score(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
    ) -> DomainResult<VendorScoreRecord> {
        self.store
            .vendor(company_id, vendor_id)?
            .ok_or(DomainError::NotFound)?;

        let quotes =
            self.store
                .recent_quotes_for_vendor(company_id, vendor_id, self.config.quote_window)?;
        let orders =
            self.store
                .recent_orders_for_vendor(company_id, vendor_id, self.config.order_window)?;
        let order_ids: Vec<_> = orders.iter().map(|o| o.id).collect();
        let deliveries: Vec<Delivery> = self
            .store
            .deliveries_for_vendor(company_id, vendor_id)?
            .into_iter()
            .filter(|d| order_ids.contains(&d.order_id))
            .collect();

        let delivery = delivery_score(&deliveries, self.config.on_time_grace_days);
        let price = price_score(&quotes);
        let quality = quality_score(&deliveries);
        let response = response_score(self.average_response_days(company_id, &quotes)?);
        let costs: Vec<f64> = quotes.iter().map(|q| q.landed_cost).collect();
        let consistency = consistency_score(&costs);

        let w = &self.config.weights;
        let overall = w.delivery * delivery
            + w.price * price
            + w.quality * quality
            + w.response * response
            + w.consistency * consistency;
        let tier = tier_for(overall);

        let now = Utc::now();
        let record = VendorScoreRecord {
            vendor_id,
            company_id,
            overall_score: overall,
            tier,
            delivery_score: delivery,
            price_score: price,
            quality_score: quality,
            response_score: response,
            consistency_score: consistency,
            data_points: quotes.len() + orders.len() + deliveries.len(),
            explanation: build_explanation(tier, delivery, price, quality, response, consistency),
            valid_until: now + Duration::days(self.config.validity_days),
            calculated_at: now,
        };
        self.store.upsert_score(record.clone())?;

        self.audit.record(AuditEntry {
            company_id,
            actor_id: None,
            action: "vendor.score_calculated".to_string(),
            entity_type: "vendor_score".to_string(),
            entity_id: vendor_id.to_string(),
            metadata: json!({ "overall_score": record.overall_score, "tier": record.tier }),
            occurred_at: now,
        });

        Ok(record)
    }

    /// Recalculate every active vendor sequentially. One vendor's failure
    /// is logged and skipped, not propagated; the returned records are the
    /// successes and their count is how callers observe partial
    /// completion.
    pub fn recalculate_all(&self, company_id: CompanyId) -> DomainResult<Vec<VendorScoreRecord>> {
        let vendors = self.store.active_vendors(company_id)?;
        let mut records = Vec::with_capacity(vendors.len());
        for vendor in vendors {
            match self.calculate_score(company_id, vendor.id) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(vendor = %vendor.id, error = %err, "score recalculation skipped");
                }
            }
        }
        Ok(records)
    }

    fn average_response_days(
        &self,
        company_id: CompanyId,
        quotes: &[Quote],
    ) -> DomainResult<f64> {
        if quotes.is_empty() {
            return Ok(self.config.default_response_days);
        }
        let mut days = Vec::with_capacity(quotes.len());
        for quote in quotes {
            if let Some(rfq) = self.store.rfq(company_id, quote.rfq_id)? {
                let gap = (quote.submitted_at - rfq.created_at).num_seconds() as f64 / 86_400.0;
                days.push(gap.max(0.0));
            }
        }
        if days.is_empty() {
            return Ok(self.config.default_response_days);
        }
        Ok(mean(&days))
    }
}

/// On-time ratio over received deliveries; 50 when there are none.
pub fn delivery_score(deliveries: &[Delivery], grace_days: i64) -> f64 {
    let verdicts: Vec<bool> = deliveries
        .iter()
        .filter_map(|d| d.is_on_time(grace_days))
        .collect();
    if verdicts.is_empty() {
        return 50.0;
    }
    let on_time = verdicts.iter().filter(|&&v| v).count();
    on_time as f64 / verdicts.len() as f64 * 100.0
}

/// Approval ratio over quotes; 50 when there are none.
pub fn price_score(quotes: &[Quote]) -> f64 {
    if quotes.is_empty() {
        return 50.0;
    }
    let approved = quotes.iter().filter(|q| q.is_approved()).count();
    approved as f64 / quotes.len() as f64 * 100.0
}

/// Non-rejection ratio over deliveries; 50 when there are none.
pub fn quality_score(deliveries: &[Delivery]) -> f64 {
    if deliveries.is_empty() {
        return 50.0;
    }
    let rejected = deliveries.iter().filter(|d| d.rejected).count();
    (deliveries.len() - rejected) as f64 / deliveries.len() as f64 * 100.0
}

/// 100 minus 15 points per average response day, floored at 0.
pub fn response_score(avg_response_days: f64) -> f64 {
    (100.0 - avg_response_days * 15.0).max(0.0)
}

/// 100 minus the coefficient of variation of quoted landed costs. One or
/// zero quotes (or zero variance) is perfectly consistent.
pub fn consistency_score(landed_costs: &[f64]) -> f64 {
    if landed_costs.len() <= 1 {
        return 100.0;
    }
    let avg = mean(landed_costs);
    if avg.abs() < f64::EPSILON {
        return 100.0;
    }
    let cov = stddev_sample(landed_costs) / avg * 100.0;
    (100.0 - cov).max(0.0)
}

fn build_explanation(
    tier: VendorTier,
    delivery: f64,
    price: f64,
    quality: f64,
    response: f64,
    consistency: f64,
) -> String {
    let mut clauses: Vec<&str> = Vec::new();
    if delivery >= 90.0 {
        clauses.push("excellent delivery performance");
    } else if delivery < 70.0 {
        clauses.push("delivery needs improvement");
    }
    if price >= 80.0 {
        clauses.push("high quote approval rate");
    } else if price < 70.0 {
        clauses.push("low quote approval rate");
    }
    if quality >= 95.0 {
        clauses.push("outstanding quality record");
    } else if quality < 70.0 {
        clauses.push("quality needs attention");
    }
    if response >= 80.0 {
        clauses.push("responds quickly to RFQs");
    }
    if consistency >= 90.0 {
        clauses.push("consistent pricing");
    }

    if clauses.is_empty() {
        format!("Tier {tier:?} vendor with average performance across all factors.")
    } else {
        format!("Tier {tier:?} vendor: {}.", clauses.join(", "))
    }
}
