//! Price anomaly detection.
//!
//! Baseline priority for the expected price:
//! 1. mean of the other quotes on the same RFQ, when any exist;
//! 2. mean of the item's price history over the trailing window, usable
//!    only when the RFQ has exactly one line item;
//! 3. the quote's own landed cost (deviation collapses to 0).

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use procureiq_ai::{AiCapability, TextRequest};
use procureiq_core::{
    AuditEntry, AuditSink, CompanyId, DomainError, DomainResult, RecordId, mean,
};
use procureiq_procurement::{ProcurementReader, Quote, QuoteId, Vendor};

/// Anomaly record identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnomalyId(pub RecordId);

impl AnomalyId {
    pub fn generate() -> Self {
        Self(RecordId::new())
    }
}

impl core::fmt::Display for AnomalyId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Severity bucket for a price deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalySeverity {
    Normal,
    High,
    ExtremelyHigh,
}

/// Persisted anomaly. Only non-`Normal` detections are persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAnomalyRecord {
    pub id: AnomalyId,
    pub company_id: CompanyId,
    pub quote_id: QuoteId,
    pub detected_price: f64,
    pub expected_price: f64,
    pub deviation_pct: f64,
    pub severity: AnomalySeverity,
    pub explanation: String,
    /// One-way flag: set once by a reviewer, never cleared.
    pub acknowledged: bool,
    pub created_at: chrono::DateTime<Utc>,
}

/// Persistence port for anomaly records.
pub trait AnomalyStore: Send + Sync {
    fn insert_anomaly(&self, record: PriceAnomalyRecord) -> DomainResult<()>;

    fn anomaly(&self, company_id: CompanyId, id: AnomalyId)
    -> DomainResult<Option<PriceAnomalyRecord>>;

    fn update_anomaly(&self, record: &PriceAnomalyRecord) -> DomainResult<()>;
}

impl<S> AnomalyStore for Arc<S>
where
    S: AnomalyStore + ?Sized,
{
    fn insert_anomaly(&self, record: PriceAnomalyRecord) -> DomainResult<()> {
        (**self).insert_anomaly(record)
    }

    fn anomaly(
        &self,
        company_id: CompanyId,
        id: AnomalyId,
    ) -> DomainResult<Option<PriceAnomalyRecord>> {
        (**self).anomaly(company_id, id)
    }

    fn update_anomaly(&self, record: &PriceAnomalyRecord) -> DomainResult<()> {
        (**self).update_anomaly(record)
    }
}

/// Detection thresholds.
#[derive(Debug, Clone)]
pub struct AnomalyConfig {
    /// Deviations above this (exclusive) are at least `High`.
    pub high_threshold_pct: f64,
    /// Deviations above this (exclusive) are `ExtremelyHigh`.
    pub extreme_threshold_pct: f64,
    /// Trailing window for the price-history baseline.
    pub history_days: i64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            high_threshold_pct: 10.0,
            extreme_threshold_pct: 25.0,
            history_days: 180,
        }
    }
}

/// Classify a deviation percentage. Boundaries are exact: 10.0 is still
/// `Normal`, 25.0 is still `High`.
pub fn classify_deviation(deviation_pct: f64, config: &AnomalyConfig) -> AnomalySeverity {
    if deviation_pct > config.extreme_threshold_pct {
        AnomalySeverity::ExtremelyHigh
    } else if deviation_pct > config.high_threshold_pct {
        AnomalySeverity::High
    } else {
        AnomalySeverity::Normal
    }
}

pub struct PriceAnomalyDetector<S> {
    store: S,
    capability: Arc<dyn AiCapability>,
    audit: Arc<dyn AuditSink>,
    config: AnomalyConfig,
}

enum Baseline {
    PeerQuotes { count: usize, average: f64 },
    PriceHistory { count: usize, average: f64 },
    SelfReference,
}

impl<S> PriceAnomalyDetector<S>
where
    S: ProcurementReader + AnomalyStore,
{
    pub fn new(store: S, capability: Arc<dyn AiCapability>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            store,
            capability,
            audit,
            config: AnomalyConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnomalyConfig) -> Self {
        self.config = config;
        self
    }

    /// Detect whether a quote's landed cost deviates anomalously from its
    /// baseline. Returns the persisted record for non-`Normal` severities,
    /// `None` otherwise.
    pub fn detect(
        &self,
        company_id: CompanyId,
        quote_id: QuoteId,
    ) -> DomainResult<Option<PriceAnomalyRecord>> {
        let quote = self
            .store
            .quote(company_id, quote_id)?
            .ok_or(DomainError::NotFound)?;

        let (expected, baseline) = self.expected_price(&quote)?;
        let deviation_pct = if expected.abs() < f64::EPSILON {
            0.0
        } else {
            (quote.landed_cost - expected) / expected * 100.0
        };

        let severity = classify_deviation(deviation_pct, &self.config);
        if severity == AnomalySeverity::Normal {
            return Ok(None);
        }

        let vendor = self.store.vendor(company_id, quote.vendor_id)?;
        let explanation = self.build_explanation(&quote, vendor.as_ref(), expected, deviation_pct, &baseline);

        let record = PriceAnomalyRecord {
            id: AnomalyId::generate(),
            company_id,
            quote_id,
            detected_price: quote.landed_cost,
            expected_price: expected,
            deviation_pct,
            severity,
            explanation,
            acknowledged: false,
            created_at: Utc::now(),
        };
        self.store.insert_anomaly(record.clone())?;

        self.audit.record(AuditEntry {
            company_id,
            actor_id: None,
            action: "price_anomaly.detected".to_string(),
            entity_type: "price_anomaly".to_string(),
            entity_id: record.id.to_string(),
            metadata: json!({
                "quote_id": quote_id,
                "severity": record.severity,
                "deviation_pct": record.deviation_pct,
            }),
            occurred_at: Utc::now(),
        });

        Ok(Some(record))
    }

    /// Mark an anomaly as reviewed. One-way and idempotent.
    pub fn acknowledge(
        &self,
        company_id: CompanyId,
        id: AnomalyId,
    ) -> DomainResult<PriceAnomalyRecord> {
        let mut record = self
            .store
            .anomaly(company_id, id)?
            .ok_or(DomainError::NotFound)?;
        if !record.acknowledged {
            record.acknowledged = true;
            self.store.update_anomaly(&record)?;
        }
        Ok(record)
    }

    fn expected_price(&self, quote: &Quote) -> DomainResult<(f64, Baseline)> {
        let peers: Vec<f64> = self
            .store
            .quotes_for_rfq(quote.company_id, quote.rfq_id)?
            .into_iter()
            .filter(|q| q.id != quote.id)
            .map(|q| q.landed_cost)
            .collect();
        if !peers.is_empty() {
            return Ok((
                mean(&peers),
                Baseline::PeerQuotes {
                    count: peers.len(),
                    average: mean(&peers),
                },
            ));
        }

        let rfq = self
            .store
            .rfq(quote.company_id, quote.rfq_id)?
            .ok_or(DomainError::NotFound)?;
        if rfq.is_single_item() {
            let since = Utc::now() - Duration::days(self.config.history_days);
            let history: Vec<f64> = self
                .store
                .price_history_since(quote.company_id, rfq.item_ids[0], since)?
                .into_iter()
                .map(|p| p.price)
                .collect();
            if !history.is_empty() {
                return Ok((
                    mean(&history),
                    Baseline::PriceHistory {
                        count: history.len(),
                        average: mean(&history),
                    },
                ));
            }
        }

        Ok((quote.landed_cost, Baseline::SelfReference))
    }

    fn build_explanation(
        &self,
        quote: &Quote,
        vendor: Option<&Vendor>,
        expected: f64,
        deviation_pct: f64,
        baseline: &Baseline,
    ) -> String {
        let vendor_name = vendor.map(|v| v.name.as_str()).unwrap_or("The vendor");
        let basis = match baseline {
            Baseline::PeerQuotes { count, average } => {
                format!("{count} peer quote(s) on the same RFQ averaging {average:.2}")
            }
            Baseline::PriceHistory { count, average } => {
                format!("{count} recent price history entr(ies) averaging {average:.2}")
            }
            Baseline::SelfReference => "no comparable baseline".to_string(),
        };
        let template = format!(
            "{vendor_name} quoted {:.2} against an expected {expected:.2} \
             ({deviation_pct:+.1}% deviation), based on {basis}.",
            quote.landed_cost
        );

        if !self.capability.is_available() {
            return template;
        }

        let request = TextRequest::new(
            "anomaly.explanation",
            format!(
                "Write a 2-3 sentence explanation of this procurement price anomaly \
                 for a purchasing manager.\nVendor: {vendor_name}\nQuoted landed cost: {:.2}\n\
                 Expected price: {expected:.2}\nDeviation: {deviation_pct:+.1}%\nBaseline: {basis}",
                quote.landed_cost
            ),
        );
        match self.capability.generate_text(&request) {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => template,
            Err(err) => {
                // Explanation generation must never fail the detection.
                debug!(%err, "anomaly explanation generation failed, keeping template");
                template
            }
        }
    }
}
