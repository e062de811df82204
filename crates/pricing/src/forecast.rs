//! Statistical price forecasting.
//!
//! No generative-model dependency: an ordinary least-squares fit over the
//! item's recent price window, projected forward and annotated with
//! human-readable factors. Each data point is treated as roughly one week
//! apart when translating the horizon into observation indices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use procureiq_core::{CompanyId, DomainError, DomainResult, RecordId, mean, stddev_sample};
use procureiq_procurement::{ItemId, ProcurementReader};

/// Forecast record identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastId(pub RecordId);

impl ForecastId {
    pub fn generate() -> Self {
        Self(RecordId::new())
    }
}

impl core::fmt::Display for ForecastId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Forecast direction relative to the latest observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PriceTrend {
    Up,
    Down,
    Stable,
}

/// One forecast invocation. Append-only; superseded by newer records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceForecastRecord {
    pub id: ForecastId,
    pub company_id: CompanyId,
    pub item_id: ItemId,
    pub horizon_days: u32,
    pub predicted_price: f64,
    pub confidence_low: f64,
    pub confidence_high: f64,
    /// Confidence as a percentage, always within `[30, 95]`.
    pub confidence_pct: f64,
    pub trend: PriceTrend,
    pub data_points_used: usize,
    pub explanation_factors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Persistence port for forecast records.
pub trait ForecastStore: Send + Sync {
    fn insert_forecast(&self, record: PriceForecastRecord) -> DomainResult<()>;
}

impl<S> ForecastStore for std::sync::Arc<S>
where
    S: ForecastStore + ?Sized,
{
    fn insert_forecast(&self, record: PriceForecastRecord) -> DomainResult<()> {
        (**self).insert_forecast(record)
    }
}

#[derive(Debug, Clone)]
pub struct ForecastConfig {
    /// Maximum number of price points considered.
    pub window: usize,
    /// Observations below this short-circuit to a flat forecast.
    pub min_points: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window: 100,
            min_points: 3,
        }
    }
}

pub struct PriceForecastEngine<S> {
    store: S,
    config: ForecastConfig,
}

impl<S> PriceForecastEngine<S>
where
    S: ProcurementReader + ForecastStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: ForecastConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ForecastConfig) -> Self {
        self.config = config;
        self
    }

    /// Forecast an item's price `horizon_days` out and persist the record.
    pub fn forecast(
        &self,
        company_id: CompanyId,
        item_id: ItemId,
        horizon_days: u32,
    ) -> DomainResult<PriceForecastRecord> {
        if horizon_days == 0 {
            return Err(DomainError::validation("forecast horizon must be positive"));
        }

        let window = self
            .store
            .price_window(company_id, item_id, self.config.window)?;
        let prices: Vec<f64> = window.iter().map(|p| p.price).collect();

        let fit = fit_forecast(&prices, horizon_days, self.config.min_points);
        let spread = (1.0 - fit.confidence) / 2.0;

        let record = PriceForecastRecord {
            id: ForecastId::generate(),
            company_id,
            item_id,
            horizon_days,
            predicted_price: fit.predicted,
            confidence_low: fit.predicted * (1.0 - spread),
            confidence_high: fit.predicted * (1.0 + spread),
            confidence_pct: fit.confidence * 100.0,
            trend: fit.trend,
            data_points_used: prices.len(),
            explanation_factors: fit.factors,
            created_at: Utc::now(),
        };
        self.store.insert_forecast(record.clone())?;
        Ok(record)
    }

    /// Forecast a batch of items. Per-item failures are logged and
    /// skipped; the returned records are the successes, and their count is
    /// how callers observe partial completion.
    pub fn forecast_many(
        &self,
        company_id: CompanyId,
        item_ids: &[ItemId],
        horizon_days: u32,
    ) -> Vec<PriceForecastRecord> {
        let mut records = Vec::with_capacity(item_ids.len());
        for &item_id in item_ids {
            match self.forecast(company_id, item_id, horizon_days) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(item = %item_id, error = %err, "forecast skipped");
                }
            }
        }
        records
    }
}

struct ForecastFit {
    predicted: f64,
    trend: PriceTrend,
    confidence: f64,
    factors: Vec<String>,
}

/// Fit a forecast over a chronological (oldest → newest) price window.
fn fit_forecast(prices: &[f64], horizon_days: u32, min_points: usize) -> ForecastFit {
    let n = prices.len();
    if n < min_points {
        return ForecastFit {
            predicted: prices.last().copied().unwrap_or(0.0),
            trend: PriceTrend::Stable,
            confidence: 0.3,
            factors: vec![format!(
                "insufficient data ({n} observation(s)); holding at the current price"
            )],
        };
    }

    let (slope, intercept) = linear_fit(prices);
    let steps_ahead = (horizon_days as f64 / 7.0).ceil();
    let forecast_index = n as f64 + steps_ahead;
    let predicted = (intercept + slope * forecast_index).max(0.0);

    let avg = mean(prices);
    let volatility = if avg.abs() < f64::EPSILON {
        0.0
    } else {
        stddev_sample(prices) / avg
    };

    let latest = prices[n - 1];
    let change = if latest.abs() < f64::EPSILON {
        0.0
    } else {
        (predicted - latest) / latest
    };
    let trend = if change > 0.05 {
        PriceTrend::Up
    } else if change < -0.05 {
        PriceTrend::Down
    } else {
        PriceTrend::Stable
    };

    let mut confidence: f64 = 0.7;
    if n < 10 {
        confidence -= 0.2;
    }
    if volatility > 0.2 {
        confidence -= 0.1;
    }
    if volatility > 0.3 {
        confidence -= 0.1;
    }
    if n > 50 {
        confidence += 0.1;
    }
    let confidence = confidence.clamp(0.3, 0.95);

    let mut factors = Vec::new();
    factors.push(match trend {
        PriceTrend::Up => format!("prices trending upward ({:+.1}% vs latest)", change * 100.0),
        PriceTrend::Down => format!("prices trending downward ({:+.1}% vs latest)", change * 100.0),
        PriceTrend::Stable => "prices stable within ±5% of the latest observation".to_string(),
    });
    if volatility > 0.2 {
        factors.push(format!(
            "high price volatility ({:.0}% of the mean)",
            volatility * 100.0
        ));
    }
    let tail = n.min(5);
    let recent_avg = mean(&prices[n - tail..]);
    let older_avg = mean(&prices[..tail]);
    if older_avg.abs() > f64::EPSILON && ((recent_avg - older_avg) / older_avg).abs() > 0.10 {
        factors.push(format!(
            "recent average ({recent_avg:.2}) differs from older average ({older_avg:.2}) by more than 10%"
        ));
    }
    factors.push(format!("based on {n} price observation(s)"));

    ForecastFit {
        predicted,
        trend,
        confidence,
        factors,
    }
}

/// Ordinary least squares over observation index 0..n.
fn linear_fit(ys: &[f64]) -> (f64, f64) {
    let n = ys.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = mean(ys);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }
    if sxx.abs() < f64::EPSILON {
        return (0.0, mean_y);
    }
    let slope = sxy / sxx;
    (slope, mean_y - slope * mean_x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Confidence stays clamped to [0.3, 0.95] for any input series.
        #[test]
        fn confidence_always_clamped(
            prices in proptest::collection::vec(0.01f64..1_000_000.0, 0..120),
            horizon in 1u32..720
        ) {
            let fit = fit_forecast(&prices, horizon, 3);
            prop_assert!(fit.confidence >= 0.3 && fit.confidence <= 0.95);
        }

        /// The projected price is never negative.
        #[test]
        fn prediction_never_negative(
            prices in proptest::collection::vec(0.01f64..10_000.0, 3..60),
            horizon in 1u32..365
        ) {
            let fit = fit_forecast(&prices, horizon, 3);
            prop_assert!(fit.predicted >= 0.0);
        }
    }
}
