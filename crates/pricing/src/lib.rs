//! `procureiq-pricing` — price intelligence engines.
//!
//! Two engines over the same price data:
//! - [`anomaly`]: compares a quoted landed cost against peer/historical
//!   baselines and persists a severity-classified anomaly record.
//! - [`forecast`]: purely statistical trend prediction from an item's price
//!   history; no generative-model dependency at all.

pub mod anomaly;
pub mod forecast;

pub use anomaly::{
    AnomalyConfig, AnomalyId, AnomalySeverity, AnomalyStore, PriceAnomalyDetector,
    PriceAnomalyRecord, classify_deviation,
};
pub use forecast::{
    ForecastConfig, ForecastId, ForecastStore, PriceForecastEngine, PriceForecastRecord,
    PriceTrend,
};
