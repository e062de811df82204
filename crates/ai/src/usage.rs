//! Usage bookkeeping for generative-model calls.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// One recorded provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiUsageRecord {
    pub feature: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub latency_ms: u64,
    pub success: bool,
    pub error: Option<String>,
    pub metadata: JsonValue,
    pub occurred_at: DateTime<Utc>,
}

/// Write side: fire-and-forget. Implementations swallow their own failures
/// (log at most); the signature guarantees a usage problem cannot fail the
/// calling engine.
pub trait UsageSink: Send + Sync {
    fn record(&self, record: AiUsageRecord);
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageStatsError {
    #[error("usage store unavailable: {0}")]
    Unavailable(String),
}

/// Per-feature aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureStats {
    pub calls: u64,
    pub failures: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Aggregated usage across all features.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_calls: u64,
    pub successes: u64,
    pub failures: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub by_feature: BTreeMap<String, FeatureStats>,
}

/// Read side: the one gateway operation that may legitimately fail a
/// caller.
pub trait UsageReporter: Send + Sync {
    fn stats(&self) -> Result<UsageStats, UsageStatsError>;
}

/// In-memory usage log for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUsageLog {
    records: Mutex<Vec<AiUsageRecord>>,
}

impl InMemoryUsageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<AiUsageRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl UsageSink for InMemoryUsageLog {
    fn record(&self, record: AiUsageRecord) {
        // A poisoned lock means a test already panicked; drop the entry
        // rather than propagate.
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}

impl UsageReporter for InMemoryUsageLog {
    fn stats(&self) -> Result<UsageStats, UsageStatsError> {
        let records = self
            .records
            .lock()
            .map_err(|_| UsageStatsError::Unavailable("usage log poisoned".to_string()))?;

        let mut stats = UsageStats::default();
        for record in records.iter() {
            stats.total_calls += 1;
            if record.success {
                stats.successes += 1;
            } else {
                stats.failures += 1;
            }
            stats.input_tokens += record.input_tokens;
            stats.output_tokens += record.output_tokens;

            let feature = stats.by_feature.entry(record.feature.clone()).or_default();
            feature.calls += 1;
            if !record.success {
                feature.failures += 1;
            }
            feature.input_tokens += record.input_tokens;
            feature.output_tokens += record.output_tokens;
        }
        Ok(stats)
    }
}
