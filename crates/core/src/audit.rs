//! Audit sink boundary.
//!
//! Engines record an audit entry after each state-changing operation. The
//! write is fire-and-forget: implementations must swallow their own
//! failures (log at most), and the trait signature makes it impossible for
//! an audit problem to fail the primary operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::id::{CompanyId, UserId};

/// One audit trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub company_id: CompanyId,
    /// Actor that triggered the operation, when known.
    pub actor_id: Option<UserId>,
    /// Verb, e.g. `"document.extracted"` or `"vendor.score_calculated"`.
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub metadata: JsonValue,
    pub occurred_at: DateTime<Utc>,
}

/// Write-only audit sink.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: AuditEntry);
}

impl<S> AuditSink for std::sync::Arc<S>
where
    S: AuditSink + ?Sized,
{
    fn record(&self, entry: AuditEntry) {
        (**self).record(entry)
    }
}

/// Sink that drops every entry. Useful where audit is not wired up.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _entry: AuditEntry) {}
}
