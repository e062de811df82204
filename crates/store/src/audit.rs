//! In-memory audit sink for tests/dev.

use std::sync::Mutex;

use procureiq_core::{AuditEntry, AuditSink};

#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl AuditSink for InMemoryAuditLog {
    fn record(&self, entry: AuditEntry) {
        // Fire-and-forget: a poisoned lock drops the entry.
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }
}
