use chrono::{DateTime, Utc};
use procureiq_core::CompanyId;
use serde::{Deserialize, Serialize};

use crate::ids::{QuoteId, RfqId, VendorId};

/// Quote status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Submitted,
    Approved,
    Rejected,
}

/// Vendor quote snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub company_id: CompanyId,
    pub rfq_id: RfqId,
    pub vendor_id: VendorId,
    /// All-in comparable value: base price + GST + transport/freight.
    pub landed_cost: f64,
    pub status: QuoteStatus,
    pub submitted_at: DateTime<Utc>,
}

impl Quote {
    pub fn is_approved(&self) -> bool {
        self.status == QuoteStatus::Approved
    }
}
