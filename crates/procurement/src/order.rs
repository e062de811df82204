use chrono::{DateTime, Utc};
use procureiq_core::CompanyId;
use serde::{Deserialize, Serialize};

use crate::ids::{PurchaseOrderId, QuoteId, VendorId};

/// Purchase order status lifecycle (linear, guarded outside this subsystem).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseOrderStatus {
    Open,
    Completed,
    Cancelled,
}

/// Purchase order snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    pub company_id: CompanyId,
    pub vendor_id: VendorId,
    /// Quote the order was raised from, when one exists.
    pub quote_id: Option<QuoteId>,
    pub status: PurchaseOrderStatus,
    pub created_at: DateTime<Utc>,
}
