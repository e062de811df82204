use chrono::{DateTime, Utc};
use procureiq_core::CompanyId;
use serde::{Deserialize, Serialize};

use crate::ids::{ItemId, RfqId};

/// Request-for-quotation snapshot: a bundle of items sent to vendors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rfq {
    pub id: RfqId,
    pub company_id: CompanyId,
    pub item_ids: Vec<ItemId>,
    pub created_at: DateTime<Utc>,
}

impl Rfq {
    /// Whether the RFQ covers exactly one line item.
    ///
    /// The anomaly baseline may only fall back to an item's price history
    /// when this holds, otherwise history entries are not comparable to the
    /// multi-line landed cost.
    pub fn is_single_item(&self) -> bool {
        self.item_ids.len() == 1
    }
}
