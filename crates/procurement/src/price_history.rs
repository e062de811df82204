use chrono::{DateTime, Utc};
use procureiq_core::CompanyId;
use serde::{Deserialize, Serialize};

use crate::ids::ItemId;

/// One observed price for an item (from approved quotes, POs or manual entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub item_id: ItemId,
    pub company_id: CompanyId,
    pub price: f64,
    pub recorded_at: DateTime<Utc>,
}
