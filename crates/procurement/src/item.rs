use procureiq_core::CompanyId;
use serde::{Deserialize, Serialize};

use crate::ids::ItemId;

/// Procured item snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub company_id: CompanyId,
    pub name: String,
    pub category: Option<String>,
}
