use procureiq_core::CompanyId;
use serde::{Deserialize, Serialize};

use crate::ids::VendorId;

/// Vendor status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VendorStatus {
    Active,
    Suspended,
}

/// Vendor snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    pub company_id: CompanyId,
    pub name: String,
    /// Primary supply category, when classified.
    pub category: Option<String>,
    /// Free-text materials/keywords the vendor declares it supplies.
    pub materials: Vec<String>,
    pub status: VendorStatus,
}

impl Vendor {
    /// Suspended vendors are excluded from scoring and recommendation.
    pub fn is_active(&self) -> bool {
        self.status == VendorStatus::Active
    }

    /// Case-insensitive match of `needle` against the declared materials.
    pub fn supplies(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.materials
            .iter()
            .any(|m| m.to_lowercase().contains(&needle) || needle.contains(&m.to_lowercase()))
    }
}
