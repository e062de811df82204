//! Entity identifiers (company-scoped via `company_id` fields on snapshots).

use procureiq_core::RecordId;
use serde::{Deserialize, Serialize};

macro_rules! impl_entity_id {
    ($t:ident) => {
        #[derive(
            Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $t(pub RecordId);

        impl $t {
            pub fn new(id: RecordId) -> Self {
                Self(id)
            }

            /// Fresh time-ordered identifier.
            pub fn generate() -> Self {
                Self(RecordId::new())
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

impl_entity_id!(VendorId);
impl_entity_id!(ItemId);
impl_entity_id!(RfqId);
impl_entity_id!(QuoteId);
impl_entity_id!(PurchaseOrderId);
impl_entity_id!(DeliveryId);
