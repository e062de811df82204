//! `procureiq-procurement` — transactional entity snapshots.
//!
//! The intelligence engines read these shapes from the data store. They are
//! **snapshots**, not aggregates: the store is the sole persistence
//! authority, engines never mutate them, and the CRUD lifecycle that
//! produces them (RFQ issuing, quote submission, PO/delivery transitions)
//! lives outside this subsystem.

pub mod delivery;
pub mod ids;
pub mod item;
pub mod order;
pub mod price_history;
pub mod quote;
pub mod reader;
pub mod rfq;
pub mod vendor;

pub use delivery::Delivery;
pub use ids::{DeliveryId, ItemId, PurchaseOrderId, QuoteId, RfqId, VendorId};
pub use item::Item;
pub use order::{PurchaseOrder, PurchaseOrderStatus};
pub use price_history::PricePoint;
pub use quote::{Quote, QuoteStatus};
pub use reader::ProcurementReader;
pub use rfq::Rfq;
pub use vendor::{Vendor, VendorStatus};
