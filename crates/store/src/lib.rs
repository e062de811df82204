//! `procureiq-store` — in-memory implementations of the storage ports.
//!
//! Intended for tests/dev; the production data store is an external
//! collaborator implementing the same traits. Not optimized for
//! performance.

pub mod audit;
pub mod memory;

pub use audit::InMemoryAuditLog;
pub use memory::InMemoryProcurementStore;
