//! `procureiq-observability`
//!
//! **Responsibility:** process-wide tracing/logging setup for hosts that
//! embed the intelligence engines.

pub mod tracing;

pub use tracing::{init, init_with_filter};
