//! `procureiq-ai`
//!
//! **Responsibility:** The optional generative-model boundary.
//!
//! Every engine that wants generated text or vision analysis goes through
//! the [`AiCapability`] trait here, never through a provider SDK directly.
//! The capability is selected **once at startup**: [`LiveCapability`] when a
//! syntactically valid credential is configured, [`NullCapability`]
//! otherwise. Engines treat every [`AiError`] as a signal to take their
//! deterministic fallback path; the only gateway operation allowed to fail
//! a caller is usage-stats retrieval.
//!
//! This crate must not mutate domain state.

pub mod capability;
pub mod error;
pub mod provider;
pub mod response;
pub mod usage;

pub use capability::{
    AiCapability, AiConfig, ImageRequest, LiveCapability, NullCapability, TextRequest,
    capability_from_config,
};
pub use error::AiError;
pub use provider::{ImageAnalysis, MockProvider, ProviderReply, TextGeneration, TextModelProvider};
pub use response::{ResponseParseError, parse_structured_response};
pub use usage::{AiUsageRecord, FeatureStats, InMemoryUsageLog, UsageReporter, UsageSink, UsageStats, UsageStatsError};
