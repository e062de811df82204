//! `procureiq-vendors` — vendor performance intelligence.
//!
//! - [`scoring`]: weighted multi-factor performance score and tier per
//!   vendor, upserted with a validity window.
//! - [`recommend`]: ranks vendors for a purchase request by combining the
//!   performance score with relevance and urgency.

pub mod recommend;
pub mod scoring;

pub use recommend::{
    RecommendRequest, RecommendationFactors, RecommendationId, RecommendationRecord,
    RecommendationStore, Urgency, VendorRecommendationRanker,
};
pub use scoring::{
    ScoreStore, ScoreWeights, ScoringConfig, VendorScoreRecord, VendorScoringEngine, VendorTier,
    tier_for,
};
