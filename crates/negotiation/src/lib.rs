//! `procureiq-negotiation` — the negotiation copilot.
//!
//! A session state machine (`Active → {Accepted, Rejected, Expired}`) with
//! an append-only message log, plus a suggestion engine that drafts
//! counter-offers via the generative model when available and via
//! deterministic heuristics when not. Durable state is persisted on every
//! mutating call; the in-process cache only accelerates a live
//! conversation and may be evicted at any time.

pub mod cache;
pub mod copilot;
pub mod session;
pub mod store;

pub use cache::{SessionCache, SessionCacheConfig};
pub use copilot::{NegotiationConfig, NegotiationCopilot, Suggestion};
pub use session::{
    MessageId, MessageRole, NegotiationMessage, NegotiationSession, NegotiationStatus, SessionId,
};
pub use store::SessionStore;
