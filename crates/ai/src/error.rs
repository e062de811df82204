use thiserror::Error;

/// Failure modes of the generative-model boundary.
///
/// All of these are recoverable from the engines' point of view: callers
/// catch them and branch to a rule-based fallback. They are never surfaced
/// to an end user as a hard failure, with one exception: document
/// extraction marks its record `Failed` when every path (including the
/// deterministic one) has failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AiError {
    /// No provider credential is configured.
    #[error("generative provider unavailable (no credential configured)")]
    ProviderUnavailable,

    /// The provider rejected the call on quota grounds.
    #[error("provider rate limit exceeded")]
    RateLimited,

    /// The provider rejected the configured credential.
    #[error("provider rejected credential")]
    InvalidCredential,

    /// The call exceeded the configured request timeout. Treated as a
    /// generation failure, never as fatal.
    #[error("provider call timed out")]
    Timeout,

    /// Any other provider-side failure.
    #[error("provider error: {0}")]
    Provider(String),

    /// The model answered, but the answer was unusable (e.g. not the JSON
    /// shape the caller asked for).
    #[error("unusable model response: {0}")]
    InvalidResponse(String),
}
