//! The injected AI capability.
//!
//! One trait, two implementations, selected once at startup. Engines hold
//! an `Arc<dyn AiCapability>` and never re-check configuration flags ad
//! hoc.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::AiError;
use crate::provider::{ImageAnalysis, TextGeneration, TextModelProvider};
use crate::usage::{AiUsageRecord, UsageSink};

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Provider credential. `None` (or a syntactically invalid value)
    /// selects [`NullCapability`].
    pub api_key: Option<String>,
    /// Model identifier recorded with each usage entry.
    pub model: String,
    /// Upper bound applied to every provider call.
    pub request_timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "default".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AiConfig {
    /// Syntactic credential check: non-empty, printable ASCII, and long
    /// enough to plausibly be a key. Semantic validation happens on the
    /// first provider call (`AiError::InvalidCredential`).
    pub fn credential_is_valid(&self) -> bool {
        match self.api_key.as_deref() {
            Some(key) => key.len() >= 16 && key.chars().all(|c| c.is_ascii_graphic()),
            None => false,
        }
    }
}

/// Text generation request as engines see it.
#[derive(Debug, Clone)]
pub struct TextRequest {
    /// Feature tag for usage bookkeeping, e.g. `"anomaly.explanation"`.
    pub feature: String,
    pub prompt: String,
    pub system_prompt: Option<String>,
}

impl TextRequest {
    pub fn new(feature: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            prompt: prompt.into(),
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// Image analysis request as engines see it.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub feature: String,
    pub prompt: String,
    pub image: Vec<u8>,
    pub mime_type: String,
}

/// The capability every engine depends on.
pub trait AiCapability: Send + Sync {
    /// True only when a provider credential is configured and
    /// syntactically valid. Engines check this before building prompts.
    fn is_available(&self) -> bool;

    fn generate_text(&self, request: &TextRequest) -> Result<String, AiError>;

    fn analyze_image(&self, request: &ImageRequest) -> Result<String, AiError>;
}

/// Select the capability implementation from configuration, once.
pub fn capability_from_config(
    config: AiConfig,
    provider: Arc<dyn TextModelProvider>,
    usage: Arc<dyn UsageSink>,
) -> Arc<dyn AiCapability> {
    if config.credential_is_valid() {
        Arc::new(LiveCapability::new(config, provider, usage))
    } else {
        debug!("no valid provider credential; AI capability disabled");
        Arc::new(NullCapability)
    }
}

/// Capability backed by a configured hosted model.
pub struct LiveCapability {
    provider: Arc<dyn TextModelProvider>,
    usage: Arc<dyn UsageSink>,
    model: String,
    timeout: Duration,
}

impl LiveCapability {
    /// Callers are expected to have checked `config.credential_is_valid()`
    /// (or to go through [`capability_from_config`]).
    pub fn new(
        config: AiConfig,
        provider: Arc<dyn TextModelProvider>,
        usage: Arc<dyn UsageSink>,
    ) -> Self {
        Self {
            provider,
            usage,
            model: config.model,
            timeout: config.request_timeout,
        }
    }

    /// Fire-and-forget usage bookkeeping. Never fails, never blocks the
    /// caller's success path.
    fn record_usage(
        &self,
        feature: &str,
        tokens: (u64, u64),
        latency: Duration,
        outcome: &Result<(), &AiError>,
    ) {
        self.usage.record(AiUsageRecord {
            feature: feature.to_string(),
            model: self.model.clone(),
            input_tokens: tokens.0,
            output_tokens: tokens.1,
            latency_ms: latency.as_millis() as u64,
            success: outcome.is_ok(),
            error: outcome.as_ref().err().map(|e| e.to_string()),
            metadata: JsonValue::Null,
            occurred_at: Utc::now(),
        });
    }
}

impl AiCapability for LiveCapability {
    fn is_available(&self) -> bool {
        true
    }

    fn generate_text(&self, request: &TextRequest) -> Result<String, AiError> {
        let started = Instant::now();
        let result = self.provider.generate(&TextGeneration {
            prompt: request.prompt.clone(),
            system_prompt: request.system_prompt.clone(),
            timeout: self.timeout,
        });
        let latency = started.elapsed();

        match result {
            Ok(reply) => {
                self.record_usage(
                    &request.feature,
                    (reply.input_tokens, reply.output_tokens),
                    latency,
                    &Ok(()),
                );
                Ok(reply.text)
            }
            Err(err) => {
                self.record_usage(&request.feature, (0, 0), latency, &Err(&err));
                Err(err)
            }
        }
    }

    fn analyze_image(&self, request: &ImageRequest) -> Result<String, AiError> {
        let started = Instant::now();
        let result = self.provider.analyze_image(&ImageAnalysis {
            image: request.image.clone(),
            mime_type: request.mime_type.clone(),
            prompt: request.prompt.clone(),
            timeout: self.timeout,
        });
        let latency = started.elapsed();

        match result {
            Ok(reply) => {
                self.record_usage(
                    &request.feature,
                    (reply.input_tokens, reply.output_tokens),
                    latency,
                    &Ok(()),
                );
                Ok(reply.text)
            }
            Err(err) => {
                self.record_usage(&request.feature, (0, 0), latency, &Err(&err));
                Err(err)
            }
        }
    }
}

/// Capability used when no provider is configured: never available, every
/// generation attempt reports [`AiError::ProviderUnavailable`].
#[derive(Debug, Default, Copy, Clone)]
pub struct NullCapability;

impl AiCapability for NullCapability {
    fn is_available(&self) -> bool {
        false
    }

    fn generate_text(&self, _request: &TextRequest) -> Result<String, AiError> {
        Err(AiError::ProviderUnavailable)
    }

    fn analyze_image(&self, _request: &ImageRequest) -> Result<String, AiError> {
        Err(AiError::ProviderUnavailable)
    }
}
