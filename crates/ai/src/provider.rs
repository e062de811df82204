//! Port to the hosted generative language/vision model.
//!
//! The transport (HTTP client, SDK, on-prem runtime) lives outside this
//! subsystem; [`LiveCapability`](crate::capability::LiveCapability) is the
//! only caller of this trait.

use std::sync::Mutex;
use std::time::Duration;

use crate::error::AiError;

/// A single-shot text generation request.
#[derive(Debug, Clone)]
pub struct TextGeneration {
    pub prompt: String,
    pub system_prompt: Option<String>,
    /// Upper bound on the blocking call; exceeding it must yield
    /// [`AiError::Timeout`].
    pub timeout: Duration,
}

/// A single-shot image analysis request.
#[derive(Debug, Clone)]
pub struct ImageAnalysis {
    pub image: Vec<u8>,
    pub mime_type: String,
    pub prompt: String,
    pub timeout: Duration,
}

/// Provider response with token accounting for usage bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReply {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

pub trait TextModelProvider: Send + Sync {
    /// Model identifier, recorded with each usage entry.
    fn model(&self) -> &str;

    fn generate(&self, request: &TextGeneration) -> Result<ProviderReply, AiError>;

    fn analyze_image(&self, request: &ImageAnalysis) -> Result<ProviderReply, AiError>;
}

/// Scripted provider for tests: pops pre-seeded results in FIFO order.
///
/// An empty script answers every call with `AiError::Provider`.
#[derive(Debug, Default)]
pub struct MockProvider {
    replies: Mutex<Vec<Result<ProviderReply, AiError>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(text: &str) -> Self {
        let mock = Self::new();
        mock.push_text(text);
        mock
    }

    pub fn push_text(&self, text: &str) {
        self.push(Ok(ProviderReply {
            text: text.to_string(),
            input_tokens: 10,
            output_tokens: 20,
        }));
    }

    pub fn push(&self, reply: Result<ProviderReply, AiError>) {
        self.replies.lock().unwrap().insert(0, reply);
    }

    fn pop(&self) -> Result<ProviderReply, AiError> {
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(AiError::Provider("mock script exhausted".to_string())))
    }
}

impl TextModelProvider for MockProvider {
    fn model(&self) -> &str {
        "mock-model"
    }

    fn generate(&self, _request: &TextGeneration) -> Result<ProviderReply, AiError> {
        self.pop()
    }

    fn analyze_image(&self, _request: &ImageAnalysis) -> Result<ProviderReply, AiError> {
        self.pop()
    }
}
