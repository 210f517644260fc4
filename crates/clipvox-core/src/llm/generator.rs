//! Text generation capability
//!
//! The script orchestrator only needs "prompt in, JSON-ish text out". Keeping
//! that behind a trait lets tests script the model's replies.

use async_trait::async_trait;

use crate::Result;

/// One structured-output prompt
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System instruction
    pub system: String,
    /// User prompt
    pub prompt: String,
    /// Upper bound on generated tokens
    pub max_tokens: u64,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            max_tokens: 2048,
            temperature: Some(0.7),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Chat-completion capability used for script writing
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send the prompt and return the model's reply text.
    ///
    /// The reply is expected to contain a JSON object; parsing is left to the caller.
    async fn generate(&self, request: CompletionRequest) -> Result<String>;
}
