//! Deterministic in-memory [`TextGenerator`] for tests and offline runs

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::generator::{CompletionRequest, TextGenerator};
use crate::error::{Error, Result};

/// Replays canned replies in order and records every request it was sent.
///
/// Once the script runs out every call fails with [`Error::LlmApi`].
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGenerator {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.iter().map(|r| r.prompt.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: CompletionRequest) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        self.replies
            .lock()
            .map_err(|_| Error::LlmApi("scripted generator poisoned".to_string()))?
            .pop_front()
            .unwrap_or_else(|| Err(Error::LlmApi("no scripted reply left".to_string())))
    }
}
