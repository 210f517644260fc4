//! Per-chunk retry with linear backoff

use std::time::Duration;

use reqwest::header::HeaderMap;
use tracing::warn;

use crate::backend::SpeechBackend;
use crate::error::{Result, VoiceError};
use crate::types::SynthesisRequest;

/// Statuses worth another attempt: timeouts, rate limits and server faults
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// How often and how patiently a chunk is retried
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first, at least 1
    pub max_attempts: u32,
    /// Wait after attempt `n` is `n * base_delay`
    pub base_delay: Duration,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            retryable_statuses: RETRYABLE_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Only provider status errors in the retryable set qualify; transport
    /// failures and missing audio are returned as is.
    pub fn is_retryable(&self, error: &VoiceError) -> bool {
        error
            .status()
            .is_some_and(|status| self.retryable_statuses.contains(&status))
    }

    /// Delay before the attempt after `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Synthesize one chunk, retrying transient provider failures.
    ///
    /// Returns the base64 audio. A success without audio is an error and is
    /// not retried.
    pub async fn synthesize_chunk(
        &self,
        backend: &dyn SpeechBackend,
        text: &str,
        request: &SynthesisRequest,
        headers: &HeaderMap,
    ) -> Result<String> {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match backend.synthesize_once(text, request, headers).await {
                Ok(response) => {
                    return response
                        .audio_content
                        .filter(|audio| !audio.is_empty())
                        .ok_or_else(|| {
                            VoiceError::MissingAudio("response contained no audio".to_string())
                        });
                }
                Err(e) if attempt < max_attempts && self.is_retryable(&e) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "Synthesis attempt {}/{} failed ({}), retrying in {:?}",
                        attempt, max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
