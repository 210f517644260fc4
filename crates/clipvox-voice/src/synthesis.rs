//! Script-to-audio synthesis
//!
//! A script is chunked under the provider's request limit, every chunk is
//! synthesized in order with one set of auth headers, and the result carries
//! one audio segment per chunk. Any chunk that still fails after retries
//! fails the whole script; no partial audio is returned.

use std::sync::Arc;

use tracing::{debug, info};

use crate::backend::SpeechBackend;
use crate::chunker::chunk_text;
use crate::error::{Result, VoiceError};
use crate::retry::RetryPolicy;
use crate::types::{AudioSegment, SynthesisRequest, SynthesisResult};

/// Hard per-request limit of the provider, in UTF-8 bytes
pub const PROVIDER_BYTE_LIMIT: usize = 5000;
/// Chunk size actually used, leaving headroom under the hard limit
pub const SAFE_CHUNK_BYTES: usize = 4500;

/// Turns whole scripts into ordered audio segments
#[derive(Clone)]
pub struct SpeechSynthesizer {
    backend: Arc<dyn SpeechBackend>,
    retry: RetryPolicy,
    chunk_bytes: usize,
}

impl SpeechSynthesizer {
    pub fn new(backend: Arc<dyn SpeechBackend>) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
            chunk_bytes: SAFE_CHUNK_BYTES,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the chunk size, capped at the provider limit
    pub fn with_chunk_bytes(mut self, bytes: usize) -> Self {
        self.chunk_bytes = bytes.clamp(1, PROVIDER_BYTE_LIMIT);
        self
    }

    pub fn chunk_bytes(&self) -> usize {
        self.chunk_bytes
    }

    /// Synthesize `script` into audio segments ordered by chunk index
    pub async fn synthesize(
        &self,
        script: &str,
        request: &SynthesisRequest,
    ) -> Result<SynthesisResult> {
        if script.trim().is_empty() {
            return Err(VoiceError::InvalidInput(
                "Text is required for synthesis.".to_string(),
            ));
        }

        let exceeded_single_request_limit = script.len() > PROVIDER_BYTE_LIMIT;
        let chunks = chunk_text(script, self.chunk_bytes)?;

        info!(
            "Synthesizing {} bytes in {} chunk(s) with voice {}",
            script.len(),
            chunks.len(),
            request.voice_descriptor()
        );

        let headers = self.backend.auth_headers().await?;

        let mut segments = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.into_iter().enumerate() {
            let audio_content = self
                .retry
                .synthesize_chunk(self.backend.as_ref(), &chunk, request, &headers)
                .await?;
            debug!("Chunk {} synthesized ({} bytes of text)", index, chunk.len());

            segments.push(AudioSegment {
                index,
                source_text: chunk,
                audio_content,
            });
        }

        Ok(SynthesisResult {
            segments,
            audio_encoding: request.audio_encoding,
            voice: request.voice_descriptor(),
            exceeded_single_request_limit,
        })
    }
}
