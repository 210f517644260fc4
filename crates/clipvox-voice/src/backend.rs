//! Speech provider abstraction

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::Deserialize;

use crate::error::Result;
use crate::types::SynthesisRequest;

/// Body of a successful provider reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeResponse {
    /// Base64 audio; absent or empty means the provider produced nothing
    #[serde(default)]
    pub audio_content: Option<String>,
}

/// One synthesis call against a speech provider.
///
/// Implementations make a single attempt; retrying and chunking live above
/// this trait.
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Authorization headers for the calls of one synthesis run
    async fn auth_headers(&self) -> Result<HeaderMap>;

    /// Synthesize one chunk of at most the provider's byte limit
    async fn synthesize_once(
        &self,
        text: &str,
        request: &SynthesisRequest,
        headers: &HeaderMap,
    ) -> Result<SynthesizeResponse>;
}
