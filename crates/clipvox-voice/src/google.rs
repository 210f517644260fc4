//! Google Cloud Text-to-Speech backend

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clipvox_core::TtsSettings;
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Serialize;
use tracing::debug;

use crate::backend::{SpeechBackend, SynthesizeResponse};
use crate::credentials::GoogleCredentials;
use crate::error::{Result, VoiceError};
use crate::types::{AudioEncoding, SynthesisRequest};

/// Default synthesize endpoint
pub const GOOGLE_TTS_URL: &str = "https://texttospeech.googleapis.com/v1/text:synthesize";

#[derive(Debug, Serialize)]
struct SynthesizeBody<'a> {
    input: TextInput<'a>,
    voice: VoiceSelection<'a>,
    #[serde(rename = "audioConfig")]
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct TextInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: AudioEncoding,
    speaking_rate: f32,
    pitch: f32,
}

impl<'a> SynthesizeBody<'a> {
    fn new(text: &'a str, request: &'a SynthesisRequest) -> Self {
        Self {
            input: TextInput { text },
            voice: VoiceSelection {
                language_code: &request.language_code,
                name: &request.voice_name,
                model_name: request.model_name.as_deref(),
            },
            audio_config: AudioConfig {
                audio_encoding: request.audio_encoding,
                speaking_rate: request.speaking_rate,
                pitch: request.pitch,
            },
        }
    }
}

/// Client for the `text:synthesize` REST method
pub struct GoogleTtsClient {
    client: Client,
    endpoint: String,
    credentials: Arc<GoogleCredentials>,
}

impl GoogleTtsClient {
    pub fn new(credentials: Arc<GoogleCredentials>) -> Result<Self> {
        Self::with_endpoint(credentials, GOOGLE_TTS_URL)
    }

    pub fn with_endpoint(
        credentials: Arc<GoogleCredentials>,
        endpoint: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| VoiceError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            credentials,
        })
    }

    /// Build from settings, honoring an endpoint override
    pub fn from_settings(settings: &TtsSettings) -> Result<Self> {
        let credentials = Arc::new(GoogleCredentials::from_settings(settings)?);
        let endpoint = settings
            .endpoint
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(GOOGLE_TTS_URL);
        Self::with_endpoint(credentials, endpoint)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SpeechBackend for GoogleTtsClient {
    async fn auth_headers(&self) -> Result<HeaderMap> {
        self.credentials.auth_headers().await
    }

    async fn synthesize_once(
        &self,
        text: &str,
        request: &SynthesisRequest,
        headers: &HeaderMap,
    ) -> Result<SynthesizeResponse> {
        debug!(
            "Synthesizing {} bytes with voice {}",
            text.len(),
            request.voice_name
        );

        let response = self
            .client
            .post(&self.endpoint)
            .headers(headers.clone())
            .json(&SynthesizeBody::new(text, request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VoiceError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<SynthesizeResponse>().await?)
    }
}
