//! In-memory speech backend for tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::backend::{SpeechBackend, SynthesizeResponse};
use crate::error::{Result, VoiceError};
use crate::types::SynthesisRequest;

/// Backend that replays canned results, then echoes.
///
/// Each call pops the next scripted result. Once the script is used up every
/// call succeeds with the base64 of the chunk text, so decoded audio equals
/// the text that was sent.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<SynthesizeResponse>>>,
    texts: Mutex<Vec<String>>,
    auth_calls: AtomicUsize,
    auth_error: Mutex<Option<String>>,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<SynthesizeResponse>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    /// Always echo
    pub fn echo() -> Self {
        Self::default()
    }

    /// Fail every `auth_headers` call with `message`
    pub fn with_auth_error(mut self, message: impl Into<String>) -> Self {
        self.auth_error = Mutex::new(Some(message.into()));
        self
    }

    /// A successful reply carrying `audio`
    pub fn audio(audio: &str) -> Result<SynthesizeResponse> {
        Ok(SynthesizeResponse {
            audio_content: Some(audio.to_string()),
        })
    }

    /// A provider failure with `status`
    pub fn status(status: u16) -> Result<SynthesizeResponse> {
        Err(VoiceError::Provider {
            status,
            body: format!("status {}", status),
        })
    }

    /// Chunk texts in the order they were sent
    pub fn texts(&self) -> Vec<String> {
        self.texts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.texts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechBackend for ScriptedBackend {
    async fn auth_headers(&self) -> Result<HeaderMap> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self
            .auth_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Err(VoiceError::Auth(message));
        }

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer test-token"));
        Ok(headers)
    }

    async fn synthesize_once(
        &self,
        text: &str,
        _request: &SynthesisRequest,
        _headers: &HeaderMap,
    ) -> Result<SynthesizeResponse> {
        self.texts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());

        let scripted = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        scripted.unwrap_or_else(|| {
            Ok(SynthesizeResponse {
                audio_content: Some(base64::engine::general_purpose::STANDARD.encode(text)),
            })
        })
    }
}
