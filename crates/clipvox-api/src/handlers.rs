//! HTTP API handlers
//!
//! Request handlers for script generation and speech synthesis.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use clipvox_core::{ScriptMode, ScriptRequest};
use clipvox_voice::{AudioEncoding, AudioSegment, SynthesisRequest, SynthesisResult};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::error::{ApiError, Result};
use crate::server::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Script generation payload
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub topic: Option<String>,
    pub tone: Option<String>,
    pub style: Option<String>,
    /// Target length in minutes
    #[serde(default, deserialize_with = "lenient_number")]
    pub length: Option<f64>,
    /// Number of chapters
    #[serde(default, deserialize_with = "lenient_number")]
    pub chapters: Option<f64>,
    /// "oneshot" or "craft"
    pub mode: Option<String>,
    pub draft: Option<String>,
}

impl GenerateRequest {
    fn into_script_request(self) -> ScriptRequest {
        let mut request = ScriptRequest::new(self.topic.unwrap_or_default());

        if let Some(tone) = self.tone {
            request = request.with_tone(tone);
        }
        if let Some(style) = self.style {
            request = request.with_style(style);
        }
        if let Some(minutes) = self.length {
            request = request.with_target_minutes(minutes);
        }
        if let Some(chapters) = self.chapters {
            // Fractions round down; anything under one falls back to the default.
            let count = if chapters >= 1.0 { chapters as usize } else { 0 };
            request = request.with_chapter_count(count);
        }
        if let Some(draft) = self.draft {
            request = request.with_draft(draft);
        }

        let mode = match self.mode.as_deref().map(str::trim) {
            Some(mode) if mode.eq_ignore_ascii_case("craft") => ScriptMode::Craft,
            _ => ScriptMode::Oneshot,
        };
        request.with_mode(mode)
    }
}

/// Accept a number or a numeric string; anything else counts as missing
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(match value {
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite()))
}

/// Unwrap a JSON body, turning extractor rejections into a 400
fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::InvalidRequest(rejection.body_text()))
}

/// Speech synthesis payload
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceRequest {
    pub text: Option<String>,
    pub audio_encoding: Option<String>,
    pub speaking_rate: Option<f32>,
    pub pitch: Option<f32>,
    pub language_code: Option<String>,
    pub voice_name: Option<String>,
    pub model_name: Option<String>,
}

impl VoiceRequest {
    fn synthesis_request(&self) -> Result<SynthesisRequest> {
        let mut request = SynthesisRequest::new();

        if let Some(encoding) = self.audio_encoding.as_deref() {
            request = request.with_encoding(encoding.parse::<AudioEncoding>()?);
        }
        if let Some(rate) = self.speaking_rate {
            request = request.with_speaking_rate(rate);
        }
        if let Some(pitch) = self.pitch {
            request = request.with_pitch(pitch);
        }
        if let Some(language) = &self.language_code {
            request = request.with_language(language.as_str());
        }
        if let Some(voice) = &self.voice_name {
            request = request.with_voice(voice.as_str());
        }
        if let Some(model) = &self.model_name {
            request = request.with_model(model.as_str());
        }

        Ok(request)
    }
}

/// Synthesized audio, one segment per chunk
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceResponse {
    pub segments: Vec<AudioSegment>,
    pub encoding: AudioEncoding,
    pub voice: String,
    pub exceeded_limit: bool,
}

impl From<SynthesisResult> for VoiceResponse {
    fn from(result: SynthesisResult) -> Self {
        Self {
            segments: result.segments,
            encoding: result.audio_encoding,
            voice: result.voice,
            exceeded_limit: result.exceeded_single_request_limit,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Seconds since start
    pub uptime: f64,
    pub timestamp: String,
}

/// Generic API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handler functions
// ============================================================================

/// Health check endpoint
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime: state.started_at.elapsed().as_secs_f64(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Generate a narration script; replies with plain text
pub async fn generate(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<String> {
    let req = json_body(payload)?;
    debug!("Generate request: {:?}", req);

    let request = req.into_script_request();
    let script = state.script.generate_script(&request).await?;

    info!(
        "Generated script {:?}: {} chapters, {} bytes",
        script.title(),
        script.chapters().len(),
        script.as_str().len()
    );
    Ok(script.into_text())
}

/// Synthesize speech for a script
pub async fn voice(
    State(state): State<AppState>,
    payload: std::result::Result<Json<VoiceRequest>, JsonRejection>,
) -> Result<Json<VoiceResponse>> {
    let req = json_body(payload)?;
    let text = req
        .text
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("Text is required.".to_string()))?;

    let request = req.synthesis_request()?;
    debug!("Voice request: {} bytes, {:?}", text.len(), request);

    let result = state.speech.synthesize(text, &request).await?;
    info!(
        "Synthesized {} segment(s) with {}",
        result.segment_count(),
        result.voice
    );

    Ok(Json(result.into()))
}
