//! Speech synthesis request and result types

use std::str::FromStr;

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoiceError};

/// Default voice, a Chirp HD narrator
pub const DEFAULT_VOICE_NAME: &str = "en-US-Chirp-HD-F";
/// Default BCP-47 language code
pub const DEFAULT_LANGUAGE_CODE: &str = "en-US";

/// Audio encoding requested from the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    /// Uncompressed 16-bit PCM with a WAV header
    #[default]
    Linear16,
    Mp3,
    OggOpus,
    Mulaw,
    Alaw,
    Pcm,
}

impl AudioEncoding {
    /// Name used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear16 => "LINEAR16",
            Self::Mp3 => "MP3",
            Self::OggOpus => "OGG_OPUS",
            Self::Mulaw => "MULAW",
            Self::Alaw => "ALAW",
            Self::Pcm => "PCM",
        }
    }

    /// MIME type of the returned audio
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::OggOpus => "audio/ogg",
            Self::Pcm => "audio/L16",
            _ => "audio/wav",
        }
    }

    /// File extension for saved segments
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::OggOpus => "ogg",
            Self::Pcm => "pcm",
            _ => "wav",
        }
    }
}

impl std::fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioEncoding {
    type Err = VoiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LINEAR16" => Ok(Self::Linear16),
            "MP3" => Ok(Self::Mp3),
            "OGG_OPUS" => Ok(Self::OggOpus),
            "MULAW" => Ok(Self::Mulaw),
            "ALAW" => Ok(Self::Alaw),
            "PCM" => Ok(Self::Pcm),
            other => Err(VoiceError::InvalidInput(format!(
                "unsupported audio encoding: {}",
                other
            ))),
        }
    }
}

/// Voice and audio settings applied to every chunk of one script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    pub audio_encoding: AudioEncoding,
    /// 0.25 - 4.0, 1.0 is normal speed
    pub speaking_rate: f32,
    /// -20.0 - 20.0 semitones
    pub pitch: f32,
    pub language_code: String,
    pub voice_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl Default for SynthesisRequest {
    fn default() -> Self {
        Self {
            audio_encoding: AudioEncoding::default(),
            speaking_rate: 1.0,
            pitch: 0.0,
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            voice_name: DEFAULT_VOICE_NAME.to_string(),
            model_name: None,
        }
    }
}

impl SynthesisRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(mut self, encoding: AudioEncoding) -> Self {
        self.audio_encoding = encoding;
        self
    }

    /// Set speaking rate; non-finite values keep the current rate
    pub fn with_speaking_rate(mut self, rate: f32) -> Self {
        if rate.is_finite() {
            self.speaking_rate = rate.clamp(0.25, 4.0);
        }
        self
    }

    /// Set pitch; non-finite values keep the current pitch
    pub fn with_pitch(mut self, pitch: f32) -> Self {
        if pitch.is_finite() {
            self.pitch = pitch.clamp(-20.0, 20.0);
        }
        self
    }

    /// Set language; blank values keep the current one
    pub fn with_language(mut self, language_code: impl Into<String>) -> Self {
        let language_code = language_code.into();
        if !language_code.trim().is_empty() {
            self.language_code = language_code.trim().to_string();
        }
        self
    }

    /// Set voice; blank values keep the current one
    pub fn with_voice(mut self, voice_name: impl Into<String>) -> Self {
        let voice_name = voice_name.into();
        if !voice_name.trim().is_empty() {
            self.voice_name = voice_name.trim().to_string();
        }
        self
    }

    /// Set model; blank values clear it
    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        let model_name = model_name.into();
        self.model_name = Some(model_name.trim().to_string()).filter(|m| !m.is_empty());
        self
    }

    /// Name of the voice actually used, or `"{language} default"` when unnamed
    pub fn voice_descriptor(&self) -> String {
        match self.voice_name.trim() {
            "" => format!("{} default", self.language_code),
            name => name.to_string(),
        }
    }
}

/// Audio for one chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSegment {
    /// 0-based position, equal to the chunk's position
    pub index: usize,
    /// The chunk that was spoken
    #[serde(rename = "text")]
    pub source_text: String,
    /// Encoded audio, base64
    pub audio_content: String,
}

impl AudioSegment {
    /// Decode the base64 payload into raw audio bytes
    pub fn decode_audio(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.audio_content.as_bytes())
            .map_err(|e| VoiceError::DecodingError(format!("segment {}: {}", self.index, e)))
    }
}

/// Audio for a whole script, one segment per chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResult {
    /// Ordered by index; play or concatenate in this order
    pub segments: Vec<AudioSegment>,
    pub audio_encoding: AudioEncoding,
    pub voice: String,
    /// Whether the unchunked script was over the provider's single-request limit
    pub exceeded_single_request_limit: bool,
}

impl SynthesisResult {
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}
