//! Error types for clipvox-voice

use thiserror::Error;

/// clipvox-voice error type
#[derive(Error, Debug)]
pub enum VoiceError {
    /// Unusable caller input (blank script, zero byte limit, unknown encoding)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The provider answered with a non-success status
    #[error("TTS API error {status}: {body}")]
    Provider { status: u16, body: String },

    /// The provider claimed success but sent no audio
    #[error("Speech synthesis failed: {0}")]
    MissingAudio(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Audio decoding error: {0}")]
    DecodingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl VoiceError {
    /// HTTP status reported by the provider, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure is a credential/grant problem rather than a synthesis one
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Auth(_)) || self.to_string().contains("invalid_grant")
    }
}

impl From<gcp_auth::Error> for VoiceError {
    fn from(e: gcp_auth::Error) -> Self {
        Self::Auth(e.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, VoiceError>;
