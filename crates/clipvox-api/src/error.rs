//! Error types for clipvox-api

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use clipvox_voice::VoiceError;
use thiserror::Error;
use tracing::error;

use crate::handlers::ErrorResponse;

/// Shown when Google rejects the service-account grant
const CREDENTIALS_GUIDANCE: &str = "Google Cloud rejected the text-to-speech credentials. \
Refresh the service-account key (GOOGLE_TTS_CREDENTIALS_JSON or GOOGLE_TTS_CREDENTIALS_BASE64) \
and check that the account is enabled and the server clock is correct.";

/// clipvox-api error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Core(#[from] clipvox_core::Error),

    #[error(transparent)]
    Voice(#[from] VoiceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Core(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Voice(e) if e.is_auth_failure() => StatusCode::UNAUTHORIZED,
            Self::Voice(VoiceError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            Self::Voice(_) => StatusCode::BAD_GATEWAY,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client
    fn public_message(&self) -> String {
        match self.status() {
            StatusCode::BAD_REQUEST => self.to_string(),
            StatusCode::UNAUTHORIZED => format!("{} ({})", CREDENTIALS_GUIDANCE, self),
            StatusCode::BAD_GATEWAY => format!("Speech synthesis failed: {}", self),
            _ => match self {
                Self::Core(e) => format!("Script generation failed: {}", e),
                _ => "Internal server error".to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() || status == StatusCode::UNAUTHORIZED {
            error!("Request failed ({}): {}", status, self);
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::InvalidRequest("Text is required.".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Core(clipvox_core::Error::Validation("Topic is required.".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Core(clipvox_core::Error::LlmApi("429".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Voice(VoiceError::Auth("invalid_grant".to_string())),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::Voice(VoiceError::Provider {
                    status: 400,
                    body: r#"{"error": "invalid_grant"}"#.to_string(),
                }),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::Voice(VoiceError::Provider {
                    status: 503,
                    body: "unavailable".to_string(),
                }),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Voice(VoiceError::MissingAudio("empty".to_string())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Voice(VoiceError::InvalidInput("bad encoding".to_string())),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{:?}", err);
        }
    }

    #[test]
    fn test_messages() {
        let err = ApiError::Core(clipvox_core::Error::Validation("Topic is required.".to_string()));
        assert_eq!(err.public_message(), "Topic is required.");

        let err = ApiError::Voice(VoiceError::Auth("invalid_grant".to_string()));
        assert!(err.public_message().contains("service-account"));

        let err = ApiError::Core(clipvox_core::Error::LlmApi("quota".to_string()));
        assert!(err.public_message().starts_with("Script generation failed"));
    }
}
