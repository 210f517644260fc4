//! Error types for clipvox-core

use thiserror::Error;

/// Main error type for clipvox-core
#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied an unusable request (missing topic, missing draft, ...)
    #[error("{0}")]
    Validation(String),

    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// The model answered, but not with what was asked for
    #[error("Malformed model response: {0}")]
    ProviderResponse(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the error was caused by the caller's input
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Result type alias for clipvox-core
pub type Result<T> = std::result::Result<T, Error>;
