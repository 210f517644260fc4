//! clipvox-voice: narration audio for ClipVox
//!
//! Turns a finished script into speech through Google Cloud Text-to-Speech.
//!
//! ## Features
//!
//! - **Byte-bounded chunking**: paragraphs packed under the provider's UTF-8 limit
//! - **Retry**: linear backoff on rate limits and server faults
//! - **Credentials**: service-account JSON (inline or base64) or ambient ADC
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use clipvox_voice::{GoogleTtsClient, SpeechSynthesizer, SynthesisRequest};
//!
//! let backend = Arc::new(GoogleTtsClient::from_settings(&config.tts)?);
//! let synthesizer = SpeechSynthesizer::new(backend);
//! let result = synthesizer.synthesize(script.as_str(), &SynthesisRequest::default()).await?;
//!
//! for segment in &result.segments {
//!     std::fs::write(format!("part-{}.wav", segment.index), segment.decode_audio()?)?;
//! }
//! ```

pub mod backend;
pub mod chunker;
pub mod credentials;
pub mod error;
pub mod google;
pub mod mock;
pub mod retry;
pub mod synthesis;
pub mod types;

pub use backend::{SpeechBackend, SynthesizeResponse};
pub use chunker::chunk_text;
pub use credentials::{CredentialSource, GcpAuthFactory, GoogleCredentials, ProviderFactory};
pub use error::{Result, VoiceError};
pub use google::{GOOGLE_TTS_URL, GoogleTtsClient};
pub use retry::RetryPolicy;
pub use synthesis::{PROVIDER_BYTE_LIMIT, SAFE_CHUNK_BYTES, SpeechSynthesizer};
pub use types::{AudioEncoding, AudioSegment, SynthesisRequest, SynthesisResult};
