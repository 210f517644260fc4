//! LLM API client and types
//!
//! Supports both OpenAI-compatible chat completions and the Claude Messages API.

mod client;
mod generator;
pub mod mock;
mod types;

pub use client::LlmClient;
pub use generator::{CompletionRequest, TextGenerator};
pub use types::*;
