//! clipvox-core: ClipVox core library
//!
//! Configuration, the chat-completion client used for script writing,
//! and the outline → chapter script orchestrator.

pub mod config;
pub mod error;
pub mod llm;
pub mod script;

pub use config::{Config, LlmConfig, LlmProvider, ServerConfig, TtsSettings};
pub use error::{Error, Result};
pub use llm::{LlmClient, TextGenerator};
pub use script::{
    ChapterPlan, ChapterSection, GeneratedScript, ScriptMode, ScriptOrchestrator, ScriptRequest,
};
