//! Narration script generation
//!
//! A script is produced in two phases: an outline call that plans the title
//! and chapter stubs, then one call per chapter, in order, each seeing the
//! one-sentence summaries of the chapters before it.

mod orchestrator;
pub mod prompts;
mod types;

pub use orchestrator::ScriptOrchestrator;
pub use prompts::{chapter_target_words, total_target_words};
pub use types::*;
