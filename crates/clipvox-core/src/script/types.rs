//! Script generation types

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default narration tone
pub const DEFAULT_TONE: &str = "neutral";
/// Default narration style
pub const DEFAULT_STYLE: &str = "informative";
/// Default video length in minutes
pub const DEFAULT_TARGET_MINUTES: f64 = 5.0;
/// Default number of chapters
pub const DEFAULT_CHAPTER_COUNT: usize = 5;
/// Longest video a single request may ask for, in minutes
pub const MAX_TARGET_MINUTES: f64 = 60.0;
/// Most chapters a single request may ask for
pub const MAX_CHAPTER_COUNT: usize = 20;

/// How the script is produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptMode {
    /// Outline and write from the topic alone
    #[default]
    Oneshot,
    /// Guided: the user's draft is used as content and style reference
    Craft,
}

impl std::fmt::Display for ScriptMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Oneshot => write!(f, "oneshot"),
            Self::Craft => write!(f, "craft"),
        }
    }
}

/// A request for one narration script
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptRequest {
    pub topic: String,
    pub tone: String,
    pub style: String,
    /// Video length in minutes, always > 0
    pub target_minutes: f64,
    /// Number of chapters, always >= 1
    pub chapter_count: usize,
    pub mode: ScriptMode,
    pub draft: Option<String>,
}

impl ScriptRequest {
    /// Create a oneshot request with default tone, style and length
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            tone: DEFAULT_TONE.to_string(),
            style: DEFAULT_STYLE.to_string(),
            target_minutes: DEFAULT_TARGET_MINUTES,
            chapter_count: DEFAULT_CHAPTER_COUNT,
            mode: ScriptMode::Oneshot,
            draft: None,
        }
    }

    /// Set tone; blank values keep the default
    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        let tone = tone.into();
        if !tone.trim().is_empty() {
            self.tone = tone.trim().to_string();
        }
        self
    }

    /// Set style; blank values keep the default
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        let style = style.into();
        if !style.trim().is_empty() {
            self.style = style.trim().to_string();
        }
        self
    }

    /// Set target length; non-positive or non-finite values fall back to the default
    pub fn with_target_minutes(mut self, minutes: f64) -> Self {
        self.target_minutes = if minutes.is_finite() && minutes > 0.0 {
            minutes
        } else {
            DEFAULT_TARGET_MINUTES
        };
        self
    }

    /// Set chapter count; zero falls back to the default
    pub fn with_chapter_count(mut self, count: usize) -> Self {
        self.chapter_count = if count == 0 {
            DEFAULT_CHAPTER_COUNT
        } else {
            count
        };
        self
    }

    /// Switch to guided mode with the user's draft
    pub fn with_draft(mut self, draft: impl Into<String>) -> Self {
        self.mode = ScriptMode::Craft;
        self.draft = Some(draft.into());
        self
    }

    pub fn with_mode(mut self, mode: ScriptMode) -> Self {
        self.mode = mode;
        self
    }

    /// The draft, only when running in craft mode and non-blank
    pub fn reference_draft(&self) -> Option<&str> {
        match self.mode {
            ScriptMode::Craft => self
                .draft
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty()),
            ScriptMode::Oneshot => None,
        }
    }

    /// Reject requests that cannot be written
    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(Error::Validation("Topic is required.".to_string()));
        }
        if self.mode == ScriptMode::Craft && self.reference_draft().is_none() {
            return Err(Error::Validation(
                "Draft is required in craft mode.".to_string(),
            ));
        }
        if !(1..=MAX_CHAPTER_COUNT).contains(&self.chapter_count) {
            return Err(Error::Validation(format!(
                "Chapter count must be between 1 and {}.",
                MAX_CHAPTER_COUNT
            )));
        }
        if !(self.target_minutes.is_finite()
            && self.target_minutes > 0.0
            && self.target_minutes <= MAX_TARGET_MINUTES)
        {
            return Err(Error::Validation(format!(
                "Target length must be more than 0 and at most {} minutes.",
                MAX_TARGET_MINUTES
            )));
        }
        Ok(())
    }
}

/// One planned chapter from the outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterPlan {
    pub title: String,
    pub summary: String,
}

/// One written chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterSection {
    /// Narration text, no headings
    pub body: String,
    /// One-sentence recap handed to later chapters
    pub summary: String,
}

/// The finished narration script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedScript {
    title: String,
    chapters: Vec<ChapterPlan>,
    text: String,
}

impl GeneratedScript {
    /// Assemble the document: the title line, then one
    /// `Chapter N: title` heading plus body per chapter, separated by blank lines.
    pub(crate) fn assemble(
        title: String,
        chapters: Vec<ChapterPlan>,
        sections: &[ChapterSection],
    ) -> Self {
        let blocks = chapters
            .iter()
            .zip(sections)
            .enumerate()
            .map(|(i, (plan, section))| {
                format!("Chapter {}: {}\n{}", i + 1, plan.title, section.body.trim())
            });

        let text = std::iter::once(title.clone())
            .chain(blocks)
            .collect::<Vec<_>>()
            .join("\n\n")
            .trim()
            .to_string();

        Self {
            title,
            chapters,
            text,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn chapters(&self) -> &[ChapterPlan] {
        &self.chapters
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl std::fmt::Display for GeneratedScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
