//! Prompt text and reply parsing for script generation

use serde_json::Value as JsonValue;

use super::types::{ChapterPlan, MAX_CHAPTER_COUNT, ScriptRequest};
use crate::error::{Error, Result};

/// Narration pace used to turn minutes into words
pub const WORDS_PER_MINUTE: f64 = 130.0;
/// Floor for a single chapter's word target
pub const MIN_CHAPTER_WORDS: u64 = 180;

const FALLBACK_SUMMARY: &str = "Continue the narrative.";

pub(crate) const OUTLINE_SYSTEM: &str = "You are a senior documentary scriptwriter. \
You plan long-form YouTube narrations. Reply with a single JSON object and nothing else.";

pub(crate) const CHAPTER_SYSTEM: &str = "You are a senior documentary scriptwriter. \
You write spoken narration only: no headings, no stage directions, no bullet points. \
Reply with a single JSON object and nothing else.";

/// Total narration words for the whole video, at least one minute's worth
pub fn total_target_words(target_minutes: f64) -> u64 {
    let words = (target_minutes * WORDS_PER_MINUTE).round();
    let words = if words.is_finite() && words > 0.0 {
        words as u64
    } else {
        0
    };
    words.max(WORDS_PER_MINUTE as u64)
}

/// Word target for each chapter: an even share of the total, never below the floor
pub fn chapter_target_words(target_minutes: f64, chapter_count: usize) -> u64 {
    let total = total_target_words(target_minutes) as f64;
    let share = (total / chapter_count.max(1) as f64).round() as u64;
    share.max(MIN_CHAPTER_WORDS)
}

pub(crate) fn outline_prompt(request: &ScriptRequest) -> String {
    let mut prompt = format!(
        "Plan a narrated video about: {topic}\n\
         Tone: {tone}\n\
         Style: {style}\n\
         Target length: {minutes} minutes (about {words} spoken words)\n\
         Chapters: exactly {count}\n\n\
         Return JSON shaped as:\n\
         {{\"title\": \"video title\", \"chapters\": [{{\"title\": \"chapter title\", \"summary\": \"what the chapter covers\"}}]}}",
        topic = request.topic.trim(),
        tone = request.tone,
        style = request.style,
        minutes = request.target_minutes,
        words = total_target_words(request.target_minutes),
        count = request.chapter_count,
    );

    if let Some(draft) = request.reference_draft() {
        prompt.push_str(
            "\n\nThe author supplied this draft. Follow its structure, facts and voice:\n",
        );
        prompt.push_str(draft);
    }

    prompt
}

pub(crate) struct ChapterPrompt<'a> {
    pub request: &'a ScriptRequest,
    pub script_title: &'a str,
    pub index: usize,
    pub plan: &'a ChapterPlan,
    pub previous_summaries: &'a [String],
    pub target_words: u64,
}

impl ChapterPrompt<'_> {
    pub(crate) fn render(&self) -> String {
        let mut prompt = format!(
            "Video title: {title}\n\
             Topic: {topic}\n\
             Tone: {tone}\n\
             Style: {style}\n\n\
             Write chapter {number} of {total}: {chapter_title}\n\
             Chapter goal: {chapter_summary}\n\
             Length: about {words} words of narration.\n",
            title = self.script_title,
            topic = self.request.topic.trim(),
            tone = self.request.tone,
            style = self.request.style,
            number = self.index + 1,
            total = self.request.chapter_count,
            chapter_title = self.plan.title,
            chapter_summary = self.plan.summary,
            words = self.target_words,
        );

        if self.previous_summaries.is_empty() {
            prompt.push_str("\nThis is the opening chapter.\n");
        } else {
            prompt.push_str("\nStory so far, one line per earlier chapter:\n");
            for (i, summary) in self.previous_summaries.iter().enumerate() {
                prompt.push_str(&format!("{}. {}\n", i + 1, summary));
            }
            prompt.push_str("Continue from there without repeating it.\n");
        }

        if let Some(draft) = self.request.reference_draft() {
            prompt.push_str("\nAuthor's draft, for content and voice:\n");
            prompt.push_str(draft);
            prompt.push('\n');
        }

        prompt.push_str(
            "\nReturn JSON shaped as:\n\
             {\"body\": \"the narration\", \"summary\": \"one sentence recap of this chapter\"}",
        );

        prompt
    }
}

/// Pull the JSON object out of a model reply.
///
/// Replies are sometimes wrapped in prose or a Markdown code fence, so on a
/// direct parse failure the outermost `{ ... }` span is tried.
pub fn extract_json_object(reply: &str) -> Result<JsonValue> {
    let trimmed = reply.trim();

    let value = match serde_json::from_str::<JsonValue>(trimmed) {
        Ok(value) => value,
        Err(_) => {
            let start = trimmed.find('{');
            let end = trimmed.rfind('}');
            match (start, end) {
                (Some(start), Some(end)) if start < end => {
                    serde_json::from_str(&trimmed[start..=end]).map_err(|e| {
                        Error::ProviderResponse(format!("reply is not valid JSON: {}", e))
                    })?
                }
                _ => {
                    return Err(Error::ProviderResponse(
                        "reply does not contain a JSON object".to_string(),
                    ));
                }
            }
        }
    };

    if !value.is_object() {
        return Err(Error::ProviderResponse(
            "reply JSON is not an object".to_string(),
        ));
    }

    Ok(value)
}

fn non_empty_str(value: &JsonValue, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse an outline reply into a title and exactly `chapter_count` plans.
///
/// Missing stub fields get placeholders; a short list is padded by repeating
/// the last stub and a long one is truncated. Counts above
/// [`MAX_CHAPTER_COUNT`] are rejected before anything is allocated.
pub fn parse_outline(reply: &str, chapter_count: usize) -> Result<(String, Vec<ChapterPlan>)> {
    if chapter_count > MAX_CHAPTER_COUNT {
        return Err(Error::Validation(format!(
            "Chapter count must be between 1 and {}.",
            MAX_CHAPTER_COUNT
        )));
    }
    let value = extract_json_object(reply)?;

    let title = non_empty_str(&value, "title")
        .ok_or_else(|| Error::ProviderResponse("outline is missing a title".to_string()))?;

    let stubs = value
        .get("chapters")
        .and_then(JsonValue::as_array)
        .filter(|chapters| !chapters.is_empty())
        .ok_or_else(|| Error::ProviderResponse("outline has no chapters".to_string()))?;

    let mut chapters: Vec<ChapterPlan> = stubs
        .iter()
        .take(chapter_count)
        .enumerate()
        .map(|(i, stub)| ChapterPlan {
            title: non_empty_str(stub, "title").unwrap_or_else(|| format!("Chapter {}", i + 1)),
            summary: non_empty_str(stub, "summary")
                .unwrap_or_else(|| FALLBACK_SUMMARY.to_string()),
        })
        .collect();

    if let Some(last) = chapters.last().cloned() {
        if chapters.len() < chapter_count {
            chapters.resize(chapter_count, last);
        }
    }

    Ok((title, chapters))
}

/// Parse a chapter reply; `body` is required, `summary` falls back to the plan's.
pub fn parse_chapter(reply: &str, plan: &ChapterPlan) -> Result<(String, String)> {
    let value = extract_json_object(reply)?;

    let body = non_empty_str(&value, "body")
        .ok_or_else(|| Error::ProviderResponse("chapter reply is missing a body".to_string()))?;
    let summary = non_empty_str(&value, "summary").unwrap_or_else(|| plan.summary.clone());

    Ok((body, summary))
}
