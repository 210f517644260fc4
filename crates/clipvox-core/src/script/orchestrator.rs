//! Outline → chapter script orchestrator

use std::sync::Arc;

use tracing::{debug, info};

use super::prompts::{
    self, CHAPTER_SYSTEM, ChapterPrompt, OUTLINE_SYSTEM, chapter_target_words, outline_prompt,
};
use super::types::{ChapterPlan, ChapterSection, GeneratedScript, ScriptRequest};
use crate::error::Result;
use crate::llm::{CompletionRequest, TextGenerator};

/// Continuity carried from one chapter to the next: the one-sentence
/// summaries of every chapter written so far, never the bodies.
#[derive(Debug, Default)]
struct Continuity {
    summaries: Vec<String>,
    sections: Vec<ChapterSection>,
}

impl Continuity {
    fn with_capacity(chapters: usize) -> Self {
        Self {
            summaries: Vec::with_capacity(chapters),
            sections: Vec::with_capacity(chapters),
        }
    }

    fn push(mut self, section: ChapterSection) -> Self {
        self.summaries.push(section.summary.clone());
        self.sections.push(section);
        self
    }
}

/// Writes a narration script: one outline call, then one call per chapter.
///
/// Chapters are written strictly in order since each prompt needs the
/// summaries of the chapters before it. Any failed step aborts the whole
/// script.
#[derive(Clone)]
pub struct ScriptOrchestrator {
    generator: Arc<dyn TextGenerator>,
}

impl ScriptOrchestrator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Generate the full script for `request`
    pub async fn generate_script(&self, request: &ScriptRequest) -> Result<GeneratedScript> {
        request.validate()?;

        info!(
            "Generating script: topic={:?}, mode={}, chapters={}, minutes={}",
            request.topic, request.mode, request.chapter_count, request.target_minutes
        );

        let (title, plans) = self.outline(request).await?;
        info!("Outline ready: {:?} with {} chapters", title, plans.len());

        let target_words = chapter_target_words(request.target_minutes, request.chapter_count);

        let mut continuity = Continuity::with_capacity(plans.len());
        for (index, plan) in plans.iter().enumerate() {
            let prompt = ChapterPrompt {
                request,
                script_title: &title,
                index,
                plan,
                previous_summaries: &continuity.summaries,
                target_words,
            };
            let section = self.write_chapter(prompt, plan).await?;
            info!("Chapter {}/{} written", index + 1, plans.len());
            continuity = continuity.push(section);
        }

        Ok(GeneratedScript::assemble(title, plans, &continuity.sections))
    }

    async fn outline(&self, request: &ScriptRequest) -> Result<(String, Vec<ChapterPlan>)> {
        let completion = CompletionRequest::new(OUTLINE_SYSTEM, outline_prompt(request));
        let reply = self.generator.generate(completion).await?;
        debug!("Outline reply: {} bytes", reply.len());

        prompts::parse_outline(&reply, request.chapter_count)
    }

    async fn write_chapter(
        &self,
        prompt: ChapterPrompt<'_>,
        plan: &ChapterPlan,
    ) -> Result<ChapterSection> {
        let completion = CompletionRequest::new(CHAPTER_SYSTEM, prompt.render())
            .with_max_tokens(chapter_max_tokens(prompt.target_words));

        let reply = self.generator.generate(completion).await?;
        debug!("Chapter {} reply: {} bytes", prompt.index + 1, reply.len());

        let (body, summary) = prompts::parse_chapter(&reply, plan)?;
        Ok(ChapterSection { body, summary })
    }
}

/// Token budget for one chapter reply. Leaves room for JSON framing on top
/// of the narration itself.
fn chapter_max_tokens(target_words: u64) -> u64 {
    target_words.saturating_mul(2).saturating_add(256).max(1024)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::llm::mock::ScriptedGenerator;

    fn scripted(replies: Vec<Result<String>>) -> Arc<ScriptedGenerator> {
        Arc::new(ScriptedGenerator::new(replies))
    }

    fn outline(titles: &[&str]) -> Result<String> {
        let chapters: Vec<_> = titles
            .iter()
            .map(|t| serde_json::json!({"title": t, "summary": format!("About {}", t)}))
            .collect();
        Ok(serde_json::json!({"title": "Tides", "chapters": chapters}).to_string())
    }

    fn chapter(body: &str, summary: &str) -> Result<String> {
        Ok(serde_json::json!({"body": body, "summary": summary}).to_string())
    }

    fn chapter_headings(script: &GeneratedScript) -> Vec<String> {
        script
            .as_str()
            .lines()
            .filter(|line| line.starts_with("Chapter "))
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_three_chapters_in_order() {
        let generator = scripted(vec![
            outline(&["Moon", "Coast", "Future"]),
            chapter("The moon pulls.", "Moon pulls water."),
            chapter("The coast breathes.", "Coasts flood and drain."),
            chapter("Tomorrow's tides.", "Tides will change."),
        ]);
        let orchestrator = ScriptOrchestrator::new(generator.clone());

        let request = ScriptRequest::new("X")
            .with_chapter_count(3)
            .with_target_minutes(3.0);
        let script = orchestrator.generate_script(&request).await.unwrap();

        assert_eq!(
            chapter_headings(&script),
            vec!["Chapter 1: Moon", "Chapter 2: Coast", "Chapter 3: Future"]
        );
        assert!(script.as_str().starts_with("Tides\n\nChapter 1: Moon\nThe moon pulls."));
        assert_eq!(generator.prompts().len(), 4);
    }

    #[tokio::test]
    async fn test_prior_summaries_are_carried_forward() {
        let generator = scripted(vec![
            outline(&["Moon", "Coast", "Future"]),
            chapter("BODY-ONE", "SUMMARY-ONE"),
            chapter("BODY-TWO", "SUMMARY-TWO"),
            chapter("BODY-THREE", "SUMMARY-THREE"),
        ]);
        let orchestrator = ScriptOrchestrator::new(generator.clone());

        orchestrator
            .generate_script(&ScriptRequest::new("Tides").with_chapter_count(3))
            .await
            .unwrap();

        let prompts = generator.prompts();
        assert!(prompts[1].contains("opening chapter"));
        assert!(prompts[2].contains("1. SUMMARY-ONE"));
        assert!(prompts[3].contains("1. SUMMARY-ONE"));
        assert!(prompts[3].contains("2. SUMMARY-TWO"));
        assert!(!prompts[3].contains("BODY-ONE"));
    }

    #[tokio::test]
    async fn test_short_outline_is_padded() {
        let generator = scripted(vec![
            outline(&["Moon", "Coast"]),
            chapter("a", "a"),
            chapter("b", "b"),
            chapter("c", "c"),
            chapter("d", "d"),
        ]);
        let orchestrator = ScriptOrchestrator::new(generator);

        let script = orchestrator
            .generate_script(&ScriptRequest::new("Tides").with_chapter_count(4))
            .await
            .unwrap();

        assert_eq!(
            chapter_headings(&script),
            vec![
                "Chapter 1: Moon",
                "Chapter 2: Coast",
                "Chapter 3: Coast",
                "Chapter 4: Coast"
            ]
        );
        assert_eq!(script.chapters()[3].summary, "About Coast");
    }

    #[tokio::test]
    async fn test_long_outline_is_truncated() {
        let generator = scripted(vec![
            outline(&["A", "B", "C", "D"]),
            chapter("a", "a"),
            chapter("b", "b"),
        ]);
        let orchestrator = ScriptOrchestrator::new(generator.clone());

        let script = orchestrator
            .generate_script(&ScriptRequest::new("Tides").with_chapter_count(2))
            .await
            .unwrap();

        assert_eq!(chapter_headings(&script), vec!["Chapter 1: A", "Chapter 2: B"]);
        assert_eq!(generator.prompts().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_body_aborts_without_partial_script() {
        let generator = scripted(vec![
            outline(&["Moon", "Coast", "Future"]),
            chapter("The moon pulls.", "Moon."),
            Ok(r#"{"summary": "no body"}"#.to_string()),
            chapter("never requested", "x"),
        ]);
        let orchestrator = ScriptOrchestrator::new(generator.clone());

        let err = orchestrator
            .generate_script(&ScriptRequest::new("Tides").with_chapter_count(3))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ProviderResponse(_)));
        assert_eq!(generator.prompts().len(), 3);
    }

    #[tokio::test]
    async fn test_generator_failure_propagates() {
        let generator = scripted(vec![Err(Error::LlmApi(
            "429 Too Many Requests".to_string(),
        ))]);
        let orchestrator = ScriptOrchestrator::new(generator);

        let err = orchestrator
            .generate_script(&ScriptRequest::new("Tides"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LlmApi(_)));
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_call() {
        let generator = scripted(vec![]);
        let orchestrator = ScriptOrchestrator::new(generator.clone());

        let err = orchestrator
            .generate_script(&ScriptRequest::new("  "))
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(generator.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_craft_mode_sends_draft() {
        let generator = scripted(vec![outline(&["Only"]), chapter("b", "s")]);
        let orchestrator = ScriptOrchestrator::new(generator.clone());

        let request = ScriptRequest::new("Tides")
            .with_chapter_count(1)
            .with_draft("Open on a lighthouse keeper.");
        orchestrator.generate_script(&request).await.unwrap();

        assert!(
            generator
                .prompts()
                .iter()
                .all(|p| p.contains("Open on a lighthouse keeper."))
        );
    }

    #[test]
    fn test_chapter_max_tokens() {
        assert_eq!(chapter_max_tokens(180), 1024);
        assert_eq!(chapter_max_tokens(1300), 2856);
        assert_eq!(chapter_max_tokens(u64::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_oversized_request_rejected_before_outline() {
        let generator = scripted(vec![outline(&["Only"])]);
        let orchestrator = ScriptOrchestrator::new(generator.clone());

        let request = ScriptRequest::new("Tides")
            .with_chapter_count(1)
            .with_target_minutes(1e300);
        let err = orchestrator.generate_script(&request).await.unwrap_err();
        assert!(err.is_validation());

        let request = ScriptRequest::new("Tides").with_chapter_count(u32::MAX as usize);
        let err = orchestrator.generate_script(&request).await.unwrap_err();
        assert!(err.is_validation());

        assert!(generator.prompts().is_empty());
    }
}
