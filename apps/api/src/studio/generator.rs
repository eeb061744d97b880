//! Content generation: prompt → LLM → validate → duplicate check → persist.
//!
//! A draft whose body duplicates stored content, or whose title collides with a stored
//! title, is regenerated with the offending title added to the avoid list. Validation
//! findings are reported with the draft rather than blocking it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::content::ContentItemRow;
use crate::slug::slugify;
use crate::studio::prompts::{ContentCategory, GenerationPrompt, PromptBuilder};
use crate::studio::repository::{
    content_in_category, insert_content, slugs_like, unique_slug, NewContentItem,
};
use crate::studio::similarity::{ContentSample, DuplicateDetector, DuplicateReport};
use crate::studio::validation::{validate_content, ContentValidation, GeneratedContent};

/// Max regenerations after the first attempt when the draft is a duplicate.
pub const MAX_GENERATION_RETRIES: u32 = 2;

/// Most recent titles passed to the model as the avoid list.
const AVOID_TITLE_LIMIT: usize = 50;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub category: ContentCategory,
    pub topic: String,
    pub business_name: Option<String>,
    pub industry: Option<String>,
    pub city: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub tone: Option<String>,
}

impl GenerateRequest {
    pub fn primary_keyword(&self) -> Option<&str> {
        self.keywords
            .iter()
            .map(|k| k.trim())
            .find(|k| !k.is_empty())
    }

    /// Prompt builder for this request with `existing` titles (newest first) to avoid.
    pub fn prompt_builder(&self, existing: &[ContentItemRow]) -> PromptBuilder {
        PromptBuilder::new(self.category)
            .business(
                self.business_name.as_deref().unwrap_or_default(),
                self.industry.as_deref().unwrap_or_default(),
                self.city.as_deref().unwrap_or_default(),
            )
            .topic(&self.topic)
            .keywords(&self.keywords)
            .tone(self.tone.as_deref())
            .avoid_titles(existing.iter().take(AVOID_TITLE_LIMIT).map(|c| &c.title))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub content: GeneratedContent,
    pub validation: ContentValidation,
    pub duplicate_report: DuplicateReport,
    pub attempts: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub item: ContentItemRow,
    pub validation: ContentValidation,
    pub duplicate_report: DuplicateReport,
    pub attempts: u32,
}

/// Produces content for a prompt. Implemented by the LLM client; scripted in tests.
#[async_trait]
pub trait ContentWriter: Send + Sync {
    async fn write(&self, prompt: &GenerationPrompt) -> Result<GeneratedContent, AppError>;
}

#[async_trait]
impl ContentWriter for LlmClient {
    async fn write(&self, prompt: &GenerationPrompt) -> Result<GeneratedContent, AppError> {
        self.call_json(&prompt.user, &prompt.system)
            .await
            .map_err(|e| AppError::Llm(format!("Content generation call failed: {e}")))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generation loop
// ────────────────────────────────────────────────────────────────────────────

/// Runs generation with duplicate-driven retries. Does not touch the database.
pub async fn run_generation(
    writer: &dyn ContentWriter,
    detector: &DuplicateDetector,
    mut builder: PromptBuilder,
    existing: &[ContentSample],
    primary_keyword: Option<&str>,
) -> Result<GenerationOutcome, AppError> {
    let category = builder.category();

    for attempt in 1..=MAX_GENERATION_RETRIES + 1 {
        let prompt = builder.build()?;
        let content = writer.write(&prompt).await?;

        let candidate = ContentSample {
            id: None,
            category: category.as_str().to_string(),
            title: content.title.clone(),
            body: content.body.clone(),
        };
        let report = detector.check(&candidate, existing);

        if !report.is_duplicate && !report.title_collision {
            let validation = validate_content(category, &content, primary_keyword);
            if !validation.passed {
                warn!(
                    "Generated {} failed {} validation rule(s); saving as draft for review",
                    category,
                    validation.issues.len()
                );
            }
            return Ok(GenerationOutcome {
                content,
                validation,
                duplicate_report: report,
                attempts: attempt,
            });
        }

        warn!(
            "Generation attempt {}/{}: duplicate={} title_collision={} max_similarity={:.2}, retrying",
            attempt,
            MAX_GENERATION_RETRIES + 1,
            report.is_duplicate,
            report.title_collision,
            report.max_similarity
        );

        builder = builder.avoid_title(&content.title);
        if let Some(title) = &report.colliding_title {
            builder = builder.avoid_title(title);
        }
        for m in report.matches.iter().take(3) {
            builder = builder.avoid_title(&m.title);
        }
    }

    Err(AppError::UnprocessableEntity(format!(
        "Generation produced duplicate content {} times in a row. \
        Try a narrower topic or different keywords.",
        MAX_GENERATION_RETRIES + 1
    )))
}

/// Full pipeline: loads existing content, generates, and saves the draft.
pub async fn generate_content(
    pool: &PgPool,
    writer: &dyn ContentWriter,
    detector: &DuplicateDetector,
    request: &GenerateRequest,
    admin_id: Uuid,
) -> Result<GenerateResponse, AppError> {
    if request.topic.trim().is_empty() {
        return Err(AppError::Validation("topic cannot be empty".to_string()));
    }

    let existing_rows = content_in_category(pool, request.category).await?;
    let existing: Vec<ContentSample> = existing_rows.iter().map(ContentSample::from).collect();
    info!(
        "Generating {} with {} existing item(s) in category",
        request.category,
        existing.len()
    );

    let outcome = run_generation(
        writer,
        detector,
        request.prompt_builder(&existing_rows),
        &existing,
        request.primary_keyword(),
    )
    .await?;

    let base = match slugify(&outcome.content.title) {
        s if s.is_empty() => format!("{}-{}", request.category, Uuid::new_v4().simple()),
        s => s,
    };
    let slug = unique_slug(&base, &slugs_like(pool, &base).await?);

    let keywords = if outcome.content.keywords.is_empty() {
        request.keywords.clone()
    } else {
        outcome.content.keywords.clone()
    };

    let item = insert_content(
        pool,
        NewContentItem {
            category: request.category,
            title: outcome.content.title.trim(),
            slug: &slug,
            meta_description: outcome.content.meta_description.trim(),
            body: &outcome.content.body,
            keywords: &keywords,
            max_similarity: outcome.duplicate_report.max_similarity,
            created_by: admin_id,
        },
    )
    .await?;

    info!(
        "Saved draft {} '{}' after {} attempt(s)",
        item.id, item.slug, outcome.attempts
    );

    Ok(GenerateResponse {
        item,
        validation: outcome.validation,
        duplicate_report: outcome.duplicate_report,
        attempts: outcome.attempts,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Returns scripted responses in order and records the prompts it saw.
    struct ScriptedWriter {
        responses: Mutex<Vec<GeneratedContent>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedWriter {
        fn new(mut responses: Vec<GeneratedContent>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ContentWriter for ScriptedWriter {
        async fn write(&self, prompt: &GenerationPrompt) -> Result<GeneratedContent, AppError> {
            self.prompts.lock().unwrap().push(prompt.user.clone());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| AppError::Llm("script exhausted".to_string()))
        }
    }

    fn content(title: &str, body: &str) -> GeneratedContent {
        GeneratedContent {
            title: title.to_string(),
            meta_description: String::new(),
            body: body.to_string(),
            keywords: vec![],
        }
    }

    const STORED_BODY: &str = "Hail storms crack shingles and loosen flashing. \
        Book an inspection after every major storm. Call us for a free estimate.";

    fn existing() -> Vec<ContentSample> {
        vec![ContentSample {
            id: Some(Uuid::new_v4()),
            category: "social_post".to_string(),
            title: "Hail Season Roof Check".to_string(),
            body: STORED_BODY.to_string(),
        }]
    }

    fn builder() -> PromptBuilder {
        PromptBuilder::new(ContentCategory::SocialPost).topic("Storm season roof care")
    }

    #[tokio::test]
    async fn test_first_original_draft_is_accepted() {
        let writer = ScriptedWriter::new(vec![content(
            "Gutter Cleaning Before Fall",
            "Clogged gutters overflow and rot fascia boards. Call us to book a cleaning.",
        )]);
        let outcome = run_generation(
            &writer,
            &DuplicateDetector::default(),
            builder(),
            &existing(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(outcome.attempts, 1);
        assert!(!outcome.duplicate_report.is_duplicate);
        assert_eq!(writer.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_triggers_retry_with_avoid_title() {
        let writer = ScriptedWriter::new(vec![
            content("Storm Damage Alert", STORED_BODY),
            content(
                "Gutter Cleaning Before Fall",
                "Clogged gutters overflow and rot fascia boards. Call us to book a cleaning.",
            ),
        ]);
        let outcome = run_generation(
            &writer,
            &DuplicateDetector::default(),
            builder(),
            &existing(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.content.title, "Gutter Cleaning Before Fall");

        let prompts = writer.prompts.lock().unwrap();
        assert!(!prompts[0].contains("- Storm Damage Alert"));
        assert!(prompts[1].contains("- Storm Damage Alert"));
        assert!(prompts[1].contains("- Hail Season Roof Check"));
    }

    #[tokio::test]
    async fn test_title_collision_triggers_retry() {
        let writer = ScriptedWriter::new(vec![
            content("Hail Season: Roof Check!", "Fresh words about attic ventilation. Call us."),
            content("Attic Ventilation Basics", "Fresh words about attic ventilation. Call us."),
        ]);
        let outcome = run_generation(
            &writer,
            &DuplicateDetector::default(),
            builder(),
            &existing(),
            None,
        )
        .await
        .unwrap();
        assert_eq!(outcome.attempts, 2);
        assert!(!outcome.duplicate_report.title_collision);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let writer = ScriptedWriter::new(vec![
            content("A", STORED_BODY),
            content("B", STORED_BODY),
            content("C", STORED_BODY),
        ]);
        let result = run_generation(
            &writer,
            &DuplicateDetector::default(),
            builder(),
            &existing(),
            None,
        )
        .await;
        assert!(matches!(result, Err(AppError::UnprocessableEntity(_))));
        assert_eq!(
            writer.prompts.lock().unwrap().len() as u32,
            MAX_GENERATION_RETRIES + 1
        );
    }

    #[tokio::test]
    async fn test_validation_issues_are_reported_not_fatal() {
        let writer = ScriptedWriter::new(vec![content("Short", "Too short.")]);
        let outcome = run_generation(
            &writer,
            &DuplicateDetector::default(),
            builder(),
            &[],
            Some("roof care"),
        )
        .await
        .unwrap();
        assert!(!outcome.validation.passed);
        assert!(!outcome.validation.issues.is_empty());
    }

    #[tokio::test]
    async fn test_llm_error_propagates() {
        let writer = ScriptedWriter::new(vec![]);
        let result = run_generation(
            &writer,
            &DuplicateDetector::default(),
            builder(),
            &[],
            None,
        )
        .await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }

    #[test]
    fn test_primary_keyword_skips_blanks() {
        let request = GenerateRequest {
            category: ContentCategory::BlogPost,
            topic: "x".to_string(),
            business_name: None,
            industry: None,
            city: None,
            keywords: vec!["  ".to_string(), " roof repair ".to_string()],
            tone: None,
        };
        assert_eq!(request.primary_keyword(), Some("roof repair"));
    }

    #[test]
    fn test_generate_request_deserialization() {
        let json = serde_json::json!({
            "category": "location_page",
            "topic": "Roof repair in Round Rock",
            "city": "Round Rock"
        });
        let request: GenerateRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.category, ContentCategory::LocationPage);
        assert!(request.keywords.is_empty());
        assert_eq!(request.city.as_deref(), Some("Round Rock"));
    }
}
