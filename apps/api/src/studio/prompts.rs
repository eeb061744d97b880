//! Category-specific generation prompts for the content studio.
//!
//! Every category carries its own `CategoryRules`. The same rules are rendered into
//! the prompt and enforced afterwards by `studio::validation`, so the model is told
//! exactly what it will be checked against.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::{
    BRAND_SAFETY_INSTRUCTION, JSON_ONLY_SYSTEM, ORIGINALITY_INSTRUCTION,
};

/// SEO title ceiling shared by all categories.
pub const TITLE_MAX_CHARS: usize = 60;

/// Phrases that mark copy as generic filler. Rejected by validation.
pub const BANNED_PHRASES: &[&str] = &[
    "in today's fast-paced world",
    "in today's digital age",
    "as an ai",
    "look no further",
    "unlock the power",
    "game-changer",
    "delve into",
    "in conclusion",
];

/// Phrases that count as a call to action.
pub const CTA_MARKERS: &[&str] = &[
    "call us",
    "contact us",
    "get a quote",
    "get a free",
    "book a",
    "schedule a",
    "request a",
    "reach out",
    "sign up",
    "subscribe",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    BlogPost,
    ServicePage,
    LocationPage,
    CaseStudy,
    SocialPost,
    EmailNewsletter,
    Faq,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 7] = [
        ContentCategory::BlogPost,
        ContentCategory::ServicePage,
        ContentCategory::LocationPage,
        ContentCategory::CaseStudy,
        ContentCategory::SocialPost,
        ContentCategory::EmailNewsletter,
        ContentCategory::Faq,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::BlogPost => "blog_post",
            ContentCategory::ServicePage => "service_page",
            ContentCategory::LocationPage => "location_page",
            ContentCategory::CaseStudy => "case_study",
            ContentCategory::SocialPost => "social_post",
            ContentCategory::EmailNewsletter => "email_newsletter",
            ContentCategory::Faq => "faq",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContentCategory::BlogPost => "blog post",
            ContentCategory::ServicePage => "service page",
            ContentCategory::LocationPage => "location landing page",
            ContentCategory::CaseStudy => "case study",
            ContentCategory::SocialPost => "social media post",
            ContentCategory::EmailNewsletter => "email newsletter",
            ContentCategory::Faq => "FAQ page",
        }
    }

    pub fn rules(&self) -> CategoryRules {
        match self {
            ContentCategory::BlogPost => CategoryRules {
                min_words: 800,
                max_words: 1500,
                meta_description: Some((120, 160)),
                min_headings: 3,
                requires_cta: true,
                structure: "Open with a short hook tied to the reader's problem. \
                    Use 3-6 '## ' sections with practical, specific advice. \
                    Close with a short summary and a call to action.",
            },
            ContentCategory::ServicePage => CategoryRules {
                min_words: 500,
                max_words: 1000,
                meta_description: Some((120, 160)),
                min_headings: 3,
                requires_cta: true,
                structure: "Sections: what the service is, who it is for, how the process \
                    works, what it includes, and why choose this business. \
                    End with a clear call to action.",
            },
            ContentCategory::LocationPage => CategoryRules {
                min_words: 400,
                max_words: 900,
                meta_description: Some((120, 160)),
                min_headings: 2,
                requires_cta: true,
                structure: "Anchor every section in the named city: local conditions, \
                    neighborhoods served, and local reasons to act. \
                    Avoid boilerplate that would fit any city.",
            },
            ContentCategory::CaseStudy => CategoryRules {
                min_words: 600,
                max_words: 1200,
                meta_description: Some((120, 160)),
                min_headings: 3,
                requires_cta: false,
                structure: "Sections: the challenge, the approach, the outcome. \
                    Describe outcomes qualitatively unless figures are provided.",
            },
            ContentCategory::SocialPost => CategoryRules {
                min_words: 20,
                max_words: 120,
                meta_description: None,
                min_headings: 0,
                requires_cta: true,
                structure: "One short hook line, two or three lines of value, \
                    then a call to action. No headings. At most three hashtags.",
            },
            ContentCategory::EmailNewsletter => CategoryRules {
                min_words: 200,
                max_words: 600,
                meta_description: Some((40, 140)),
                min_headings: 1,
                requires_cta: true,
                structure: "The title is the subject line; the meta description is the \
                    preview text. Lead with one timely tip, follow with one update, \
                    and end with a single call to action.",
            },
            ContentCategory::Faq => CategoryRules {
                min_words: 400,
                max_words: 1200,
                meta_description: Some((120, 160)),
                min_headings: 5,
                requires_cta: false,
                structure: "Each question is a '## ' heading phrased the way a customer \
                    would ask it, followed by a direct two-to-four sentence answer.",
            },
        }
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown content category '{s}'")))
    }
}

/// Generation and validation rules for a single category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryRules {
    pub min_words: usize,
    pub max_words: usize,
    /// Inclusive character range; `None` when the category has no meta description.
    pub meta_description: Option<(usize, usize)>,
    pub min_headings: usize,
    pub requires_cta: bool,
    pub structure: &'static str,
}

impl CategoryRules {
    /// Renders the rules as the numbered list embedded in prompts.
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!(
                "Body length: between {} and {} words.",
                self.min_words, self.max_words
            ),
            format!("Title: at most {TITLE_MAX_CHARS} characters."),
        ];
        match self.meta_description {
            Some((min, max)) => lines.push(format!(
                "meta_description: between {min} and {max} characters."
            )),
            None => lines.push("meta_description: empty string.".to_string()),
        }
        if self.min_headings > 0 {
            lines.push(format!(
                "Use at least {} markdown '## ' headings in the body.",
                self.min_headings
            ));
        } else {
            lines.push("Do not use markdown headings.".to_string());
        }
        if self.requires_cta {
            lines.push(
                "Include an explicit call to action (e.g. 'Call us', 'Get a quote', 'Book a visit')."
                    .to_string(),
            );
        }
        lines.push("Use the primary keyword in the title or the first paragraph.".to_string());
        lines.push(format!(
            "Never use these phrases: {}.",
            BANNED_PHRASES
                .iter()
                .map(|p| format!("\"{p}\""))
                .collect::<Vec<_>>()
                .join(", ")
        ));
        lines.push(format!("Structure: {}", self.structure));

        lines
            .iter()
            .enumerate()
            .map(|(i, l)| format!("{}. {}", i + 1, l))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Studio system prompt. JSON-only output with a copywriter persona.
pub const GENERATION_SYSTEM: &str = "\
You are a senior copywriter at a marketing agency that serves small local businesses. \
You write clear, specific, search-friendly copy in plain language.";

/// Generation prompt template. Placeholders are replaced by `PromptBuilder::build`.
pub const GENERATION_PROMPT_TEMPLATE: &str = r#"Write a {category_label} for the business below.

BUSINESS:
- Name: {business_name}
- Industry: {industry}
- City: {city}

TOPIC:
{topic}

TARGET KEYWORDS (first one is primary):
{keywords}

TONE:
{tone}

RULES:
{rules}

TITLES ALREADY USED (do not reuse or paraphrase):
{avoid_titles}

{brand_safety_instruction}

{originality_instruction}

OUTPUT SCHEMA (return exactly this structure):
{
  "title": "string",
  "meta_description": "string",
  "body": "markdown string",
  "keywords": ["string"]
}"#;

/// A fully assembled prompt pair.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationPrompt {
    pub system: String,
    pub user: String,
}

/// Assembles category-specific generation prompts.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    category: ContentCategory,
    business_name: String,
    industry: String,
    city: String,
    topic: String,
    keywords: Vec<String>,
    tone: String,
    avoid_titles: Vec<String>,
}

impl PromptBuilder {
    pub fn new(category: ContentCategory) -> Self {
        Self {
            category,
            business_name: String::new(),
            industry: String::new(),
            city: String::new(),
            topic: String::new(),
            keywords: Vec::new(),
            tone: "friendly, confident, and local".to_string(),
            avoid_titles: Vec::new(),
        }
    }

    pub fn business(mut self, name: &str, industry: &str, city: &str) -> Self {
        self.business_name = name.trim().to_string();
        self.industry = industry.trim().to_string();
        self.city = city.trim().to_string();
        self
    }

    pub fn topic(mut self, topic: &str) -> Self {
        self.topic = topic.trim().to_string();
        self
    }

    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        self
    }

    pub fn tone(mut self, tone: Option<&str>) -> Self {
        if let Some(t) = tone.map(str::trim).filter(|t| !t.is_empty()) {
            self.tone = t.to_string();
        }
        self
    }

    pub fn avoid_title(mut self, title: &str) -> Self {
        let title = title.trim();
        if !title.is_empty() && !self.avoid_titles.iter().any(|t| t == title) {
            self.avoid_titles.push(title.to_string());
        }
        self
    }

    pub fn avoid_titles<I, S>(self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        titles
            .into_iter()
            .fold(self, |builder, t| builder.avoid_title(t.as_ref()))
    }

    pub fn category(&self) -> ContentCategory {
        self.category
    }

    pub fn build(&self) -> Result<GenerationPrompt, AppError> {
        if self.topic.is_empty() {
            return Err(AppError::Validation("topic cannot be empty".to_string()));
        }

        let or_unspecified = |s: &str| {
            if s.is_empty() {
                "(not specified)".to_string()
            } else {
                s.to_string()
            }
        };

        let keywords = if self.keywords.is_empty() {
            "(none; choose natural search phrases for the topic)".to_string()
        } else {
            self.keywords.join(", ")
        };

        let avoid_titles = if self.avoid_titles.is_empty() {
            "(none)".to_string()
        } else {
            self.avoid_titles
                .iter()
                .map(|t| format!("- {t}"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let business_name = or_unspecified(&self.business_name);
        let industry = or_unspecified(&self.industry);
        let city = or_unspecified(&self.city);
        let rules = self.category.rules().render();
        let user = fill_template(
            GENERATION_PROMPT_TEMPLATE,
            &[
                ("category_label", self.category.label()),
                ("business_name", business_name.as_str()),
                ("industry", industry.as_str()),
                ("city", city.as_str()),
                ("topic", self.topic.as_str()),
                ("keywords", keywords.as_str()),
                ("tone", self.tone.as_str()),
                ("rules", rules.as_str()),
                ("avoid_titles", avoid_titles.as_str()),
                ("brand_safety_instruction", BRAND_SAFETY_INSTRUCTION),
                ("originality_instruction", ORIGINALITY_INSTRUCTION),
            ],
        );

        Ok(GenerationPrompt {
            system: format!("{GENERATION_SYSTEM} {JSON_ONLY_SYSTEM}"),
            user,
        })
    }
}

/// Substitutes `{name}` placeholders in one pass over `template`. Substituted
/// values are never rescanned, and braces that do not name a known key are
/// copied as-is.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> PromptBuilder {
        PromptBuilder::new(ContentCategory::BlogPost)
            .business("Lone Star Roofing", "roofing", "Austin")
            .topic("Preparing your roof for hail season")
            .keywords(["austin roof inspection", "hail damage"])
    }

    #[test]
    fn test_fill_template_single_pass() {
        let filled = fill_template(
            "{a} and {b} with {\"json\": 1} and {unknown}",
            &[("a", "{b}"), ("b", "B")],
        );
        assert_eq!(filled, "{b} and B with {\"json\": 1} and {unknown}");
        assert_eq!(fill_template("trailing {a", &[("a", "x")]), "trailing {a");
    }

    #[test]
    fn test_build_does_not_expand_placeholders_in_user_text() {
        let prompt = PromptBuilder::new(ContentCategory::BlogPost)
            .business("{topic} Roofing", "roofing", "Austin")
            .topic("Why {rules} matter for hail season")
            .build()
            .unwrap();
        assert!(prompt.user.contains("{topic} Roofing"));
        assert!(prompt.user.contains("Why {rules} matter for hail season"));
        assert_eq!(prompt.user.matches("Body length:").count(), 1);
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in ContentCategory::ALL {
            assert_eq!(category.as_str().parse::<ContentCategory>().unwrap(), category);
        }
        assert!("press_release".parse::<ContentCategory>().is_err());
    }

    #[test]
    fn test_prompt_embeds_business_and_keywords() {
        let prompt = builder().build().unwrap();
        assert!(prompt.user.contains("Lone Star Roofing"));
        assert!(prompt.user.contains("Austin"));
        assert!(prompt.user.contains("austin roof inspection, hail damage"));
        assert!(prompt.user.contains("blog post"));
        assert!(prompt.system.contains("valid JSON only"));
    }

    #[test]
    fn test_prompt_embeds_category_rules() {
        let prompt = builder().build().unwrap();
        assert!(prompt.user.contains("between 800 and 1500 words"));
        assert!(prompt.user.contains("at least 3 markdown '## ' headings"));
        assert!(prompt.user.contains("between 120 and 160 characters"));
        assert!(prompt.user.contains("call to action"));
        assert!(prompt.user.contains("\"delve into\""));
    }

    #[test]
    fn test_social_post_rules_forbid_headings() {
        let prompt = PromptBuilder::new(ContentCategory::SocialPost)
            .topic("Spring tune-up special")
            .build()
            .unwrap();
        assert!(prompt.user.contains("Do not use markdown headings."));
        assert!(prompt.user.contains("meta_description: empty string."));
        assert!(prompt.user.contains("(not specified)"));
    }

    #[test]
    fn test_prompt_lists_avoid_titles_once() {
        let prompt = builder()
            .avoid_titles(["Hail Season Checklist", "Roof Inspection 101"])
            .avoid_title("Hail Season Checklist")
            .build()
            .unwrap();
        assert_eq!(prompt.user.matches("- Hail Season Checklist").count(), 1);
        assert!(prompt.user.contains("- Roof Inspection 101"));
    }

    #[test]
    fn test_no_placeholders_left_behind() {
        let prompt = builder().build().unwrap();
        for placeholder in [
            "{category_label}",
            "{business_name}",
            "{topic}",
            "{keywords}",
            "{rules}",
            "{avoid_titles}",
            "{brand_safety_instruction}",
            "{originality_instruction}",
        ] {
            assert!(!prompt.user.contains(placeholder), "left {placeholder}");
        }
    }

    #[test]
    fn test_empty_topic_is_rejected() {
        let result = PromptBuilder::new(ContentCategory::Faq).topic("   ").build();
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_tone_override() {
        let prompt = builder().tone(Some("playful")).build().unwrap();
        assert!(prompt.user.contains("TONE:\nplayful"));
        let prompt = builder().tone(Some("  ")).build().unwrap();
        assert!(prompt.user.contains("friendly, confident, and local"));
    }
}
