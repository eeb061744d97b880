use serde::{Deserialize, Serialize};

use crate::studio::prompts::{ContentCategory, BANNED_PHRASES, CTA_MARKERS, TITLE_MAX_CHARS};

/// Content as returned by the generation model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub title: String,
    #[serde(default)]
    pub meta_description: String,
    pub body: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub rule: String,
    pub severity: IssueSeverity,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentValidation {
    /// False when any issue has `Error` severity.
    pub passed: bool,
    pub word_count: usize,
    pub issues: Vec<ValidationIssue>,
}

fn issue(rule: &str, severity: IssueSeverity, message: String) -> ValidationIssue {
    ValidationIssue {
        rule: rule.to_string(),
        severity,
        message,
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

/// Counts markdown headings of level 2 or deeper.
pub fn heading_count(body: &str) -> usize {
    body.lines()
        .map(str::trim_start)
        .filter(|l| l.starts_with("## ") || l.starts_with("### "))
        .count()
}

/// Checks generated content against its category's rules.
///
/// `primary_keyword` is the first requested keyword, if any.
pub fn validate_content(
    category: ContentCategory,
    content: &GeneratedContent,
    primary_keyword: Option<&str>,
) -> ContentValidation {
    let rules = category.rules();
    let mut issues = Vec::new();

    let words = word_count(&content.body);
    if words < rules.min_words {
        issues.push(issue(
            "word_count",
            IssueSeverity::Error,
            format!("Body has {words} words; minimum is {}", rules.min_words),
        ));
    } else if words > rules.max_words {
        issues.push(issue(
            "word_count",
            IssueSeverity::Warning,
            format!("Body has {words} words; maximum is {}", rules.max_words),
        ));
    }

    let title = content.title.trim();
    let title_len = title.chars().count();
    if title.is_empty() {
        issues.push(issue(
            "title",
            IssueSeverity::Error,
            "Title is empty".to_string(),
        ));
    } else if title_len > TITLE_MAX_CHARS {
        issues.push(issue(
            "title",
            IssueSeverity::Error,
            format!("Title is {title_len} characters; maximum is {TITLE_MAX_CHARS}"),
        ));
    }

    if let Some((min, max)) = rules.meta_description {
        let len = content.meta_description.trim().chars().count();
        if len == 0 {
            issues.push(issue(
                "meta_description",
                IssueSeverity::Error,
                "Meta description is empty".to_string(),
            ));
        } else if len < min || len > max {
            issues.push(issue(
                "meta_description",
                IssueSeverity::Warning,
                format!("Meta description is {len} characters; expected {min}-{max}"),
            ));
        }
    }

    if let Some(keyword) = primary_keyword.map(str::trim).filter(|k| !k.is_empty()) {
        let keyword = keyword.to_lowercase();
        if !content.title.to_lowercase().contains(&keyword)
            && !content.body.to_lowercase().contains(&keyword)
        {
            issues.push(issue(
                "primary_keyword",
                IssueSeverity::Warning,
                format!("Primary keyword '{keyword}' appears in neither title nor body"),
            ));
        }
    }

    let headings = heading_count(&content.body);
    if headings < rules.min_headings {
        issues.push(issue(
            "headings",
            IssueSeverity::Warning,
            format!(
                "Body has {headings} headings; at least {} expected",
                rules.min_headings
            ),
        ));
    }

    let lower_body = content.body.to_lowercase();
    if rules.requires_cta && !CTA_MARKERS.iter().any(|m| lower_body.contains(m)) {
        issues.push(issue(
            "call_to_action",
            IssueSeverity::Error,
            "No call to action found".to_string(),
        ));
    }

    let lower_all = format!("{} {}", content.title.to_lowercase(), lower_body);
    for phrase in BANNED_PHRASES {
        if lower_all.contains(phrase) {
            issues.push(issue(
                "banned_phrase",
                IssueSeverity::Error,
                format!("Contains banned phrase '{phrase}'"),
            ));
        }
    }

    ContentValidation {
        passed: !issues.iter().any(|i| i.severity == IssueSeverity::Error),
        word_count: words,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["roofing"; n].join(" ")
    }

    fn social(body: &str) -> GeneratedContent {
        GeneratedContent {
            title: "Spring tune-up special".to_string(),
            meta_description: String::new(),
            body: body.to_string(),
            keywords: vec![],
        }
    }

    fn has_rule(v: &ContentValidation, rule: &str) -> bool {
        v.issues.iter().any(|i| i.rule == rule)
    }

    #[test]
    fn test_word_count_ignores_punctuation_tokens() {
        assert_eq!(word_count("Roof repair — fast & local!"), 4);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_heading_count() {
        let body = "# Title\n## One\ntext\n  ### Two\n####Nope\n## Three";
        assert_eq!(heading_count(body), 3);
    }

    #[test]
    fn test_valid_social_post_passes() {
        let body = format!("{} Call us today to book.", words(30));
        let v = validate_content(ContentCategory::SocialPost, &social(&body), None);
        assert!(v.passed, "{:?}", v.issues);
        assert!(v.issues.is_empty());
    }

    #[test]
    fn test_too_short_body_fails() {
        let body = "Call us today.";
        let v = validate_content(ContentCategory::SocialPost, &social(body), None);
        assert!(!v.passed);
        assert!(has_rule(&v, "word_count"));
    }

    #[test]
    fn test_too_long_body_is_only_a_warning() {
        let body = format!("{} Call us today.", words(200));
        let v = validate_content(ContentCategory::SocialPost, &social(&body), None);
        assert!(v.passed);
        assert!(has_rule(&v, "word_count"));
    }

    #[test]
    fn test_missing_cta_fails() {
        let v = validate_content(ContentCategory::SocialPost, &social(&words(30)), None);
        assert!(!v.passed);
        assert!(has_rule(&v, "call_to_action"));
    }

    #[test]
    fn test_banned_phrase_fails() {
        let body = format!("In today's fast-paced world, {} call us.", words(30));
        let v = validate_content(ContentCategory::SocialPost, &social(&body), None);
        assert!(!v.passed);
        assert!(has_rule(&v, "banned_phrase"));
    }

    #[test]
    fn test_long_title_fails() {
        let mut content = social(&format!("{} Contact us.", words(30)));
        content.title = "x".repeat(61);
        let v = validate_content(ContentCategory::SocialPost, &content, None);
        assert!(!v.passed);
        assert!(has_rule(&v, "title"));
    }

    #[test]
    fn test_missing_keyword_is_warning() {
        let body = format!("{} Call us.", words(30));
        let v = validate_content(
            ContentCategory::SocialPost,
            &social(&body),
            Some("Hail Damage"),
        );
        assert!(v.passed);
        assert!(has_rule(&v, "primary_keyword"));

        let body = format!("{} hail damage checks. Call us.", words(30));
        let v = validate_content(
            ContentCategory::SocialPost,
            &social(&body),
            Some("Hail Damage"),
        );
        assert!(!has_rule(&v, "primary_keyword"));
    }

    #[test]
    fn test_blog_post_requires_meta_and_headings() {
        let content = GeneratedContent {
            title: "Austin Roof Inspection Guide".to_string(),
            meta_description: String::new(),
            body: format!("{} Get a quote today.", words(900)),
            keywords: vec![],
        };
        let v = validate_content(ContentCategory::BlogPost, &content, None);
        assert!(!v.passed);
        assert!(has_rule(&v, "meta_description"));
        assert!(has_rule(&v, "headings"));
    }

    #[test]
    fn test_meta_description_out_of_range_is_warning() {
        let content = GeneratedContent {
            title: "Austin Roof Inspection Guide".to_string(),
            meta_description: "Too short.".to_string(),
            body: format!(
                "## One\n## Two\n## Three\n{} Get a quote today.",
                words(900)
            ),
            keywords: vec![],
        };
        let v = validate_content(ContentCategory::BlogPost, &content, None);
        assert!(v.passed, "{:?}", v.issues);
        assert!(has_rule(&v, "meta_description"));
    }
}
