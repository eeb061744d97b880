use std::sync::OnceLock;

use regex::Regex;

const MAX_SLUG_LEN: usize = 80;

fn separator_regex() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug regex is valid"))
}

/// URL slug: lowercase ASCII alphanumerics joined by single dashes.
pub fn slugify(text: &str) -> String {
    let lower = text.to_lowercase();
    let slug = separator_regex().replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.len() <= MAX_SLUG_LEN {
        return slug.to_string();
    }
    slug[..MAX_SLUG_LEN].trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("5 Signs You Need a New Roof!"), "5-signs-you-need-a-new-roof");
        assert_eq!(slugify("  --Local SEO: Growth Plan--  "), "local-seo-growth-plan");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("Café Menu"), "caf-menu");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_truncates() {
        let slug = slugify(&"word ".repeat(40));
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }
}
