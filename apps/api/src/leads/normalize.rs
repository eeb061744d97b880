//! Normalization for lead contact details and blacklist values.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::AppError;
use crate::leads::BlacklistKind;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9\-]+(\.[a-z0-9\-]+)*\.[a-z]{2,}$")
            .expect("email regex is valid")
    })
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Expects an already-normalized address.
pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 254 && email_regex().is_match(email)
}

/// The part after `@`, if any.
pub fn email_domain(email: &str) -> Option<&str> {
    email.rsplit_once('@').map(|(_, d)| d).filter(|d| !d.is_empty())
}

/// Digits only. `+1 (555) 010-0100` → `15550100100`.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Lowercased host with scheme, `www.`, path, and port stripped.
pub fn normalize_domain(domain: &str) -> String {
    let d = domain.trim().to_lowercase();
    let d = d
        .strip_prefix("https://")
        .or_else(|| d.strip_prefix("http://"))
        .unwrap_or(&d);
    let d = d.strip_prefix("www.").unwrap_or(d);
    let d = d.split(['/', '?', '#']).next().unwrap_or("");
    d.split(':').next().unwrap_or("").to_string()
}

/// Normalizes a blacklist value for its kind and rejects values that cannot match anything.
pub fn normalize_blacklist_value(kind: BlacklistKind, value: &str) -> Result<String, AppError> {
    let normalized = match kind {
        BlacklistKind::Email => {
            let email = normalize_email(value);
            if !is_valid_email(&email) {
                return Err(AppError::Validation(format!(
                    "'{value}' is not a valid email address"
                )));
            }
            email
        }
        BlacklistKind::Domain => normalize_domain(value),
        BlacklistKind::Phone => normalize_phone(value),
    };
    if normalized.is_empty() {
        return Err(AppError::Validation(format!(
            "'{value}' is empty after normalization"
        )));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("owner@joes-plumbing.com"));
        assert!(is_valid_email("a.b+leads@mail.example.co.uk"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Owner@Example.COM "), "owner@example.com");
    }

    #[test]
    fn test_email_domain() {
        assert_eq!(email_domain("a@spam.io"), Some("spam.io"));
        assert_eq!(email_domain("nodomain@"), None);
        assert_eq!(email_domain("plain"), None);
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+1 (555) 010-0100"), "15550100100");
        assert_eq!(normalize_phone("call me"), "");
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("https://www.Spam.io/path?x=1"), "spam.io");
        assert_eq!(normalize_domain("spam.io:8080"), "spam.io");
        assert_eq!(normalize_domain(" SPAM.IO "), "spam.io");
    }

    #[test]
    fn test_normalize_blacklist_value() {
        assert_eq!(
            normalize_blacklist_value(BlacklistKind::Email, " Bot@Spam.io ").unwrap(),
            "bot@spam.io"
        );
        assert_eq!(
            normalize_blacklist_value(BlacklistKind::Phone, "555-0100").unwrap(),
            "5550100"
        );
        assert!(normalize_blacklist_value(BlacklistKind::Email, "nope").is_err());
        assert!(normalize_blacklist_value(BlacklistKind::Phone, "---").is_err());
        assert!(normalize_blacklist_value(BlacklistKind::Domain, "https://").is_err());
    }
}
