use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub session_ttl_secs: u64,
    pub cookie_secure: bool,
    pub site: SiteConfig,
}

/// Public-facing business details used by the marketing site metadata.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub url: String,
    pub name: String,
    pub phone: String,
    pub city: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: "https://example-agency.com".to_string(),
            name: "Example Agency".to_string(),
            phone: "+1-555-010-0100".to_string(),
            city: "Austin".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let site_defaults = SiteConfig::default();

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            session_ttl_secs: std::env::var("SESSION_TTL_SECS")
                .unwrap_or_else(|_| "604800".to_string())
                .parse::<u64>()
                .context("SESSION_TTL_SECS must be a positive integer")?,
            cookie_secure: parse_bool(
                &std::env::var("COOKIE_SECURE").unwrap_or_else(|_| "true".to_string()),
            )
            .context("COOKIE_SECURE must be true or false")?,
            site: SiteConfig {
                url: std::env::var("SITE_URL")
                    .map(|u| u.trim_end_matches('/').to_string())
                    .unwrap_or(site_defaults.url),
                name: std::env::var("SITE_NAME").unwrap_or(site_defaults.name),
                phone: std::env::var("SITE_PHONE").unwrap_or(site_defaults.phone),
                city: std::env::var("SITE_CITY").unwrap_or(site_defaults.city),
            },
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("invalid boolean '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_accepts_common_spellings() {
        assert!(parse_bool("TRUE").unwrap());
        assert!(parse_bool(" on ").unwrap());
        assert!(!parse_bool("0").unwrap());
        assert!(!parse_bool("no").unwrap());
    }

    #[test]
    fn test_parse_bool_rejects_garbage() {
        assert!(parse_bool("maybe").is_err());
    }
}
