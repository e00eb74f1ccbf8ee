use std::time::Duration;

use anyhow::{Context, Result};

use crate::acquisition::{ExporterSettings, PaginationPolicy};

/// Application configuration loaded from environment variables.
/// Session credentials are optional; without them only embedded payloads work.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub voyager_base_url: String,
    pub session_csrf_token: Option<String>,
    pub session_cookie: Option<String>,
    pub prefer_embedded: bool,
    pub page_size: u64,
    pub pagination_request_limit: u32,
    pub pagination_throttle: Duration,
    pub lazy_load_settle: Duration,
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            voyager_base_url: "https://www.linkedin.com/voyager/api".to_string(),
            session_csrf_token: None,
            session_cookie: None,
            prefer_embedded: true,
            page_size: 20,
            pagination_request_limit: 100,
            pagination_throttle: Duration::from_millis(100),
            lazy_load_settle: Duration::from_millis(400),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            voyager_base_url: std::env::var("VOYAGER_BASE_URL")
                .unwrap_or(defaults.voyager_base_url),
            session_csrf_token: optional_env("SESSION_CSRF_TOKEN"),
            session_cookie: optional_env("SESSION_COOKIE"),
            prefer_embedded: parse_env("PREFER_EMBEDDED", defaults.prefer_embedded)?,
            page_size: parse_env("PAGE_SIZE", defaults.page_size)?,
            pagination_request_limit: parse_env(
                "PAGINATION_REQUEST_LIMIT",
                defaults.pagination_request_limit,
            )?,
            pagination_throttle: Duration::from_millis(parse_env("PAGINATION_THROTTLE_MS", 100)?),
            lazy_load_settle: Duration::from_millis(parse_env("LAZY_LOAD_SETTLE_MS", 400)?),
            fetch_timeout: Duration::from_secs(parse_env("FETCH_TIMEOUT_SECS", 30)?),
        })
    }

    pub fn exporter_settings(&self) -> ExporterSettings {
        ExporterSettings {
            prefer_embedded: self.prefer_embedded,
            pagination: PaginationPolicy {
                page_size: self.page_size,
                request_limit: self.pagination_request_limit,
                throttle: self.pagination_throttle,
            },
            settle_delay: self.lazy_load_settle,
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exporter_settings_follow_config() {
        let config = Config {
            prefer_embedded: false,
            page_size: 50,
            pagination_throttle: Duration::from_millis(5),
            ..Config::default()
        };
        let settings = config.exporter_settings();
        assert!(!settings.prefer_embedded);
        assert_eq!(settings.pagination.page_size, 50);
        assert_eq!(settings.pagination.request_limit, 100);
        assert_eq!(settings.pagination.throttle, Duration::from_millis(5));
        assert_eq!(settings.settle_delay, Duration::from_millis(400));
    }

    #[test]
    fn test_parse_env_default_and_invalid() {
        assert_eq!(parse_env("RESUME_EXPORT_TEST_UNSET_VAR", 7u32).unwrap(), 7);
        std::env::set_var("RESUME_EXPORT_TEST_BAD_PORT", "eighty");
        assert!(parse_env::<u16>("RESUME_EXPORT_TEST_BAD_PORT", 8080).is_err());
        std::env::set_var("RESUME_EXPORT_TEST_FLAG", " false ");
        assert!(!parse_env("RESUME_EXPORT_TEST_FLAG", true).unwrap());
    }
}
