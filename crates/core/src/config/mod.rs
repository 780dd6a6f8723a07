//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (STARSEARCH_*)
//! 2. TOML config file (if STARSEARCH_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::{ConfigError, MAX_DURATION_SECS};

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (STARSEARCH_*)
/// 2. TOML config file (if STARSEARCH_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// OAuth application client id.
    ///
    /// Set via STARSEARCH_GITHUB_CLIENT_ID environment variable.
    #[serde(default)]
    pub github_client_id: Option<String>,

    /// OAuth application client secret.
    ///
    /// Set via STARSEARCH_GITHUB_CLIENT_SECRET environment variable.
    #[serde(default)]
    pub github_client_secret: Option<String>,

    /// Base URL of the OAuth host (token exchange lives under it).
    #[serde(default = "default_oauth_base_url")]
    pub oauth_base_url: String,

    /// Base URL of the REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// User-Agent string for HTTP requests. GitHub rejects requests without one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Largest README body accepted, in bytes.
    #[serde(default = "default_max_readme_bytes")]
    pub max_readme_bytes: usize,

    /// Page size for the starred listing (GitHub caps it at 100).
    #[serde(default = "default_per_page")]
    pub per_page: usize,

    /// Hard cap on starred repositories ingested per user.
    #[serde(default = "default_max_repo_count")]
    pub max_repo_count: usize,

    /// Concurrent lightweight calls (token exchange, user, listing pages).
    #[serde(default = "default_light_concurrency")]
    pub light_concurrency: usize,

    /// Concurrent README fetches.
    #[serde(default = "default_readme_concurrency")]
    pub readme_concurrency: usize,

    /// Idle time after which a session is evicted, in seconds.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Idle time after which a cached repository is evicted, in seconds.
    #[serde(default = "default_repo_ttl_secs")]
    pub repo_ttl_secs: u64,

    /// Minimum time between two purge sweeps, in seconds.
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,

    /// Queries shorter than this (in characters) are not evaluated.
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,
}

fn default_oauth_base_url() -> String {
    "https://github.com".into()
}

fn default_api_base_url() -> String {
    "https://api.github.com".into()
}

fn default_user_agent() -> String {
    "starsearch/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_readme_bytes() -> usize {
    1_048_576 // 1MB
}

fn default_per_page() -> usize {
    100
}

fn default_max_repo_count() -> usize {
    1000
}

fn default_light_concurrency() -> usize {
    10
}

fn default_readme_concurrency() -> usize {
    50
}

fn default_session_ttl_secs() -> u64 {
    4 * 60 * 60
}

fn default_repo_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_purge_interval_secs() -> u64 {
    60 * 60
}

fn default_min_query_length() -> usize {
    3
}

/// Saturates at `chrono::Duration::MAX` instead of panicking.
fn seconds(secs: u64) -> chrono::Duration {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::Duration::MAX)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            github_client_id: None,
            github_client_secret: None,
            oauth_base_url: default_oauth_base_url(),
            api_base_url: default_api_base_url(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_readme_bytes: default_max_readme_bytes(),
            per_page: default_per_page(),
            max_repo_count: default_max_repo_count(),
            light_concurrency: default_light_concurrency(),
            readme_concurrency: default_readme_concurrency(),
            session_ttl_secs: default_session_ttl_secs(),
            repo_ttl_secs: default_repo_ttl_secs(),
            purge_interval_secs: default_purge_interval_secs(),
            min_query_length: default_min_query_length(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        seconds(self.session_ttl_secs)
    }

    pub fn repo_ttl(&self) -> chrono::Duration {
        seconds(self.repo_ttl_secs)
    }

    pub fn purge_interval(&self) -> chrono::Duration {
        seconds(self.purge_interval_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `STARSEARCH_`
    /// 2. TOML file from `STARSEARCH_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("STARSEARCH_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("STARSEARCH_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Client id and secret, both required before any token exchange.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` naming the first absent credential.
    pub fn require_github_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let id = self.github_client_id.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "github_client_id".into(),
            hint: "Set STARSEARCH_GITHUB_CLIENT_ID environment variable".into(),
        })?;
        let secret = self.github_client_secret.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "github_client_secret".into(),
            hint: "Set STARSEARCH_GITHUB_CLIENT_SECRET environment variable".into(),
        })?;
        Ok((id, secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations_saturate_instead_of_panicking() {
        let config =
            AppConfig { session_ttl_secs: 100_000_000_000_000_000, repo_ttl_secs: u64::MAX, ..Default::default() };
        assert_eq!(config.session_ttl(), chrono::Duration::MAX);
        assert_eq!(config.repo_ttl(), chrono::Duration::MAX);
        assert_eq!(AppConfig::default().session_ttl(), chrono::Duration::hours(4));
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.oauth_base_url, "https://github.com");
        assert_eq!(config.api_base_url, "https://api.github.com");
        assert_eq!(config.user_agent, "starsearch/0.1");
        assert_eq!(config.per_page, 100);
        assert_eq!(config.max_repo_count, 1000);
        assert_eq!(config.light_concurrency, 10);
        assert_eq!(config.readme_concurrency, 50);
        assert_eq!(config.session_ttl_secs, 14_400);
        assert_eq!(config.repo_ttl_secs, 86_400);
        assert_eq!(config.purge_interval_secs, 3_600);
        assert_eq!(config.min_query_length, 3);
        assert!(config.github_client_id.is_none());
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
        assert_eq!(config.session_ttl(), chrono::Duration::hours(4));
        assert_eq!(config.repo_ttl(), chrono::Duration::hours(24));
        assert_eq!(config.purge_interval(), chrono::Duration::hours(1));
    }

    #[test]
    fn test_require_credentials_missing() {
        let config = AppConfig { github_client_id: Some("id".into()), ..Default::default() };
        let result = config.require_github_credentials();
        assert!(matches!(result, Err(ConfigError::Missing { field, .. }) if field == "github_client_secret"));
    }

    #[test]
    fn test_require_credentials_present() {
        let config = AppConfig {
            github_client_id: Some("id".into()),
            github_client_secret: Some("secret".into()),
            ..Default::default()
        };
        assert_eq!(config.require_github_credentials().unwrap(), ("id", "secret"));
    }

    #[test]
    fn test_load_from_env_and_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("starsearch.toml", "per_page = 50\nmax_repo_count = 200\n")?;
            jail.set_env("STARSEARCH_CONFIG_FILE", "starsearch.toml");
            jail.set_env("STARSEARCH_MAX_REPO_COUNT", "300");
            jail.set_env("STARSEARCH_GITHUB_CLIENT_ID", "abc");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.per_page, 50);
            assert_eq!(config.max_repo_count, 300);
            assert_eq!(config.github_client_id.as_deref(), Some("abc"));
            assert_eq!(config.readme_concurrency, 50);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("STARSEARCH_PER_PAGE", "0");
            assert!(matches!(AppConfig::load(), Err(ConfigError::Invalid { .. })));
            Ok(())
        });
    }
}
