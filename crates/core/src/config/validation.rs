//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

/// Upper bound for TTLs and the purge interval.
pub const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn validate_base_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| invalid(field, &e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(invalid(field, "scheme must be http or https")),
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `per_page` is outside 1..=100
    /// - a count, pool size, TTL or interval is 0
    /// - a TTL or interval exceeds [`MAX_DURATION_SECS`]
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - a base URL is not an http(s) URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.per_page == 0 || self.per_page > 100 {
            return Err(invalid("per_page", "must be between 1 and 100"));
        }
        if self.max_repo_count == 0 {
            return Err(invalid("max_repo_count", "must be greater than 0"));
        }
        if self.max_readme_bytes == 0 {
            return Err(invalid("max_readme_bytes", "must be greater than 0"));
        }

        if self.light_concurrency == 0 {
            return Err(invalid("light_concurrency", "must be at least 1"));
        }
        if self.readme_concurrency == 0 {
            return Err(invalid("readme_concurrency", "must be at least 1"));
        }

        for (field, secs) in [
            ("session_ttl_secs", self.session_ttl_secs),
            ("repo_ttl_secs", self.repo_ttl_secs),
            ("purge_interval_secs", self.purge_interval_secs),
        ] {
            if secs == 0 {
                return Err(invalid(field, "must be greater than 0"));
            }
            if secs > MAX_DURATION_SECS {
                return Err(invalid(field, "must not exceed 10 years (315360000s)"));
            }
        }
        if self.min_query_length == 0 {
            return Err(invalid("min_query_length", "must be greater than 0"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        validate_base_url("oauth_base_url", &self.oauth_base_url)?;
        validate_base_url("api_base_url", &self.api_base_url)?;

        if self.readme_concurrency < self.light_concurrency {
            tracing::warn!(
                light = self.light_concurrency,
                readme = self.readme_concurrency,
                "readme_concurrency is below light_concurrency; README fetches will be the bottleneck"
            );
        }

        if self.repo_ttl_secs < self.session_ttl_secs {
            tracing::warn!(
                session_ttl_secs = self.session_ttl_secs,
                repo_ttl_secs = self.repo_ttl_secs,
                "repo_ttl_secs is shorter than session_ttl_secs; live sessions may refetch READMEs"
            );
        }

        Ok(())
    }
}
