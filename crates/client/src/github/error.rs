//! GitHub client error types.

use std::sync::Arc;

/// Errors from the GitHub OAuth and REST client.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    /// The token endpoint answered without an access token.
    #[error("missing access token in OAuth response")]
    MissingToken,

    /// The token endpoint reported an OAuth error (e.g. `bad_verification_code`).
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// Authentication failed (invalid or revoked token).
    #[error("authentication failed: invalid token")]
    AuthError,

    /// Rate limited by GitHub.
    #[error("rate limited: too many requests")]
    RateLimited,

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),

    /// Response body exceeds the configured limit.
    #[error("response too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    /// The request pool was shut down before a slot became free.
    #[error("request pool closed")]
    PoolClosed,
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { GitHubError::Timeout } else { GitHubError::Network(Arc::new(err)) }
    }
}
