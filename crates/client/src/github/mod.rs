//! GitHub OAuth and REST API client.
//!
//! Covers the four calls ingestion needs:
//!
//! - **Token exchange**: `POST {oauth_base}/login/oauth/access_token`
//! - **Current user**: `GET {api_base}/user`
//! - **Starred listing**: `GET {api_base}/user/starred` with the `star+json`
//!   media type so every item carries its `starred_at` timestamp
//! - **README**: `GET {api_base}/repos/{owner}/{name}/readme` with the `raw`
//!   media type
//!
//! Calls go through the [`StarsApi`] trait so the pipeline can run against a
//! fake in tests.

pub mod error;
pub mod response;

pub use error::GitHubError;
pub use response::{StarredRecord, parse_starred, parse_token_body};

use reqwest::{Client, StatusCode, header};
use starsearch_core::{AppConfig, ConfigError};
use std::sync::Arc;
use std::time::{Duration, Instant};

const STAR_MEDIA_TYPE: &str = "application/vnd.github.star+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// GitHub client configuration.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub client_id: String,
    pub client_secret: String,
    /// OAuth host (default: https://github.com).
    pub oauth_base_url: String,
    /// REST API host (default: https://api.github.com).
    pub api_base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Largest README body accepted.
    pub max_readme_bytes: usize,
}

impl GitHubConfig {
    /// Build from application configuration. Both OAuth credentials must be set.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let (client_id, client_secret) = config.require_github_credentials()?;

        Ok(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            oauth_base_url: config.oauth_base_url.trim_end_matches('/').to_string(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            max_readme_bytes: config.max_readme_bytes,
        })
    }
}

/// The outbound calls made during ingestion.
#[async_trait::async_trait]
pub trait StarsApi: Send + Sync {
    /// Exchange an OAuth authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String, GitHubError>;

    /// Login name of the token's owner.
    async fn current_user(&self, token: &str) -> Result<String, GitHubError>;

    /// One raw page of the starred listing (1-based `page`).
    async fn starred_page(&self, token: &str, page: usize, per_page: usize)
    -> Result<Vec<serde_json::Value>, GitHubError>;

    /// Raw README markdown of `owner/name`.
    async fn readme(&self, token: &str, owner: &str, name: &str) -> Result<String, GitHubError>;
}

/// reqwest-backed [`StarsApi`].
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    config: GitHubConfig,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Result<Self, GitHubError> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| GitHubError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    fn authorized(&self, url: &str, token: &str, accept: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header(header::AUTHORIZATION, format!("token {token}"))
            .header(header::ACCEPT, accept)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, GitHubError> {
        let response = request.send().await?;
        check_status(response.status())?;
        Ok(response)
    }
}

fn check_status(status: StatusCode) -> Result<(), GitHubError> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(GitHubError::AuthError);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(GitHubError::RateLimited);
    }

    if status.is_client_error() || status.is_server_error() {
        return Err(GitHubError::HttpError { status: status.as_u16() });
    }

    Ok(())
}

#[async_trait::async_trait]
impl StarsApi for GitHubClient {
    async fn exchange_code(&self, code: &str) -> Result<String, GitHubError> {
        let url = format!("{}/login/oauth/access_token", self.config.oauth_base_url);

        let request = self
            .http
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
            ]);

        let body = self.send(request).await?.text().await?;
        parse_token_body(&body)
    }

    async fn current_user(&self, token: &str) -> Result<String, GitHubError> {
        let url = format!("{}/user", self.config.api_base_url);

        let bytes = self.send(self.authorized(&url, token, JSON_MEDIA_TYPE)).await?.bytes().await?;
        let user: response::UserPayload =
            serde_json::from_slice(&bytes).map_err(|e| GitHubError::Parse(e.to_string()))?;

        user.login.ok_or_else(|| GitHubError::Parse("missing login".into()))
    }

    async fn starred_page(
        &self, token: &str, page: usize, per_page: usize,
    ) -> Result<Vec<serde_json::Value>, GitHubError> {
        let start = Instant::now();
        let url = format!("{}/user/starred", self.config.api_base_url);

        let request = self
            .authorized(&url, token, STAR_MEDIA_TYPE)
            .query(&[("page", page), ("per_page", per_page)]);

        let bytes = self.send(request).await?.bytes().await?;
        let items: Vec<serde_json::Value> =
            serde_json::from_slice(&bytes).map_err(|e| GitHubError::Parse(e.to_string()))?;

        tracing::debug!(
            page,
            items = items.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fetched starred page"
        );

        Ok(items)
    }

    async fn readme(&self, token: &str, owner: &str, name: &str) -> Result<String, GitHubError> {
        let url = format!("{}/repos/{owner}/{name}/readme", self.config.api_base_url);
        let max = self.config.max_readme_bytes;

        let response = self.send(self.authorized(&url, token, RAW_MEDIA_TYPE)).await?;

        if let Some(len) = response.content_length()
            && len as usize > max
        {
            return Err(GitHubError::TooLarge { size: len as usize, max });
        }

        let bytes = response.bytes().await?;
        if bytes.len() > max {
            return Err(GitHubError::TooLarge { size: bytes.len(), max });
        }

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
