//! search_readmes tool implementation.
//!
//! Runs a README search for a session and flattens the ranked matches into
//! a stable JSON shape.

use super::json_result;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use starsearch_client::StarSearch;
use starsearch_core::{RepoMatches, SortOrder};

/// Input parameters for search_readmes tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchReadmesParams {
    pub session_id: String,

    /// Text to find (case-insensitive, at least 3 characters).
    pub query: String,

    /// Result order: count (default), starred, name or owner. Unknown values fall back to count.
    #[serde(default)]
    pub order: Option<String>,
}

/// Output structure for search_readmes tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchReadmesOutput {
    pub query: String,
    pub order: SortOrder,
    /// Machine-readable status: empty, need_more_characters, no_results, results or not_ready.
    pub status: String,
    /// Human-readable status line, empty when there is nothing to say.
    pub message: String,
    /// Number of repositories searched.
    pub total_count: usize,
    pub repos: Vec<RepoHit>,
}

/// One matching repository.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RepoHit {
    pub repo_id: u64,
    pub repo_name: String,
    pub repo_url: String,
    pub owner_id: u64,
    pub owner_name: String,
    pub owner_url: String,
    pub forks_count: u64,
    pub stars_count: u64,
    /// Date the repository was starred (YYYY-MM-DD).
    pub starred_at: String,
    pub matches_count: usize,
    /// Matching lines as escaped HTML with `<mark>` spans.
    pub lines: Vec<String>,
}

impl From<RepoMatches> for RepoHit {
    fn from(matches: RepoMatches) -> Self {
        let repo = &matches.repo;
        Self {
            repo_id: repo.id,
            repo_name: repo.name.clone(),
            repo_url: repo.html_url(),
            owner_id: repo.owner_id,
            owner_name: repo.owner_name.clone(),
            owner_url: repo.owner_url(),
            forks_count: repo.forks,
            stars_count: repo.stars,
            starred_at: repo.starred_at.format("%Y-%m-%d").to_string(),
            matches_count: matches.count,
            lines: matches.lines,
        }
    }
}

/// Implementation of the search_readmes tool.
pub async fn search_impl(service: &StarSearch, params: SearchReadmesParams) -> Result<CallToolResult, McpError> {
    let order = params.order.as_deref().map(SortOrder::parse_or_default).unwrap_or_default();

    let outcome = service.search(&params.session_id, &params.query, order).await;

    let output = SearchReadmesOutput {
        status: outcome.status.kind().to_string(),
        message: outcome.status.to_string(),
        total_count: outcome.total_repos,
        repos: outcome.results.into_iter().map(RepoHit::from).collect(),
        query: params.query,
        order,
    };

    json_result(&output)
}
