//! GitHub response types and parsing.
//!
//! Raw API payloads are deserialized leniently (every field optional) and
//! then converted into stable records. Items that lack a required field are
//! dropped instead of failing the whole page.

use super::GitHubError;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// One entry of the starred listing, flattened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarredRecord {
    pub id: u64,
    pub name: String,
    pub owner_id: u64,
    pub owner_name: String,
    pub forks: u64,
    pub stars: u64,
    pub starred_at: DateTime<Utc>,
}

/// Item shape returned with `Accept: application/vnd.github.star+json`.
#[derive(Debug, Deserialize)]
pub(crate) struct StarredItem {
    starred_at: Option<String>,
    repo: Option<RepoPayload>,
}

#[derive(Debug, Deserialize)]
struct RepoPayload {
    id: Option<u64>,
    name: Option<String>,
    owner: Option<OwnerPayload>,
    forks_count: Option<u64>,
    forks: Option<u64>,
    stargazers_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OwnerPayload {
    id: Option<u64>,
    login: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserPayload {
    pub login: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl StarredItem {
    fn into_record(self) -> Option<StarredRecord> {
        let starred_at = DateTime::parse_from_rfc3339(self.starred_at.as_deref()?).ok()?.with_timezone(&Utc);
        let repo = self.repo?;
        let owner = repo.owner?;

        Some(StarredRecord {
            id: repo.id?,
            name: repo.name?,
            owner_id: owner.id?,
            owner_name: owner.login?,
            forks: repo.forks_count.or(repo.forks)?,
            stars: repo.stargazers_count?,
            starred_at,
        })
    }
}

/// Convert one raw listing page into records, dropping malformed items.
pub fn parse_starred(items: Vec<serde_json::Value>) -> Vec<StarredRecord> {
    let total = items.len();
    let records: Vec<StarredRecord> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<StarredItem>(item).ok()?.into_record())
        .collect();

    if records.len() < total {
        tracing::debug!(dropped = total - records.len(), "dropped malformed starred items");
    }

    records
}

/// Extract the access token from a token endpoint body.
///
/// GitHub answers with JSON when asked to, and with a query-encoded body
/// otherwise; both are accepted.
pub fn parse_token_body(body: &str) -> Result<String, GitHubError> {
    let trimmed = body.trim();
    let payload = if trimmed.starts_with('{') {
        serde_json::from_str::<TokenPayload>(trimmed).map_err(|e| GitHubError::Parse(e.to_string()))?
    } else {
        let mut fields: HashMap<String, String> =
            url::form_urlencoded::parse(trimmed.as_bytes()).into_owned().collect();
        TokenPayload {
            access_token: fields.remove("access_token"),
            error: fields.remove("error"),
            error_description: fields.remove("error_description"),
        }
    };

    if let Some(error) = payload.error {
        return Err(GitHubError::OAuth(payload.error_description.unwrap_or(error)));
    }

    payload.access_token.filter(|token| !token.is_empty()).ok_or(GitHubError::MissingToken)
}
