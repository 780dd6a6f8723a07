//! Service facade tying sessions, ingestion and search together.
//!
//! [`StarSearch`] is what the server exposes. It owns no global state: the
//! registry, the cache and the GitHub client are injected at construction.

use crate::github::StarsApi;
use crate::ingest::{IngestConfig, Ingestor};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use starsearch_core::search::{self, SearchOutcome, SortOrder};
use starsearch_core::{AppConfig, Error, RepoCache, ReposState, SessionRegistry, User};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Ingestion progress reported to a polling client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct IngestStatus {
    pub state: ReposState,
    pub fetched_count: usize,
    pub total_count: usize,
    pub message: String,
}

impl IngestStatus {
    fn new(state: ReposState, fetched_count: usize, total_count: usize) -> Self {
        let message = match state {
            ReposState::NotFetched => "Connecting to GitHub...".to_string(),
            ReposState::Fetching if total_count == 0 => "Getting starred repositories...".to_string(),
            ReposState::Fetching => format!("Fetching {total_count} readmes..."),
            ReposState::Fetched => "Fetched readmes".to_string(),
        };
        Self { state, fetched_count, total_count, message }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct UserSummary {
    pub username: String,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct CachedRepoSummary {
    pub id: u64,
    pub name: String,
    pub last_touched: DateTime<Utc>,
    /// Distinct usernames of the sessions whose repository list includes this
    /// one, sorted.
    pub usernames: Vec<String>,
}

/// Operator view of live sessions and the shared cache, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct AdminSnapshot {
    pub users: Vec<UserSummary>,
    pub repos: Vec<CachedRepoSummary>,
}

/// README search over each session's starred repositories.
pub struct StarSearch {
    registry: Arc<SessionRegistry>,
    ingestor: Ingestor,
    min_query_length: usize,
}

impl StarSearch {
    pub fn new(registry: Arc<SessionRegistry>, ingestor: Ingestor, min_query_length: usize) -> Self {
        Self { registry, ingestor, min_query_length }
    }

    /// Wire up a fresh cache and registry around `api`.
    pub fn from_config(config: &AppConfig, api: Arc<dyn StarsApi>) -> Self {
        let cache = Arc::new(RepoCache::new());
        let registry = Arc::new(SessionRegistry::from_config(config, cache.clone(), Utc::now()));
        let ingestor = Ingestor::new(api, cache, IngestConfig::from(config));
        Self::new(registry, ingestor, config.min_query_length)
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Register a new user under `session_id` and start ingestion in the
    /// background. A previous user under the same id is replaced.
    pub async fn start_ingestion(&self, session_id: &str, code: &str) -> Result<JoinHandle<()>, Error> {
        if session_id.trim().is_empty() {
            return Err(Error::InvalidInput("session_id must not be empty".into()));
        }
        if code.trim().is_empty() {
            return Err(Error::InvalidInput("code must not be empty".into()));
        }

        let now = Utc::now();
        self.registry.purge_if_due(now).await;

        let user = Arc::new(User::new(now));
        self.registry.set(session_id, user.clone()).await;

        tracing::info!(session = %session_id, "starting ingestion");

        Ok(self.ingestor.spawn(user, code.to_string()))
    }

    /// Current progress, or `None` for an unknown session.
    pub async fn status(&self, session_id: &str) -> Option<IngestStatus> {
        let user = self.registry.lookup(session_id, Utc::now()).await?;
        let progress = user.progress().await;
        Some(IngestStatus::new(user.state().await, progress.fetched_count, progress.total_count))
    }

    /// Search the session's READMEs for `query`.
    ///
    /// Unknown sessions and sessions still ingesting yield an empty
    /// [`SearchOutcome::not_ready`].
    pub async fn search(&self, session_id: &str, query: &str, order: SortOrder) -> SearchOutcome {
        let Some(user) = self.registry.lookup(session_id, Utc::now()).await else {
            tracing::debug!(session = %session_id, "search for unknown session");
            return SearchOutcome::not_ready();
        };

        if user.state().await != ReposState::Fetched {
            return SearchOutcome::not_ready();
        }

        search::search(&user.repos().await, query, self.min_query_length, order)
    }

    pub async fn admin_snapshot(&self) -> AdminSnapshot {
        let mut users = Vec::new();
        let mut usernames_by_repo: HashMap<u64, BTreeSet<String>> = HashMap::new();

        for user in self.registry.users().await {
            let username = user.username().await;
            for repo in user.repos().await {
                usernames_by_repo.entry(repo.id).or_default().insert(username.clone());
            }
            users.push(UserSummary { username, last_activity: user.touched_at().await });
        }
        users.sort_by(|l, r| l.last_activity.cmp(&r.last_activity).then_with(|| l.username.cmp(&r.username)));

        let mut repos: Vec<CachedRepoSummary> = self
            .registry
            .cache()
            .repos()
            .await
            .into_iter()
            .map(|repo| CachedRepoSummary {
                id: repo.id,
                name: repo.name.clone(),
                last_touched: repo.touched_at(),
                usernames: usernames_by_repo
                    .remove(&repo.id)
                    .map(|names| names.into_iter().collect())
                    .unwrap_or_default(),
            })
            .collect();
        repos.sort_by(|l, r| l.last_touched.cmp(&r.last_touched).then_with(|| l.id.cmp(&r.id)));

        AdminSnapshot { users, repos }
    }
}
