//! Per-session ingestion state.
//!
//! A [`User`] is created when an OAuth callback arrives and is driven through
//! [`ReposState`] by its ingestion task. Every mutable field has its own
//! reader/writer lock so that status polling never waits on an unrelated write.

pub mod registry;

pub use registry::{PurgeStats, SessionRegistry};

use crate::repo::Repository;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Ingestion state. Ordered: a user only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReposState {
    NotFetched,
    Fetching,
    Fetched,
}

impl fmt::Display for ReposState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReposState::NotFetched => "not_fetched",
            ReposState::Fetching => "fetching",
            ReposState::Fetched => "fetched",
        };
        f.write_str(s)
    }
}

/// README fetch progress for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FetchProgress {
    pub fetched_count: usize,
    pub total_count: usize,
}

/// One authenticated session.
pub struct User {
    username: RwLock<String>,
    token: RwLock<Option<String>>,
    state: RwLock<ReposState>,
    repos: RwLock<Vec<Arc<Repository>>>,
    progress: RwLock<FetchProgress>,
    touched_at: RwLock<DateTime<Utc>>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User").field("token", &"<redacted>").finish_non_exhaustive()
    }
}

impl User {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            username: RwLock::new(String::new()),
            token: RwLock::new(None),
            state: RwLock::new(ReposState::NotFetched),
            repos: RwLock::new(Vec::new()),
            progress: RwLock::new(FetchProgress::default()),
            touched_at: RwLock::new(now),
        }
    }

    pub async fn username(&self) -> String {
        self.username.read().await.clone()
    }

    pub async fn set_username(&self, username: impl Into<String>) {
        *self.username.write().await = username.into();
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn state(&self) -> ReposState {
        *self.state.read().await
    }

    /// Move the state forward to `next`.
    ///
    /// Returns `false` without changing anything if `next` is not strictly
    /// after the current state.
    pub async fn advance(&self, next: ReposState) -> bool {
        let mut state = self.state.write().await;
        if next <= *state {
            tracing::debug!(current = %*state, requested = %next, "ignored non-forward state transition");
            return false;
        }
        *state = next;
        true
    }

    pub async fn repos(&self) -> Vec<Arc<Repository>> {
        self.repos.read().await.clone()
    }

    pub async fn set_repos(&self, repos: Vec<Arc<Repository>>) {
        *self.repos.write().await = repos;
    }

    pub async fn progress(&self) -> FetchProgress {
        *self.progress.read().await
    }

    pub async fn set_progress(&self, fetched_count: usize, total_count: usize) {
        *self.progress.write().await = FetchProgress { fetched_count, total_count };
    }

    /// Count one more completed README fetch.
    pub async fn increment_fetched(&self) {
        self.progress.write().await.fetched_count += 1;
    }

    pub async fn touched_at(&self) -> DateTime<Utc> {
        *self.touched_at.read().await
    }

    pub async fn touch(&self, now: DateTime<Utc>) {
        *self.touched_at.write().await = now;
    }

    pub async fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.touched_at().await > ttl
    }
}
