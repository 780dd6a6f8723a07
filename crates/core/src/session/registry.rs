//! Session registry with lazy, time-gated purging.
//!
//! There is no timer: every inbound lookup calls [`SessionRegistry::purge_if_due`],
//! which sweeps only when the purge interval has elapsed since the last sweep.
//! A sweep evicts idle sessions and then idle repositories from the shared
//! [`RepoCache`].

use super::User;
use crate::config::AppConfig;
use crate::repo::RepoCache;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Counts removed by one purge sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeStats {
    pub users: usize,
    pub repos: usize,
}

/// Maps opaque session identifiers to users.
#[derive(Debug)]
pub struct SessionRegistry {
    users: RwLock<HashMap<String, Arc<User>>>,
    last_purge: RwLock<DateTime<Utc>>,
    cache: Arc<RepoCache>,
    session_ttl: chrono::Duration,
    repo_ttl: chrono::Duration,
    purge_interval: chrono::Duration,
}

impl SessionRegistry {
    pub fn new(
        cache: Arc<RepoCache>, session_ttl: chrono::Duration, repo_ttl: chrono::Duration,
        purge_interval: chrono::Duration, now: DateTime<Utc>,
    ) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            last_purge: RwLock::new(now),
            cache,
            session_ttl,
            repo_ttl,
            purge_interval,
        }
    }

    pub fn from_config(config: &AppConfig, cache: Arc<RepoCache>, now: DateTime<Utc>) -> Self {
        Self::new(cache, config.session_ttl(), config.repo_ttl(), config.purge_interval(), now)
    }

    pub fn cache(&self) -> &Arc<RepoCache> {
        &self.cache
    }

    pub async fn get(&self, session_id: &str) -> Option<Arc<User>> {
        self.users.read().await.get(session_id).cloned()
    }

    pub async fn set(&self, session_id: impl Into<String>, user: Arc<User>) {
        self.users.write().await.insert(session_id.into(), user);
    }

    /// Resolve the user behind an inbound request.
    ///
    /// Runs a purge if one is due, then refreshes the user's activity stamp.
    pub async fn lookup(&self, session_id: &str, now: DateTime<Utc>) -> Option<Arc<User>> {
        self.purge_if_due(now).await;

        let user = self.get(session_id).await?;
        user.touch(now).await;
        Some(user)
    }

    /// Remove every user idle for longer than `ttl`.
    ///
    /// Returns the number of evicted sessions.
    pub async fn purge(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> usize {
        let mut users = self.users.write().await;

        let mut expired = Vec::new();
        for (session_id, user) in users.iter() {
            if user.is_expired(now, ttl).await {
                expired.push(session_id.clone());
            }
        }

        for session_id in &expired {
            users.remove(session_id);
        }

        expired.len()
    }

    /// Sweep sessions and repositories if the purge interval has elapsed.
    ///
    /// Returns `None` when no sweep was due, including when a concurrent
    /// caller claimed the sweep first.
    pub async fn purge_if_due(&self, now: DateTime<Utc>) -> Option<PurgeStats> {
        if now - *self.last_purge.read().await <= self.purge_interval {
            return None;
        }

        {
            let mut last_purge = self.last_purge.write().await;
            if now - *last_purge <= self.purge_interval {
                return None;
            }
            *last_purge = now;
        }

        let stats = PurgeStats {
            users: self.purge(now, self.session_ttl).await,
            repos: self.cache.purge(now, self.repo_ttl).await,
        };

        tracing::info!(users = stats.users, repos = stats.repos, "purged idle sessions and repositories");

        Some(stats)
    }

    /// Snapshot of all registered users.
    pub async fn users(&self) -> Vec<Arc<User>> {
        self.users.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}
