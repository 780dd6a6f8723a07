//! Process-wide repository cache keyed by repository id.
//!
//! Uses a HashMap behind a tokio RwLock: lookups share the lock, inserts and
//! purges take it exclusively.

use super::Repository;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared cache of every repository seen by any user.
#[derive(Debug, Default)]
pub struct RepoCache {
    repos: RwLock<HashMap<u64, Arc<Repository>>>,
}

impl RepoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a repository by id.
    pub async fn lookup(&self, id: u64) -> Option<Arc<Repository>> {
        self.repos.read().await.get(&id).cloned()
    }

    /// Insert a repository, replacing any previous entry with the same id.
    ///
    /// The entry's last-touched stamp is reset to `now`.
    pub async fn insert(&self, repo: Arc<Repository>, now: DateTime<Utc>) {
        repo.touch(now);
        let mut repos = self.repos.write().await;
        if let Some(previous) = repos.insert(repo.id, repo.clone())
            && !Arc::ptr_eq(&previous, &repo)
        {
            tracing::debug!(repo_id = repo.id, "replaced cached repository");
        }
    }

    /// Remove every repository untouched for longer than `ttl`.
    ///
    /// Returns the number of evicted entries.
    pub async fn purge(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> usize {
        let mut repos = self.repos.write().await;
        let before = repos.len();
        repos.retain(|_, repo| !repo.is_expired(now, ttl));
        let evicted = before - repos.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = repos.len(), "purged cached repositories");
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.repos.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.repos.read().await.is_empty()
    }

    /// Snapshot of all cached repositories, in no particular order.
    pub async fn repos(&self) -> Vec<Arc<Repository>> {
        self.repos.read().await.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::test_support::repo;

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let cache = RepoCache::new();
        assert!(cache.lookup(42).await.is_none());

        let inserted = Arc::new(repo(42, "tokio", "tokio-rs"));
        cache.insert(inserted.clone(), Utc::now()).await;

        let found = cache.lookup(42).await.unwrap();
        assert!(Arc::ptr_eq(&found, &inserted));
        assert_eq!(cache.len().await, 1);
        assert!(!cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let cache = RepoCache::new();
        let first = Arc::new(repo(42, "tokio", "tokio-rs"));
        let second = Arc::new(repo(42, "tokio", "tokio-rs"));

        cache.insert(first.clone(), Utc::now()).await;
        cache.insert(second.clone(), Utc::now()).await;

        let found = cache.lookup(42).await.unwrap();
        assert!(Arc::ptr_eq(&found, &second));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_insert_resets_touched_at() {
        let cache = RepoCache::new();
        let entry = Arc::new(repo(7, "serde", "serde-rs"));
        let now = entry.touched_at() + chrono::Duration::days(3);

        cache.insert(entry.clone(), now).await;
        assert_eq!(entry.touched_at(), now);
    }

    #[tokio::test]
    async fn test_purge_evicts_only_stale_entries() {
        let cache = RepoCache::new();
        let now = Utc::now();
        let ttl = chrono::Duration::hours(24);

        cache.insert(Arc::new(repo(1, "old", "a")), now - chrono::Duration::hours(25)).await;
        cache.insert(Arc::new(repo(2, "fresh", "b")), now - chrono::Duration::hours(1)).await;

        let evicted = cache.purge(now, ttl).await;
        assert_eq!(evicted, 1);
        assert!(cache.lookup(1).await.is_none());
        assert!(cache.lookup(2).await.is_some());
    }

    #[tokio::test]
    async fn test_purge_empty_cache() {
        let cache = RepoCache::new();
        assert_eq!(cache.purge(Utc::now(), chrono::Duration::seconds(1)).await, 0);
        assert!(cache.is_empty().await);
    }
}
