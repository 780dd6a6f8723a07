//! Starred repositories and the process-wide cache that owns them.
//!
//! A [`Repository`] is shared by every user who starred it. Its metadata is
//! immutable, its README is written at most once, and its last-touched stamp
//! drives eviction from the [`RepoCache`].

pub mod cache;

pub use cache::RepoCache;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::OnceLock;

/// A starred repository as seen by the search engine.
#[derive(Debug)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub owner_id: u64,
    pub owner_name: String,
    pub forks: u64,
    pub stars: u64,
    pub starred_at: DateTime<Utc>,
    touched_at: RwLock<DateTime<Utc>>,
    readme: OnceLock<Vec<String>>,
}

impl Repository {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64, name: impl Into<String>, owner_id: u64, owner_name: impl Into<String>, forks: u64, stars: u64,
        starred_at: DateTime<Utc>, now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            owner_id,
            owner_name: owner_name.into(),
            forks,
            stars,
            starred_at,
            touched_at: RwLock::new(now),
            readme: OnceLock::new(),
        }
    }

    /// Normalized README lines, or `None` until a fetch has succeeded.
    pub fn readme(&self) -> Option<&[String]> {
        self.readme.get().map(Vec::as_slice)
    }

    pub fn has_readme(&self) -> bool {
        self.readme.get().is_some()
    }

    /// Store the README lines.
    ///
    /// Returns `false` and leaves the existing lines in place if a README was
    /// already set.
    pub fn set_readme(&self, lines: Vec<String>) -> bool {
        self.readme.set(lines).is_ok()
    }

    pub fn touched_at(&self) -> DateTime<Utc> {
        *self.touched_at.read()
    }

    pub fn touch(&self, now: DateTime<Utc>) {
        *self.touched_at.write() = now;
    }

    /// True when the repository has not been touched within `ttl` of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.touched_at() > ttl
    }

    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner_name, self.name)
    }

    pub fn owner_url(&self) -> String {
        format!("https://github.com/{}", self.owner_name)
    }
}
