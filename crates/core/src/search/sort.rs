//! Result ordering.
//!
//! Every order ends in the same tie-break chain (name, owner, id) so the
//! result list is totally ordered.

use super::RepoMatches;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// How search results are ranked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most matches first.
    #[default]
    Count,
    /// Most recently starred first.
    Starred,
    /// Repository name, A to Z.
    Name,
    /// Owner name, A to Z.
    Owner,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Count => "count",
            SortOrder::Starred => "starred",
            SortOrder::Name => "name",
            SortOrder::Owner => "owner",
        }
    }

    /// Parse a user-supplied order, falling back to [`SortOrder::Count`].
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn compare(&self, left: &RepoMatches, right: &RepoMatches) -> Ordering {
        let primary = match self {
            SortOrder::Count => right.count.cmp(&left.count),
            SortOrder::Starred => right.repo.starred_at.cmp(&left.repo.starred_at),
            SortOrder::Name | SortOrder::Owner => Ordering::Equal,
        };

        let by_names = match self {
            SortOrder::Owner => primary.then_with(|| by_owner(left, right)).then_with(|| by_name(left, right)),
            _ => primary.then_with(|| by_name(left, right)).then_with(|| by_owner(left, right)),
        };

        by_names.then_with(|| left.repo.id.cmp(&right.repo.id))
    }

    pub fn sort(&self, results: &mut [RepoMatches]) {
        results.sort_by(|l, r| self.compare(l, r));
    }
}

fn by_name(left: &RepoMatches, right: &RepoMatches) -> Ordering {
    left.repo.name.to_lowercase().cmp(&right.repo.name.to_lowercase())
}

fn by_owner(left: &RepoMatches, right: &RepoMatches) -> Ordering {
    left.repo.owner_name.to_lowercase().cmp(&right.repo.owner_name.to_lowercase())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort order: {0}")]
pub struct UnknownSortOrder(String);

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" => Ok(SortOrder::Count),
            "starred" => Ok(SortOrder::Starred),
            "name" => Ok(SortOrder::Name),
            "owner" => Ok(SortOrder::Owner),
            other => Err(UnknownSortOrder(other.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
