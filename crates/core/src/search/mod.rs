//! Full-text README search over a user's starred repositories.
//!
//! This is a linear scan: every README line of every repository is checked
//! for case-insensitive, non-overlapping occurrences of the query. Matching
//! lines come back as escaped HTML with `<mark>` spans, and repositories are
//! ranked by a [`SortOrder`].

pub mod highlight;
pub mod sort;

pub use highlight::{MARK_CLOSE, MARK_OPEN, escape_html, highlight_line};
pub use sort::{SortOrder, UnknownSortOrder};

use crate::repo::Repository;
use std::fmt;
use std::sync::Arc;

/// Matches found in one repository.
#[derive(Debug, Clone)]
pub struct RepoMatches {
    pub repo: Arc<Repository>,
    /// Total matches across all lines.
    pub count: usize,
    /// Highlighted HTML for each matching line, in README order.
    pub lines: Vec<String>,
}

/// Why a search returned what it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    /// No query was entered.
    Empty,
    /// The query is shorter than the minimum length.
    NeedMoreCharacters { min: usize },
    /// The query was evaluated and nothing matched.
    NoResults { query: String },
    /// At least one repository matched.
    Results,
    /// The session is unknown or still ingesting.
    NotReady,
}

impl SearchStatus {
    /// Short machine-readable tag.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchStatus::Empty => "empty",
            SearchStatus::NeedMoreCharacters { .. } => "need_more_characters",
            SearchStatus::NoResults { .. } => "no_results",
            SearchStatus::Results => "results",
            SearchStatus::NotReady => "not_ready",
        }
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStatus::Empty | SearchStatus::Results => Ok(()),
            SearchStatus::NeedMoreCharacters { min } => write!(f, "Please enter at least {min} characters."),
            SearchStatus::NoResults { query } => write!(f, "No results for “{query}”."),
            SearchStatus::NotReady => f.write_str("Repositories are not fetched yet."),
        }
    }
}

/// Result of one search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub results: Vec<RepoMatches>,
    /// Number of repositories that were searched.
    pub total_repos: usize,
}

impl SearchOutcome {
    pub fn not_ready() -> Self {
        Self { status: SearchStatus::NotReady, results: Vec::new(), total_repos: 0 }
    }
}

/// Find `query` in the README lines of `repos`.
///
/// Queries shorter than `min_length` characters are not evaluated.
pub fn search(repos: &[Arc<Repository>], query: &str, min_length: usize, order: SortOrder) -> SearchOutcome {
    let total_repos = repos.len();
    let query_len = query.chars().count();

    if query_len == 0 {
        return SearchOutcome { status: SearchStatus::Empty, results: Vec::new(), total_repos };
    }
    if query_len < min_length {
        return SearchOutcome {
            status: SearchStatus::NeedMoreCharacters { min: min_length },
            results: Vec::new(),
            total_repos,
        };
    }

    let Some(matcher) = highlight::matcher(query) else {
        return SearchOutcome {
            status: SearchStatus::NoResults { query: query.to_string() },
            results: Vec::new(),
            total_repos,
        };
    };

    let mut results: Vec<RepoMatches> = repos
        .iter()
        .filter_map(|repo| {
            let readme = repo.readme()?;
            let mut count = 0;
            let mut lines = Vec::new();
            for line in readme {
                if let Some((n, html)) = highlight_line(&matcher, line) {
                    count += n;
                    lines.push(html);
                }
            }
            (count > 0).then(|| RepoMatches { repo: repo.clone(), count, lines })
        })
        .collect();

    order.sort(&mut results);

    tracing::debug!(query, repos = total_repos, matched = results.len(), order = %order, "search completed");

    let status =
        if results.is_empty() { SearchStatus::NoResults { query: query.to_string() } } else { SearchStatus::Results };

    SearchOutcome { status, results, total_repos }
}
