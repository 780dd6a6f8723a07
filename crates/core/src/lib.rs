//! Core types and shared functionality for starsearch.
//!
//! This crate provides:
//! - Repository model and the process-wide repository cache
//! - Session registry with lazy TTL purging
//! - README search, highlighting and ranking
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod repo;
pub mod search;
pub mod session;

pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use repo::{RepoCache, Repository};
pub use search::{RepoMatches, SearchOutcome, SearchStatus, SortOrder};
pub use session::{FetchProgress, PurgeStats, ReposState, SessionRegistry, User};
