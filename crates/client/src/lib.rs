//! Client code for starsearch.
//!
//! This crate provides the GitHub API client, README normalization, the
//! ingestion pipeline and the service facade used by the server.

pub mod github;
pub mod ingest;
pub mod markdown;
pub mod service;

pub use github::{GitHubClient, GitHubConfig, GitHubError, StarredRecord, StarsApi};
pub use ingest::{IngestConfig, Ingestor};
pub use markdown::normalize;
pub use service::{AdminSnapshot, CachedRepoSummary, IngestStatus, StarSearch, UserSummary};
