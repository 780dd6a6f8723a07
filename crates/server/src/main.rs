//! starsearch server entry point.
//!
//! Boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use starsearch_client::{GitHubClient, GitHubConfig, StarSearch};
use starsearch_core::{AppConfig, Error};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().map_err(Error::Config)?;
    let github = GitHubClient::new(GitHubConfig::from_app_config(&config).map_err(Error::Config)?)?;
    let service = Arc::new(StarSearch::from_config(&config, Arc::new(github)));

    tracing::info!(api = %config.api_base_url, "Starting starsearch server on stdio transport");

    let handler = handler::StarSearchServer::new(service);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
