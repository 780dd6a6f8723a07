//! admin_snapshot tool implementation.

use super::json_result;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use starsearch_client::StarSearch;

/// Implementation of the admin_snapshot tool.
pub async fn snapshot_impl(service: &StarSearch) -> Result<CallToolResult, McpError> {
    let snapshot = service.admin_snapshot().await;
    tracing::debug!(users = snapshot.users.len(), repos = snapshot.repos.len(), "admin snapshot");
    json_result(&snapshot)
}
