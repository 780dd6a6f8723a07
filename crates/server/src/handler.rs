//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::admin::snapshot_impl;
use crate::tools::ingest::{IngestStatusParams, StartIngestionParams, start_impl, status_impl};
use crate::tools::search::{SearchReadmesParams, search_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use starsearch_client::StarSearch;
use std::sync::Arc;

/// The main MCP server handler for starsearch.
#[derive(Clone)]
pub struct StarSearchServer {
    service: Arc<StarSearch>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl StarSearchServer {
    pub fn new(service: Arc<StarSearch>) -> Self {
        Self { service, tool_router: Self::tool_router() }
    }

    #[tool(description = "Load a session's starred repositories and READMEs from an OAuth code. Poll ingest_status.")]
    async fn start_ingestion(&self, params: Parameters<StartIngestionParams>) -> Result<CallToolResult, McpError> {
        start_impl(&self.service, params.0).await
    }

    #[tool(description = "Report ingestion progress for a session: state, fetched and total README counts.")]
    async fn ingest_status(&self, params: Parameters<IngestStatusParams>) -> Result<CallToolResult, McpError> {
        status_impl(&self.service, params.0).await
    }

    /// Case-insensitive README search with `<mark>` highlighting.
    #[tool(description = "Search a session's starred READMEs. Sort by count, starred, name or owner.")]
    async fn search_readmes(&self, params: Parameters<SearchReadmesParams>) -> Result<CallToolResult, McpError> {
        search_impl(&self.service, params.0).await
    }

    #[tool(description = "List live sessions and cached repositories, oldest activity first.")]
    async fn admin_snapshot(&self) -> Result<CallToolResult, McpError> {
        snapshot_impl(&self.service).await
    }
}

impl ServerHandler for StarSearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "starsearch".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
