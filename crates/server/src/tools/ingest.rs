//! start_ingestion and ingest_status tool implementations.

use super::json_result;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use starsearch_client::{IngestStatus, StarSearch};
use starsearch_core::Error;

/// Input parameters for start_ingestion tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StartIngestionParams {
    /// Opaque identifier the caller uses for this session in later calls.
    pub session_id: String,
    /// OAuth authorization code from the GitHub callback.
    pub code: String,
}

/// Input parameters for ingest_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IngestStatusParams {
    pub session_id: String,
}

/// Output structure for start_ingestion and ingest_status tools.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct IngestStatusOutput {
    pub session_id: String,
    #[serde(flatten)]
    pub status: IngestStatus,
}

/// Implementation of the start_ingestion tool.
///
/// Ingestion keeps running after this returns.
pub async fn start_impl(service: &StarSearch, params: StartIngestionParams) -> Result<CallToolResult, McpError> {
    let StartIngestionParams { session_id, code } = params;

    // detached: progress is observed through ingest_status
    drop(service.start_ingestion(&session_id, &code).await?);

    status_impl(service, IngestStatusParams { session_id }).await
}

/// Implementation of the ingest_status tool.
pub async fn status_impl(service: &StarSearch, params: IngestStatusParams) -> Result<CallToolResult, McpError> {
    let status = service
        .status(&params.session_id)
        .await
        .ok_or_else(|| Error::SessionNotFound(params.session_id.clone()))?;

    json_result(&IngestStatusOutput { session_id: params.session_id, status })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{output_json, service};

    #[tokio::test]
    async fn test_start_reports_session() {
        let service = service();
        let params = StartIngestionParams { session_id: "sid".into(), code: "code".into() };

        let result = start_impl(&service, params).await.unwrap();
        assert!(!result.is_error.unwrap_or(false));

        let output = output_json(&result);
        assert_eq!(output["session_id"], "sid");
        assert!(output["state"].is_string());
        assert!(output["message"].is_string());
    }

    #[tokio::test]
    async fn test_start_rejects_empty_code() {
        let service = service();
        let params = StartIngestionParams { session_id: "sid".into(), code: "".into() };

        let err = start_impl(&service, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }

    #[tokio::test]
    async fn test_status_after_ingestion() {
        let service = service();
        service.start_ingestion("sid", "code").await.unwrap().await.unwrap();

        let result = status_impl(&service, IngestStatusParams { session_id: "sid".into() }).await.unwrap();
        let output = output_json(&result);
        assert_eq!(output["state"], "fetched");
        assert_eq!(output["fetched_count"], 2);
        assert_eq!(output["total_count"], 2);
        assert_eq!(output["message"], "Fetched readmes");
    }

    #[tokio::test]
    async fn test_status_bad_code_finishes_empty() {
        let service = service();
        service.start_ingestion("sid", "bad").await.unwrap().await.unwrap();

        let params = IngestStatusParams { session_id: "sid".into() };
        let output = output_json(&status_impl(&service, params).await.unwrap());
        assert_eq!(output["state"], "fetched");
        assert_eq!(output["total_count"], 0);
    }

    #[tokio::test]
    async fn test_status_unknown_session() {
        let service = service();
        let err = status_impl(&service, IngestStatusParams { session_id: "missing".into() }).await.unwrap_err();
        assert_eq!(err.code.0, -32001);
    }
}
