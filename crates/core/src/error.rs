//! Unified error types for starsearch.
//!
//! The ingestion core never fails; these cover the edges where a caller
//! hands us something we cannot serve.

use rmcp::model::{ErrorCode, ErrorData as McpError};

use crate::config::ConfigError;

/// Unified error types for the starsearch service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty session id).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// No session registered under the given identifier.
    #[error("SESSION_NOT_FOUND: {0}")]
    SessionNotFound(String),

    /// Configuration could not be loaded or is invalid.
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::SessionNotFound(msg) => (-32001, msg.clone()),
            Error::Config(e) => (-32003, e.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::SessionNotFound("abc123".to_string());
        assert!(err.to_string().contains("SESSION_NOT_FOUND"));
        assert!(err.to_string().contains("abc123"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::SessionNotFound("abc123".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32001);

        let err = Error::InvalidInput("empty".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32602);
    }

    #[test]
    fn test_config_error_converts() {
        let err: Error = ConfigError::Missing { field: "github_client_id".into(), hint: "set it".into() }.into();
        assert!(err.to_string().starts_with("CONFIG_ERROR"));
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32003);
    }
}
