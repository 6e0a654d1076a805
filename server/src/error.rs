//! Error types for the wordvec server and CLI.

use crate::rpc::protocol::JsonRpcError;
use thiserror::Error;
use wordvec_core::VectorError;

/// Errors that can occur while serving queries.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Query(#[from] VectorError),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Reload failed: {0}")]
    Reload(String),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }
}

impl From<ServerError> for JsonRpcError {
    fn from(err: ServerError) -> Self {
        let message = err.to_string();
        match err {
            ServerError::Query(VectorError::UnknownToken(tokens)) => {
                let mut error = JsonRpcError::invalid_params(message);
                error.data = Some(serde_json::json!({ "unknownTokens": tokens }));
                error
            }
            ServerError::Query(ref e) if e.is_query_error() => {
                JsonRpcError::invalid_params(message)
            }
            ServerError::InvalidParams(_) => JsonRpcError::invalid_params(message),
            ServerError::MethodNotFound(method) => JsonRpcError::method_not_found(method),
            _ => JsonRpcError::internal_error(message),
        }
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::protocol::{INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND};

    #[test]
    fn test_server_error_display_query() {
        let err: ServerError = VectorError::unknown_tokens(["train"]).into();
        assert_eq!(err.to_string(), "Unknown token(s): train");
    }

    #[test]
    fn test_server_error_display_invalid_params() {
        let err = ServerError::invalid_params("missing field `a`");
        assert_eq!(err.to_string(), "Invalid params: missing field `a`");
    }

    #[test]
    fn test_server_error_display_reload() {
        let err = ServerError::Reload("table not found".to_string());
        assert_eq!(err.to_string(), "Reload failed: table not found");
    }

    #[test]
    fn test_jsonrpc_error_conversion_unknown_token() {
        let err: JsonRpcError = ServerError::from(VectorError::unknown_tokens(["a", "b"])).into();
        assert_eq!(err.code, INVALID_PARAMS);
        assert_eq!(
            err.data,
            Some(serde_json::json!({ "unknownTokens": ["a", "b"] }))
        );
    }

    #[test]
    fn test_jsonrpc_error_conversion_invalid_argument() {
        let err: JsonRpcError =
            ServerError::from(VectorError::invalid_argument("top_n must be at least 1")).into();
        assert_eq!(err.code, INVALID_PARAMS);
        assert!(err.message.contains("top_n"));
        assert!(err.data.is_none());
    }

    #[test]
    fn test_jsonrpc_error_conversion_method_not_found() {
        let err: JsonRpcError = ServerError::MethodNotFound("frobnicate".to_string()).into();
        assert_eq!(err.code, METHOD_NOT_FOUND);
        assert_eq!(err.message, "Method not found: frobnicate");
    }

    #[test]
    fn test_jsonrpc_error_conversion_internal() {
        let err: JsonRpcError =
            ServerError::from(VectorError::invalid_table("zero vector")).into();
        assert_eq!(err.code, INTERNAL_ERROR);

        let err: JsonRpcError = ServerError::Reload("boom".to_string()).into();
        assert_eq!(err.code, INTERNAL_ERROR);
    }
}
