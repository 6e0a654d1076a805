//! Query protocol types
//!
//! JSON-RPC 2.0 envelopes plus the params and results of each query method.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wordvec_core::Neighbor;

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC 2.0 request
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 error
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(PARSE_ERROR, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST, message)
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(
            METHOD_NOT_FOUND,
            format!("Method not found: {}", method.into()),
        )
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }
}

/// `similarity` params
#[derive(Debug, Clone, Deserialize)]
pub struct SimilarityParams {
    pub a: String,
    pub b: String,
}

/// `similar_by_vector` params
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorQueryParams {
    pub vector: Vec<f32>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    wordvec_core::DEFAULT_TOP_N
}

/// `doesnt_match` params
#[derive(Debug, Clone, Deserialize)]
pub struct DoesntMatchParams {
    pub tokens: Vec<String>,
}

/// `contains` / `vector` params
#[derive(Debug, Clone, Deserialize)]
pub struct TokenParams {
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarityResult {
    pub a: String,
    pub b: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankResult {
    pub a: String,
    pub b: String,
    pub rank: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NeighborsResult {
    pub neighbors: Vec<Neighbor>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlierResult {
    pub outlier: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContainsResult {
    pub token: String,
    pub contains: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct VectorResult {
    pub token: String,
    pub vector: Vec<f32>,
}

/// Outcome of a table reload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResult {
    pub generation: u64,
    pub vocabulary_size: usize,
    pub dimension: usize,
    pub source: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PingResult {}
