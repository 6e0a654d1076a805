//! Query server
//!
//! Reads JSON-RPC requests line by line and routes them to the query engine.
//! Each request runs against one table snapshot, so a concurrent reload never
//! changes the table in the middle of a query.

use super::protocol::*;
use super::transport::{Incoming, LineTransport};
use crate::backend::QueryBackend;
use crate::error::{ServerError, ServerResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};
use wordvec_core::NeighborQuery;

/// Line-oriented query server
pub struct QueryServer {
    backend: Arc<QueryBackend>,
}

impl QueryServer {
    pub fn new(backend: Arc<QueryBackend>) -> Self {
        Self { backend }
    }

    /// Serve requests until the input closes
    pub async fn run<R, W>(&self, transport: &mut LineTransport<R, W>) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("Query server ready");

        loop {
            match transport.read_request().await? {
                Incoming::Request(request) => {
                    let response = self.handle_request(request).await;
                    transport.write_response(&response).await?;
                }
                Incoming::Empty => continue,
                Incoming::Malformed(message) => {
                    let response = JsonRpcResponse::error(
                        None,
                        JsonRpcError::parse_error(format!("Parse error: {}", message)),
                    );
                    transport.write_response(&response).await?;
                }
                Incoming::Invalid { id, message } => {
                    let response = JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_request(format!("Invalid request: {}", message)),
                    );
                    transport.write_response(&response).await?;
                }
                Incoming::Eof => {
                    tracing::info!("Client disconnected");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!("Handling request: {}", request.method);

        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request(format!(
                    "Unsupported jsonrpc version: {}",
                    request.jsonrpc
                )),
            );
        }

        match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(request.id, result),
            Err(e) => {
                tracing::debug!("Request {} failed: {}", request.method, e);
                JsonRpcResponse::error(request.id, e.into())
            }
        }
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> ServerResult<Value> {
        let engine = self.backend.engine();

        match method {
            "ping" => to_value(PingResult {}),
            "similarity" => {
                let p: SimilarityParams = parse_params(params)?;
                let similarity = engine.similarity(&p.a, &p.b)?;
                to_value(SimilarityResult {
                    a: p.a,
                    b: p.b,
                    similarity,
                })
            }
            "most_similar" => {
                let query: NeighborQuery = parse_params(params)?;
                let neighbors = engine.most_similar(&query)?;
                to_value(NeighborsResult { neighbors })
            }
            "similar_by_vector" => {
                let p: VectorQueryParams = parse_params(params)?;
                let neighbors = engine.similar_by_vector(&p.vector, p.top_n)?;
                to_value(NeighborsResult { neighbors })
            }
            "rank" => {
                let p: SimilarityParams = parse_params(params)?;
                let rank = engine.rank(&p.a, &p.b)?;
                to_value(RankResult {
                    a: p.a,
                    b: p.b,
                    rank,
                })
            }
            "doesnt_match" => {
                let p: DoesntMatchParams = parse_params(params)?;
                let outlier = engine.doesnt_match(&p.tokens)?;
                to_value(OutlierResult { outlier })
            }
            "contains" => {
                let p: TokenParams = parse_params(params)?;
                let contains = engine.contains(&p.token);
                to_value(ContainsResult {
                    token: p.token,
                    contains,
                })
            }
            "vector" => {
                let p: TokenParams = parse_params(params)?;
                let vector = engine.vector(&p.token)?.to_vec();
                to_value(VectorResult {
                    token: p.token,
                    vector,
                })
            }
            "stats" => {
                let (table, generation) = self.backend.shared_table().versioned_snapshot();
                let mut stats = table.stats();
                stats["generation"] = Value::from(generation);
                Ok(stats)
            }
            "reload" => to_value(self.backend.reload().await?),
            _ => Err(ServerError::MethodNotFound(method.to_string())),
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> ServerResult<T> {
    let params = params.ok_or_else(|| ServerError::invalid_params("Missing params"))?;
    serde_json::from_value(params).map_err(|e| ServerError::invalid_params(e.to_string()))
}

fn to_value<T: Serialize>(value: T) -> ServerResult<Value> {
    serde_json::to_value(value).map_err(|e| ServerError::Io(e.into()))
}
