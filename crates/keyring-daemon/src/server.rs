//! JSON-RPC 2.0 endpoint over HTTP.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use keyring_core::rpc::{error_code, KeyringCall};
use keyring_core::MpcKeyring;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;

const INVALID_REQUEST: i64 = -32600;

#[derive(Clone)]
pub struct AppState {
    keyring: Arc<RwLock<MpcKeyring>>,
}

pub fn router(keyring: Arc<RwLock<MpcKeyring>>) -> Router {
    Router::new()
        .route("/", post(handle_rpc))
        .route("/health", get(health))
        .with_state(AppState { keyring })
}

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcResponse {
    fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Value, code: i64, message: String) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError { code, message }),
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// Queries share the read lock so signing requests run concurrently;
// account changes take the write lock.
async fn handle_rpc(State(state): State<AppState>, Json(request): Json<RpcRequest>) -> Json<RpcResponse> {
    if request.jsonrpc.as_deref().is_some_and(|version| version != "2.0") {
        return Json(RpcResponse::failure(
            request.id,
            INVALID_REQUEST,
            "jsonrpc must be \"2.0\"".into(),
        ));
    }

    debug!(method = %request.method, "keyring rpc");
    let outcome = match KeyringCall::parse(&request.method, request.params) {
        Ok(KeyringCall::Query(query)) => {
            let keyring = state.keyring.read().await;
            query.execute(&keyring).await
        }
        Ok(KeyringCall::Mutation(mutation)) => {
            let mut keyring = state.keyring.write().await;
            mutation.execute(&mut keyring).await
        }
        Err(e) => Err(e),
    };

    Json(match outcome {
        Ok(result) => RpcResponse::success(request.id, result),
        Err(e) => RpcResponse::failure(request.id, error_code(&e), e.to_string()),
    })
}
