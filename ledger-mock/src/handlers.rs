/// Axum HTTP handlers for the mock node

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::Value;
use transfer_ledger::{RpcRequest, RpcResponse};

use crate::chain::MockChain;
use crate::types::{RejectAuthorizationRequest, SentTransaction};

/// Shared application state
pub type AppState = MockChain;

/// POST /
/// JSON-RPC endpoint. Method failures travel in the response body with
/// status 200, as real nodes do.
pub async fn rpc_handler(
    State(chain): State<AppState>,
    body: String,
) -> impl IntoResponse {
    let request: RpcRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("Unparseable JSON-RPC request: {}", e);
            let error = transfer_ledger::RpcErrorObject {
                code: -32700,
                message: format!("Parse error: {}", e),
            };
            return (StatusCode::OK, Json(RpcResponse::failure(Value::Null, error)));
        }
    };

    log::debug!("→ {} {}", request.method, request.params);

    let response = match chain.dispatch(&request.method, &request.params) {
        Ok(result) => RpcResponse::success(request.id, result),
        Err(e) => {
            log::info!("✗ {} failed: {}", request.method, e);
            RpcResponse::failure(request.id, e.to_rpc_error())
        }
    };

    (StatusCode::OK, Json(response))
}

/// POST /dev/reject-authorization
/// Make the next account requests fail as if the user declined
pub async fn set_reject_authorization(
    State(chain): State<AppState>,
    Json(request): Json<RejectAuthorizationRequest>,
) -> StatusCode {
    chain.set_reject_authorization(request.reject);
    log::info!("Authorization rejection set to {}", request.reject);
    StatusCode::NO_CONTENT
}

/// GET /dev/sent
/// Every `eth_sendTransaction` the mock accepted
pub async fn sent_transactions(State(chain): State<AppState>) -> Json<Vec<SentTransaction>> {
    Json(chain.sent_transactions())
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}
