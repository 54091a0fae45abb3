/// Axum HTTP server setup and routing

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::chain::MockChain;
use crate::handlers::*;

pub fn create_router(chain: MockChain) -> Router {
    // Browser wallets and local tests call from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // JSON-RPC
        .route("/", post(rpc_handler))

        // Health check
        .route("/health", get(health_check))

        // Development helpers
        .route("/dev/reject-authorization", post(set_reject_authorization))
        .route("/dev/sent", get(sent_transactions))

        // Shared state
        .with_state(chain)

        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(chain: MockChain, host: String, port: u16) -> anyhow::Result<()> {
    let ledger = chain.contract_address();
    let app = create_router(chain);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("🚀 Ledger mock node listening on http://{}", addr);
    log::info!("📒 Ledger contract at {}", ledger);
    log::info!("🙅 Rejection toggle: POST /dev/reject-authorization");

    axum::serve(listener, app).await?;

    Ok(())
}
