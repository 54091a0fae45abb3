use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use transfer_ledger::HttpProvider;

use super::handlers;
use crate::config::WalletConfig;
use crate::gif::{GifClient, GifLookup};
use crate::store::TransactionStore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TransactionStore<HttpProvider>>,
    pub gif: Arc<GifLookup>,
}

impl AppState {
    pub fn from_config(config: &WalletConfig) -> Self {
        Self {
            store: Arc::new(TransactionStore::from_config(config)),
            gif: Arc::new(GifLookup::new(GifClient::from_config(config))),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session routes
        .route("/api/session", get(handlers::get_session_handler))
        .route("/api/transactions", get(handlers::list_transactions_handler))
        .route("/api/connect", post(handlers::connect_wallet_handler))
        .route("/api/form", put(handlers::update_form_handler))
        .route("/api/submit", post(handlers::submit_handler))
        .route("/api/refresh", post(handlers::refresh_handler))
        .route("/api/gif", get(handlers::gif_handler))
        .route("/health", get(handlers::health_handler))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Set ALLOWED_ORIGINS="https://app.example.com,https://preview.example.com" for production
/// If not set, allows any origin (development mode)
fn cors_layer() -> CorsLayer {
    match std::env::var("ALLOWED_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            log::info!("CORS configured for origins: {}", origins);
            let origin_list: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|origin| match origin.trim().parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        log::warn!("Ignoring invalid CORS origin '{}'", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(origin_list)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        _ => {
            log::warn!("CORS: Allowing all origins (development mode). Set ALLOWED_ORIGINS env var for production.");
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

pub async fn start_server(addr: &str, config: WalletConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config);

    // A missing wallet or an unreachable node is not fatal; clients can connect later
    match state.store.initialize().await {
        Ok(Some(account)) => log::info!("Resumed session for {}", account),
        Ok(None) => log::info!("No wallet account authorized yet"),
        Err(e) => log::warn!("Starting without a session: {}", e),
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            log::info!("Received SIGTERM signal");
        },
    }

    log::info!("Shutdown signal received, exiting gracefully...");
}
