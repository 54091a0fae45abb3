use axum::{
    extract::{Query, State},
    Json,
};
use transfer_ledger::EntryView;

use crate::error::WalletError;
use crate::gif::GifResult;

use super::server::AppState;
use super::types::{
    ConnectResponse, GifQuery, RefreshResponse, SessionResponse, SubmitResponse, UpdateFormRequest,
};

fn session_response(state: &AppState) -> SessionResponse {
    SessionResponse::new(&state.store.session(), state.store.flow(), state.store.form())
}

pub async fn get_session_handler(State(state): State<AppState>) -> Json<SessionResponse> {
    Json(session_response(&state))
}

pub async fn list_transactions_handler(State(state): State<AppState>) -> Json<Vec<EntryView>> {
    let session = state.store.session();
    Json(session.transactions.iter().map(EntryView::from).collect())
}

pub async fn connect_wallet_handler(
    State(state): State<AppState>,
) -> Result<Json<ConnectResponse>, WalletError> {
    let account = state.store.connect_wallet().await?;
    Ok(Json(ConnectResponse {
        account: account.to_string(),
    }))
}

pub async fn update_form_handler(
    State(state): State<AppState>,
    Json(req): Json<UpdateFormRequest>,
) -> Json<SessionResponse> {
    state.store.handle_change(req.field, req.value);
    Json(session_response(&state))
}

pub async fn submit_handler(
    State(state): State<AppState>,
) -> Result<Json<SubmitResponse>, WalletError> {
    let receipt = state.store.submit().await?;
    Ok(Json(SubmitResponse {
        transaction_hash: receipt.transaction_hash.to_string(),
        transaction_count: receipt.transaction_count,
    }))
}

pub async fn refresh_handler(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, WalletError> {
    let transaction_count = state.store.refresh().await?;
    let session = state.store.session();
    Ok(Json(RefreshResponse {
        transaction_count,
        transactions: session.transactions.iter().map(EntryView::from).collect(),
    }))
}

pub async fn gif_handler(
    State(state): State<AppState>,
    Query(query): Query<GifQuery>,
) -> Json<GifResult> {
    let url = state.gif.lookup(&query.keyword).await;
    Json(GifResult {
        keyword: query.keyword,
        url,
    })
}

pub async fn health_handler() -> &'static str {
    "OK"
}
