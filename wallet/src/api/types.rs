use serde::{Deserialize, Serialize};
use transfer_ledger::EntryView;

use crate::store::{FlowState, FormField, FormState, SessionState};

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Empty until an account is connected
    pub current_account: String,
    pub is_loading: bool,
    pub transaction_count: Option<u64>,
    pub flow: FlowState,
    pub form: FormState,
    pub transactions: Vec<EntryView>,
}

impl SessionResponse {
    pub fn new(session: &SessionState, flow: FlowState, form: FormState) -> Self {
        Self {
            current_account: session
                .current_account
                .map(|account| account.to_string())
                .unwrap_or_default(),
            is_loading: session.is_loading,
            transaction_count: session.transaction_count,
            flow,
            form,
            transactions: session.transactions.iter().map(EntryView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub account: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateFormRequest {
    pub field: FormField,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub transaction_hash: String,
    /// `null` when the ledger could not be re-read after confirmation
    pub transaction_count: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub transaction_count: u64,
    pub transactions: Vec<EntryView>,
}

#[derive(Debug, Deserialize)]
pub struct GifQuery {
    #[serde(default)]
    pub keyword: String,
}
