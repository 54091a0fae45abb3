use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use transfer_ledger::{FailureKind, LedgerError};

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("No wallet account connected")]
    NotConnected,

    #[error("A transfer is already being submitted")]
    Busy,

    #[error("Invalid form: {0}")]
    InvalidForm(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WalletError {
    /// Failure category for the presentation layer
    pub fn kind(&self) -> &'static str {
        let kind = match self {
            WalletError::Ledger(err) => err.kind(),
            WalletError::InvalidForm(_) => FailureKind::InvalidInput,
            WalletError::NotConnected => FailureKind::EnvironmentMissing,
            WalletError::Busy => return "busy",
            WalletError::Storage(_) => return "storage",
        };
        match kind {
            FailureKind::EnvironmentMissing => "environment_missing",
            FailureKind::UserRejected => "user_rejected",
            FailureKind::Transport => "transport",
            FailureKind::Chain => "chain",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::InvalidInput => "invalid_input",
        }
    }
}

impl IntoResponse for WalletError {
    fn into_response(self) -> Response {
        let status = match &self {
            WalletError::Ledger(err) => match err.kind() {
                FailureKind::EnvironmentMissing => StatusCode::SERVICE_UNAVAILABLE,
                FailureKind::UserRejected => StatusCode::FORBIDDEN,
                FailureKind::Transport => StatusCode::BAD_GATEWAY,
                FailureKind::Chain => StatusCode::UNPROCESSABLE_ENTITY,
                FailureKind::MalformedResponse => StatusCode::BAD_GATEWAY,
                FailureKind::InvalidInput => StatusCode::BAD_REQUEST,
            },
            WalletError::InvalidForm(_) => StatusCode::BAD_REQUEST,
            WalletError::NotConnected => StatusCode::CONFLICT,
            WalletError::Busy => StatusCode::CONFLICT,
            WalletError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}
