/// Mock node error and record types
///
/// Error codes follow EIP-1193 for wallet-level failures and the usual
/// node codes for everything else, so clients see what a real wallet
/// would send them.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use transfer_ledger::{LedgerError, RpcErrorObject};

#[derive(Debug, Error)]
pub enum MockError {
    #[error("User rejected the request.")]
    UserRejected,

    #[error("The requested account has not been authorized by the user: {0}")]
    Unauthorized(Address),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error("insufficient funds for transfer from {0}")]
    InsufficientFunds(Address),
}

impl MockError {
    pub fn code(&self) -> i64 {
        match self {
            MockError::UserRejected => 4001,
            MockError::Unauthorized(_) => 4100,
            MockError::MethodNotFound(_) => -32601,
            MockError::InvalidParams(_) => -32602,
            MockError::Reverted(_) | MockError::InsufficientFunds(_) => -32000,
        }
    }

    pub fn to_rpc_error(&self) -> RpcErrorObject {
        RpcErrorObject {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

impl From<MockError> for LedgerError {
    fn from(err: MockError) -> Self {
        LedgerError::from_rpc(err.code(), err.to_string())
    }
}

/// One `eth_sendTransaction` request as the mock received it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentTransaction {
    pub from: Address,
    pub to: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<String>,
    /// Exactly as sent (decimal or `0x` hex)
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Toggle for `POST /dev/reject-authorization`
#[derive(Debug, Deserialize)]
pub struct RejectAuthorizationRequest {
    pub reject: bool,
}
