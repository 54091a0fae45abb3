//! Error types for transfer ledger operations
//!
//! Every wallet, chain and deployment failure is reported through
//! [`LedgerError`]. Callers that only need to react to the broad category
//! (show "install a wallet" vs "request rejected" vs "network problem")
//! use [`LedgerError::kind`].

use std::error::Error as StdError;
use std::fmt;

/// EIP-1193 "User Rejected Request"
pub const USER_REJECTED_CODE: i64 = 4001;

/// Broad failure categories exposed to the presentation layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No wallet is reachable from this environment
    EnvironmentMissing,
    /// The user declined an authorization or signing prompt
    UserRejected,
    /// The request never got a usable answer (connection, HTTP status)
    Transport,
    /// The chain answered with an error or the transaction reverted
    Chain,
    /// The answer arrived but did not have the expected shape
    MalformedResponse,
    /// The caller supplied something unusable
    InvalidInput,
}

/// Core error type for wallet gateway, contract and deployment operations
#[derive(Clone, Debug)]
pub enum LedgerError {
    /// No wallet provider is configured
    WalletUnavailable,

    /// The wallet returned EIP-1193 code 4001
    UserRejected(String),

    /// The wallet is reachable but no account is authorized
    NoSigner,

    /// Transport failure talking to the wallet or node
    Transport(String),

    /// JSON-RPC error object returned by the wallet or node
    Rpc { code: i64, message: String },

    /// Transaction was mined with a failure status
    Reverted { transaction_hash: String },

    /// Receipt polling gave up
    ConfirmationTimeout {
        transaction_hash: String,
        attempts: u32,
    },

    /// Response did not decode
    MalformedResponse(String),

    /// Unusable caller input (address, amount, key)
    InvalidInput(String),

    /// Contract build artifact could not be loaded
    Artifact(String),

    /// Local transaction signing failed
    Signing(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WalletUnavailable => {
                write!(f, "No wallet provider available, install or configure a wallet")
            }
            Self::UserRejected(msg) => write!(f, "Request rejected by user: {}", msg),
            Self::NoSigner => write!(f, "No authorized wallet account to sign with"),
            Self::Transport(msg) => write!(f, "Transport error: {}", msg),
            Self::Rpc { code, message } => write!(f, "RPC error {}: {}", code, message),
            Self::Reverted { transaction_hash } => {
                write!(f, "Transaction reverted: {}", transaction_hash)
            }
            Self::ConfirmationTimeout {
                transaction_hash,
                attempts,
            } => write!(
                f,
                "Transaction {} not confirmed after {} attempts",
                transaction_hash, attempts
            ),
            Self::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::Artifact(msg) => write!(f, "Contract artifact error: {}", msg),
            Self::Signing(msg) => write!(f, "Signing error: {}", msg),
        }
    }
}

impl StdError for LedgerError {}

impl LedgerError {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Map a JSON-RPC error object, singling out user rejection
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        let message = message.into();
        if code == USER_REJECTED_CODE {
            Self::UserRejected(message)
        } else {
            Self::Rpc { code, message }
        }
    }

    /// Broad category of this failure
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::WalletUnavailable => FailureKind::EnvironmentMissing,
            Self::UserRejected(_) => FailureKind::UserRejected,
            Self::Transport(_) => FailureKind::Transport,
            Self::NoSigner
            | Self::Rpc { .. }
            | Self::Reverted { .. }
            | Self::ConfirmationTimeout { .. } => FailureKind::Chain,
            Self::MalformedResponse(_) => FailureKind::MalformedResponse,
            Self::InvalidInput(_) | Self::Artifact(_) | Self::Signing(_) => {
                FailureKind::InvalidInput
            }
        }
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<alloy_sol_types::Error> for LedgerError {
    fn from(err: alloy_sol_types::Error) -> Self {
        Self::MalformedResponse(format!("ABI decode failed: {}", err))
    }
}
