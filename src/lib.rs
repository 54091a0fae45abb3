//! Transfer Ledger: wallet gateway and ledger contract client
//!
//! This crate provides the chain-facing half of the transfer ledger dApp:
//! a user connects a wallet, records a value transfer with a message and a
//! keyword in an append-only ledger contract, and reads the ledger back.
//!
//! # Architecture
//!
//! - **Wallet Gateway**: [`Wallet`] over any [`WalletProvider`] (EIP-1193 style
//!   `request`), with [`HttpProvider`] for JSON-RPC endpoints
//! - **Ledger Contract**: [`LedgerContract`] reads and appends entries through
//!   the wallet's authorized account
//! - **Deployment**: [`Deployer`] publishes the contract artifact with a local key
//!
//! # Example
//!
//! ```ignore
//! use transfer_ledger::{HttpProvider, LedgerContract, Wallet, DEFAULT_CONTRACT_ADDRESS};
//!
//! let wallet = Wallet::Available(HttpProvider::new("http://localhost:8545"));
//! wallet.request_accounts().await?;
//!
//! let ledger = LedgerContract::create(&wallet, DEFAULT_CONTRACT_ADDRESS).await?;
//! let amount = transfer_ledger::parse_amount("0.01")?;
//! let pending = ledger.append(receiver, amount, "hi", "hello").await?;
//! pending.wait_for_confirmation(&Default::default()).await?;
//!
//! for entry in ledger.list_all().await? {
//!     println!("{} -> {}: {}", entry.sender, entry.receiver, entry.display_amount());
//! }
//! ```

pub mod contract;
pub mod deployer;
pub mod entry;
pub mod error;
pub mod provider;
pub mod rpc;
pub mod signer;
pub mod units;

// Re-exports for convenience
pub use contract::{
    ConfirmationPolicy, LedgerContract, PendingTransaction, Transactions,
    DEFAULT_CONTRACT_ADDRESS,
};
pub use deployer::{ContractArtifact, Deployer, Deployment};
pub use entry::{Entry, EntryView};
pub use error::{FailureKind, LedgerError};
pub use provider::{Wallet, WalletProvider};
pub use rpc::{HttpProvider, RpcErrorObject, RpcRequest, RpcResponse, TransactionReceipt};
pub use signer::{LegacyTransaction, LocalSigner};
pub use units::{format_amount, parse_amount, parse_quantity, TRANSFER_GAS_LIMIT};

// Re-export chain primitives used in the public API
pub use alloy_primitives::{Address, Bytes, B256, U256};

// Common result type
pub type Result<T> = std::result::Result<T, LedgerError>;
