//! Transfer ledger application layer
//!
//! - Transaction store: session state over the wallet gateway and ledger contract
//! - Persisted key-value cache
//! - GIF lookup for entry keywords
//! - HTTP API exposing the store to the presentation layer

pub mod api;
pub mod config;
pub mod error;
pub mod gif;
pub mod storage;
pub mod store;

pub use config::{DeployConfig, WalletConfig};
pub use error::{StorageError, WalletError};
pub use gif::{GifClient, GifLookup, FALLBACK_GIF_URL};
pub use storage::Storage;
pub use store::{FlowState, FormField, FormState, SessionState, SubmitReceipt, TransactionStore};
