/// Ledger Mock Node Library
///
/// In-memory JSON-RPC node that plays both the browser wallet and the
/// deployed ledger contract. Usable as a standalone binary for local
/// development or as a [`transfer_ledger::WalletProvider`] in tests.

pub mod chain;
pub mod handlers;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use chain::{MockChain, MockChainConfig, DEFAULT_ACCOUNTS, DEFAULT_CHAIN_ID};
pub use server::{create_router, run_server};
pub use types::*;
