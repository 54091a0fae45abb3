//! Storage and persistence layer
//!
//! A small file-backed key-value store, the local analog of browser
//! local storage. Holds derived hints only; everything in it can be
//! re-read from the chain.

mod file_system;

pub use file_system::Storage;

/// Last known ledger entry count, as a decimal string
pub const TRANSACTION_COUNT_KEY: &str = "transactionCount";
