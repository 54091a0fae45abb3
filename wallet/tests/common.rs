//! Common test utilities for transfer ledger integration tests
//!
//! This module provides shared test infrastructure including:
//! - An in-process mock chain standing in for the wallet and contract
//! - Test environment setup with temporary storage
//! - A fault-injecting node wrapper for failure paths
//! - An HTTP mock node for tests that go through the JSON-RPC transport

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ledger_mock::MockChain;
use ledger_wallet::storage::Storage;
use ledger_wallet::{FormField, TransactionStore};
use serde_json::{json, Value};
use tempfile::TempDir;
use transfer_ledger::{ConfirmationPolicy, LedgerError, Wallet, WalletProvider};

pub fn init_logging() {
    env_logger::builder().is_test(true).try_init().ok();
}

/// Receipts from the mock are immediate; keep polling short and bounded
pub fn fast_confirmation() -> ConfirmationPolicy {
    ConfirmationPolicy {
        poll_interval: Duration::from_millis(10),
        max_attempts: Some(50),
    }
}

/// Test environment with automatic cleanup
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub chain: MockChain,
    pub store: TransactionStore<MockChain>,
}

impl TestEnvironment {
    pub fn new() -> anyhow::Result<Self> {
        init_logging();

        let temp_dir = TempDir::new()?;
        log::info!("📁 Test directory: {:?}", temp_dir.path());

        let chain = MockChain::default();
        let store = store_for(&chain, &temp_dir);

        Ok(Self {
            temp_dir,
            chain,
            store,
        })
    }

    pub fn storage(&self) -> Storage {
        Storage::new_with_base_dir(self.temp_dir.path().to_path_buf())
    }

    /// A new session over the same chain and storage, like a page reload
    pub fn reopen(&self) -> TransactionStore<MockChain> {
        store_for(&self.chain, &self.temp_dir)
    }

    pub fn fill_form(&self, address_to: &str, amount: &str, keyword: &str, message: &str) {
        self.store.handle_change(FormField::AddressTo, address_to);
        self.store.handle_change(FormField::Amount, amount);
        self.store.handle_change(FormField::Keyword, keyword);
        self.store.handle_change(FormField::Message, message);
    }
}

/// Switches read by [`FaultyNode`]; all off by default
#[derive(Debug, Default)]
pub struct Faults {
    /// `eth_call` fails with a transport error
    pub fail_calls: AtomicBool,
    /// Receipts stay `null` as if the transaction were still pending
    pub hold_receipts: AtomicBool,
    /// Mined receipts report status `0x0`
    pub revert_receipts: AtomicBool,
}

/// Mock chain behind a layer that can fail or stall selected calls
#[derive(Clone)]
pub struct FaultyNode {
    pub chain: MockChain,
    pub faults: Arc<Faults>,
}

impl FaultyNode {
    pub fn new(chain: MockChain) -> Self {
        Self {
            chain,
            faults: Arc::new(Faults::default()),
        }
    }
}

impl WalletProvider for FaultyNode {
    async fn request(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        match method {
            "eth_call" if self.faults.fail_calls.load(Ordering::SeqCst) => {
                Err(LedgerError::transport("node unreachable"))
            }
            "eth_getTransactionReceipt" => {
                if self.faults.hold_receipts.load(Ordering::SeqCst) {
                    return Ok(Value::Null);
                }
                let mut receipt = self.chain.request(method, params).await?;
                if self.faults.revert_receipts.load(Ordering::SeqCst) && receipt.is_object() {
                    receipt["status"] = json!("0x0");
                }
                Ok(receipt)
            }
            _ => self.chain.request(method, params).await,
        }
    }
}

/// Store over a [`FaultyNode`] wrapping a fresh mock chain
pub struct FaultyEnvironment {
    pub temp_dir: TempDir,
    pub node: FaultyNode,
    pub store: TransactionStore<FaultyNode>,
}

impl FaultyEnvironment {
    pub fn new(confirmation: ConfirmationPolicy) -> anyhow::Result<Self> {
        init_logging();

        let temp_dir = TempDir::new()?;
        let node = FaultyNode::new(MockChain::default());
        let store = TransactionStore::new(
            Wallet::Available(node.clone()),
            node.chain.contract_address(),
            Storage::new_with_base_dir(temp_dir.path().to_path_buf()),
        )
        .with_confirmation(confirmation);

        Ok(Self {
            temp_dir,
            node,
            store,
        })
    }

    pub fn fill_form(&self, address_to: &str, amount: &str, keyword: &str, message: &str) {
        self.store.handle_change(FormField::AddressTo, address_to);
        self.store.handle_change(FormField::Amount, amount);
        self.store.handle_change(FormField::Keyword, keyword);
        self.store.handle_change(FormField::Message, message);
    }
}

fn store_for(chain: &MockChain, temp_dir: &TempDir) -> TransactionStore<MockChain> {
    TransactionStore::new(
        Wallet::Available(chain.clone()),
        chain.contract_address(),
        Storage::new_with_base_dir(temp_dir.path().to_path_buf()),
    )
    .with_confirmation(fast_confirmation())
}

/// Serve `chain` over HTTP on an ephemeral port; returns the base URL
pub async fn spawn_mock_node(chain: MockChain) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = ledger_mock::create_router(chain);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            log::error!("Mock node stopped: {}", e);
        }
    });

    Ok(format!("http://{}", addr))
}
