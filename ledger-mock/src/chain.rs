/// In-memory chain emulating a wallet and the transfer ledger contract
///
/// Every transaction is mined immediately into its own block. Only the
/// ledger contract at the configured address has code; anything else is a
/// plain account.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use alloy_primitives::{address, keccak256, Address, B256, U256};
use alloy_sol_types::{SolCall, SolInterface};
use serde_json::{json, Value};
use transfer_ledger::contract::Transactions::{self, TransactionsCalls};
use transfer_ledger::units::to_quantity;
use transfer_ledger::{
    parse_quantity, Entry, LedgerError, WalletProvider, DEFAULT_CONTRACT_ADDRESS,
};

use crate::types::{MockError, SentTransaction};

/// Development chain id
pub const DEFAULT_CHAIN_ID: u64 = 31_337;

/// First two well-known development accounts
pub const DEFAULT_ACCOUNTS: [Address; 2] = [
    address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
    address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"),
];

#[derive(Debug, Clone)]
pub struct MockChainConfig {
    pub chain_id: u64,
    /// Wallet accounts, in the order `eth_accounts` returns them
    pub accounts: Vec<Address>,
    /// Starting balance of every wallet account, in wei
    pub initial_balance: U256,
    pub contract_address: Address,
    /// Start with accounts already authorized
    pub authorized: bool,
}

impl Default for MockChainConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            accounts: DEFAULT_ACCOUNTS.to_vec(),
            // 10_000 ether
            initial_balance: U256::from(10_000u64) * U256::from(10u64).pow(U256::from(18u64)),
            contract_address: DEFAULT_CONTRACT_ADDRESS,
            authorized: false,
        }
    }
}

#[derive(Debug)]
struct ChainState {
    config: MockChainConfig,
    authorized: bool,
    reject_authorization: bool,
    balances: HashMap<Address, U256>,
    entries: Vec<Entry>,
    receipts: HashMap<B256, Value>,
    block_number: u64,
    sent: Vec<SentTransaction>,
}

/// Cloneable handle; clones share one chain
#[derive(Debug, Clone)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new(MockChainConfig::default())
    }
}

impl MockChain {
    pub fn new(config: MockChainConfig) -> Self {
        let balances = config
            .accounts
            .iter()
            .map(|account| (*account, config.initial_balance))
            .collect();

        log::info!(
            "Mock chain {} with {} account(s), ledger at {}",
            config.chain_id,
            config.accounts.len(),
            config.contract_address
        );

        Self {
            state: Arc::new(Mutex::new(ChainState {
                authorized: config.authorized,
                config,
                reject_authorization: false,
                balances,
                entries: Vec::new(),
                receipts: HashMap::new(),
                block_number: 0,
                sent: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        // A panic while holding the lock leaves consistent data behind
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn accounts(&self) -> Vec<Address> {
        self.lock().config.accounts.clone()
    }

    pub fn contract_address(&self) -> Address {
        self.lock().config.contract_address
    }

    /// Make `eth_requestAccounts` fail with code 4001
    pub fn set_reject_authorization(&self, reject: bool) {
        self.lock().reject_authorization = reject;
    }

    /// Authorize without a prompt, as if approved in an earlier session
    pub fn authorize(&self) {
        self.lock().authorized = true;
    }

    pub fn is_authorized(&self) -> bool {
        self.lock().authorized
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.lock().entries.clone()
    }

    pub fn balance(&self, account: Address) -> U256 {
        self.lock()
            .balances
            .get(&account)
            .copied()
            .unwrap_or(U256::ZERO)
    }

    pub fn block_number(&self) -> u64 {
        self.lock().block_number
    }

    /// Every `eth_sendTransaction` request received so far
    pub fn sent_transactions(&self) -> Vec<SentTransaction> {
        self.lock().sent.clone()
    }

    /// Answer one JSON-RPC call
    pub fn dispatch(&self, method: &str, params: &Value) -> Result<Value, MockError> {
        let mut state = self.lock();
        match method {
            "eth_chainId" => Ok(json!(to_quantity(U256::from(state.config.chain_id)))),
            "eth_blockNumber" => Ok(json!(to_quantity(U256::from(state.block_number)))),
            "eth_accounts" => Ok(state.visible_accounts()),
            "eth_requestAccounts" => {
                if state.reject_authorization {
                    return Err(MockError::UserRejected);
                }
                state.authorized = true;
                Ok(state.visible_accounts())
            }
            "eth_getBalance" => {
                let account = parse_address(param(params, 0)?)?;
                let balance = state.balances.get(&account).copied().unwrap_or(U256::ZERO);
                Ok(json!(to_quantity(balance)))
            }
            "eth_sendTransaction" => state.send_transaction(param(params, 0)?),
            "eth_call" => state.call(param(params, 0)?),
            "eth_getTransactionReceipt" => {
                let hash = param(params, 0)?
                    .as_str()
                    .ok_or_else(|| MockError::InvalidParams("hash must be a string".into()))?
                    .parse::<B256>()
                    .map_err(|e| MockError::InvalidParams(format!("invalid hash: {}", e)))?;
                Ok(state.receipts.get(&hash).cloned().unwrap_or(Value::Null))
            }
            other => Err(MockError::MethodNotFound(other.to_string())),
        }
    }
}

impl WalletProvider for MockChain {
    async fn request(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        self.dispatch(method, &params).map_err(LedgerError::from)
    }
}

impl ChainState {
    fn visible_accounts(&self) -> Value {
        if !self.authorized {
            return json!([]);
        }
        let accounts: Vec<String> = self
            .config
            .accounts
            .iter()
            .map(|account| account.to_string())
            .collect();
        json!(accounts)
    }

    fn send_transaction(&mut self, tx: &Value) -> Result<Value, MockError> {
        let from = parse_address(field(tx, "from")?)?;
        let to = parse_address(field(tx, "to")?)?;
        if !self.authorized || !self.config.accounts.contains(&from) {
            return Err(MockError::Unauthorized(from));
        }

        let raw_value = optional_str(tx, "value");
        let value = match raw_value.as_deref() {
            Some(raw) => parse_quantity(raw)
                .map_err(|e| MockError::InvalidParams(format!("value: {}", e)))?,
            None => U256::ZERO,
        };
        let raw_data = optional_str(tx, "data");

        if to == self.config.contract_address {
            let data = decode_data(raw_data.as_deref())?;
            self.execute_ledger(from, value, &data)?;
        } else {
            self.transfer(from, to, value)?;
        }

        self.sent.push(SentTransaction {
            from,
            to,
            gas: optional_str(tx, "gas"),
            value: raw_value,
            data: raw_data,
        });

        let hash = self.mine(from, to);
        Ok(json!(hash.to_string()))
    }

    fn execute_ledger(&mut self, from: Address, value: U256, data: &[u8]) -> Result<(), MockError> {
        let call = TransactionsCalls::abi_decode(data, true)
            .map_err(|e| MockError::Reverted(format!("unknown call: {}", e)))?;

        match call {
            TransactionsCalls::addToBlockchain(call) => {
                if value != call.amount {
                    return Err(MockError::Reverted(format!(
                        "value {} does not match amount {}",
                        value, call.amount
                    )));
                }
                self.transfer(from, call.receiver, value)?;

                self.entries.push(Entry {
                    sender: from,
                    receiver: call.receiver,
                    amount: call.amount,
                    message: call.message,
                    keyword: call.keyword,
                    timestamp: u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0),
                });
                log::info!("Ledger entry #{} recorded from {}", self.entries.len(), from);
                Ok(())
            }
            // View functions sent as transactions change nothing
            _ => Ok(()),
        }
    }

    fn call(&self, tx: &Value) -> Result<Value, MockError> {
        let to = parse_address(field(tx, "to")?)?;
        if to != self.config.contract_address {
            return Ok(json!("0x"));
        }

        let data = decode_data(optional_str(tx, "data").as_deref())?;
        let call = TransactionsCalls::abi_decode(&data, true)
            .map_err(|e| MockError::Reverted(format!("unknown call: {}", e)))?;

        let output = match call {
            TransactionsCalls::getAllTransactions(_) => {
                let entries: Vec<Transactions::TransferStruct> =
                    self.entries.iter().map(Into::into).collect();
                Transactions::getAllTransactionsCall::abi_encode_returns(&(entries,))
            }
            TransactionsCalls::getTransactionCount(_) => {
                Transactions::getTransactionCountCall::abi_encode_returns(&(U256::from(
                    self.entries.len(),
                ),))
            }
            TransactionsCalls::addToBlockchain(_) => Vec::new(),
        };
        Ok(json!(format!("0x{}", hex::encode(output))))
    }

    fn transfer(&mut self, from: Address, to: Address, value: U256) -> Result<(), MockError> {
        if value.is_zero() {
            return Ok(());
        }
        let available = self.balances.get(&from).copied().unwrap_or(U256::ZERO);
        if available < value {
            return Err(MockError::InsufficientFunds(from));
        }
        self.balances.insert(from, available - value);
        *self.balances.entry(to).or_insert(U256::ZERO) += value;
        Ok(())
    }

    fn mine(&mut self, from: Address, to: Address) -> B256 {
        self.block_number += 1;
        let hash = keccak256(format!(
            "{}:{}:{}:{}",
            self.config.chain_id, self.block_number, from, to
        ));

        self.receipts.insert(
            hash,
            json!({
                "transactionHash": hash.to_string(),
                "blockNumber": to_quantity(U256::from(self.block_number)),
                "from": from.to_string(),
                "to": to.to_string(),
                "status": "0x1",
                "contractAddress": null,
            }),
        );
        hash
    }
}

fn param(params: &Value, index: usize) -> Result<&Value, MockError> {
    params
        .get(index)
        .ok_or_else(|| MockError::InvalidParams(format!("missing parameter {}", index)))
}

fn field<'a>(tx: &'a Value, name: &str) -> Result<&'a Value, MockError> {
    tx.get(name)
        .ok_or_else(|| MockError::InvalidParams(format!("missing field '{}'", name)))
}

fn optional_str(tx: &Value, name: &str) -> Option<String> {
    tx.get(name).and_then(Value::as_str).map(str::to_string)
}

fn parse_address(value: &Value) -> Result<Address, MockError> {
    value
        .as_str()
        .ok_or_else(|| MockError::InvalidParams("address must be a string".into()))?
        .parse::<Address>()
        .map_err(|e| MockError::InvalidParams(format!("invalid address: {}", e)))
}

fn decode_data(data: Option<&str>) -> Result<Vec<u8>, MockError> {
    let data = data.ok_or_else(|| MockError::Reverted("call without data".into()))?;
    hex::decode(data.trim_start_matches("0x"))
        .map_err(|e| MockError::InvalidParams(format!("invalid data: {}", e)))
}
