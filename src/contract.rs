//! Transfer ledger contract client
//!
//! The ledger is an append-only list of transfers with a counter. This module
//! only binds to it; the contract logic lives on chain.

use std::time::Duration;

use alloy_primitives::{address, Address, B256, U256};
use alloy_sol_types::{sol, SolCall};
use serde_json::json;

use crate::entry::Entry;
use crate::provider::{parse_hash, Wallet, WalletProvider};
use crate::rpc::{self, TransactionReceipt};
use crate::LedgerError;

/// Address of the first contract created by account 0 on a fresh
/// development chain
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

sol! {
    contract Transactions {
        struct TransferStruct {
            address sender;
            address receiver;
            uint amount;
            string message;
            uint256 timestamp;
            string keyword;
        }

        // Only deployed builds declaring this payable accept the attached value
        function addToBlockchain(address receiver, uint amount, string message, string keyword) external payable;
        function getAllTransactions() external view returns (TransferStruct[] memory);
        function getTransactionCount() external view returns (uint256);
    }
}

impl From<Transactions::TransferStruct> for Entry {
    fn from(raw: Transactions::TransferStruct) -> Self {
        Self {
            sender: raw.sender,
            receiver: raw.receiver,
            amount: raw.amount,
            message: raw.message,
            keyword: raw.keyword,
            timestamp: u64::try_from(raw.timestamp).unwrap_or(u64::MAX),
        }
    }
}

impl From<&Entry> for Transactions::TransferStruct {
    fn from(entry: &Entry) -> Self {
        Self {
            sender: entry.sender,
            receiver: entry.receiver,
            amount: entry.amount,
            message: entry.message.clone(),
            timestamp: U256::from(entry.timestamp),
            keyword: entry.keyword.clone(),
        }
    }
}

/// How long to wait for a transaction to be mined
#[derive(Debug, Clone)]
pub struct ConfirmationPolicy {
    pub poll_interval: Duration,
    /// `None` waits indefinitely
    pub max_attempts: Option<u32>,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_attempts: None,
        }
    }
}

/// A broadcast transaction awaiting confirmation
#[derive(Debug)]
pub struct PendingTransaction<'a, P> {
    provider: &'a P,
    hash: B256,
}

impl<'a, P: WalletProvider> PendingTransaction<'a, P> {
    pub fn new(provider: &'a P, hash: B256) -> Self {
        Self { provider, hash }
    }

    pub fn hash(&self) -> B256 {
        self.hash
    }

    /// Poll for the receipt until mined
    ///
    /// Fails with [`LedgerError::Reverted`] on a failed receipt and with
    /// [`LedgerError::ConfirmationTimeout`] once `max_attempts` is spent.
    pub async fn wait_for_confirmation(
        &self,
        policy: &ConfirmationPolicy,
    ) -> Result<TransactionReceipt, LedgerError> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            if let Some(receipt) = rpc::transaction_receipt(self.provider, self.hash).await? {
                if !receipt.succeeded() {
                    return Err(LedgerError::Reverted {
                        transaction_hash: self.hash.to_string(),
                    });
                }
                log::debug!(
                    "Transaction {} confirmed after {} poll(s)",
                    self.hash,
                    attempt
                );
                return Ok(receipt);
            }

            if let Some(max) = policy.max_attempts {
                if attempt >= max {
                    return Err(LedgerError::ConfirmationTimeout {
                        transaction_hash: self.hash.to_string(),
                        attempts: attempt,
                    });
                }
            }
            tokio::time::sleep(policy.poll_interval).await;
        }
    }
}

/// Handle to the ledger contract, signed by the wallet's current account
#[derive(Debug)]
pub struct LedgerContract<'a, P> {
    provider: &'a P,
    address: Address,
    signer: Address,
}

impl<'a, P: WalletProvider> LedgerContract<'a, P> {
    /// Bind to the contract at `address`
    ///
    /// The signer is the first account the wallet has already authorized.
    pub async fn create(wallet: &'a Wallet<P>, address: Address) -> Result<Self, LedgerError> {
        let provider = wallet.provider()?;
        let signer = wallet
            .authorized_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(LedgerError::NoSigner)?;

        Ok(Self {
            provider,
            address,
            signer,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signer(&self) -> Address {
        self.signer
    }

    /// Every entry, in contract order (`getAllTransactions`)
    pub async fn list_all(&self) -> Result<Vec<Entry>, LedgerError> {
        let data = Transactions::getAllTransactionsCall {}.abi_encode();
        let output = rpc::call(self.provider, Some(self.signer), self.address, &data).await?;
        let decoded = Transactions::getAllTransactionsCall::abi_decode_returns(&output, true)?;

        Ok(decoded._0.into_iter().map(Entry::from).collect())
    }

    /// Number of recorded entries (`getTransactionCount`)
    pub async fn count(&self) -> Result<u64, LedgerError> {
        let data = Transactions::getTransactionCountCall {}.abi_encode();
        let output = rpc::call(self.provider, Some(self.signer), self.address, &data).await?;
        let decoded = Transactions::getTransactionCountCall::abi_decode_returns(&output, true)?;

        u64::try_from(decoded._0)
            .map_err(|_| LedgerError::malformed(format!("entry count out of range: {}", decoded._0)))
    }

    /// Record a transfer (`addToBlockchain`)
    ///
    /// The call carries `amount` as value, so the payment and the ledger
    /// entry succeed or fail together. `value` is sent as a decimal string
    /// of wei, like the wallet gateway's plain transfers.
    pub async fn append(
        &self,
        to: Address,
        amount: U256,
        message: &str,
        keyword: &str,
    ) -> Result<PendingTransaction<'a, P>, LedgerError> {
        let data = Transactions::addToBlockchainCall {
            receiver: to,
            amount,
            message: message.to_string(),
            keyword: keyword.to_string(),
        }
        .abi_encode();

        let params = json!([{
            "from": self.signer.to_string(),
            "to": self.address.to_string(),
            "value": amount.to_string(),
            "data": format!("0x{}", hex::encode(&data)),
        }]);

        let result = self
            .provider
            .request("eth_sendTransaction", params)
            .await?;
        let hash = parse_hash(&result)?;
        log::info!("Ledger append broadcast: {}", hash);

        Ok(PendingTransaction::new(self.provider, hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_sol_types::SolInterface;

    #[test]
    fn test_selectors_match_deployed_abi() {
        assert_eq!(
            Transactions::getAllTransactionsCall::SIGNATURE,
            "getAllTransactions()"
        );
        assert_eq!(
            Transactions::getTransactionCountCall::SIGNATURE,
            "getTransactionCount()"
        );
        assert_eq!(
            Transactions::addToBlockchainCall::SIGNATURE,
            "addToBlockchain(address,uint256,string,string)"
        );
    }

    #[test]
    fn test_append_calldata_decodes_back() {
        let call = Transactions::addToBlockchainCall {
            receiver: address!("abc0000000000000000000000000000000000abc"),
            amount: U256::from(10_000_000_000_000_000u64),
            message: "hi".to_string(),
            keyword: "hello".to_string(),
        };
        let data = call.abi_encode();
        assert_eq!(&data[..4], &Transactions::addToBlockchainCall::SELECTOR);

        match Transactions::TransactionsCalls::abi_decode(&data, true).unwrap() {
            Transactions::TransactionsCalls::addToBlockchain(decoded) => {
                assert_eq!(decoded.receiver, call.receiver);
                assert_eq!(decoded.amount, call.amount);
                assert_eq!(decoded.message, "hi");
                assert_eq!(decoded.keyword, "hello");
            }
            _ => panic!("decoded to the wrong call"),
        }
    }

    #[test]
    fn test_entry_list_decodes_from_return_data() {
        let entry = Entry {
            sender: address!("1230000000000000000000000000000000000123"),
            receiver: address!("abc0000000000000000000000000000000000abc"),
            amount: U256::from(5u64),
            message: "m".to_string(),
            keyword: "k".to_string(),
            timestamp: 42,
        };
        let encoded = Transactions::getAllTransactionsCall::abi_encode_returns(&(vec![
            Transactions::TransferStruct::from(&entry),
        ],));

        let decoded =
            Transactions::getAllTransactionsCall::abi_decode_returns(&encoded, true).unwrap();
        let entries: Vec<Entry> = decoded._0.into_iter().map(Entry::from).collect();
        assert_eq!(entries, vec![entry]);
    }
}
