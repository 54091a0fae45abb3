//! Wallet gateway
//!
//! A wallet is reached through an EIP-1193 style `request(method, params)`
//! call. [`WalletProvider`] is that capability; [`Wallet`] wraps it with an
//! explicit `Unavailable` variant so call sites never check for a missing
//! global object.

use std::future::Future;

use alloy_primitives::{Address, B256, U256};
use serde_json::{json, Value};

use crate::units::to_quantity;
use crate::LedgerError;

/// Anything that answers wallet / node JSON-RPC requests
pub trait WalletProvider: Send + Sync {
    /// Issue one request and return its `result`
    fn request(
        &self,
        method: &str,
        params: Value,
    ) -> impl Future<Output = Result<Value, LedgerError>> + Send;
}

/// Injected wallet capability
#[derive(Clone, Debug)]
pub enum Wallet<P> {
    /// A provider was found in the environment
    Available(P),
    /// No wallet in this environment
    Unavailable,
}

impl<P: WalletProvider> Wallet<P> {
    /// Wrap an optional provider
    pub fn from_option(provider: Option<P>) -> Self {
        match provider {
            Some(provider) => Self::Available(provider),
            None => Self::Unavailable,
        }
    }

    /// True if a wallet provider is present
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Borrow the provider or fail with [`LedgerError::WalletUnavailable`]
    pub fn provider(&self) -> Result<&P, LedgerError> {
        match self {
            Self::Available(provider) => Ok(provider),
            Self::Unavailable => Err(LedgerError::WalletUnavailable),
        }
    }

    /// Already-approved accounts, without prompting (`eth_accounts`)
    pub async fn authorized_accounts(&self) -> Result<Vec<Address>, LedgerError> {
        let result = self.provider()?.request("eth_accounts", json!([])).await?;
        parse_accounts(result)
    }

    /// Prompt the user for approval (`eth_requestAccounts`)
    pub async fn request_accounts(&self) -> Result<Vec<Address>, LedgerError> {
        let result = self
            .provider()?
            .request("eth_requestAccounts", json!([]))
            .await?;
        parse_accounts(result)
    }

    /// Submit a native value transfer (`eth_sendTransaction`)
    ///
    /// `gas` travels as a hex quantity and `value` as a decimal string of wei.
    /// Returns once the wallet has broadcast the transaction.
    pub async fn send_value(
        &self,
        from: Address,
        to: Address,
        amount_wei: U256,
        gas_limit: u64,
    ) -> Result<B256, LedgerError> {
        let params = json!([{
            "from": from.to_string(),
            "to": to.to_string(),
            "gas": to_quantity(U256::from(gas_limit)),
            "value": amount_wei.to_string(),
        }]);
        log::debug!("Sending {} wei from {} to {}", amount_wei, from, to);

        let result = self
            .provider()?
            .request("eth_sendTransaction", params)
            .await?;
        parse_hash(&result)
    }
}

pub(crate) fn parse_accounts(result: Value) -> Result<Vec<Address>, LedgerError> {
    let raw: Vec<String> = serde_json::from_value(result)
        .map_err(|e| LedgerError::malformed(format!("account list: {}", e)))?;

    raw.iter()
        .map(|account| {
            account
                .parse::<Address>()
                .map_err(|e| LedgerError::malformed(format!("account '{}': {}", account, e)))
        })
        .collect()
}

pub(crate) fn parse_hash(result: &Value) -> Result<B256, LedgerError> {
    let hash = result
        .as_str()
        .ok_or_else(|| LedgerError::malformed(format!("expected hash, got {}", result)))?;
    hash.parse::<B256>()
        .map_err(|e| LedgerError::malformed(format!("transaction hash '{}': {}", hash, e)))
}
