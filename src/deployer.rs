//! Contract deployment
//!
//! Publishes a compiled contract from its build artifact, signing the
//! creation transaction locally and waiting for it to be mined.

use std::path::Path;

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::Deserialize;

use crate::contract::{ConfirmationPolicy, PendingTransaction};
use crate::provider::WalletProvider;
use crate::rpc;
use crate::signer::{LegacyTransaction, LocalSigner};
use crate::LedgerError;

/// Compiled contract as written by the Hardhat toolchain
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub abi: serde_json::Value,
    pub bytecode: Bytes,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    #[serde(default)]
    contract_name: String,
    #[serde(default)]
    abi: serde_json::Value,
    bytecode: String,
}

impl ContractArtifact {
    /// Read an artifact JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::Artifact(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    /// Parse artifact JSON
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        let raw: RawArtifact = serde_json::from_str(json)
            .map_err(|e| LedgerError::Artifact(format!("invalid artifact JSON: {}", e)))?;

        let bytecode = rpc::decode_hex(&raw.bytecode)
            .map_err(|e| LedgerError::Artifact(format!("invalid bytecode: {}", e)))?;
        if bytecode.is_empty() {
            return Err(LedgerError::Artifact(format!(
                "artifact '{}' has no bytecode (abstract contract or interface?)",
                raw.contract_name
            )));
        }

        Ok(Self {
            contract_name: raw.contract_name,
            abi: raw.abi,
            bytecode: Bytes::from(bytecode),
        })
    }

    /// Whether the ABI declares `function` as accepting value
    ///
    /// Reads `stateMutability`, falling back to the older `payable` flag.
    pub fn is_payable(&self, function: &str) -> bool {
        let Some(entries) = self.abi.as_array() else {
            return false;
        };
        entries
            .iter()
            .filter(|entry| entry["type"] == "function" && entry["name"] == function)
            .any(|entry| match entry["stateMutability"].as_str() {
                Some(mutability) => mutability == "payable",
                None => entry["payable"].as_bool().unwrap_or(false),
            })
    }
}

/// Outcome of a successful deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    pub transaction_hash: B256,
}

/// Deploys contracts through a node, paying from a local key
pub struct Deployer<P> {
    provider: P,
    signer: LocalSigner,
    policy: ConfirmationPolicy,
}

impl<P: WalletProvider> Deployer<P> {
    pub fn new(provider: P, signer: LocalSigner) -> Self {
        Self {
            provider,
            signer,
            policy: ConfirmationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ConfirmationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn deployer_address(&self) -> Address {
        self.signer.address()
    }

    /// Build the unsigned creation transaction from chain state
    pub async fn prepare(
        &self,
        artifact: &ContractArtifact,
    ) -> Result<LegacyTransaction, LedgerError> {
        let from = self.signer.address();
        let chain_id = rpc::chain_id(&self.provider).await?;
        let nonce = rpc::transaction_count(&self.provider, from).await?;
        let gas_price = rpc::gas_price(&self.provider).await?;
        let gas_limit = rpc::estimate_gas(&self.provider, from, None, &artifact.bytecode).await?;

        log::debug!(
            "Prepared deployment of {}: chain {}, nonce {}, gas {} @ {} wei",
            artifact.contract_name,
            chain_id,
            nonce,
            gas_limit,
            gas_price
        );

        Ok(LegacyTransaction {
            nonce,
            gas_price,
            gas_limit,
            to: None,
            value: U256::ZERO,
            input: artifact.bytecode.clone(),
            chain_id,
        })
    }

    /// Deploy and wait until the contract exists on chain
    pub async fn deploy(&self, artifact: &ContractArtifact) -> Result<Deployment, LedgerError> {
        let tx = self.prepare(artifact).await?;
        let raw = self.signer.sign_transaction(&tx)?;

        let transaction_hash = rpc::send_raw_transaction(&self.provider, &raw).await?;
        log::info!(
            "Deploying {} from {} in {}",
            artifact.contract_name,
            self.signer.address(),
            transaction_hash
        );

        let receipt = PendingTransaction::new(&self.provider, transaction_hash)
            .wait_for_confirmation(&self.policy)
            .await?;

        let address = receipt.contract_address.ok_or_else(|| {
            LedgerError::malformed(format!(
                "receipt for {} has no contract address",
                transaction_hash
            ))
        })?;

        Ok(Deployment {
            address,
            transaction_hash,
        })
    }
}
