//! Local secp256k1 signing for legacy (EIP-155) transactions
//!
//! Used by the deployer, which holds a raw private key instead of going
//! through a wallet prompt.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{BufMut, Encodable, Header, EMPTY_STRING_CODE};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

use crate::LedgerError;

/// Pre-EIP-1559 transaction with replay protection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    /// `None` creates a contract
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    pub chain_id: u64,
}

impl LegacyTransaction {
    fn fields_length(&self) -> usize {
        self.nonce.length()
            + self.gas_price.length()
            + self.gas_limit.length()
            + self.to.map_or(1, |to| to.length())
            + self.value.length()
            + self.input.length()
    }

    fn encode_fields(&self, out: &mut dyn BufMut) {
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        match self.to {
            Some(to) => to.encode(out),
            None => out.put_u8(EMPTY_STRING_CODE),
        }
        self.value.encode(out);
        self.input.encode(out);
    }

    /// RLP of `[nonce, gasPrice, gas, to, value, data, chainId, 0, 0]`
    pub fn signing_payload(&self) -> Vec<u8> {
        let payload_length = self.fields_length() + self.chain_id.length() + 0u8.length() * 2;

        let mut out = Vec::with_capacity(payload_length + 3);
        Header {
            list: true,
            payload_length,
        }
        .encode(&mut out);
        self.encode_fields(&mut out);
        self.chain_id.encode(&mut out);
        0u8.encode(&mut out);
        0u8.encode(&mut out);
        out
    }

    /// Keccak-256 of the signing payload
    pub fn signature_hash(&self) -> B256 {
        keccak256(self.signing_payload())
    }

    /// RLP of `[nonce, gasPrice, gas, to, value, data, v, r, s]`
    fn encode_signed(&self, v: u64, r: U256, s: U256) -> Vec<u8> {
        let payload_length = self.fields_length() + v.length() + r.length() + s.length();

        let mut out = Vec::with_capacity(payload_length + 3);
        Header {
            list: true,
            payload_length,
        }
        .encode(&mut out);
        self.encode_fields(&mut out);
        v.encode(&mut out);
        r.encode(&mut out);
        s.encode(&mut out);
        out
    }
}

/// Private-key signer
pub struct LocalSigner {
    secret_key: SecretKey,
    address: Address,
}

impl std::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl LocalSigner {
    /// Parse a hex private key, with or without `0x`
    pub fn from_hex(private_key: &str) -> Result<Self, LedgerError> {
        let bytes = hex::decode(private_key.trim().trim_start_matches("0x"))
            .map_err(|e| LedgerError::invalid_input(format!("private key is not hex: {}", e)))?;
        let secret_key = SecretKey::from_slice(&bytes)
            .map_err(|e| LedgerError::invalid_input(format!("invalid private key: {}", e)))?;

        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let address = public_key_to_address(&public_key);

        Ok(Self {
            secret_key,
            address,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign and return the raw transaction bytes for `eth_sendRawTransaction`
    pub fn sign_transaction(&self, tx: &LegacyTransaction) -> Result<Bytes, LedgerError> {
        let hash = tx.signature_hash();

        let secp = Secp256k1::new();
        let message = Message::from_digest(hash.0);
        let signature = secp.sign_ecdsa_recoverable(&message, &self.secret_key);
        let (recovery_id, compact) = signature.serialize_compact();

        let recovery_id = u64::try_from(recovery_id.to_i32())
            .map_err(|_| LedgerError::Signing("negative recovery id".to_string()))?;
        let v = tx.chain_id * 2 + 35 + recovery_id;
        let r = U256::from_be_slice(&compact[..32]);
        let s = U256::from_be_slice(&compact[32..]);

        Ok(Bytes::from(tx.encode_signed(v, r, s)))
    }
}

/// Ethereum address of a public key: last 20 bytes of keccak(x || y)
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}
