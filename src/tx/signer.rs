//! Session account and transaction signing
//!
//! Credentials are supplied externally (env var named in config), held only
//! in process memory, and never persisted. Exactly one signed transaction
//! is derived per built request; its hash is computed locally before any
//! endpoint sees the bytes.

use super::payload::TxPayload;
use crate::config::WalletConfig;
use crate::error::{RelayerError, RelayerResult};

use ethers::signers::coins_bip39::English;
use ethers::signers::{LocalWallet, MnemonicBuilder, Signer};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, TransactionRequest, U256};
use ethers::utils::keccak256;
use tracing::{debug, info};

/// One session's signing identity.
pub struct Account {
    address: Address,
    wallet: LocalWallet,
}

impl Account {
    /// Load credentials from whichever env var the config names, private
    /// key first.
    pub fn from_config(config: &WalletConfig) -> RelayerResult<Self> {
        if let Some(var) = &config.private_key_env {
            if let Ok(key) = std::env::var(var) {
                return Self::from_private_key(key.trim());
            }
        }
        if let Some(var) = &config.mnemonic_env {
            if let Ok(phrase) = std::env::var(var) {
                return Self::from_mnemonic(phrase.trim());
            }
        }
        Err(RelayerError::Wallet(
            "No credentials found in configured env vars".to_string(),
        ))
    }

    pub fn from_private_key(key: &str) -> RelayerResult<Self> {
        let wallet = key
            .parse::<LocalWallet>()
            .map_err(|e| RelayerError::Wallet(format!("Invalid private key: {}", e)))?;
        Ok(Self::from_wallet(wallet))
    }

    pub fn from_mnemonic(phrase: &str) -> RelayerResult<Self> {
        let wallet = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .build()
            .map_err(|e| RelayerError::Wallet(format!("Invalid seed phrase: {}", e)))?;
        Ok(Self::from_wallet(wallet))
    }

    fn from_wallet(wallet: LocalWallet) -> Self {
        let address = wallet.address();
        info!(address = ?address, "Session account loaded");
        Self { address, wallet }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a built request. Failure here is terminal for a submit: it
    /// means malformed input or corrupted key material, not a transient
    /// endpoint condition.
    pub async fn sign(&self, request: &TypedTransaction) -> RelayerResult<SignedTransaction> {
        let chain_id = request
            .chain_id()
            .ok_or_else(|| RelayerError::Signing("Request is missing a chain id".to_string()))?;

        let wallet = self.wallet.clone().with_chain_id(chain_id.as_u64());
        let signature = wallet
            .sign_transaction(request)
            .await
            .map_err(|e| RelayerError::Signing(e.to_string()))?;

        let raw = request.rlp_signed(&signature);
        let hash = keccak256(&raw).into();
        debug!("Signed raw transaction: 0x{}", hex::encode(&raw));

        Ok(SignedTransaction { raw, hash })
    }
}

/// Raw signed bytes plus the hash precomputed from them. The same bytes
/// are broadcast to every endpoint; the hash deduplicates across them.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub raw: ethers::types::Bytes,
    pub hash: ethers::types::H256,
}

/// Assemble the immutable request a signed transaction derives from. Fee
/// and sequence number are fixed here, before the first send attempt.
pub fn build_request(
    sender: Address,
    payload: &TxPayload,
    gas_limit: u64,
    gas_price: U256,
    nonce: u64,
    chain_id: u64,
) -> TypedTransaction {
    TypedTransaction::Legacy(
        TransactionRequest::new()
            .from(sender)
            .to(payload.to)
            .value(payload.value)
            .data(payload.data.clone())
            .gas(gas_limit)
            .gas_price(gas_price)
            .nonce(nonce)
            .chain_id(chain_id),
    )
}
