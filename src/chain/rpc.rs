//! RPC transport abstraction with classified errors
//!
//! Every provider-specific error message is classified here, once, into a
//! closed [`RpcErrorKind`]. The broadcast loop dispatches on the kind and
//! never inspects message text.

use ethers::providers::{Http, Middleware, Provider, ProviderError};
use ethers::types::{Address, BlockId, BlockNumber, Bytes, H256, U256};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Closed classification of endpoint failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcErrorKind {
    /// The endpoint already holds an identical transaction in its mempool.
    AlreadyKnown,
    /// The endpoint throttled the request.
    RateLimited,
    /// The submitted nonce is below the endpoint's view of the account.
    SequenceTooLow,
    /// The endpoint did not answer within the configured window.
    Timeout,
    /// Transport-level failure (connection refused, malformed response).
    Connection,
    /// The endpoint answered and rejected the request for any other reason.
    Rejected,
}

/// An RPC failure with its classification and the original message kept
/// for diagnostics.
#[derive(Debug, Clone)]
pub struct RpcError {
    pub kind: RpcErrorKind,
    pub message: String,
}

impl RpcError {
    pub fn new(kind: RpcErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RpcError {}

/// Read/submit access to one chain endpoint.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Current gas price in wei.
    async fn gas_price(&self) -> Result<U256, RpcError>;

    /// Transaction count for `address` in the pending view, i.e. the next
    /// usable nonce including mempool transactions.
    async fn pending_nonce(&self, address: Address) -> Result<u64, RpcError>;

    /// Broadcast pre-signed raw transaction bytes. Returns the hash the
    /// endpoint computed for it.
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<H256, RpcError>;
}

/// HTTP JSON-RPC transport backed by an ethers provider.
pub struct HttpTransport {
    provider: Provider<Http>,
}

impl HttpTransport {
    pub fn new(url: &str) -> Result<Self, RpcError> {
        let provider = Provider::<Http>::try_from(url)
            .map_err(|e| RpcError::new(RpcErrorKind::Connection, e.to_string()))?;
        Ok(Self { provider })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn gas_price(&self) -> Result<U256, RpcError> {
        self.provider.get_gas_price().await.map_err(classify)
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, RpcError> {
        let count = self
            .provider
            .get_transaction_count(address, Some(BlockId::Number(BlockNumber::Pending)))
            .await
            .map_err(classify)?;
        Ok(count.as_u64())
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<H256, RpcError> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(classify)?;
        Ok(pending.tx_hash())
    }
}

/// Map a provider error onto the closed kind set. Node implementations
/// agree on these substrings closely enough in practice (geth, erigon,
/// hosted gateways); anything unrecognized becomes `Rejected` or
/// `Connection` depending on whether the node answered at all.
fn classify(err: ProviderError) -> RpcError {
    let message = err.to_string();
    let lowered = message.to_ascii_lowercase();

    let kind = if lowered.contains("already known") || lowered.contains("known transaction") {
        RpcErrorKind::AlreadyKnown
    } else if lowered.contains("too many requests")
        || lowered.contains("rate limit")
        || lowered.contains("429")
    {
        RpcErrorKind::RateLimited
    } else if lowered.contains("nonce too low") {
        RpcErrorKind::SequenceTooLow
    } else if matches!(err, ProviderError::JsonRpcClientError(_)) {
        RpcErrorKind::Rejected
    } else {
        RpcErrorKind::Connection
    };

    RpcError::new(kind, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_msg(msg: &str) -> RpcErrorKind {
        // CustomError carries plain text like a JSON-RPC error body would
        classify(ProviderError::CustomError(msg.to_string())).kind
    }

    #[test]
    fn test_already_known_classification() {
        assert_eq!(
            classify_msg("(code: -32000, message: already known)"),
            RpcErrorKind::AlreadyKnown
        );
        assert_eq!(
            classify_msg("Known Transaction: 0xabc"),
            RpcErrorKind::AlreadyKnown
        );
    }

    #[test]
    fn test_rate_limit_classification() {
        assert_eq!(
            classify_msg("429 Too Many Requests"),
            RpcErrorKind::RateLimited
        );
        assert_eq!(
            classify_msg("daily rate limit exceeded"),
            RpcErrorKind::RateLimited
        );
    }

    #[test]
    fn test_nonce_too_low_classification() {
        assert_eq!(
            classify_msg("(code: -32000, message: nonce too low)"),
            RpcErrorKind::SequenceTooLow
        );
    }

    #[test]
    fn test_unrecognized_is_connection() {
        assert_eq!(
            classify_msg("error sending request for url"),
            RpcErrorKind::Connection
        );
    }

    #[test]
    fn test_original_message_preserved() {
        let err = classify(ProviderError::CustomError("nonce too low".to_string()));
        assert_eq!(err.kind, RpcErrorKind::SequenceTooLow);
        assert!(err.message.contains("nonce too low"));
    }
}
