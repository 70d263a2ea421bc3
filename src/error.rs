//! Error types for the fanout relayer

use crate::chain::RpcErrorKind;

use thiserror::Error;

/// Main error type for the relayer
#[derive(Error, Debug)]
pub enum RelayerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("No endpoint returned a fee quote")]
    NoFeeQuote,

    #[error("Could not resolve account sequence number: {message}")]
    SequenceUnavailable { message: String },

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Broadcast exhausted after {} endpoints", attempts.len())]
    Exhausted { attempts: Vec<EndpointFailure> },

    #[error("Submit cancelled")]
    Cancelled,
}

impl RelayerError {
    /// Whether a fresh submit call (new fee/sequence resolution) could
    /// plausibly succeed. Signing failures indicate bad input or key
    /// material and are not worth repeating.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RelayerError::NoFeeQuote
                | RelayerError::SequenceUnavailable { .. }
                | RelayerError::Exhausted { .. }
        )
    }
}

/// A single endpoint's rejection, recorded in pool order during the
/// failover loop.
#[derive(Debug, Clone)]
pub struct EndpointFailure {
    pub endpoint: String,
    pub kind: RpcErrorKind,
    pub message: String,
}

impl std::fmt::Display for EndpointFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:?} ({})", self.endpoint, self.kind, self.message)
    }
}

/// Result type for relayer operations
pub type RelayerResult<T> = Result<T, RelayerError>;
