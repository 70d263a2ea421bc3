//! Account sequence number (nonce) resolution
//!
//! The chain is the only authority. Every call issues a fresh pending-view
//! query; the last observed value is kept purely so operators can spot
//! drift in the logs, and never feeds the value used for signing.

use crate::chain::EndpointPool;
use crate::error::{RelayerError, RelayerResult};

use ethers::types::Address;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Resolves the next usable nonce for an account.
pub struct SequenceTracker {
    /// Diagnostics only. Carries no correctness guarantee.
    last_observed: Mutex<Option<u64>>,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self {
            last_observed: Mutex::new(None),
        }
    }

    /// Fresh pending-view nonce for `address`, trying endpoints in pool
    /// order until one answers. Two calls in the same process never share a
    /// cached value; an incremented mempool between them is reflected in
    /// the second result.
    pub async fn next_sequence(
        &self,
        pool: &EndpointPool,
        address: Address,
    ) -> RelayerResult<u64> {
        let mut last_error = None;

        for endpoint in pool.endpoints() {
            match endpoint.transport().pending_nonce(address).await {
                Ok(nonce) => {
                    let previous = {
                        let mut cell = self.last_observed.lock().unwrap_or_else(|e| e.into_inner());
                        cell.replace(nonce)
                    };
                    debug!(
                        endpoint = %endpoint.name(),
                        nonce,
                        previous = ?previous,
                        "Resolved pending nonce"
                    );
                    return Ok(nonce);
                }
                Err(e) => {
                    warn!(endpoint = %endpoint.name(), error = %e, "Nonce query failed");
                    last_error = Some(e);
                }
            }
        }

        Err(RelayerError::SequenceUnavailable {
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no endpoints in pool".to_string()),
        })
    }

    /// Last value returned by `next_sequence`, for logs and status output.
    pub fn last_observed(&self) -> Option<u64> {
        *self.last_observed.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SequenceTracker {
    fn default() -> Self {
        Self::new()
    }
}
