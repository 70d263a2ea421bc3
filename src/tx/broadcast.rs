//! Broadcast coordination with per-endpoint failover
//!
//! One submit call resolves fee and nonce once, signs once, then walks the
//! endpoint pool in order with the same raw bytes. Endpoints are tried
//! strictly one at a time: racing sends would make an "already known"
//! answer from a later endpoint ambiguous.

use super::fee::FeeEstimator;
use super::payload::PayloadBuilder;
use super::sequence::SequenceTracker;
use super::signer::{build_request, Account, SignedTransaction};
use crate::chain::{EndpointPool, RpcErrorKind};
use crate::error::{EndpointFailure, RelayerError, RelayerResult};

use ethers::types::{Address, H256, U256};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Knobs for a coordinator instance.
#[derive(Debug, Clone)]
pub struct BroadcastConfig {
    pub chain_id: u64,
    pub gas_limit: u64,
    /// Upper bound on any single endpoint's send call.
    pub send_timeout: Duration,
}

/// Terminal success of a submit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// An endpoint accepted the transaction just now.
    Accepted { hash: H256, endpoint: String },
    /// An endpoint already held an identical copy in its mempool; the
    /// hash is the one precomputed from our raw bytes.
    AlreadyKnown { hash: H256 },
}

impl BroadcastOutcome {
    pub fn hash(&self) -> H256 {
        match self {
            BroadcastOutcome::Accepted { hash, .. } => *hash,
            BroadcastOutcome::AlreadyKnown { hash } => *hash,
        }
    }
}

/// Orchestrates fee resolution, nonce resolution, signing and the
/// sequential failover broadcast.
pub struct BroadcastCoordinator {
    pool: Arc<EndpointPool>,
    fee_estimator: FeeEstimator,
    sequence_tracker: SequenceTracker,
    config: BroadcastConfig,
}

impl BroadcastCoordinator {
    pub fn new(pool: Arc<EndpointPool>, config: BroadcastConfig) -> Self {
        Self {
            pool,
            fee_estimator: FeeEstimator::new(),
            sequence_tracker: SequenceTracker::new(),
            config,
        }
    }

    /// Submit one transfer. Resolution order is fixed: fee, then nonce,
    /// then a single signing pass; any of those failing is terminal with
    /// no endpoint contacted for broadcast. The cancellation token is
    /// honored at every await, abandoning the in-flight request.
    pub async fn submit(
        &self,
        account: &Account,
        recipient: Address,
        value: U256,
        payload_builder: &dyn PayloadBuilder,
        cancel: &CancellationToken,
    ) -> RelayerResult<BroadcastOutcome> {
        let fee = with_cancel(cancel, self.fee_estimator.best_fee(&self.pool)).await??;
        debug!(gas_price = %fee.value, source = %fee.endpoint, "Fee resolved");

        let nonce = with_cancel(
            cancel,
            self.sequence_tracker.next_sequence(&self.pool, account.address()),
        )
        .await??;
        debug!(nonce, "Sequence resolved");

        let payload = payload_builder.build(recipient, value);
        let request = build_request(
            account.address(),
            &payload,
            self.config.gas_limit,
            fee.value,
            nonce,
            self.config.chain_id,
        );
        let signed = with_cancel(cancel, account.sign(&request)).await??;
        info!(hash = ?signed.hash, nonce, gas_price = %fee.value, "Transaction signed");

        self.broadcast(&signed, cancel).await
    }

    /// Walk the pool once with the already-signed bytes. No per-endpoint
    /// retries; the nonce is never re-resolved mid-loop, so a stale nonce
    /// may be rejected identically by every remaining endpoint (known
    /// limitation, surfaced in the exhaustion error rather than patched
    /// over here).
    async fn broadcast(
        &self,
        signed: &SignedTransaction,
        cancel: &CancellationToken,
    ) -> RelayerResult<BroadcastOutcome> {
        let mut attempts: Vec<EndpointFailure> = Vec::with_capacity(self.pool.len());

        for endpoint in self.pool.endpoints() {
            let send = timeout(
                self.config.send_timeout,
                endpoint.transport().send_raw_transaction(signed.raw.clone()),
            );

            let result = match with_cancel(cancel, send).await? {
                Ok(result) => result,
                Err(_elapsed) => {
                    warn!(endpoint = %endpoint.name(), "Send timed out");
                    attempts.push(EndpointFailure {
                        endpoint: endpoint.name().to_string(),
                        kind: RpcErrorKind::Timeout,
                        message: format!(
                            "no response within {:?}",
                            self.config.send_timeout
                        ),
                    });
                    continue;
                }
            };

            match result {
                Ok(hash) => {
                    info!(endpoint = %endpoint.name(), hash = ?hash, "Transaction accepted");
                    return Ok(BroadcastOutcome::Accepted {
                        hash,
                        endpoint: endpoint.name().to_string(),
                    });
                }
                Err(e) => {
                    match e.kind {
                        RpcErrorKind::AlreadyKnown => {
                            // The endpoint holds an identical copy; that is
                            // a success, not a rejection.
                            info!(
                                endpoint = %endpoint.name(),
                                hash = ?signed.hash,
                                "Transaction already in mempool"
                            );
                            return Ok(BroadcastOutcome::AlreadyKnown { hash: signed.hash });
                        }
                        RpcErrorKind::RateLimited => {
                            warn!(endpoint = %endpoint.name(), "Rate limited, trying next endpoint");
                        }
                        RpcErrorKind::SequenceTooLow => {
                            warn!(
                                endpoint = %endpoint.name(),
                                "Nonce stale for this endpoint's view, trying next"
                            );
                        }
                        _ => {
                            warn!(endpoint = %endpoint.name(), error = %e, "Broadcast failed");
                        }
                    }
                    attempts.push(EndpointFailure {
                        endpoint: endpoint.name().to_string(),
                        kind: e.kind,
                        message: e.message,
                    });
                }
            }
        }

        Err(RelayerError::Exhausted { attempts })
    }

    /// Last nonce handed out, for status output only.
    pub fn last_observed_sequence(&self) -> Option<u64> {
        self.sequence_tracker.last_observed()
    }
}

/// Await `fut` unless the token fires first, in which case the in-flight
/// future is dropped and the submit reports `Cancelled`.
async fn with_cancel<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> RelayerResult<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RelayerError::Cancelled),
        out = fut => Ok(out),
    }
}
