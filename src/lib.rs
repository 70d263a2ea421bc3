//! Fanout Relayer - redundant transaction submission across independent
//! RPC endpoints
//!
//! One submit call resolves a pool-wide gas price (maximum across every
//! endpoint that answers), takes a fresh pending-view nonce from the chain,
//! signs exactly one transaction, and broadcasts the same raw bytes across
//! the pool in order until an endpoint accepts it or reports it already
//! known.

pub mod chain;
pub mod config;
pub mod error;
pub mod tx;

pub use chain::{Endpoint, EndpointPool, RpcError, RpcErrorKind, RpcTransport};
pub use config::Settings;
pub use error::{EndpointFailure, RelayerError, RelayerResult};
pub use tx::{
    Account, BroadcastConfig, BroadcastCoordinator, BroadcastOutcome, NativeTransfer,
    PayloadBuilder, TokenTransfer,
};
