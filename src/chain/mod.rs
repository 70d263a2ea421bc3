//! Chain access - named RPC endpoints and the transport seam
//!
//! This module provides:
//! - An ordered, immutable pool of independently reachable endpoints
//! - The `RpcTransport` trait the rest of the relayer talks through
//! - Classified endpoint errors so control flow never parses message text

pub mod endpoint;
pub mod rpc;

pub use endpoint::{Endpoint, EndpointPool};
pub use rpc::{HttpTransport, RpcError, RpcErrorKind, RpcTransport};

#[cfg(test)]
pub use rpc::MockRpcTransport;
