//! Named endpoints and the ordered pool they live in

use super::rpc::{HttpTransport, RpcTransport};
use crate::config::EndpointConfig;
use crate::error::{RelayerError, RelayerResult};

use std::sync::Arc;
use tracing::{debug, warn};

/// One named RPC endpoint. Immutable once constructed.
#[derive(Clone)]
pub struct Endpoint {
    name: String,
    transport: Arc<dyn RpcTransport>,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            name: name.into(),
            transport,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transport(&self) -> &dyn RpcTransport {
        self.transport.as_ref()
    }
}

/// Fixed, ordered set of endpoints. Order defines failover preference and
/// never changes after construction.
pub struct EndpointPool {
    endpoints: Vec<Endpoint>,
}

impl EndpointPool {
    /// Build a pool from pre-constructed endpoints. Fails on an empty set.
    pub fn new(endpoints: Vec<Endpoint>) -> RelayerResult<Self> {
        if endpoints.is_empty() {
            return Err(RelayerError::Config(
                "Endpoint pool must contain at least one endpoint".to_string(),
            ));
        }
        Ok(Self { endpoints })
    }

    /// Build a pool from configuration, preserving config order. Endpoints
    /// with unusable URLs are skipped with a warning; an entirely unusable
    /// set is a configuration error.
    pub fn from_config(configs: &[EndpointConfig]) -> RelayerResult<Self> {
        let mut endpoints = Vec::with_capacity(configs.len());

        for cfg in configs {
            match HttpTransport::new(&cfg.url) {
                Ok(transport) => {
                    debug!(endpoint = %cfg.name, url = %cfg.url, "Added RPC endpoint");
                    endpoints.push(Endpoint::new(cfg.name.clone(), Arc::new(transport)));
                }
                Err(e) => {
                    warn!(endpoint = %cfg.name, error = %e, "Skipping unusable endpoint URL");
                }
            }
        }

        Self::new(endpoints)
    }

    /// Endpoints in preference order.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pool_rejected() {
        assert!(matches!(
            EndpointPool::new(Vec::new()),
            Err(RelayerError::Config(_))
        ));
    }

    #[test]
    fn test_pool_preserves_order() {
        let configs = vec![
            EndpointConfig {
                name: "infura".to_string(),
                url: "https://mainnet.example-a.io/v3/key".to_string(),
            },
            EndpointConfig {
                name: "alchemy".to_string(),
                url: "https://eth.example-b.com/v2/key".to_string(),
            },
            EndpointConfig {
                name: "ankr".to_string(),
                url: "https://rpc.example-c.com/eth".to_string(),
            },
        ];

        let pool = EndpointPool::from_config(&configs).unwrap();
        let names: Vec<_> = pool.endpoints().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["infura", "alchemy", "ankr"]);
    }
}
