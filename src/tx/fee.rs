//! Gas price resolution across the endpoint pool
//!
//! Each endpoint relays into a possibly different mempool view, so the
//! lowest quote is not safe to use everywhere. The pool-wide price is the
//! maximum across every endpoint that answered.

use crate::chain::EndpointPool;
use crate::error::{RelayerError, RelayerResult};

use chrono::{DateTime, Utc};
use ethers::types::U256;
use futures::future::join_all;
use tracing::{debug, warn};

/// One endpoint's gas price observation. Produced fresh per broadcast,
/// never cached across calls.
#[derive(Debug, Clone)]
pub struct FeeQuote {
    pub endpoint: String,
    pub value: U256,
    pub fetched_at: DateTime<Utc>,
}

/// Resolves a pool-wide gas price.
pub struct FeeEstimator;

impl FeeEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Query every endpoint concurrently and take the maximum successful
    /// quote. Aggregation only starts once every query has settled, so a
    /// lower partial view is never selected. Fails with `NoFeeQuote` when
    /// no endpoint answered; the fee is never defaulted.
    pub async fn best_fee(&self, pool: &EndpointPool) -> RelayerResult<FeeQuote> {
        let queries = pool.endpoints().iter().map(|endpoint| async move {
            let result = endpoint.transport().gas_price().await;
            (endpoint.name().to_string(), result)
        });

        let results = join_all(queries).await;

        let mut best: Option<FeeQuote> = None;
        for (name, result) in results {
            match result {
                Ok(value) => {
                    debug!(endpoint = %name, gas_price = %value, "Fee quote received");
                    let quote = FeeQuote {
                        endpoint: name,
                        value,
                        fetched_at: Utc::now(),
                    };
                    match &best {
                        Some(current) if current.value >= quote.value => {}
                        _ => best = Some(quote),
                    }
                }
                Err(e) => {
                    warn!(endpoint = %name, error = %e, "Fee quote failed");
                }
            }
        }

        best.ok_or(RelayerError::NoFeeQuote)
    }
}

impl Default for FeeEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Endpoint, MockRpcTransport, RpcError, RpcErrorKind};
    use std::sync::Arc;

    fn quoting(name: &str, price: u64) -> Endpoint {
        let mut mock = MockRpcTransport::new();
        mock.expect_gas_price()
            .times(1)
            .returning(move || Ok(U256::from(price)));
        Endpoint::new(name, Arc::new(mock))
    }

    fn failing(name: &str) -> Endpoint {
        let mut mock = MockRpcTransport::new();
        mock.expect_gas_price().times(1).returning(|| {
            Err(RpcError::new(RpcErrorKind::Connection, "connection refused"))
        });
        Endpoint::new(name, Arc::new(mock))
    }

    #[tokio::test]
    async fn test_max_of_successful_quotes() {
        let pool = EndpointPool::new(vec![
            quoting("a", 20),
            failing("b"),
            quoting("c", 35),
        ])
        .unwrap();

        let quote = FeeEstimator::new().best_fee(&pool).await.unwrap();
        assert_eq!(quote.value, U256::from(35));
        assert_eq!(quote.endpoint, "c");
    }

    #[tokio::test]
    async fn test_all_failures_yield_no_fee_quote() {
        let pool = EndpointPool::new(vec![failing("a"), failing("b"), failing("c")]).unwrap();

        let err = FeeEstimator::new().best_fee(&pool).await.unwrap_err();
        assert!(matches!(err, RelayerError::NoFeeQuote));
    }

    #[tokio::test]
    async fn test_single_endpoint_quote_wins() {
        let pool = EndpointPool::new(vec![quoting("only", 7)]).unwrap();

        let quote = FeeEstimator::new().best_fee(&pool).await.unwrap();
        assert_eq!(quote.value, U256::from(7));
    }

    #[tokio::test]
    async fn test_equal_quotes_keep_first_endpoint() {
        let pool = EndpointPool::new(vec![quoting("a", 30), quoting("b", 30)]).unwrap();

        let quote = FeeEstimator::new().best_fee(&pool).await.unwrap();
        assert_eq!(quote.endpoint, "a");
    }
}
