//! Fanout Relayer binary - one configured transfer, submitted once
//!
//! Loads the TOML config, builds the endpoint pool and session account,
//! and runs a single submit. Ctrl+C cancels an in-flight submit cleanly.

use anyhow::{Context, Result};
use ethers::types::{Address, U256};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use fanout_relayer::config::Settings;
use fanout_relayer::tx::{
    Account, BroadcastConfig, BroadcastCoordinator, BroadcastOutcome, NativeTransfer,
    PayloadBuilder, TokenTransfer,
};
use fanout_relayer::{EndpointPool, RelayerError};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!("Starting Fanout Relayer v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load()?;
    info!(
        "Loaded configuration with {} endpoints",
        settings.endpoints.len()
    );

    let transfer = settings
        .transfer
        .clone()
        .context("No [transfer] section configured; nothing to submit")?;

    let pool = Arc::new(
        EndpointPool::from_config(&settings.endpoints)
            .context("Failed to build endpoint pool")?,
    );

    let account = Account::from_config(&settings.wallet)
        .context("Failed to load session account")?;

    let coordinator = BroadcastCoordinator::new(
        pool,
        BroadcastConfig {
            chain_id: settings.relayer.chain_id,
            gas_limit: settings.relayer.gas_limit,
            send_timeout: Duration::from_millis(settings.relayer.send_timeout_ms),
        },
    );

    let recipient: Address = transfer
        .recipient
        .parse()
        .context("Invalid recipient address")?;
    let amount = U256::from_dec_str(&transfer.amount).context("Invalid transfer amount")?;

    let payload_builder: Box<dyn PayloadBuilder> = match &transfer.token_address {
        Some(token) => {
            let token: Address = token.parse().context("Invalid token address")?;
            info!(token = ?token, "Submitting ERC-20 transfer");
            Box::new(TokenTransfer::new(token))
        }
        None => {
            info!("Submitting native transfer");
            Box::new(NativeTransfer)
        }
    };

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Shutdown signal received, cancelling submit");
        signal_cancel.cancel();
    });

    match coordinator
        .submit(&account, recipient, amount, payload_builder.as_ref(), &cancel)
        .await
    {
        Ok(BroadcastOutcome::Accepted { hash, endpoint }) => {
            info!(hash = ?hash, endpoint = %endpoint, "Transaction accepted");
        }
        Ok(BroadcastOutcome::AlreadyKnown { hash }) => {
            info!(hash = ?hash, "Transaction was already in a mempool");
        }
        Err(RelayerError::Exhausted { attempts }) => {
            for attempt in &attempts {
                warn!("Endpoint failed: {}", attempt);
            }
            anyhow::bail!("Broadcast exhausted across {} endpoints", attempts.len());
        }
        Err(e) => {
            return Err(e).context("Submit failed");
        }
    }

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fanout_relayer=debug,hyper=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
