mod config;
mod server;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use keyring_core::{JsonFileStateStore, MpcKeyring, TracingEventSink};
use mpc_client::RemoteSigningClient;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::DaemonConfig;

/// Serves the MPC keyring over JSON-RPC.
#[derive(Parser, Debug)]
#[command(name = "keyring-daemon", version, about)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = DaemonConfig::load(cli.config.as_deref())?;
    config.apply_env_overrides();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    let signer = Arc::new(RemoteSigningClient::new(&config.api.url));
    let state_store = Arc::new(JsonFileStateStore::new(&config.state.path));
    let keyring = MpcKeyring::load(signer, state_store, Arc::new(TracingEventSink)).await?;
    info!(
        accounts = keyring.list_accounts().len(),
        api_url = %config.api.url,
        state = %config.state.path.display(),
        "keyring loaded"
    );

    let app = server::router(Arc::new(RwLock::new(keyring)));
    let listener = tokio::net::TcpListener::bind(config.server.listen).await?;
    info!(listen = %config.server.listen, "keyring daemon listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("keyring daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
