//! btshell server entry point.
//!
//! Wires together the infrastructure services and starts the Tokio runtime.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ AppConfig::load()          -- /etc/btshell/config.toml, defaults if absent
//!  └─ DiscoveryController        -- power on, set advertised alias
//!  └─ IdentityStore              -- stable 4-digit device suffix
//!  └─ Server::run()              -- advertise, accept, spawn sessions
//!       └─ shutdown via CancellationToken on SIGINT / SIGTERM
//! ```

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use btshell_server::application::server::Server;
use btshell_server::infrastructure::bluetooth::bluez::{BluezAdapter, HciRadioConfig};
use btshell_server::infrastructure::bluetooth::discovery::DiscoveryController;
use btshell_server::infrastructure::exec::shell::HostShell;
use btshell_server::infrastructure::storage::config::AppConfig;
use btshell_server::infrastructure::storage::identity::IdentityStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;

    // Structured logging; the configured level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    info!("btshell server starting");

    // Adapter acquisition and power-on must precede every other adapter
    // operation.
    let bt_session = bluer::Session::new()
        .await
        .context("failed to connect to bluetoothd")?;
    let adapter = bt_session
        .default_adapter()
        .await
        .context("no usable bluetooth adapter")?;
    let device = adapter.name().to_string();
    let discovery = DiscoveryController::new(
        Arc::new(BluezAdapter::new(adapter)),
        Arc::new(HciRadioConfig::new(device)),
    );
    discovery
        .power_on()
        .await
        .context("failed to power on the adapter")?;

    // Advertised alias: <hostname>-<persistent 4-digit suffix>.
    let identity = IdentityStore::new(&config.bluetooth.identity_file)
        .read_or_create()
        .context("failed to resolve device identity")?;
    let hostname = gethostname::gethostname().to_string_lossy().into_owned();
    let alias = identity.alias_for(&hostname);
    info!("setting device name '{alias}'");
    discovery
        .set_alias(&alias)
        .await
        .context("failed to set adapter alias")?;

    // Single shutdown token: SIGINT/SIGTERM cancel it, the accept loop and
    // every session observe it.  Cancellation is idempotent.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(()) => {
                info!("shutdown signal received");
                signal_cancel.cancel();
            }
            Err(e) => error!("failed to listen for shutdown signals: {e}"),
        }
    });

    let server = Server::new(
        bt_session,
        discovery,
        Arc::new(HostShell::new(config.server.shell.clone())),
        config.server.service_name.clone(),
        config.server.framing,
        cancel,
    );

    // A top-level failure takes the same path as a termination signal: the
    // accept loop's drain has already forced discoverability off by the time
    // the error reaches us.
    let result = server.run().await;
    if let Err(e) = &result {
        error!("server failed: {e:#}");
    }
    result
}

/// Waits for Ctrl-C (SIGINT) or SIGTERM.
async fn shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = sigterm.recv() => Ok(()),
    }
}
