//! Accept loop: service advertisement, discoverability, and dispatch of
//! accepted connections to session tasks.
//!
//! The loop walks a fixed lifecycle:
//!
//! ```text
//! Idle ──► Listening ──► Accepting ──► Draining ──► Closed
//! ```
//!
//! - **Listening**: register the Serial Port Profile with BlueZ.  The
//!   registration binds an RFCOMM channel (auto-assigned), publishes the SDP
//!   record, and hands back the stream of incoming connect requests — the
//!   advertisement and the listening endpoint live and die together, so the
//!   record can never outlive or lag the socket.  The classic radio is also
//!   put into page + inquiry scan here.
//! - **Accepting**: discoverability goes on (with an unlimited timeout) and
//!   the loop waits for connect requests.  Each accepted stream is handed to
//!   a freshly spawned [`Session`] task and the loop immediately returns to
//!   accepting: connections are served concurrently and the device stays
//!   discoverable while peers are connected.
//! - **Draining**: discoverability is forced off.  This runs after the
//!   accept loop future completes, whichever way it completed, so shutdown
//!   by signal, by advertisement withdrawal, and by error all leave the
//!   adapter non-discoverable.
//! - **Closed**: dropping the profile handle withdraws the advertisement and
//!   closes the listening endpoint; running sessions observe their child
//!   cancellation tokens.
//!
//! Cancelling the [`CancellationToken`] passed at construction is the only
//! way to stop the loop from outside; the token is safe to cancel from any
//! task and unblocks a pending accept immediately.

use std::sync::Arc;

use anyhow::Context;
use btshell_core::{FramingPolicy, SERIAL_PORT_SERVICE_CLASS};
use bluer::rfcomm::{Profile, ProfileHandle, Role};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::application::session::Session;
use crate::infrastructure::bluetooth::discovery::DiscoveryController;
use crate::infrastructure::exec::CommandExecutor;

/// The btshell accept loop and the resources it owns.
pub struct Server {
    session: bluer::Session,
    discovery: DiscoveryController,
    executor: Arc<dyn CommandExecutor>,
    service_name: String,
    framing: FramingPolicy,
    cancel: CancellationToken,
}

impl Server {
    pub fn new(
        session: bluer::Session,
        discovery: DiscoveryController,
        executor: Arc<dyn CommandExecutor>,
        service_name: String,
        framing: FramingPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            session,
            discovery,
            executor,
            service_name,
            framing,
            cancel,
        }
    }

    /// Runs the server until shutdown is requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be registered or discoverable
    /// mode cannot be enabled (startup errors, fatal).  Per-connection
    /// failures are handled inside their sessions and never surface here.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut advertisement = self
            .session
            .register_profile(serial_port_profile(&self.service_name))
            .await
            .context("failed to register serial port profile")?;
        info!("serial port service '{}' registered", self.service_name);

        self.discovery.enable_page_inquiry_scan().await;
        self.discovery
            .set_discoverable(true)
            .await
            .context("failed to enable discoverable mode")?;

        let result = self.accept_loop(&mut advertisement).await;

        // Draining: discoverability ends up off regardless of how the accept
        // loop exited.
        if let Err(e) = self.discovery.set_discoverable(false).await {
            warn!("failed to disable discoverable mode during shutdown: {e}");
        }
        info!("server done");
        result
    }

    async fn accept_loop(&self, advertisement: &mut ProfileHandle) -> anyhow::Result<()> {
        loop {
            info!("waiting for connections");
            let request = tokio::select! {
                () = self.cancel.cancelled() => {
                    info!("stop waiting for connections (shutdown requested)");
                    return Ok(());
                }
                request = advertisement.next() => match request {
                    Some(request) => request,
                    None => {
                        info!("stop waiting for connections (advertisement withdrawn)");
                        return Ok(());
                    }
                },
            };

            let peer = request.device().to_string();
            match request.accept() {
                Ok(stream) => {
                    info!("connection from {peer}");
                    let session = Session::new(
                        stream,
                        peer,
                        Arc::clone(&self.executor),
                        self.framing,
                        self.cancel.child_token(),
                    );
                    tokio::spawn(session.run());
                }
                // A failed accept affects only that peer; keep accepting.
                Err(e) => warn!("failed to accept connection from {peer}: {e}"),
            }
        }
    }
}

/// The Serial Port Profile registration for this service.
///
/// The channel is left to BlueZ to auto-assign; peers find it through the
/// published SDP record, not by number.  Authentication and authorization
/// are explicitly waived — any paired peer may connect.
fn serial_port_profile(service_name: &str) -> Profile {
    Profile {
        uuid: SERIAL_PORT_SERVICE_CLASS,
        name: Some(service_name.to_string()),
        role: Some(Role::Server),
        require_authentication: Some(false),
        require_authorization: Some(false),
        ..Default::default()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
