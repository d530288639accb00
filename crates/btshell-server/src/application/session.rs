//! Per-connection session: read a command, execute it, stream the response.
//!
//! One session owns one accepted connection exclusively and runs as its own
//! Tokio task, so a slow or hung command stalls only its own peer.  The
//! session is a two-state machine:
//!
//! ```text
//! Active ──(zero-length read)──────────► Stopped
//!   │  ▲                                    ▲
//!   │  └─(response fully written)           │
//!   └────(transport error / shutdown)───────┘
//! ```
//!
//! While `Active`, each cycle reads one buffer's worth of bytes, treats the
//! decoded text as a single command, executes it, and writes every framed
//! message of the response before reading again — commands on one
//! connection are strictly serialized, with no pipelining.
//!
//! Transport errors never leave the session: they stop this connection and
//! are logged, nothing more.  The connection is closed exactly once, when
//! the session task drops the stream on exit.

use std::sync::Arc;

use btshell_core::FramingPolicy;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::infrastructure::exec::CommandExecutor;

/// Size of the request read buffer; one read is one command.
const READ_BUFFER_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Active,
    Stopped,
}

/// A single peer connection being served.
pub struct Session<S> {
    stream: S,
    peer: String,
    executor: Arc<dyn CommandExecutor>,
    framing: FramingPolicy,
    cancel: CancellationToken,
    state: SessionState,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(
        stream: S,
        peer: String,
        executor: Arc<dyn CommandExecutor>,
        framing: FramingPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            stream,
            peer,
            executor,
            framing,
            cancel,
            state: SessionState::Active,
        }
    }

    /// Runs the session to completion and logs the outcome.
    ///
    /// This is the entry point for the per-connection task spawned by the
    /// accept loop.  Errors are consumed here; they never propagate to the
    /// loop or to other sessions.
    pub async fn run(mut self) {
        match self.drive().await {
            Ok(()) => info!("connection from {} ended", self.peer),
            Err(e) => debug!("connection from {} ended with transport error: {e}", self.peer),
        }
        // Dropping `self.stream` here closes the connection, once, on every
        // exit path.
    }

    async fn drive(&mut self) -> std::io::Result<()> {
        let mut buf = [0u8; READ_BUFFER_SIZE];

        while self.state == SessionState::Active {
            let n = tokio::select! {
                read = self.stream.read(&mut buf) => read?,
                () = self.cancel.cancelled() => {
                    debug!("session with {} cancelled by shutdown", self.peer);
                    self.state = SessionState::Stopped;
                    break;
                }
            };

            // Zero-length read: the peer closed cleanly.  Stop without
            // treating the empty buffer as a command.
            if n == 0 {
                self.state = SessionState::Stopped;
                break;
            }

            let request = String::from_utf8_lossy(&buf[..n]);
            let command = request.trim_end_matches(['\r', '\n']).to_string();
            info!("received request '{command}'");

            let result = self.executor.execute(&command).await;
            for message in self.framing.frame(&command, &result) {
                self.send(&message).await?;
            }
            self.stream.flush().await?;
        }

        Ok(())
    }

    /// Writes one wire message, unless the session has been cancelled in the
    /// meantime — then the write is a silent no-op and the next loop cycle
    /// stops the session.
    async fn send(&mut self, message: &str) -> std::io::Result<()> {
        if self.cancel.is_cancelled() {
            return Ok(());
        }
        debug!("send message: {message}");
        self.stream.write_all(message.as_bytes()).await
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
