//! Integration tests for the per-connection session protocol.
//!
//! # Purpose
//!
//! These tests exercise the session the way the accept loop uses it: an
//! owned duplex byte stream, a shared executor, a framing policy, and a
//! cancellation token.  The transport is an in-memory `tokio::io::duplex`
//! pair, so no Bluetooth hardware is involved; everything above the socket
//! is the production code path, including the real `/bin/sh` executor in
//! the end-to-end scenarios.
//!
//! They verify:
//!
//! - The wire scenarios: `echo hello` produces `::start::hello ::end::`,
//!   a failing command produces exactly one error notice, a silent command
//!   produces exactly one no-output notice.
//! - Lifecycle edges: a peer that disconnects without sending anything
//!   triggers no execution at all.
//! - Concurrency isolation: a command blocked indefinitely on one
//!   connection does not delay command execution on another.
//! - Shutdown: cancelling the shared token stops every session, twice is
//!   as good as once, and the drain sequence leaves the adapter
//!   non-discoverable.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::Notify;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use btshell_core::{ExecutionResult, FramingPolicy};
use btshell_server::application::session::Session;
use btshell_server::infrastructure::bluetooth::discovery::DiscoveryController;
use btshell_server::infrastructure::bluetooth::mock::{CallLog, MockAdapter, MockRadio};
use btshell_server::infrastructure::exec::shell::HostShell;
use btshell_server::infrastructure::exec::CommandExecutor;

const TEST_TIMEOUT: Duration = Duration::from_secs(10);

// ── Test executors ────────────────────────────────────────────────────────────

/// Counts invocations and echoes back the command it was given.
struct CountingExecutor {
    calls: AtomicUsize,
}

impl CountingExecutor {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CommandExecutor for CountingExecutor {
    async fn execute(&self, command: &str) -> ExecutionResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ExecutionResult::Output(format!("ran {command}"))
    }
}

/// Blocks forever on the command `block`; answers instantly otherwise.
struct BlockingExecutor {
    blocked: Notify,
    release: Notify,
}

impl BlockingExecutor {
    fn new() -> Self {
        Self {
            blocked: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl CommandExecutor for BlockingExecutor {
    async fn execute(&self, command: &str) -> ExecutionResult {
        if command == "block" {
            self.blocked.notify_one();
            self.release.notified().await;
            ExecutionResult::Empty
        } else {
            ExecutionResult::Output(format!("ran {command}"))
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn spawn_session(
    server_end: DuplexStream,
    executor: Arc<dyn CommandExecutor>,
    framing: FramingPolicy,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let session = Session::new(
        server_end,
        "AA:BB:CC:DD:EE:FF".to_string(),
        executor,
        framing,
        cancel,
    );
    tokio::spawn(session.run())
}

/// Reads exactly `expected.len()` bytes and asserts they match `expected`.
async fn expect_response(client: &mut DuplexStream, expected: &str) {
    let mut buf = vec![0u8; expected.len()];
    timeout(TEST_TIMEOUT, client.read_exact(&mut buf))
        .await
        .expect("response within timeout")
        .expect("read response");
    assert_eq!(String::from_utf8(buf).expect("utf8"), expected);
}

// ── Wire scenarios against the real shell ─────────────────────────────────────

/// Sends `echo hello` through the real `/bin/sh` and expects the bracketed
/// response: start marker, the line with its trailing space, end marker.
#[tokio::test]
async fn test_echo_command_streams_bracketed_response() {
    let (mut client, server_end) = duplex(4096);
    let handle = spawn_session(
        server_end,
        Arc::new(HostShell::new("/bin/sh")),
        FramingPolicy::Bracketed,
        CancellationToken::new(),
    );

    client.write_all(b"echo hello\n").await.expect("send");
    expect_response(&mut client, "::start::hello ::end::").await;

    drop(client);
    timeout(TEST_TIMEOUT, handle)
        .await
        .expect("session ends")
        .expect("session task");
}

/// Multi-line output arrives as one message per line, each with a trailing
/// space, between the markers.
#[tokio::test]
async fn test_multi_line_output_is_streamed_line_by_line() {
    let (mut client, server_end) = duplex(4096);
    let handle = spawn_session(
        server_end,
        Arc::new(HostShell::new("/bin/sh")),
        FramingPolicy::Bracketed,
        CancellationToken::new(),
    );

    client.write_all(b"printf 'a\\nb\\n'\n").await.expect("send");
    expect_response(&mut client, "::start::a b ::end::").await;

    drop(client);
    timeout(TEST_TIMEOUT, handle)
        .await
        .expect("session ends")
        .expect("session task");
}

/// `false` exits non-zero with no output: the peer sees exactly one error
/// notice referencing the command text, and no output lines.
#[tokio::test]
async fn test_failing_command_yields_single_error_notice() {
    let (mut client, server_end) = duplex(4096);
    let handle = spawn_session(
        server_end,
        Arc::new(HostShell::new("/bin/sh")),
        FramingPolicy::Bracketed,
        CancellationToken::new(),
    );

    client.write_all(b"false\n").await.expect("send");
    expect_response(
        &mut client,
        "::start::Error when trying to run the command 'false' ::end::",
    )
    .await;

    drop(client);
    timeout(TEST_TIMEOUT, handle)
        .await
        .expect("session ends")
        .expect("session task");
}

/// `true` succeeds silently: the peer sees exactly one no-output notice.
#[tokio::test]
async fn test_silent_command_yields_no_output_notice() {
    let (mut client, server_end) = duplex(4096);
    let handle = spawn_session(
        server_end,
        Arc::new(HostShell::new("/bin/sh")),
        FramingPolicy::Bracketed,
        CancellationToken::new(),
    );

    client.write_all(b"true\n").await.expect("send");
    expect_response(
        &mut client,
        "::start::the command 'true' returns nothing ::end::",
    )
    .await;

    drop(client);
    timeout(TEST_TIMEOUT, handle)
        .await
        .expect("session ends")
        .expect("session task");
}

// ── Lifecycle edges ───────────────────────────────────────────────────────────

/// A peer that connects and immediately disconnects must not trigger any
/// command execution: the zero-length read stops the session first.
#[tokio::test]
async fn test_disconnect_without_command_executes_nothing() {
    let (client, server_end) = duplex(4096);
    let executor = Arc::new(CountingExecutor::new());
    let handle = spawn_session(
        server_end,
        Arc::clone(&executor) as Arc<dyn CommandExecutor>,
        FramingPolicy::Bracketed,
        CancellationToken::new(),
    );

    drop(client);
    timeout(TEST_TIMEOUT, handle)
        .await
        .expect("session ends")
        .expect("session task");

    assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
}

// ── Concurrency isolation ─────────────────────────────────────────────────────

/// A command that blocks indefinitely on one connection must not delay
/// command execution on a second, concurrently served connection.
#[tokio::test]
async fn test_blocked_command_does_not_stall_other_connections() {
    let executor = Arc::new(BlockingExecutor::new());
    let cancel = CancellationToken::new();

    let (mut client_a, server_a) = duplex(4096);
    let (mut client_b, server_b) = duplex(4096);
    let handle_a = spawn_session(
        server_a,
        Arc::clone(&executor) as Arc<dyn CommandExecutor>,
        FramingPolicy::Unbracketed,
        cancel.child_token(),
    );
    let handle_b = spawn_session(
        server_b,
        Arc::clone(&executor) as Arc<dyn CommandExecutor>,
        FramingPolicy::Unbracketed,
        cancel.child_token(),
    );

    // Wedge connection A in an in-flight command.
    client_a.write_all(b"block\n").await.expect("send block");
    timeout(TEST_TIMEOUT, executor.blocked.notified())
        .await
        .expect("executor reaches the blocking command");

    // Connection B must make full progress while A is wedged.
    client_b.write_all(b"status\n").await.expect("send status");
    expect_response(&mut client_b, "ran status ").await;

    // Unblock A and let both sessions wind down.
    executor.release.notify_one();
    expect_response(&mut client_a, "the command 'block' returns nothing ").await;

    drop(client_a);
    drop(client_b);
    timeout(TEST_TIMEOUT, handle_a)
        .await
        .expect("session A ends")
        .expect("session A task");
    timeout(TEST_TIMEOUT, handle_b)
        .await
        .expect("session B ends")
        .expect("session B task");
}

// ── Shutdown ──────────────────────────────────────────────────────────────────

/// Cancelling the shared token stops every idle session; a second cancel is
/// a no-op.
#[tokio::test]
async fn test_cancelling_the_token_stops_all_sessions() {
    let executor = Arc::new(CountingExecutor::new());
    let cancel = CancellationToken::new();

    let (_client_a, server_a) = duplex(4096);
    let (_client_b, server_b) = duplex(4096);
    let handle_a = spawn_session(
        server_a,
        Arc::clone(&executor) as Arc<dyn CommandExecutor>,
        FramingPolicy::Bracketed,
        cancel.child_token(),
    );
    let handle_b = spawn_session(
        server_b,
        Arc::clone(&executor) as Arc<dyn CommandExecutor>,
        FramingPolicy::Bracketed,
        cancel.child_token(),
    );

    cancel.cancel();
    cancel.cancel(); // idempotent

    timeout(TEST_TIMEOUT, handle_a)
        .await
        .expect("session A ends")
        .expect("session A task");
    timeout(TEST_TIMEOUT, handle_b)
        .await
        .expect("session B ends")
        .expect("session B task");
    assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
}

/// The drain sequence the accept loop runs on every exit path leaves the
/// adapter non-discoverable, and running it twice has the same observable
/// effect as running it once.
#[tokio::test]
async fn test_drain_leaves_adapter_non_discoverable_and_is_idempotent() {
    let log = CallLog::default();
    let controller = DiscoveryController::new(
        Arc::new(MockAdapter::new(log.clone())),
        Arc::new(MockRadio::new(log.clone())),
    );

    // Server startup enables discoverability...
    controller.set_discoverable(true).await.expect("enable");
    assert_eq!(log.last_discoverable(), Some(true));

    // ...and the drain disables it, however many times it runs.
    controller.set_discoverable(false).await.expect("drain");
    controller.set_discoverable(false).await.expect("second drain");
    assert_eq!(log.last_discoverable(), Some(false));
}
