//! Command execution infrastructure.
//!
//! [`CommandExecutor`] is the seam between the per-connection session and
//! the host shell.  The trait is deliberately infallible at the type level:
//! every command yields an [`ExecutionResult`], and all failure detail is
//! collapsed into [`ExecutionResult::Failed`] so that peers only ever see
//! one generic error notice.  The underlying cause stays in the server log.
//!
//! # Security
//!
//! The production implementation runs whatever text a connected peer sends,
//! unvalidated, with the daemon's full privileges.  That is the service's
//! contract, not an oversight — there is no authentication or allow-listing
//! anywhere in this server.  Deploy accordingly.

use async_trait::async_trait;
use btshell_core::ExecutionResult;

pub mod shell;

/// Runs one command string and reports its terminal outcome.
///
/// The production implementation is [`shell::HostShell`]; session unit tests
/// use the generated `MockCommandExecutor`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Executes `command`, blocking (asynchronously) until it completes.
    ///
    /// There is no timeout and no cancellation: a hung command stalls its
    /// caller indefinitely.
    async fn execute(&self, command: &str) -> ExecutionResult;
}
