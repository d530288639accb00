//! Host shell executor.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use btshell_core::ExecutionResult;
use tokio::process::Command;
use tracing::debug;

use super::CommandExecutor;

/// Executes commands through the host shell (`<shell> -c <command>`).
///
/// Standard output is captured; standard error is inherited and lands in the
/// daemon's own stderr alongside the logs.
pub struct HostShell {
    shell: PathBuf,
}

impl HostShell {
    /// Creates an executor using the given shell binary, e.g. `/bin/sh`.
    pub fn new(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

#[async_trait]
impl CommandExecutor for HostShell {
    async fn execute(&self, command: &str) -> ExecutionResult {
        let output = match Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                debug!("failed to spawn shell for '{command}': {e}");
                return ExecutionResult::Failed;
            }
        };

        if !output.status.success() {
            debug!("command '{command}' exited with {}", output.status);
            return ExecutionResult::Failed;
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let trimmed = text.trim_end();
        if trimmed.is_empty() {
            ExecutionResult::Empty
        } else {
            ExecutionResult::Output(trimmed.to_string())
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
