//! Response framing: turning one execution result into ordered wire messages.
//!
//! The transport is a plain byte stream, so the only structure a peer sees is
//! the sequence of messages the server chooses to write.  Framing is a pure
//! function from `(command, result)` to an ordered list of messages; the
//! session layer writes them verbatim, one `write` per message.
//!
//! Two policies exist in the field:
//!
//! - [`FramingPolicy::Bracketed`] wraps every response in `::start::` and
//!   `::end::` markers.  Terminal-style peers use the markers to know when a
//!   response is complete, since the text itself carries no length prefix.
//! - [`FramingPolicy::Unbracketed`] writes the payload messages only.
//!
//! Under both policies each output line becomes exactly one message with a
//! single trailing space appended, empty output becomes exactly one notice
//! message, and a failed execution becomes exactly one error message.

use serde::{Deserialize, Serialize};

/// Marker written before a response under [`FramingPolicy::Bracketed`].
pub const START_MARKER: &str = "::start::";

/// Marker written after a response under [`FramingPolicy::Bracketed`].
pub const END_MARKER: &str = "::end::";

/// Terminal outcome of executing one command.
///
/// Every received command produces exactly one of these; the executor never
/// drops a command silently.  `Failed` deliberately carries no detail: all
/// execution failures collapse into one generic peer-visible notice, and the
/// underlying error stays in the server log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// Non-empty captured output, trailing whitespace already trimmed.
    Output(String),
    /// The command ran successfully but produced no output.
    Empty,
    /// The command could not be run or exited unsuccessfully.
    Failed,
}

/// Which message-boundary policy the server writes responses with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FramingPolicy {
    /// `::start::`, payload messages, `::end::` — markers are written for
    /// success, empty output, and failure alike.
    #[default]
    Bracketed,
    /// Payload messages only, no markers.
    Unbracketed,
}

impl FramingPolicy {
    /// Renders `result` as the ordered list of wire messages for `command`.
    ///
    /// Output lines are split on `\n` boundaries; each segment becomes one
    /// message suffixed with a single space.
    pub fn frame(&self, command: &str, result: &ExecutionResult) -> Vec<String> {
        let mut messages = Vec::new();
        if *self == FramingPolicy::Bracketed {
            messages.push(START_MARKER.to_string());
        }
        match result {
            ExecutionResult::Output(text) => {
                for line in text.lines() {
                    messages.push(format!("{line} "));
                }
            }
            ExecutionResult::Empty => messages.push(empty_output_notice(command)),
            ExecutionResult::Failed => messages.push(execution_failure_notice(command)),
        }
        if *self == FramingPolicy::Bracketed {
            messages.push(END_MARKER.to_string());
        }
        messages
    }
}

/// Peer-visible notice for a command that succeeded with no output.
pub fn empty_output_notice(command: &str) -> String {
    format!("the command '{command}' returns nothing ")
}

/// Peer-visible notice for a command that failed to run.
pub fn execution_failure_notice(command: &str) -> String {
    format!("Error when trying to run the command '{command}' ")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
