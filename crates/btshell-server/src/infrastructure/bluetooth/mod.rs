//! Bluetooth adapter control for the btshell daemon.
//!
//! The adapter is driven through two narrow capability traits instead of raw
//! property access:
//!
//! - [`AdapterControl`] covers the managed adapter properties BlueZ exposes
//!   over D-Bus: power, alias, discoverable flag, discoverable timeout.
//! - [`RadioConfig`] covers the low-level scan/advertising modes that still
//!   go through `hciconfig`, because BlueZ does not expose classic inquiry
//!   scan and raw LE advertising toggles as adapter properties.
//!
//! [`discovery::DiscoveryController`] combines both into the operations the
//! accept loop actually needs.  Production implementations live in
//! [`bluez`]; call-recording test doubles live in [`mock`].
//!
//! # Ordering invariant
//!
//! `set_powered(true)` must complete before any alias or discoverable
//! operation; issuing those against a powered-off adapter is undefined on
//! real hardware.

use async_trait::async_trait;
use thiserror::Error;

pub mod bluez;
pub mod discovery;
pub mod mock;

/// Error type for adapter and radio operations.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A BlueZ D-Bus operation failed.
    #[error("bluetooth adapter operation failed: {0}")]
    Bluez(#[from] bluer::Error),
    /// The radio configuration subprocess could not be run.
    #[error("failed to run radio config command '{command}': {source}")]
    Radio {
        command: String,
        #[source]
        source: std::io::Error,
    },
    /// Injected failure from a test double.
    #[error("adapter failure injected by test: {0}")]
    Injected(&'static str),
}

/// Low-level radio modes applied around the connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioMode {
    /// Page + inquiry scan: the classic radio answers both connection
    /// attempts and discovery inquiries.
    PageInquiryScan,
    /// Start undirected LE advertising.
    AdvertiseOn,
    /// Stop LE advertising.
    AdvertiseOff,
}

impl RadioMode {
    /// The `hciconfig` argument string for this mode.
    pub fn token(&self) -> &'static str {
        match self {
            RadioMode::PageInquiryScan => "piscan",
            RadioMode::AdvertiseOn => "leadv 3",
            RadioMode::AdvertiseOff => "noleadv",
        }
    }
}

/// Managed adapter properties.
///
/// The production implementation is [`bluez::BluezAdapter`]; tests use
/// [`mock::MockAdapter`].
#[async_trait]
pub trait AdapterControl: Send + Sync {
    /// Sets the adapter power state.
    async fn set_powered(&self, on: bool) -> Result<(), AdapterError>;
    /// Sets the advertised adapter name.
    async fn set_alias(&self, alias: &str) -> Result<(), AdapterError>;
    /// Sets the discoverable flag.
    async fn set_discoverable(&self, on: bool) -> Result<(), AdapterError>;
    /// Sets the discoverable timeout in seconds; `0` means unlimited.
    async fn set_discoverable_timeout(&self, timeout_secs: u32) -> Result<(), AdapterError>;
}

/// Low-level radio mode application.
#[async_trait]
pub trait RadioConfig: Send + Sync {
    /// Applies `mode` to the local radio.
    async fn apply_mode(&self, mode: RadioMode) -> Result<(), AdapterError>;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
