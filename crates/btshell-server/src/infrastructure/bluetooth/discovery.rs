//! DiscoveryController: discoverability and advertised identity of the
//! local adapter.
//!
//! The controller is the only component that touches adapter state after
//! startup.  The lifecycle calls [`DiscoveryController::power_on`] and
//! [`DiscoveryController::set_alias`] once; the accept loop then toggles
//! discoverability around its connection cycles.  Enabling discoverability
//! sets an unlimited timeout before raising the flag, so the device stays
//! visible until the server itself turns it off; every shutdown path must
//! end with `set_discoverable(false)`.
//!
//! Radio mode failures are logged and swallowed: `hciconfig` is best-effort
//! on hardware where classic scan or LE advertising is absent, and the
//! managed discoverable flag alone is enough for most peers to find us.

use std::sync::Arc;

use tracing::{info, warn};

use super::{AdapterControl, AdapterError, RadioConfig, RadioMode};

/// Wraps the adapter and radio capabilities into the operations the server
/// lifecycle needs.
pub struct DiscoveryController {
    adapter: Arc<dyn AdapterControl>,
    radio: Arc<dyn RadioConfig>,
}

impl DiscoveryController {
    pub fn new(adapter: Arc<dyn AdapterControl>, radio: Arc<dyn RadioConfig>) -> Self {
        Self { adapter, radio }
    }

    /// Ensures the adapter is powered.
    ///
    /// Must complete before any alias or discoverable operation.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] if the power property cannot be set.
    pub async fn power_on(&self) -> Result<(), AdapterError> {
        self.adapter.set_powered(true).await
    }

    /// Sets the advertised adapter name.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] if the alias property cannot be set.
    pub async fn set_alias(&self, alias: &str) -> Result<(), AdapterError> {
        self.adapter.set_alias(alias).await
    }

    /// Puts the classic radio into page + inquiry scan so peers can both
    /// discover and connect.  Best-effort.
    pub async fn enable_page_inquiry_scan(&self) {
        self.apply_radio(RadioMode::PageInquiryScan).await;
    }

    /// Toggles discoverability and LE advertising together.
    ///
    /// When enabling, the discoverable timeout is forced to unlimited first
    /// so the flag never silently expires while the server is accepting.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError`] if a managed adapter property cannot be set;
    /// radio command failures are logged but not returned.
    pub async fn set_discoverable(&self, discoverable: bool) -> Result<(), AdapterError> {
        if discoverable {
            self.adapter.set_discoverable_timeout(0).await?;
            self.adapter.set_discoverable(true).await?;
            self.apply_radio(RadioMode::AdvertiseOn).await;
            info!("discoverable enabled");
        } else {
            self.adapter.set_discoverable(false).await?;
            self.apply_radio(RadioMode::AdvertiseOff).await;
            info!("discoverable disabled");
        }
        Ok(())
    }

    async fn apply_radio(&self, mode: RadioMode) {
        if let Err(e) = self.radio.apply_mode(mode).await {
            warn!("failed to apply radio mode '{}': {e}", mode.token());
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
