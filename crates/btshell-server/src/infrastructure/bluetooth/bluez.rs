//! Production adapter implementations: BlueZ D-Bus properties and
//! `hciconfig` subprocess calls.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{AdapterControl, AdapterError, RadioConfig, RadioMode};

/// [`AdapterControl`] backed by a BlueZ adapter over D-Bus.
pub struct BluezAdapter {
    inner: bluer::Adapter,
}

impl BluezAdapter {
    pub fn new(inner: bluer::Adapter) -> Self {
        Self { inner }
    }

    /// The kernel device name of the wrapped adapter, e.g. `hci0`.
    pub fn device_name(&self) -> &str {
        self.inner.name()
    }
}

#[async_trait]
impl AdapterControl for BluezAdapter {
    async fn set_powered(&self, on: bool) -> Result<(), AdapterError> {
        self.inner.set_powered(on).await?;
        Ok(())
    }

    async fn set_alias(&self, alias: &str) -> Result<(), AdapterError> {
        self.inner.set_alias(alias.to_string()).await?;
        Ok(())
    }

    async fn set_discoverable(&self, on: bool) -> Result<(), AdapterError> {
        self.inner.set_discoverable(on).await?;
        Ok(())
    }

    async fn set_discoverable_timeout(&self, timeout_secs: u32) -> Result<(), AdapterError> {
        self.inner.set_discoverable_timeout(timeout_secs).await?;
        Ok(())
    }
}

/// [`RadioConfig`] that shells out to `hciconfig` for the scan and
/// advertising modes BlueZ does not manage as properties.
pub struct HciRadioConfig {
    device: String,
}

impl HciRadioConfig {
    /// Creates a radio config for the given kernel device, e.g. `hci0`.
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }
}

#[async_trait]
impl RadioConfig for HciRadioConfig {
    async fn apply_mode(&self, mode: RadioMode) -> Result<(), AdapterError> {
        let status = Command::new("hciconfig")
            .arg(&self.device)
            .args(mode.token().split_whitespace())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .await
            .map_err(|source| AdapterError::Radio {
                command: format!("hciconfig {} {}", self.device, mode.token()),
                source,
            })?;
        debug!(
            "hciconfig {} {} exited with {status}",
            self.device,
            mode.token()
        );
        Ok(())
    }
}
