//! TOML-based configuration for the btshell daemon.
//!
//! The daemon reads `/etc/btshell/config.toml` at startup.  Every field has
//! a default, and a missing file is not an error, so a stock install needs
//! no configuration at all: the defaults reproduce the daemon's canonical
//! behavior (bracketed framing, `/bin/sh`, identity under `/etc/btshell`).
//!
//! Fields annotated with `#[serde(default = "…")]` fall back to their
//! default when absent from the file, so partial configs and configs written
//! for older versions keep working.

use std::path::{Path, PathBuf};

use btshell_core::FramingPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Path the daemon loads its configuration from.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/btshell/config.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub bluetooth: BluetoothConfig,
}

/// Behavior of the command service itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    /// Overridden by `RUST_LOG` when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Human-readable name attached to the service advertisement.
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Response framing policy on the wire.
    #[serde(default)]
    pub framing: FramingPolicy,
    /// Shell binary commands are run through (`<shell> -c <command>`).
    #[serde(default = "default_shell")]
    pub shell: PathBuf,
}

/// Adapter-adjacent settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BluetoothConfig {
    /// File the 4-digit device-identity suffix is persisted in.
    #[serde(default = "default_identity_file")]
    pub identity_file: PathBuf,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_service_name() -> String {
    btshell_core::SERVICE_NAME.to_string()
}
fn default_shell() -> PathBuf {
    PathBuf::from("/bin/sh")
}
fn default_identity_file() -> PathBuf {
    PathBuf::from("/etc/btshell/device-id")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            service_name: default_service_name(),
            framing: FramingPolicy::default(),
            shell: default_shell(),
        }
    }
}

impl Default for BluetoothConfig {
    fn default() -> Self {
        Self {
            identity_file: default_identity_file(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration from [`DEFAULT_CONFIG_PATH`], returning
    /// defaults when no file exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for file-system errors other than
    /// "not found" and [`ConfigError::Parse`] if the TOML is malformed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Loads the configuration from an explicit path.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config: AppConfig = toml::from_str(&content)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
            Err(e) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
