//! Persistence of the stable device-identity suffix.
//!
//! The suffix is generated once, on first startup, and written to a small
//! file; every later startup reads the same value back, so the advertised
//! alias stays stable across restarts and re-pairs keep working.

use std::path::{Path, PathBuf};

use btshell_core::DeviceIdentity;
use thiserror::Error;
use tracing::{info, warn};

/// Error type for identity-file operations.
#[derive(Debug, Error)]
pub enum IdentityStoreError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing identity file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reads and writes the 4-digit suffix file.
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the persisted identity, generating and persisting a fresh one
    /// on first use.
    ///
    /// A present-but-invalid file (wrong length, non-digits) is replaced
    /// with a freshly generated suffix rather than crashing the daemon.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityStoreError::Io`] when the file cannot be read or a
    /// fresh identity cannot be written.
    pub fn read_or_create(&self) -> Result<DeviceIdentity, IdentityStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => match DeviceIdentity::parse(&content) {
                Ok(identity) => Ok(identity),
                Err(e) => {
                    warn!(
                        "stored device identity at {} is invalid ({e}), regenerating",
                        self.path.display()
                    );
                    self.generate_and_store()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => self.generate_and_store(),
            Err(source) => Err(IdentityStoreError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn generate_and_store(&self) -> Result<DeviceIdentity, IdentityStoreError> {
        let identity = DeviceIdentity::generate(&mut rand::thread_rng());

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| IdentityStoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, identity.suffix()).map_err(|source| IdentityStoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        info!(
            "generated device identity '{}' at {}",
            identity.suffix(),
            self.path.display()
        );
        Ok(identity)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
