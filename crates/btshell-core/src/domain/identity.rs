//! Stable device identity used to build the advertised Bluetooth alias.
//!
//! Several hosts on the same site often share a hostname image, so the alias
//! a peer sees is `<hostname>-<suffix>` where the suffix is a random 4-digit
//! token generated once per device and persisted by the server's identity
//! store.  The suffix never changes across restarts once written.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// Number of digits in the identity suffix.
pub const SUFFIX_LEN: usize = 4;

/// Error type for identity parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The stored value is not exactly four ASCII digits.
    #[error("device identity suffix must be {SUFFIX_LEN} ASCII digits, got {0:?}")]
    InvalidSuffix(String),
}

/// A validated 4-digit device-identity suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    suffix: String,
}

impl DeviceIdentity {
    /// Parses a stored suffix, tolerating surrounding whitespace from the
    /// identity file.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidSuffix`] unless the trimmed value is
    /// exactly four ASCII digits.
    pub fn parse(raw: &str) -> Result<Self, IdentityError> {
        let trimmed = raw.trim();
        if trimmed.len() == SUFFIX_LEN && trimmed.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self {
                suffix: trimmed.to_string(),
            })
        } else {
            Err(IdentityError::InvalidSuffix(raw.to_string()))
        }
    }

    /// Generates a fresh suffix: four *distinct* digits in random order.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let digits: [u8; 10] = *b"0123456789";
        let suffix = digits
            .choose_multiple(rng, SUFFIX_LEN)
            .map(|&d| d as char)
            .collect();
        Self { suffix }
    }

    /// The bare 4-digit suffix, as persisted on disk.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The advertised adapter alias for this device: `<hostname>-<suffix>`.
    pub fn alias_for(&self, hostname: &str) -> String {
        format!("{hostname}-{}", self.suffix)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
