//! Call-recording adapter doubles for unit and integration testing.
//!
//! Both doubles share one [`CallLog`] so tests can assert on the relative
//! order of adapter property writes and radio mode changes.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{AdapterControl, AdapterError, RadioConfig, RadioMode};

/// One recorded capability invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterCall {
    Powered(bool),
    Alias(String),
    Discoverable(bool),
    DiscoverableTimeout(u32),
    Radio(RadioMode),
}

/// Shared, ordered record of capability calls.
#[derive(Debug, Default, Clone)]
pub struct CallLog(Arc<Mutex<Vec<AdapterCall>>>);

impl CallLog {
    pub fn record(&self, call: AdapterCall) {
        self.0.lock().expect("lock poisoned").push(call);
    }

    /// Snapshot of all calls recorded so far, in order.
    pub fn calls(&self) -> Vec<AdapterCall> {
        self.0.lock().expect("lock poisoned").clone()
    }

    /// `true` if the most recent discoverable write set the flag to `on`.
    pub fn last_discoverable(&self) -> Option<bool> {
        self.0
            .lock()
            .expect("lock poisoned")
            .iter()
            .rev()
            .find_map(|call| match call {
                AdapterCall::Discoverable(on) => Some(*on),
                _ => None,
            })
    }
}

/// An [`AdapterControl`] that records every call and always succeeds.
pub struct MockAdapter {
    log: CallLog,
}

impl MockAdapter {
    pub fn new(log: CallLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl AdapterControl for MockAdapter {
    async fn set_powered(&self, on: bool) -> Result<(), AdapterError> {
        self.log.record(AdapterCall::Powered(on));
        Ok(())
    }

    async fn set_alias(&self, alias: &str) -> Result<(), AdapterError> {
        self.log.record(AdapterCall::Alias(alias.to_string()));
        Ok(())
    }

    async fn set_discoverable(&self, on: bool) -> Result<(), AdapterError> {
        self.log.record(AdapterCall::Discoverable(on));
        Ok(())
    }

    async fn set_discoverable_timeout(&self, timeout_secs: u32) -> Result<(), AdapterError> {
        self.log.record(AdapterCall::DiscoverableTimeout(timeout_secs));
        Ok(())
    }
}

/// A [`RadioConfig`] that records every call; optionally fails each one.
pub struct MockRadio {
    log: CallLog,
    fail: bool,
}

impl MockRadio {
    pub fn new(log: CallLog) -> Self {
        Self { log, fail: false }
    }

    /// A radio whose every mode change fails, for error-path tests.
    pub fn failing(log: CallLog) -> Self {
        Self { log, fail: true }
    }
}

#[async_trait]
impl RadioConfig for MockRadio {
    async fn apply_mode(&self, mode: RadioMode) -> Result<(), AdapterError> {
        self.log.record(AdapterCall::Radio(mode));
        if self.fail {
            Err(AdapterError::Injected("radio mode change refused"))
        } else {
            Ok(())
        }
    }
}
