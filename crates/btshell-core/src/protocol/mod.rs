//! Wire protocol: service identity constants and response framing.
//!
//! Peers locate the service through the standard Serial Port Profile class
//! UUID rather than a custom identifier, so any SPP-capable terminal app can
//! connect without prior knowledge of btshell.

use uuid::{uuid, Uuid};

pub mod framing;

/// Service class advertised to peers: the Bluetooth SIG Serial Port class.
///
/// Peers browse for this UUID to find the command channel among whatever
/// other services the adapter exposes.
pub const SERIAL_PORT_SERVICE_CLASS: Uuid = uuid!("00001101-0000-1000-8000-00805F9B34FB");

/// Default human-readable service name attached to the advertisement.
pub const SERVICE_NAME: &str = "btshell";
