//! Infrastructure layer: BlueZ adapter control, shell execution, and
//! on-disk persistence (configuration and device identity).

pub mod bluetooth;
pub mod exec;
pub mod storage;
