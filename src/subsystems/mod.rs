//! Subsystems
//!
//! Higher-level logic built on the device drivers: telemetry fusion and the
//! lap/drag timing engines.

pub mod telemetry;
pub mod timing;
