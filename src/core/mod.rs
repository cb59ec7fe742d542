//! Core systems
//!
//! Logging macros, shared-state abstraction, and the persistent parameter
//! registry.

pub mod logging;
pub mod parameters;
pub mod traits;
