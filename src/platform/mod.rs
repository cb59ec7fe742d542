//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the peripherals the timing
//! core touches: the GNSS UART, a monotonic timer, and the Flash page used
//! for parameter persistence. All platform-specific code is isolated here.

pub mod error;
pub mod traits;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{FlashError, PlatformError, Result, TimerError, UartError};
pub use traits::{FlashInterface, TimerInterface, UartConfig, UartInterface};
