//! Platform trait definitions
//!
//! Hardware interface traits implemented by each platform backend and by the
//! host-side mocks.

pub mod flash;
pub mod timer;
pub mod uart;

pub use flash::FlashInterface;
pub use timer::TimerInterface;
pub use uart::{UartConfig, UartInterface, UartParity, UartStopBits};
