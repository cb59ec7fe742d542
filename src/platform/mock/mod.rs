//! Mock platform implementations for host-side testing
//!
//! These mocks run on the host with simulated time and in-memory buffers, so
//! the whole timing core can be exercised without hardware.

pub mod flash;
pub mod timer;
pub mod uart;

pub use flash::MockFlash;
pub use timer::MockTimer;
pub use uart::MockUart;
