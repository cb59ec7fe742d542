//! Timer interface trait

use crate::platform::error::Result;

/// Monotonic time source with blocking delays
pub trait TimerInterface {
    /// Block for the given number of microseconds
    fn delay_us(&mut self, us: u32) -> Result<()>;

    /// Block for the given number of milliseconds
    fn delay_ms(&mut self, ms: u32) -> Result<()> {
        self.delay_us(ms.saturating_mul(1000))
    }

    /// Microseconds since boot
    fn now_us(&self) -> u64;

    /// Milliseconds since boot
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}
