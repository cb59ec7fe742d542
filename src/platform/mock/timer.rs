//! Mock timer implementation

use crate::platform::error::Result;
use crate::platform::traits::TimerInterface;

/// Mock timer with simulated time
///
/// Delays advance the simulated clock instantly, so tests that exercise
/// settle delays run at full speed. `advance_ms` lets tests move time
/// forward without going through a delay call.
pub struct MockTimer {
    current_us: u64,
}

impl MockTimer {
    pub fn new() -> Self {
        Self { current_us: 0 }
    }

    /// Move simulated time forward
    pub fn advance_ms(&mut self, ms: u64) {
        self.current_us += ms * 1000;
    }
}

impl Default for MockTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerInterface for MockTimer {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        self.current_us += us as u64;
        Ok(())
    }

    fn now_us(&self) -> u64 {
        self.current_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_advances_time() {
        let mut timer = MockTimer::new();
        assert_eq!(timer.now_us(), 0);
        timer.delay_ms(250).unwrap();
        assert_eq!(timer.now_ms(), 250);
        timer.delay_us(500).unwrap();
        assert_eq!(timer.now_us(), 250_500);
    }

    #[test]
    fn test_advance() {
        let mut timer = MockTimer::new();
        timer.advance_ms(1000);
        assert_eq!(timer.now_ms(), 1000);
    }
}
