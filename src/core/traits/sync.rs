//! Shared state abstraction
//!
//! Snapshot publication crosses task boundaries on the embedded target, so
//! the shared cell is abstracted behind a trait with a critical-section
//! implementation for embassy tasks and a plain `RefCell` for host tests.

use ::core::cell::RefCell;

/// Shared mutable state accessed from multiple contexts
pub trait SharedState<T> {
    /// Run `f` with shared access to the value
    fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R;

    /// Run `f` with exclusive access to the value
    fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R;
}

/// Critical-section-backed shared state for embassy executors
#[cfg(feature = "embassy")]
pub struct EmbassyState<T> {
    inner: embassy_sync::blocking_mutex::Mutex<
        embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex,
        RefCell<T>,
    >,
}

#[cfg(feature = "embassy")]
impl<T> EmbassyState<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: embassy_sync::blocking_mutex::Mutex::new(RefCell::new(value)),
        }
    }
}

#[cfg(feature = "embassy")]
impl<T> SharedState<T> for EmbassyState<T> {
    fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Single-threaded shared state for host tests
#[cfg(any(test, feature = "mock"))]
pub struct MockState<T> {
    inner: RefCell<T>,
}

#[cfg(any(test, feature = "mock"))]
impl<T> MockState<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: RefCell::new(value),
        }
    }
}

#[cfg(any(test, feature = "mock"))]
impl<T> SharedState<T> for MockState<T> {
    fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow())
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_state_read_write() {
        let state = MockState::new(5u32);
        state.with_mut(|v| *v += 10);
        assert_eq!(state.with(|v| *v), 15);
    }
}
