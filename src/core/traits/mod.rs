//! Core trait definitions

pub mod sync;

pub use sync::SharedState;

#[cfg(feature = "embassy")]
pub use sync::EmbassyState;

#[cfg(any(test, feature = "mock"))]
pub use sync::MockState;
