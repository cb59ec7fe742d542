//! Device drivers
//!
//! Drivers are generic over the platform traits so they run unchanged
//! against hardware UARTs and the host mocks.

pub mod gnss;
pub mod rpm;
