#![cfg_attr(not(test), no_std)]

//! apexbox - telemetry and timing core for a GPS lap/drag timing computer
//!
//! This library provides the GNSS link manager (UBX configuration + NMEA
//! decode), redundant wall clock, position/motion fusion, pulse-rate (RPM)
//! capture, and the geofence/threshold crossing engine used for lap and
//! drag-run timing. Display, touch, WiFi and SD logging live outside this
//! crate and consume its read accessors and snapshot types.

#[cfg(feature = "mock")]
extern crate std;

// Platform abstraction layer (UART, timer, Flash traits + mocks)
pub mod platform;

// Device drivers using platform abstraction
pub mod devices;

// Core systems (logging, shared-state traits, parameter storage)
pub mod core;

// Subsystems (telemetry fusion, lap/drag timing)
pub mod subsystems;
