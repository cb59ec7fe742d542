//! Lap and drag timing
//!
//! Geofence crossing detection for lap timing and threshold-based drag
//! disciplines, both fed from the fused position stream.

pub mod discipline;
pub mod geo;
pub mod geofence;

pub use discipline::{
    distance_disciplines, speed_disciplines, Discipline, DisciplineKind, DragRun,
};
pub use geofence::{CrossingEvent, Geofence};
