//! Geofence crossing detection
//!
//! A circular gate with hysteresis: entry fires inside the entry radius,
//! and the gate re-arms only after the position has moved beyond the larger
//! exit radius. A minimum retrigger interval suppresses double fires from
//! position jitter near the line.

use crate::devices::gnss::Position;
use crate::log_info;

use super::geo::distance_m;

/// Radius inside which a crossing fires
pub const ENTRY_RADIUS_M: f64 = 20.0;

/// Radius beyond which the gate re-arms
pub const EXIT_RADIUS_M: f64 = 25.0;

/// Minimum spacing between crossings of the same gate
pub const MIN_RETRIGGER_MS: u32 = 10_000;

/// A crossing of a gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CrossingEvent {
    pub timestamp_ms: u32,
    pub geofence_id: u8,
}

/// Circular timing gate with hysteresis and retrigger debounce
pub struct Geofence {
    id: u8,
    center: Position,
    entry_radius_m: f64,
    exit_radius_m: f64,
    min_retrigger_ms: u32,
    inside: bool,
    last_trigger_ms: Option<u32>,
}

impl Geofence {
    pub fn new(id: u8, center: Position) -> Self {
        Self {
            id,
            center,
            entry_radius_m: ENTRY_RADIUS_M,
            exit_radius_m: EXIT_RADIUS_M,
            min_retrigger_ms: MIN_RETRIGGER_MS,
            inside: false,
            last_trigger_ms: None,
        }
    }

    /// Gate with custom radii; `exit` must exceed `entry` for hysteresis
    pub fn with_radii(id: u8, center: Position, entry: f64, exit: f64) -> Self {
        Self {
            entry_radius_m: entry,
            exit_radius_m: exit,
            ..Self::new(id, center)
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn center(&self) -> Position {
        self.center
    }

    /// Move the gate and disarm any in-progress crossing
    pub fn relocate(&mut self, center: Position) {
        self.center = center;
        self.inside = false;
        self.last_trigger_ms = None;
    }

    /// Feed a position sample; returns the crossing if one fired
    pub fn update(&mut self, position: Position, now_ms: u32) -> Option<CrossingEvent> {
        let distance = distance_m(position, self.center);

        if self.inside {
            if distance > self.exit_radius_m {
                self.inside = false;
            }
            return None;
        }

        if distance >= self.entry_radius_m {
            return None;
        }

        // First crossing ever is always allowed
        if let Some(last) = self.last_trigger_ms {
            if now_ms.wrapping_sub(last) < self.min_retrigger_ms {
                self.inside = true;
                return None;
            }
        }

        self.inside = true;
        self.last_trigger_ms = Some(now_ms);
        log_info!("gate {} crossed at {} ms", self.id, now_ms);
        Some(CrossingEvent {
            timestamp_ms: now_ms,
            geofence_id: self.id,
        })
    }
}
