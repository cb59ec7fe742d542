//! Position and motion fusion
//!
//! Trip odometer, smoothed speed estimate and fix-rate counter, all fed
//! from the merged GNSS fix once per poll.

use crate::devices::gnss::{Fix, Position};
use crate::subsystems::timing::geo::distance_m;

/// Steps shorter than this are jitter and do not count toward the trip
pub const TRIP_MIN_STEP_M: f64 = 2.0;

/// Steps longer than this are fix jumps and do not count toward the trip
pub const TRIP_MAX_STEP_M: f64 = 1000.0;

/// Trip odometer over the fused position stream
pub struct TripMeter {
    total_m: f64,
    last: Option<Position>,
}

impl TripMeter {
    pub const fn new() -> Self {
        Self {
            total_m: 0.0,
            last: None,
        }
    }

    /// Resume a persisted total
    pub fn restore(&mut self, total_m: f64) {
        self.total_m = total_m;
    }

    /// Accumulate the step since the previous position
    ///
    /// The reference position advances on every valid update, including
    /// filtered steps, so jitter cannot pile up into a counted move.
    pub fn update(&mut self, fix: &Fix) {
        if !fix.location.is_valid() || !fix.location.is_updated() {
            return;
        }
        let position = fix.location.value();
        if let Some(last) = self.last {
            let step = distance_m(last, position);
            if step > TRIP_MIN_STEP_M && step < TRIP_MAX_STEP_M {
                self.total_m += step;
            }
        }
        self.last = Some(position);
    }

    pub fn total_m(&self) -> f64 {
        self.total_m
    }

    pub fn total_km(&self) -> f64 {
        self.total_m / 1000.0
    }

    pub fn reset(&mut self) {
        self.total_m = 0.0;
    }
}

impl Default for TripMeter {
    fn default() -> Self {
        Self::new()
    }
}

/// Exponential smoothing weight on the previous estimate
const SPEED_BLEND_OLD: f32 = 0.4;
const SPEED_BLEND_NEW: f32 = 0.6;

/// Derived-speed step bounds in meters
const SPEED_MIN_STEP_M: f64 = 0.01;
const SPEED_MAX_STEP_M: f64 = 1000.0;

/// Speed estimate with position-derived fallback
///
/// When the receiver reports a speed it is taken verbatim. When only the
/// position updated, speed is derived from the step and blended into the
/// previous estimate to damp fix noise.
pub struct SpeedEstimator {
    smoothed_kmh: f32,
    last: Option<(Position, u32)>,
}

impl SpeedEstimator {
    pub const fn new() -> Self {
        Self {
            smoothed_kmh: 0.0,
            last: None,
        }
    }

    pub fn update(&mut self, fix: &Fix, now_ms: u32) -> f32 {
        if fix.speed_kmh.is_valid() && fix.speed_kmh.is_updated() {
            self.smoothed_kmh = fix.speed_kmh.value();
            if fix.location.is_valid() && fix.location.is_updated() {
                self.last = Some((fix.location.value(), now_ms));
            }
            return self.smoothed_kmh;
        }

        if !fix.location.is_valid() || !fix.location.is_updated() {
            return self.smoothed_kmh;
        }
        let position = fix.location.value();
        if let Some((last_pos, last_ms)) = self.last {
            let elapsed_ms = now_ms.wrapping_sub(last_ms);
            let step = distance_m(last_pos, position);
            if elapsed_ms > 0 && step > SPEED_MIN_STEP_M && step < SPEED_MAX_STEP_M {
                let derived = (step / (elapsed_ms as f64 / 1000.0) * 3.6) as f32;
                self.smoothed_kmh =
                    SPEED_BLEND_OLD * self.smoothed_kmh + SPEED_BLEND_NEW * derived;
            }
        }
        self.last = Some((position, now_ms));
        self.smoothed_kmh
    }

    pub fn speed_kmh(&self) -> f32 {
        self.smoothed_kmh
    }
}

impl Default for SpeedEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Window length of the fix-rate counter
const RATE_WINDOW_MS: u32 = 1000;

/// Position updates per second over a one-second window
pub struct RateCounter {
    updates: u32,
    hz: u32,
    window_start_ms: u32,
}

impl RateCounter {
    pub const fn new() -> Self {
        Self {
            updates: 0,
            hz: 0,
            window_start_ms: 0,
        }
    }

    pub fn count_update(&mut self) {
        self.updates += 1;
    }

    pub fn sample(&mut self, now_ms: u32) {
        if now_ms.wrapping_sub(self.window_start_ms) >= RATE_WINDOW_MS {
            self.hz = self.updates;
            self.updates = 0;
            self.window_start_ms = now_ms;
        }
    }

    pub fn hz(&self) -> u32 {
        self.hz
    }
}

impl Default for RateCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix_at(latitude: f64, longitude: f64) -> Fix {
        let mut fix = Fix::new();
        fix.location.set(Position::new(latitude, longitude));
        fix
    }

    /// Latitude offset that is `meters` north of 48.0
    fn north(meters: f64) -> f64 {
        48.0 + meters / 111_226.0
    }

    #[test]
    fn test_trip_counts_normal_steps() {
        let mut trip = TripMeter::new();
        trip.update(&fix_at(48.0, 11.0));
        trip.update(&fix_at(north(10.0), 11.0));
        assert!((trip.total_m() - 10.0).abs() < 0.1);
    }

    #[test]
    fn test_trip_filters_jitter() {
        let mut trip = TripMeter::new();
        trip.update(&fix_at(48.0, 11.0));
        trip.update(&fix_at(north(1.5), 11.0));
        assert_eq!(trip.total_m(), 0.0);
    }

    #[test]
    fn test_trip_filters_fix_jumps() {
        let mut trip = TripMeter::new();
        trip.update(&fix_at(48.0, 11.0));
        trip.update(&fix_at(north(5000.0), 11.0));
        assert_eq!(trip.total_m(), 0.0);
    }

    #[test]
    fn test_trip_reference_advances_on_filtered_steps() {
        let mut trip = TripMeter::new();
        trip.update(&fix_at(48.0, 11.0));
        // A fix jump moves the reference without counting
        trip.update(&fix_at(north(5000.0), 11.0));
        // The next normal step counts from the new reference
        trip.update(&fix_at(north(5010.0), 11.0));
        assert!((trip.total_m() - 10.0).abs() < 0.1);
    }

    #[test]
    fn test_trip_ignores_stale_fix() {
        let mut trip = TripMeter::new();
        trip.update(&fix_at(48.0, 11.0));
        let mut stale = fix_at(north(10.0), 11.0);
        stale.clear_updated();
        trip.update(&stale);
        assert_eq!(trip.total_m(), 0.0);
    }

    #[test]
    fn test_trip_restore() {
        let mut trip = TripMeter::new();
        trip.restore(1234.0);
        assert_eq!(trip.total_m(), 1234.0);
        assert!((trip.total_km() - 1.234).abs() < 1e-9);
    }

    #[test]
    fn test_reported_speed_taken_verbatim() {
        let mut speed = SpeedEstimator::new();
        let mut fix = Fix::new();
        fix.speed_kmh.set(42.0);
        assert_eq!(speed.update(&fix, 0), 42.0);
    }

    #[test]
    fn test_derived_speed_blends() {
        let mut speed = SpeedEstimator::new();

        // Seed the position reference with no prior estimate
        speed.update(&fix_at(48.0, 11.0), 0);
        // 10 m in 3600 ms = 10 km/h derived; blend from 0:
        // 0.4 * 0 + 0.6 * 10 = 6
        let estimate = speed.update(&fix_at(north(10.0), 11.0), 3_600);
        assert!((estimate - 6.0).abs() < 0.05, "got {}", estimate);

        // Same step again: 0.4 * 6 + 0.6 * 10 = 8.4
        let estimate = speed.update(&fix_at(north(20.0), 11.0), 7_200);
        assert!((estimate - 8.4).abs() < 0.05, "got {}", estimate);
    }

    #[test]
    fn test_derived_speed_skips_zero_elapsed() {
        let mut speed = SpeedEstimator::new();
        speed.update(&fix_at(48.0, 11.0), 1_000);
        let estimate = speed.update(&fix_at(north(10.0), 11.0), 1_000);
        assert_eq!(estimate, 0.0);
    }

    #[test]
    fn test_rate_counter_windows() {
        let mut rate = RateCounter::new();
        rate.sample(0);
        for _ in 0..5 {
            rate.count_update();
        }
        rate.sample(500);
        assert_eq!(rate.hz(), 0, "window not elapsed yet");
        rate.sample(1_000);
        assert_eq!(rate.hz(), 5);

        rate.sample(2_000);
        assert_eq!(rate.hz(), 0, "empty window resets the figure");
    }
}
