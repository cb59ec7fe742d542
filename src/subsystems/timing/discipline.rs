//! Drag-run disciplines
//!
//! A run is armed at standstill and evaluated against a set of disciplines:
//! reach a target speed, or cover a target distance. Each discipline latches
//! its elapsed time, terminal speed, peak speed and the track slope at the
//! moment it completes.

use crate::devices::gnss::Position;
use heapless::Vec;

use super::geo::distance_m;

/// Maximum disciplines evaluated per run
pub const MAX_DISCIPLINES: usize = 8;

/// Minimum covered distance before a slope figure is meaningful
pub const SLOPE_MIN_DISTANCE_M: f64 = 50.0;

/// Downhill grades steeper than this invalidate the result
pub const SLOPE_INVALID_BELOW_PCT: f32 = -1.0;

/// What a discipline measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisciplineKind {
    /// Target is a speed in km/h
    Speed,
    /// Target is a distance in meters
    Distance,
}

/// One timed target within a run
#[derive(Debug, Clone, Copy)]
pub struct Discipline {
    pub name: &'static str,
    pub kind: DisciplineKind,
    pub target: f32,
    pub result_time_ms: u32,
    pub end_speed_kmh: f32,
    pub peak_speed_kmh: f32,
    pub slope_pct: f32,
    pub slope_valid: bool,
    pub completed: bool,
}

impl Discipline {
    pub const fn new(name: &'static str, kind: DisciplineKind, target: f32) -> Self {
        Self {
            name,
            kind,
            target,
            result_time_ms: 0,
            end_speed_kmh: 0.0,
            peak_speed_kmh: 0.0,
            slope_pct: 0.0,
            slope_valid: false,
            completed: false,
        }
    }
}

/// Stock speed disciplines in km/h
///
/// 100-200 is timed from the run start like the others; its name reflects
/// the sticker figure, not a rolling start.
pub fn speed_disciplines() -> Vec<Discipline, MAX_DISCIPLINES> {
    let mut set = Vec::new();
    let _ = set.push(Discipline::new("0-60", DisciplineKind::Speed, 60.0));
    let _ = set.push(Discipline::new("0-100", DisciplineKind::Speed, 100.0));
    let _ = set.push(Discipline::new("100-200", DisciplineKind::Speed, 200.0));
    let _ = set.push(Discipline::new("0-200", DisciplineKind::Speed, 200.0));
    set
}

/// Stock distance disciplines in meters
pub fn distance_disciplines() -> Vec<Discipline, MAX_DISCIPLINES> {
    let mut set = Vec::new();
    let _ = set.push(Discipline::new("60ft", DisciplineKind::Distance, 18.288));
    let _ = set.push(Discipline::new("100m", DisciplineKind::Distance, 100.0));
    let _ = set.push(Discipline::new("200m", DisciplineKind::Distance, 200.0));
    let _ = set.push(Discipline::new("400m", DisciplineKind::Distance, 400.0));
    set
}

/// An in-progress drag run
pub struct DragRun {
    start_time_ms: u32,
    start_alt_m: f32,
    start: Position,
    run_distance_m: f64,
    peak_speed_kmh: f32,
    slope_pct: f32,
    slope_valid: bool,
    disciplines: Vec<Discipline, MAX_DISCIPLINES>,
}

impl DragRun {
    /// Arm a run at the current position, altitude and time
    pub fn new(
        start: Position,
        start_alt_m: f32,
        start_time_ms: u32,
        disciplines: Vec<Discipline, MAX_DISCIPLINES>,
    ) -> Self {
        Self {
            start_time_ms,
            start_alt_m,
            start,
            run_distance_m: 0.0,
            peak_speed_kmh: 0.0,
            slope_pct: 0.0,
            slope_valid: false,
            disciplines,
        }
    }

    /// Feed one fused sample into the run
    ///
    /// Run distance is the straight-line distance from the launch point,
    /// which matches a drag strip and is immune to fix jitter piling up.
    pub fn update(&mut self, position: Position, altitude_m: f32, speed_kmh: f32, now_ms: u32) {
        self.run_distance_m = distance_m(self.start, position);

        if speed_kmh > self.peak_speed_kmh {
            self.peak_speed_kmh = speed_kmh;
        }

        // Grade over the whole run so far
        if self.run_distance_m > SLOPE_MIN_DISTANCE_M {
            let rise = altitude_m - self.start_alt_m;
            self.slope_pct = rise / self.run_distance_m as f32 * 100.0;
            self.slope_valid = self.slope_pct >= SLOPE_INVALID_BELOW_PCT;
        }

        let elapsed_ms = now_ms.wrapping_sub(self.start_time_ms);
        for discipline in self.disciplines.iter_mut() {
            if discipline.completed {
                continue;
            }
            let reached = match discipline.kind {
                DisciplineKind::Speed => speed_kmh >= discipline.target,
                DisciplineKind::Distance => self.run_distance_m >= discipline.target as f64,
            };
            if reached {
                discipline.completed = true;
                discipline.result_time_ms = elapsed_ms;
                discipline.end_speed_kmh = speed_kmh;
                discipline.peak_speed_kmh = self.peak_speed_kmh;
                discipline.slope_pct = self.slope_pct;
                discipline.slope_valid = self.slope_valid;
            }
        }
    }

    pub fn disciplines(&self) -> &[Discipline] {
        &self.disciplines
    }

    pub fn all_complete(&self) -> bool {
        self.disciplines.iter().all(|d| d.completed)
    }

    pub fn run_distance_m(&self) -> f64 {
        self.run_distance_m
    }

    pub fn peak_speed_kmh(&self) -> f32 {
        self.peak_speed_kmh
    }

    pub fn slope_pct(&self) -> f32 {
        self.slope_pct
    }

    pub fn slope_valid(&self) -> bool {
        self.slope_valid
    }
}
