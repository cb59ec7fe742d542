//! Pulse-rate (RPM) capture
//!
//! A GPIO edge interrupt feeds [`PulseSource`]; the main loop samples it
//! through [`RpmSensor`] on a fixed cadence. The source is a single
//! producer, single consumer pair of atomics, so no critical section is
//! needed on either side.

use ::core::sync::atomic::{AtomicU32, Ordering};

/// Minimum spacing between accepted edges in microseconds
pub const DEBOUNCE_US: u32 = 2000;

/// Readings below this are treated as ignition noise and reported as zero
pub const NOISE_FLOOR_RPM: u32 = 300;

/// Selectable pulses-per-revolution calibrations
pub const PPR_TABLE: [f32; 5] = [1.0, 0.5, 2.0, 3.0, 4.0];

/// Sampling cadence of [`RpmSensor::sample`]
pub const SAMPLE_INTERVAL_MS: u32 = 100;

/// Edge counter shared between the pulse interrupt and the sampler
///
/// `on_edge` is the only writer of `last_edge_us` and the only incrementer
/// of `count`; `sample_and_reset` only swaps `count` back to zero. Relaxed
/// ordering is enough for that split.
pub struct PulseSource {
    count: AtomicU32,
    last_edge_us: AtomicU32,
}

impl PulseSource {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
            last_edge_us: AtomicU32::new(0),
        }
    }

    /// Record one edge; called from the pulse interrupt
    ///
    /// Edges closer than [`DEBOUNCE_US`] to the previous accepted edge are
    /// dropped. An edge exactly at the debounce spacing is accepted.
    pub fn on_edge(&self, now_us: u32) {
        let last = self.last_edge_us.load(Ordering::Relaxed);
        if now_us.wrapping_sub(last) < DEBOUNCE_US {
            return;
        }
        self.last_edge_us.store(now_us, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Take the accumulated edge count, leaving zero behind
    pub fn sample_and_reset(&self) -> u32 {
        self.count.swap(0, Ordering::Relaxed)
    }
}

impl Default for PulseSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Calibrated RPM sampler over a [`PulseSource`]
pub struct RpmSensor<'a> {
    source: &'a PulseSource,
    ppr_index: usize,
    enabled: bool,
    last_sample_ms: u32,
    rpm: u32,
}

impl<'a> RpmSensor<'a> {
    pub fn new(source: &'a PulseSource) -> Self {
        Self {
            source,
            ppr_index: 0,
            enabled: false,
            last_sample_ms: 0,
            rpm: 0,
        }
    }

    /// Select a pulses-per-revolution calibration by table index
    pub fn set_ppr_index(&mut self, index: usize) {
        self.ppr_index = index.min(PPR_TABLE.len() - 1);
    }

    pub fn ppr(&self) -> f32 {
        PPR_TABLE[self.ppr_index]
    }

    /// Enable or disable capture; disabling zeroes the reading and drains
    /// any pulses counted in the meantime
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.rpm = 0;
            self.source.sample_and_reset();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Latest reading in RPM, zero when disabled or below the noise floor
    pub fn rpm(&self) -> u32 {
        self.rpm
    }

    /// Recompute the reading if a full sample interval has elapsed
    pub fn sample(&mut self, now_ms: u32) -> u32 {
        if !self.enabled {
            return 0;
        }
        let elapsed = now_ms.wrapping_sub(self.last_sample_ms);
        if elapsed < SAMPLE_INTERVAL_MS {
            return self.rpm;
        }
        self.last_sample_ms = now_ms;

        let pulses = self.source.sample_and_reset();
        let raw = (pulses as f32 * 60_000.0) / (elapsed as f32 * self.ppr());
        let raw = raw as u32;
        self.rpm = if raw < NOISE_FLOOR_RPM { 0 } else { raw };
        self.rpm
    }
}
