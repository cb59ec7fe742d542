//! Telemetry fusion
//!
//! [`TelemetryCore`] owns the GNSS driver, clock, motion estimators and RPM
//! sampler, runs them in a fixed order once per main-loop pass, and exposes
//! read accessors with display-safe fallbacks. Other tasks consume the
//! [`TelemetrySnapshot`] published through the shared cell.

pub mod clock;
pub mod motion;

pub use clock::{LocalTime, RedundantClock};
pub use motion::{RateCounter, SpeedEstimator, TripMeter};

use crate::devices::gnss::{GnssManager, WORST_HDOP};
use crate::devices::rpm::RpmSensor;
use crate::platform::error::Result;
use crate::platform::UartInterface;

/// Fused telemetry state for cross-task consumers
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetrySnapshot {
    pub fixed: bool,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f32,
    pub altitude_m: f32,
    pub heading_deg: f32,
    pub hdop: f32,
    pub satellites: u8,
    pub rpm: u32,
    pub trip_km: f64,
    pub update_rate_hz: u32,
}

impl TelemetrySnapshot {
    pub const INIT: Self = Self {
        fixed: false,
        latitude: 0.0,
        longitude: 0.0,
        speed_kmh: 0.0,
        altitude_m: 0.0,
        heading_deg: 0.0,
        hdop: WORST_HDOP,
        satellites: 0,
        rpm: 0,
        trip_km: 0.0,
        update_rate_hz: 0,
    };
}

/// Owner of the telemetry pipeline
pub struct TelemetryCore<'a, U: UartInterface> {
    gnss: GnssManager<U>,
    clock: RedundantClock,
    trip: TripMeter,
    speed: SpeedEstimator,
    rate: RateCounter,
    rpm: RpmSensor<'a>,
}

impl<'a, U: UartInterface> TelemetryCore<'a, U> {
    pub fn new(gnss: GnssManager<U>, rpm: RpmSensor<'a>) -> Self {
        Self {
            gnss,
            clock: RedundantClock::new(),
            trip: TripMeter::new(),
            speed: SpeedEstimator::new(),
            rate: RateCounter::new(),
            rpm,
        }
    }

    pub fn gnss(&self) -> &GnssManager<U> {
        &self.gnss
    }

    pub fn gnss_mut(&mut self) -> &mut GnssManager<U> {
        &mut self.gnss
    }

    pub fn clock(&self) -> &RedundantClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut RedundantClock {
        &mut self.clock
    }

    pub fn trip_mut(&mut self) -> &mut TripMeter {
        &mut self.trip
    }

    pub fn rpm_mut(&mut self) -> &mut RpmSensor<'a> {
        &mut self.rpm
    }

    /// Run one pass of the pipeline
    ///
    /// Order matters: the clock syncs off the freshly decoded fix, the
    /// motion estimators consume the update flags, and the flags are
    /// dropped at the end so the next pass sees only new data.
    pub fn poll(&mut self, now_ms: u32) -> Result<()> {
        self.gnss.poll()?;
        self.clock.tick(now_ms);

        let fix = self.gnss.fix();
        self.clock.sync_from_fix(fix, now_ms);
        if fix.location.is_valid() && fix.location.is_updated() {
            self.rate.count_update();
        }
        self.trip.update(fix);
        self.speed.update(fix, now_ms);
        self.rate.sample(now_ms);
        self.rpm.sample(now_ms);

        self.gnss.clear_updated();
        Ok(())
    }

    // Read accessors with display-safe fallbacks

    pub fn is_fixed(&self) -> bool {
        self.gnss.fix().has_fix()
    }

    pub fn latitude(&self) -> f64 {
        self.gnss.fix().location.value().latitude
    }

    pub fn longitude(&self) -> f64 {
        self.gnss.fix().location.value().longitude
    }

    pub fn speed_kmh(&self) -> f32 {
        self.speed.speed_kmh()
    }

    pub fn altitude_m(&self) -> f32 {
        self.gnss.fix().altitude_m.value_or(0.0)
    }

    pub fn heading_deg(&self) -> f32 {
        self.gnss.fix().course_deg.value_or(0.0)
    }

    pub fn hdop(&self) -> f32 {
        self.gnss.fix().hdop.value_or(WORST_HDOP)
    }

    pub fn satellites(&self) -> u8 {
        self.gnss.fix().satellites.value_or(0)
    }

    pub fn rpm(&self) -> u32 {
        self.rpm.rpm()
    }

    pub fn trip_km(&self) -> f64 {
        self.trip.total_km()
    }

    pub fn update_rate_hz(&self) -> u32 {
        self.rate.hz()
    }

    pub fn time_string(&self) -> heapless::String<16> {
        self.clock.time_string()
    }

    pub fn date_string(&self) -> heapless::String<16> {
        self.clock.date_string()
    }

    /// Everything a display or logger task needs, in one copy
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            fixed: self.is_fixed(),
            latitude: self.latitude(),
            longitude: self.longitude(),
            speed_kmh: self.speed_kmh(),
            altitude_m: self.altitude_m(),
            heading_deg: self.heading_deg(),
            hdop: self.hdop(),
            satellites: self.satellites(),
            rpm: self.rpm(),
            trip_km: self.trip_km(),
            update_rate_hz: self.update_rate_hz(),
        }
    }
}

/// Shared snapshot cell read by the display and logger tasks
#[cfg(feature = "embassy")]
pub static TELEMETRY: crate::core::traits::sync::EmbassyState<TelemetrySnapshot> =
    crate::core::traits::sync::EmbassyState::new(TelemetrySnapshot::INIT);

/// Publish the latest snapshot for other tasks
#[cfg(feature = "embassy")]
pub fn publish_snapshot(snapshot: &TelemetrySnapshot) {
    use crate::core::traits::SharedState;
    TELEMETRY.with_mut(|shared| *shared = *snapshot);
}

/// Host builds have no cross-task consumers
#[cfg(not(feature = "embassy"))]
pub fn publish_snapshot(_snapshot: &TelemetrySnapshot) {}
