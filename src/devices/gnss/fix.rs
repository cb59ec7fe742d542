//! GNSS fix model
//!
//! Merged view of the receiver's GGA/RMC/VTG output. Each field carries its
//! own validity and freshness flags so consumers can distinguish "never
//! seen", "stale" and "updated since my last look".

use nmea0183::{GGA, RMC, VTG};

/// HDOP reported when the receiver has no usable geometry
pub const WORST_HDOP: f32 = 99.9;

/// Knots to km/h
const KNOTS_TO_KMH: f32 = 1.852;

/// One fix field with validity and freshness tracking
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FixField<T: Copy> {
    value: T,
    valid: bool,
    updated: bool,
}

impl<T: Copy> FixField<T> {
    pub const fn new(initial: T) -> Self {
        Self {
            value: initial,
            valid: false,
            updated: false,
        }
    }

    /// Store a fresh value, marking it valid and updated
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.valid = true;
        self.updated = true;
    }

    /// Last stored value regardless of validity
    pub fn value(&self) -> T {
        self.value
    }

    /// Last stored value if valid, else the fallback
    pub fn value_or(&self, fallback: T) -> T {
        if self.valid {
            self.value
        } else {
            fallback
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_updated(&self) -> bool {
        self.updated
    }

    pub fn clear_updated(&mut self) {
        self.updated = false;
    }

    pub fn invalidate(&mut self) {
        self.valid = false;
    }
}

/// WGS-84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// UTC time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UtcTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

/// UTC calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UtcDate {
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

/// Merged receiver state
#[derive(Debug, Clone, Copy)]
pub struct Fix {
    pub location: FixField<Position>,
    pub altitude_m: FixField<f32>,
    pub speed_kmh: FixField<f32>,
    pub course_deg: FixField<f32>,
    pub hdop: FixField<f32>,
    pub satellites: FixField<u8>,
    pub time: FixField<UtcTime>,
    pub date: FixField<UtcDate>,
}

impl Fix {
    pub const fn new() -> Self {
        Self {
            location: FixField::new(Position::new(0.0, 0.0)),
            altitude_m: FixField::new(0.0),
            speed_kmh: FixField::new(0.0),
            course_deg: FixField::new(0.0),
            hdop: FixField::new(WORST_HDOP),
            satellites: FixField::new(0),
            time: FixField::new(UtcTime {
                hours: 0,
                minutes: 0,
                seconds: 0,
            }),
            date: FixField::new(UtcDate {
                day: 1,
                month: 1,
                year: 2000,
            }),
        }
    }

    /// Whether the receiver currently reports a position fix
    pub fn has_fix(&self) -> bool {
        self.location.is_valid()
    }

    /// Merge a GGA sentence: position, altitude, HDOP, satellite count
    pub fn apply_gga(&mut self, gga: &GGA) {
        self.location.set(Position {
            latitude: gga.latitude.as_f64(),
            longitude: gga.longitude.as_f64(),
        });
        self.satellites.set(gga.sat_in_use);
        self.hdop.set(gga.hdop);
        self.altitude_m.set(gga.altitude.meters);
    }

    /// Merge an RMC sentence: position, speed, course, UTC time and date
    pub fn apply_rmc(&mut self, rmc: &RMC) {
        self.location.set(Position {
            latitude: rmc.latitude.as_f64(),
            longitude: rmc.longitude.as_f64(),
        });
        self.speed_kmh.set(rmc.speed.as_knots() * KNOTS_TO_KMH);
        if let Some(course) = &rmc.course {
            self.course_deg.set(course.degrees);
        }
        let dt = &rmc.datetime;
        self.time.set(UtcTime {
            hours: dt.time.hours,
            minutes: dt.time.minutes,
            seconds: dt.time.seconds as u8,
        });
        self.date.set(UtcDate {
            day: dt.date.day,
            month: dt.date.month,
            year: dt.date.year as u16,
        });
    }

    /// Merge a VTG sentence: speed and course over ground
    pub fn apply_vtg(&mut self, vtg: &VTG) {
        self.speed_kmh.set(vtg.speed.as_knots() * KNOTS_TO_KMH);
        if let Some(course) = &vtg.course {
            self.course_deg.set(course.degrees);
        }
    }

    /// Mark the fix as lost, keeping last values for display
    pub fn mark_lost(&mut self) {
        self.location.invalidate();
        self.speed_kmh.invalidate();
        self.hdop.invalidate();
    }

    /// Drop all freshness flags after a consumer pass
    pub fn clear_updated(&mut self) {
        self.location.clear_updated();
        self.altitude_m.clear_updated();
        self.speed_kmh.clear_updated();
        self.course_deg.clear_updated();
        self.hdop.clear_updated();
        self.satellites.clear_updated();
        self.time.clear_updated();
        self.date.clear_updated();
    }
}

impl Default for Fix {
    fn default() -> Self {
        Self::new()
    }
}
