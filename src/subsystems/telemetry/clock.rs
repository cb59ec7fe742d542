//! Redundant wall clock
//!
//! UTC time kept alive by a local millisecond tick between GNSS syncs, so
//! the displayed clock keeps running through tunnels and cold starts. A
//! valid GNSS time always wins over the local estimate.

use crate::devices::gnss::Fix;
use ::core::fmt::Write;
use heapless::String;

/// Clock time projected into the configured timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LocalTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(month: u8, year: u16) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

/// UTC clock with local tick fallback
pub struct RedundantClock {
    hours: u8,
    minutes: u8,
    seconds: u8,
    day: u8,
    month: u8,
    year: u16,
    utc_offset_hours: i8,
    last_tick_ms: Option<u32>,
}

impl RedundantClock {
    pub const fn new() -> Self {
        Self {
            hours: 0,
            minutes: 0,
            seconds: 0,
            day: 1,
            month: 1,
            year: 2000,
            utc_offset_hours: 0,
            last_tick_ms: None,
        }
    }

    pub fn set_utc_offset(&mut self, hours: i8) {
        self.utc_offset_hours = hours;
    }

    pub fn utc_offset(&self) -> i8 {
        self.utc_offset_hours
    }

    /// Advance by the whole seconds elapsed since the previous tick
    ///
    /// The local tick never advances the date; the hour wraps at midnight
    /// and the date stays put until the next GNSS sync. Sub-second
    /// remainders carry over to the next tick.
    pub fn tick(&mut self, now_ms: u32) {
        let last = match self.last_tick_ms {
            Some(last) => last,
            None => {
                self.last_tick_ms = Some(now_ms);
                return;
            }
        };

        let elapsed_ms = now_ms.wrapping_sub(last);
        let whole_seconds = elapsed_ms / 1000;
        if whole_seconds == 0 {
            return;
        }
        self.last_tick_ms = Some(last.wrapping_add(whole_seconds * 1000));

        let mut total = self.seconds as u32 + whole_seconds;
        self.seconds = (total % 60) as u8;
        total /= 60;
        let minutes = self.minutes as u32 + total;
        self.minutes = (minutes % 60) as u8;
        self.hours = ((self.hours as u32 + minutes / 60) % 24) as u8;
    }

    /// Take UTC time and date from a fresh GNSS fix
    ///
    /// Time and date are always overwritten together so a midnight wrap of
    /// the local tick cannot leave them disagreeing.
    pub fn sync_from_fix(&mut self, fix: &Fix, now_ms: u32) {
        if !fix.time.is_valid() || !fix.date.is_valid() || !fix.time.is_updated() {
            return;
        }
        let t = fix.time.value();
        self.hours = t.hours;
        self.minutes = t.minutes;
        self.seconds = t.seconds;
        self.last_tick_ms = Some(now_ms);

        let d = fix.date.value();
        self.day = d.day;
        self.month = d.month;
        self.year = d.year;
    }

    /// Set the time of day by hand, given in local time
    ///
    /// The date is left as whatever GNSS last provided.
    pub fn set_manual(&mut self, hours: u8, minutes: u8, seconds: u8) {
        let utc = (hours as i16 - self.utc_offset_hours as i16).rem_euclid(24);
        self.hours = utc as u8;
        self.minutes = minutes.min(59);
        self.seconds = seconds.min(59);
    }

    /// Project the UTC clock into the configured timezone
    pub fn local_time(&self) -> LocalTime {
        let mut hours = self.hours as i16 + self.utc_offset_hours as i16;
        let mut day = self.day;
        let mut month = self.month;
        let mut year = self.year;

        if hours >= 24 {
            hours -= 24;
            day += 1;
            if day > days_in_month(month, year) {
                day = 1;
                month += 1;
                if month > 12 {
                    month = 1;
                    year += 1;
                }
            }
        } else if hours < 0 {
            hours += 24;
            if day > 1 {
                day -= 1;
            } else {
                month = if month == 1 { 12 } else { month - 1 };
                if month == 12 {
                    year -= 1;
                }
                day = days_in_month(month, year);
            }
        }

        LocalTime {
            hours: hours as u8,
            minutes: self.minutes,
            seconds: self.seconds,
            day,
            month,
            year,
        }
    }

    /// Local time as `HH:MM:SS`
    pub fn time_string(&self) -> String<16> {
        let t = self.local_time();
        let mut s = String::new();
        let _ = write!(s, "{:02}:{:02}:{:02}", t.hours, t.minutes, t.seconds);
        s
    }

    /// Local date as `DD/MM/YYYY`
    pub fn date_string(&self) -> String<16> {
        let t = self.local_time();
        let mut s = String::new();
        let _ = write!(s, "{:02}/{:02}/{}", t.day, t.month, t.year);
        s
    }
}

impl Default for RedundantClock {
    fn default() -> Self {
        Self::new()
    }
}
