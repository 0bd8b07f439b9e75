//! Lunar phase calculation.
//!
//! Purely date based, no network. The same date always yields the same phase.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Length of the synodic month in days.
pub const SYNODIC_MONTH: f64 = 29.53;

/// Julian day of the new moon on 2000-01-06.
const REFERENCE_NEW_MOON_JD: f64 = 2_451_549.5;

/// Upper bounds (days into the cycle) of each bucket, in cycle order.
const PHASE_BOUNDS: [(f64, MoonPhase); 8] = [
    (1.84566, MoonPhase::NewMoon),
    (5.53699, MoonPhase::WaxingCrescent),
    (9.22831, MoonPhase::FirstQuarter),
    (12.91963, MoonPhase::WaxingGibbous),
    (16.61096, MoonPhase::FullMoon),
    (20.30228, MoonPhase::WaningGibbous),
    (23.99361, MoonPhase::LastQuarter),
    (27.68493, MoonPhase::WaningCrescent),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhase {
    NewMoon,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    FullMoon,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    pub fn name(self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::FullMoon => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "🌑",
            MoonPhase::WaxingCrescent => "🌒",
            MoonPhase::FirstQuarter => "🌓",
            MoonPhase::WaxingGibbous => "🌔",
            MoonPhase::FullMoon => "🌕",
            MoonPhase::WaningGibbous => "🌖",
            MoonPhase::LastQuarter => "🌗",
            MoonPhase::WaningCrescent => "🌘",
        }
    }
}

/// Julian day number at 0h UT of a civil (Gregorian) date.
///
/// January and February count as months 13 and 14 of the previous year.
pub fn julian_day(date: NaiveDate) -> f64 {
    let (mut year, mut month) = (date.year() as i64, date.month() as i64);
    if month < 3 {
        year -= 1;
        month += 12;
    }
    let a = year.div_euclid(100);
    let b = 2 - a + a.div_euclid(4);

    (365.25 * (year + 4716) as f64).floor()
        + (30.6001 * (month + 1) as f64).floor()
        + date.day() as f64
        + b as f64
        - 1524.5
}

/// Days into the current synodic month, in `[0, SYNODIC_MONTH)`.
pub fn moon_age(date: NaiveDate) -> f64 {
    let cycles = (julian_day(date) - REFERENCE_NEW_MOON_JD) / SYNODIC_MONTH;
    cycles.rem_euclid(1.0) * SYNODIC_MONTH
}

pub fn moon_phase(date: NaiveDate) -> MoonPhase {
    let age = moon_age(date);
    PHASE_BOUNDS
        .iter()
        .find(|(bound, _)| age < *bound)
        .map(|&(_, phase)| phase)
        // Past the last bound the cycle wraps back to new moon
        .unwrap_or(MoonPhase::NewMoon)
}
