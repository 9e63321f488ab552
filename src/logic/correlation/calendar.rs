//! Day binning and cyclic proxies computed from fixed reference epochs.

use chrono::{Datelike, NaiveDate};

/// Synodic month (days)
pub const SYNODIC_MONTH_DAYS: f64 = 29.530588;

/// Mean solar cycle (days)
pub const SOLAR_CYCLE_DAYS: f64 = 11.0 * 365.25;

/// Reference new moon
pub fn new_moon_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 6).unwrap_or_default()
}

/// Reference solar minimum (start of cycle 24)
pub fn solar_minimum_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2008, 12, 1).unwrap_or_default()
}

/// Day number used for binning (days since the Common Era epoch)
pub fn day_number(date: NaiveDate) -> i64 {
    date.num_days_from_ce() as i64
}

pub fn date_from_day_number(day: i64) -> Option<NaiveDate> {
    i32::try_from(day).ok().and_then(NaiveDate::from_num_days_from_ce_opt)
}

fn phase(date: NaiveDate, epoch: NaiveDate, period: f64) -> f64 {
    let days = (date - epoch).num_days() as f64;
    days.rem_euclid(period) / period
}

/// 0 = new moon, 0.5 = full moon
pub fn lunar_phase(date: NaiveDate) -> f64 {
    phase(date, new_moon_epoch(), SYNODIC_MONTH_DAYS)
}

/// 0 = solar minimum
pub fn solar_cycle_phase(date: NaiveDate) -> f64 {
    phase(date, solar_minimum_epoch(), SOLAR_CYCLE_DAYS)
}

/// Position within the calendar year, 0 on Jan 1
pub fn season_phase(date: NaiveDate) -> f64 {
    (date.ordinal0() as f64) / 365.25
}

/// (sin, cos) embedding of a phase in [0, 1)
pub fn cyclic(phase: f64) -> (f64, f64) {
    let angle = phase * std::f64::consts::TAU;
    (angle.sin(), angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_is_new_moon() {
        assert_eq!(lunar_phase(new_moon_epoch()), 0.0);
    }

    #[test]
    fn test_known_full_moon() {
        // 2015-09-28 total lunar eclipse happens at full moon
        let p = lunar_phase(NaiveDate::from_ymd_opt(2015, 9, 28).unwrap());
        assert!((p - 0.5).abs() < 0.05, "phase {}", p);
    }

    #[test]
    fn test_phase_before_epoch_in_range() {
        let p = lunar_phase(NaiveDate::from_ymd_opt(1900, 1, 1).unwrap());
        assert!((0.0..1.0).contains(&p));
        let s = solar_cycle_phase(NaiveDate::from_ymd_opt(1950, 6, 1).unwrap());
        assert!((0.0..1.0).contains(&s));
    }

    #[test]
    fn test_day_number_round_trip() {
        let d = NaiveDate::from_ymd_opt(1923, 9, 1).unwrap();
        assert_eq!(date_from_day_number(day_number(d)), Some(d));
        assert_eq!(day_number(d.succ_opt().unwrap()) - day_number(d), 1);
    }

    #[test]
    fn test_cyclic_unit_circle() {
        let (s, c) = cyclic(0.25);
        assert!((s - 1.0).abs() < 1e-12);
        assert!(c.abs() < 1e-12);
    }
}
