//! Tetrad Detector
//!
//! Slides a window of four consecutive total lunar eclipses over the
//! chronologically sorted input. Overlapping windows are emitted independently;
//! dedup is the post-filter's job.

use chrono::Datelike;

use super::types::{Feast, FeastAlignment, TetradPattern};
use crate::logic::events::Event;

pub const TETRAD_SIZE: usize = 4;
pub const TETRAD_MIN_GAP_DAYS: i64 = 150;
pub const TETRAD_MAX_GAP_DAYS: i64 = 210;
pub const TETRAD_MAX_SPAN_DAYS: i64 = 730;

pub const TETRAD_BASE_SIGNIFICANCE: f64 = 0.7;
pub const FEAST_ALIGNMENT_BONUS: f64 = 0.2;

/// Scan for tetrads. Non-total and non-lunar eclipses are ignored.
pub fn detect_tetrads(events: &[Event]) -> Vec<TetradPattern> {
    let mut eclipses: Vec<&Event> = events.iter().filter(|e| e.is_total_lunar_eclipse()).collect();
    if eclipses.len() < TETRAD_SIZE {
        return vec![];
    }
    eclipses.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

    let tetrads: Vec<TetradPattern> = eclipses
        .windows(TETRAD_SIZE)
        .filter(|window| is_tetrad_window(window))
        .map(build_tetrad)
        .collect();

    log::debug!("Tetrad scan: {} total lunar eclipses -> {} tetrads", eclipses.len(), tetrads.len());
    tetrads
}

fn is_tetrad_window(window: &[&Event]) -> bool {
    if !window.iter().all(|e| e.is_total_lunar_eclipse()) {
        return false;
    }

    let gaps_ok = window.windows(2).all(|pair| {
        let gap = (pair[1].timestamp.date_naive() - pair[0].timestamp.date_naive()).num_days();
        (TETRAD_MIN_GAP_DAYS..=TETRAD_MAX_GAP_DAYS).contains(&gap)
    });

    let span = (window[TETRAD_SIZE - 1].timestamp.date_naive() - window[0].timestamp.date_naive()).num_days();
    gaps_ok && span <= TETRAD_MAX_SPAN_DAYS
}

fn build_tetrad(window: &[&Event]) -> TetradPattern {
    let dates = [0, 1, 2, 3].map(|i| window[i].timestamp.date_naive());
    let event_ids = [0, 1, 2, 3].map(|i| window[i].id.clone());

    let feast_alignments: Vec<FeastAlignment> = dates
        .iter()
        .filter_map(|d| Feast::for_month(d.month()).map(|feast| FeastAlignment { date: *d, feast }))
        .collect();

    let significance = if feast_alignments.is_empty() {
        TETRAD_BASE_SIGNIFICANCE
    } else {
        TETRAD_BASE_SIGNIFICANCE + FEAST_ALIGNMENT_BONUS
    };

    TetradPattern {
        event_ids,
        eclipse_dates: dates,
        feast_alignments,
        significance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::events::{EclipseBody, EclipseType, EventType};
    use crate::logic::patterns::types::Feast;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn lunar(id: &str, y: i32, m: u32, d: u32, kind: EclipseType) -> Event {
        Event::new(id, EventType::Eclipse, Utc.with_ymd_and_hms(y, m, d, 3, 0, 0).unwrap())
            .with_eclipse(EclipseBody::Lunar, kind)
    }

    fn blood_moons() -> Vec<Event> {
        vec![
            lunar("e1", 2014, 4, 15, EclipseType::Total),
            lunar("e2", 2014, 10, 8, EclipseType::Total),
            lunar("e3", 2015, 4, 4, EclipseType::Total),
            lunar("e4", 2015, 9, 28, EclipseType::Total),
        ]
    }

    #[test]
    fn test_2014_2015_tetrad() {
        let tetrads = detect_tetrads(&blood_moons());
        assert_eq!(tetrads.len(), 1);

        let t = &tetrads[0];
        assert_eq!(t.eclipse_dates[0], NaiveDate::from_ymd_opt(2014, 4, 15).unwrap());
        assert_eq!(t.eclipse_dates[3], NaiveDate::from_ymd_opt(2015, 9, 28).unwrap());
        assert!(t.has_feast(Feast::Passover));
        assert!(t.has_feast(Feast::Tabernacles));
        assert_eq!(t.feast_alignments.len(), 4);
        assert!((t.significance - (TETRAD_BASE_SIGNIFICANCE + FEAST_ALIGNMENT_BONUS)).abs() < 1e-12);
    }

    #[test]
    fn test_input_order_irrelevant() {
        let mut events = blood_moons();
        events.reverse();
        assert_eq!(detect_tetrads(&events), detect_tetrads(&blood_moons()));
    }

    #[test]
    fn test_wide_gap_rejected() {
        let mut events = blood_moons();
        // 2014-10-08 + 250 days
        events[2] = lunar("e3", 2015, 6, 15, EclipseType::Total);
        events[3] = lunar("e4", 2015, 12, 10, EclipseType::Total);
        assert!(detect_tetrads(&events).is_empty());
    }

    #[test]
    fn test_partial_eclipse_breaks_tetrad() {
        let mut events = blood_moons();
        events[1] = lunar("e2", 2014, 10, 8, EclipseType::Partial);
        assert!(detect_tetrads(&events).is_empty());
    }

    #[test]
    fn test_fewer_than_four() {
        let events = &blood_moons()[..3];
        assert!(detect_tetrads(events).is_empty());
    }

    #[test]
    fn test_overlapping_windows_all_emitted() {
        let mut events = blood_moons();
        events.push(lunar("e5", 2016, 3, 23, EclipseType::Total));
        let tetrads = detect_tetrads(&events);
        assert_eq!(tetrads.len(), 2);
        assert_eq!(tetrads[0].event_ids[1], tetrads[1].event_ids[0]);
    }

    #[test]
    fn test_no_feast_months_lowers_significance() {
        let events = vec![
            lunar("a", 2001, 1, 9, EclipseType::Total),
            lunar("b", 2001, 7, 5, EclipseType::Total),
            lunar("c", 2001, 12, 30, EclipseType::Total),
            lunar("d", 2002, 6, 24, EclipseType::Total),
        ];
        let tetrads = detect_tetrads(&events);
        assert_eq!(tetrads.len(), 1);
        assert!(tetrads[0].feast_alignments.is_empty());
        assert_eq!(tetrads[0].significance, TETRAD_BASE_SIGNIFICANCE);
    }
}
