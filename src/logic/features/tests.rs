//! Integration Tests for the feature schema
//!
//! Exercise the full extractor table against realistic events.

use chrono::{TimeZone, Utc};

use super::layout::{feature_index, FEATURE_COUNT};
use super::vector::extract_features;
use crate::logic::events::{EclipseBody, EclipseType, Event, EventType};

fn blood_moon() -> Event {
    Event::new("lunar-2015-09-28", EventType::Eclipse, Utc.with_ymd_and_hms(2015, 9, 28, 2, 47, 0).unwrap())
        .with_eclipse(EclipseBody::Lunar, EclipseType::Total)
        .with_magnitude(1.276)
        .with_duration_hours(1.2)
        .with_jerusalem_visible(true)
        .with_feast_day(true)
}

fn tohoku() -> Event {
    Event::new("quake-2011-03-11", EventType::Earthquake, Utc.with_ymd_and_hms(2011, 3, 11, 5, 46, 0).unwrap())
        .with_location(38.297, 142.373)
        .with_magnitude(9.1)
        .with_impact(19_747.0, 235_000.0)
}

#[test]
fn test_extraction_is_deterministic() {
    for event in [blood_moon(), tohoku()] {
        let a = extract_features(&event);
        let b = extract_features(&event);
        let bits_a: Vec<u64> = a.values.iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u64> = b.values.iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }
}

#[test]
fn test_every_event_type_gets_full_width() {
    for (i, ty) in EventType::ALL.iter().enumerate() {
        let e = Event::new(format!("e{}", i), *ty, Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap());
        let v = extract_features(&e);
        assert_eq!(v.values.len(), FEATURE_COUNT);
        assert!(v.values.iter().all(|x| x.is_finite()));
    }
}

#[test]
fn test_blood_moon_flags() {
    let v = extract_features(&blood_moon());
    assert_eq!(v.get_by_name("jerusalem_proximity"), Some(1.0));
    assert_eq!(v.get_by_name("feast_day"), Some(1.0));
    assert_eq!(v.get_by_name("lunar_involved"), Some(1.0));
    assert_eq!(v.get_by_name("solar_involved"), Some(0.0));
    assert_eq!(v.get_by_name("event_type_code"), Some(0.0));
    assert!((v.values[2] - 0.05).abs() < 1e-12);
}

#[test]
fn test_earthquake_far_from_reference() {
    let v = extract_features(&tohoku());
    let idx = feature_index("inverse_distance").unwrap();
    assert!(v.values[idx] > 0.0 && v.values[idx] < 0.2);
    assert_eq!(v.get_by_name("jerusalem_proximity"), Some(0.0));
    assert!((v.values[1] - 0.91).abs() < 1e-12);
    assert!(v.values[13] > 0.8 && v.values[13] < 1.0);
}
