//! Per-column extractors.
//!
//! Every function is total: a missing field yields the neutral value
//! (0.0, or 0.5 for the externally supplied priors).

use chrono::Datelike;

use crate::constants::NEAR_REFERENCE_KM;
use crate::logic::events::{Event, EventType};

/// Neutral value for externally supplied priors
pub const NEUTRAL_PRIOR: f64 = 0.5;

/// Day-of-year where the lunisolar proxy year starts (spring equinox, ~Nisan)
const NISAN_START_DOY: i64 = 80;

/// Upper bound of the era scale (years)
const ERA_SPAN_YEARS: f64 = 3000.0;

pub const OUTER_PLANETS: [&str; 5] = ["jupiter", "saturn", "uranus", "neptune", "pluto"];

pub fn event_type_code(event: &Event) -> f64 {
    event.event_type.ordinal() as f64 / (EventType::ALL.len() - 1) as f64
}

/// Magnitude on the type's own scale, mapped towards [0, 1]
pub fn normalized_magnitude(event: &Event) -> f64 {
    let Some(m) = event.magnitude else { return 0.0 };
    match event.event_type {
        EventType::Earthquake => m / 10.0, // Richter
        EventType::Volcanic => m / 8.0,    // VEI
        EventType::Hurricane => m / 5.0,   // Saffir-Simpson
        EventType::Tsunami => m / 12.0,    // Soloviev-Imamura
        _ => m,
    }
}

pub fn duration_24h(event: &Event) -> f64 {
    event.duration_hours.map(|h| h / 24.0).unwrap_or(0.0)
}

pub fn jerusalem_proximity(event: &Event) -> f64 {
    let near = event
        .distance_to_reference_km()
        .map(|d| d <= NEAR_REFERENCE_KM)
        .unwrap_or(false);
    if event.jerusalem_visible || near { 1.0 } else { 0.0 }
}

pub fn feast_day(event: &Event) -> f64 {
    if event.feast_day { 1.0 } else { 0.0 }
}

/// `1 / (1 + d/1000)`; 0 when the event has no location
pub fn inverse_distance(event: &Event) -> f64 {
    event
        .distance_to_reference_km()
        .map(|d| 1.0 / (1.0 + d / 1000.0))
        .unwrap_or(0.0)
}

/// Position within a spring-anchored 365-day year, in [0, 1)
pub fn lunisolar_position(event: &Event) -> f64 {
    let doy = event.timestamp.ordinal() as i64;
    (doy - NISAN_START_DOY).rem_euclid(365) as f64 / 365.0
}

pub fn era_position(event: &Event) -> f64 {
    (event.timestamp.year() as f64 / ERA_SPAN_YEARS).clamp(0.0, 1.0)
}

pub fn solar_involved(event: &Event) -> f64 {
    let solar = event.is_solar_eclipse()
        || event.event_type == EventType::SolarFlare
        || event.involves("sun");
    if solar { 1.0 } else { 0.0 }
}

pub fn lunar_involved(event: &Event) -> f64 {
    if event.is_lunar_eclipse() || event.involves("moon") { 1.0 } else { 0.0 }
}

pub fn outer_planet_involved(event: &Event) -> f64 {
    if OUTER_PLANETS.iter().any(|p| event.involves(p)) { 1.0 } else { 0.0 }
}

pub fn historical_significance(event: &Event) -> f64 {
    event.metadata.historical_significance.unwrap_or(NEUTRAL_PRIOR)
}

pub fn prophecy_correlation(event: &Event) -> f64 {
    event.metadata.prophecy_correlation.unwrap_or(NEUTRAL_PRIOR)
}

/// `log1p(fatalities*10 + damages_musd) / 15`, clipped to [0, 1]
pub fn combined_impact(event: &Event) -> f64 {
    let fatalities = event.metadata.fatalities.unwrap_or(0.0).max(0.0);
    let damages = event.metadata.damages_usd_millions.unwrap_or(0.0).max(0.0);
    ((fatalities * 10.0 + damages).ln_1p() / 15.0).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn quake() -> Event {
        Event::new("q", EventType::Earthquake, Utc.with_ymd_and_hms(2011, 3, 11, 5, 46, 0).unwrap())
    }

    #[test]
    fn test_magnitude_scales() {
        assert!((normalized_magnitude(&quake().with_magnitude(9.0)) - 0.9).abs() < 1e-12);

        let mut volcano = quake().with_magnitude(4.0);
        volcano.event_type = EventType::Volcanic;
        assert!((normalized_magnitude(&volcano) - 0.5).abs() < 1e-12);

        let mut tsunami = quake().with_magnitude(6.0);
        tsunami.event_type = EventType::Tsunami;
        assert!((normalized_magnitude(&tsunami) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_missing_fields_are_neutral() {
        let e = quake();
        assert_eq!(normalized_magnitude(&e), 0.0);
        assert_eq!(duration_24h(&e), 0.0);
        assert_eq!(inverse_distance(&e), 0.0);
        assert_eq!(jerusalem_proximity(&e), 0.0);
        assert_eq!(historical_significance(&e), NEUTRAL_PRIOR);
        assert_eq!(prophecy_correlation(&e), NEUTRAL_PRIOR);
        assert_eq!(combined_impact(&e), 0.0);
    }

    #[test]
    fn test_inverse_distance_at_reference_is_one() {
        let e = quake().with_location(31.7683, 35.2137);
        assert!((inverse_distance(&e) - 1.0).abs() < 1e-9);
        assert_eq!(jerusalem_proximity(&e), 1.0);
    }

    #[test]
    fn test_combined_impact_clipped() {
        let e = quake().with_impact(1.0e9, 1.0e9);
        assert_eq!(combined_impact(&e), 1.0);

        let small = quake().with_impact(0.0, 1.0);
        assert!((combined_impact(&small) - 2f64.ln() / 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_lunisolar_position_in_range() {
        let e = quake();
        let p = lunisolar_position(&e);
        assert!((0.0..1.0).contains(&p));

        let nye = Event::new("n", EventType::Other, Utc.with_ymd_and_hms(2016, 12, 31, 0, 0, 0).unwrap());
        assert!((0.0..1.0).contains(&lunisolar_position(&nye)));
    }

    #[test]
    fn test_outer_planets() {
        let e = Event::new("c", EventType::Conjunction, Utc::now()).with_planets(&["Venus", "Jupiter"]);
        assert_eq!(outer_planet_involved(&e), 1.0);
        let inner = Event::new("c", EventType::Conjunction, Utc::now()).with_planets(&["Venus", "Mars"]);
        assert_eq!(outer_planet_involved(&inner), 0.0);
    }
}
