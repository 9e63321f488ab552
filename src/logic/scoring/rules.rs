//! Scoring Rules & Reference Table
//!
//! Constants and static lookups only. The scorer lives in `scorer.rs`.

use crate::constants::LUNAR_DISTANCE_KM;
use crate::logic::events::EventType;

// ============================================================================
// SEVERITY (0-100)
// ============================================================================

pub const BASE_SEVERITY: f64 = 50.0;
pub const MAX_SEVERITY: f64 = 100.0;

/// Additive per-type bonus
pub fn type_bonus(event_type: EventType) -> f64 {
    match event_type {
        EventType::Tsunami => 25.0,
        EventType::Earthquake | EventType::Volcanic => 20.0,
        EventType::Eclipse | EventType::Hurricane => 15.0,
        EventType::SolarFlare | EventType::Neo => 10.0,
        EventType::Conjunction => 5.0,
        EventType::Other => 0.0,
    }
}

/// (max distance in lunar distances, bonus), first match wins
pub const PROXIMITY_LADDER: [(f64, f64); 3] = [(1.0, 20.0), (5.0, 10.0), (10.0, 5.0)];

pub fn proximity_bonus(distance_km: f64) -> f64 {
    let lunar_distances = distance_km / LUNAR_DISTANCE_KM;
    PROXIMITY_LADDER
        .iter()
        .find(|(max, _)| lunar_distances < *max)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0.0)
}

/// (minimum magnitude, bonus) per type, first match wins
pub fn magnitude_ladder(event_type: EventType) -> &'static [(f64, f64)] {
    match event_type {
        // Richter / moment magnitude
        EventType::Earthquake => &[(8.0, 25.0), (7.0, 15.0), (6.0, 8.0)],
        // VEI
        EventType::Volcanic => &[(6.0, 25.0), (4.0, 15.0), (3.0, 8.0)],
        // Saffir-Simpson
        EventType::Hurricane => &[(5.0, 20.0), (4.0, 12.0), (3.0, 6.0)],
        // Soloviev-Imamura intensity
        EventType::Tsunami => &[(4.0, 20.0), (2.0, 10.0)],
        _ => &[],
    }
}

pub fn magnitude_bonus(event_type: EventType, magnitude: f64) -> f64 {
    magnitude_ladder(event_type)
        .iter()
        .find(|(min, _)| magnitude >= *min)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0.0)
}

pub const TOTAL_ECLIPSE_BONUS: f64 = 10.0;

/// Rarity: membership in named patterns
pub const TETRAD_RARITY_BONUS: f64 = 15.0;
pub const CONJUNCTION_PATTERN_RARITY_BONUS: f64 = 10.0;

// ============================================================================
// SIGNIFICANCE (0-1)
// ============================================================================

pub const MAX_SIGNIFICANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignificanceMarker {
    BloodMoon,
    SolarEclipse,
    Conjunction,
    JupiterVenus,
    NearEarthObject,
    FeastMonth,
    Tetrad,
    TripleConjunction,
}

impl SignificanceMarker {
    pub fn bonus(&self) -> f64 {
        match self {
            SignificanceMarker::BloodMoon => 0.3,
            SignificanceMarker::SolarEclipse => 0.2,
            SignificanceMarker::Conjunction => 0.15,
            SignificanceMarker::JupiterVenus => 0.15,
            SignificanceMarker::NearEarthObject => 0.1,
            SignificanceMarker::FeastMonth => 0.15,
            SignificanceMarker::Tetrad => 0.3,
            SignificanceMarker::TripleConjunction => 0.2,
        }
    }

    pub fn reference(&self) -> &'static str {
        match self {
            SignificanceMarker::BloodMoon => "Joel 2:31",
            SignificanceMarker::SolarEclipse => "Amos 8:9",
            SignificanceMarker::Conjunction => "Genesis 1:14",
            SignificanceMarker::JupiterVenus => "Matthew 2:2",
            SignificanceMarker::NearEarthObject => "Revelation 8:10",
            SignificanceMarker::FeastMonth => "Leviticus 23:4",
            SignificanceMarker::Tetrad => "Acts 2:20",
            SignificanceMarker::TripleConjunction => "Luke 21:25",
        }
    }
}

// ============================================================================
// ALERT LEVELS
// ============================================================================

/// Severity below this = Low
pub const MEDIUM_SEVERITY_MIN: f64 = 60.0;
pub const HIGH_SEVERITY_MIN: f64 = 75.0;
pub const CRITICAL_SEVERITY_MIN: f64 = 90.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proximity_ladder() {
        assert_eq!(proximity_bonus(100_000.0), 20.0);
        assert_eq!(proximity_bonus(LUNAR_DISTANCE_KM * 3.0), 10.0);
        assert_eq!(proximity_bonus(LUNAR_DISTANCE_KM * 9.9), 5.0);
        assert_eq!(proximity_bonus(LUNAR_DISTANCE_KM * 10.0), 0.0);
    }

    #[test]
    fn test_magnitude_ladders() {
        assert_eq!(magnitude_bonus(EventType::Earthquake, 9.1), 25.0);
        assert_eq!(magnitude_bonus(EventType::Earthquake, 6.0), 8.0);
        assert_eq!(magnitude_bonus(EventType::Earthquake, 5.9), 0.0);
        assert_eq!(magnitude_bonus(EventType::Volcanic, 4.0), 15.0);
        assert_eq!(magnitude_bonus(EventType::Hurricane, 5.0), 20.0);
        assert_eq!(magnitude_bonus(EventType::Tsunami, 3.0), 10.0);
        assert_eq!(magnitude_bonus(EventType::Eclipse, 1.2), 0.0);
    }

    #[test]
    fn test_references_are_distinct() {
        let markers = [
            SignificanceMarker::BloodMoon,
            SignificanceMarker::SolarEclipse,
            SignificanceMarker::Conjunction,
            SignificanceMarker::JupiterVenus,
            SignificanceMarker::NearEarthObject,
            SignificanceMarker::FeastMonth,
            SignificanceMarker::Tetrad,
            SignificanceMarker::TripleConjunction,
        ];
        let mut refs: Vec<&str> = markers.iter().map(|m| m.reference()).collect();
        refs.sort();
        refs.dedup();
        assert_eq!(refs.len(), markers.len());
    }
}
