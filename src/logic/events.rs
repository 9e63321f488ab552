//! Event Records
//!
//! Read-only value objects handed over by the persistence collaborator.
//! Every field beyond id/type/timestamp is optional and defaults silently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{EARTH_RADIUS_KM, REFERENCE_LAT, REFERENCE_LON};

// ============================================================================
// EVENT TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Eclipse,
    Conjunction,
    Earthquake,
    Volcanic,
    Hurricane,
    Tsunami,
    SolarFlare,
    Neo,
    Other,
}

impl EventType {
    pub const ALL: [EventType; 9] = [
        EventType::Eclipse,
        EventType::Conjunction,
        EventType::Earthquake,
        EventType::Volcanic,
        EventType::Hurricane,
        EventType::Tsunami,
        EventType::SolarFlare,
        EventType::Neo,
        EventType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Eclipse => "eclipse",
            EventType::Conjunction => "conjunction",
            EventType::Earthquake => "earthquake",
            EventType::Volcanic => "volcanic",
            EventType::Hurricane => "hurricane",
            EventType::Tsunami => "tsunami",
            EventType::SolarFlare => "solar_flare",
            EventType::Neo => "neo",
            EventType::Other => "other",
        }
    }

    /// Position in `ALL`, used for the ordinal type code
    pub fn ordinal(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(Self::ALL.len() - 1)
    }

    pub fn is_celestial(&self) -> bool {
        matches!(
            self,
            EventType::Eclipse | EventType::Conjunction | EventType::SolarFlare | EventType::Neo
        )
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown event type '{}'", s))
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EclipseBody {
    Lunar,
    Solar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EclipseType {
    Total,
    Partial,
    Annular,
    Penumbral,
    Hybrid,
}

// ============================================================================
// LOCATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// The fixed reference coordinate (Jerusalem)
    pub fn reference() -> Self {
        Self::new(REFERENCE_LAT, REFERENCE_LON)
    }

    /// Great-circle distance (haversine)
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

// ============================================================================
// METADATA
// ============================================================================

/// Type-specific details. Unknown keys are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventMetadata {
    pub eclipse_body: Option<EclipseBody>,
    pub eclipse_type: Option<EclipseType>,
    /// Bodies involved in a conjunction
    pub planets: Vec<String>,
    pub fatalities: Option<f64>,
    pub damages_usd_millions: Option<f64>,
    /// Externally supplied prior (0-1)
    pub historical_significance: Option<f64>,
    /// Externally supplied prior (0-1)
    pub prophecy_correlation: Option<f64>,
    /// Closest approach to Earth (km), for NEOs and flybys
    pub distance_to_earth_km: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ============================================================================
// EVENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Richter, VEI, Saffir-Simpson, Soloviev-Imamura or raw intensity depending on type
    #[serde(default)]
    pub magnitude: Option<f64>,
    #[serde(default)]
    pub duration_hours: Option<f64>,
    #[serde(default)]
    pub feast_day: bool,
    #[serde(default)]
    pub jerusalem_visible: bool,
    #[serde(default)]
    pub metadata: EventMetadata,
}

impl Event {
    pub fn new(id: impl Into<String>, event_type: EventType, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            event_type,
            timestamp,
            location: None,
            magnitude: None,
            duration_hours: None,
            feast_day: false,
            jerusalem_visible: false,
            metadata: EventMetadata::default(),
        }
    }

    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.location = Some(GeoPoint::new(lat, lon));
        self
    }

    pub fn with_magnitude(mut self, magnitude: f64) -> Self {
        self.magnitude = Some(magnitude);
        self
    }

    pub fn with_duration_hours(mut self, hours: f64) -> Self {
        self.duration_hours = Some(hours);
        self
    }

    pub fn with_feast_day(mut self, feast_day: bool) -> Self {
        self.feast_day = feast_day;
        self
    }

    pub fn with_jerusalem_visible(mut self, visible: bool) -> Self {
        self.jerusalem_visible = visible;
        self
    }

    pub fn with_eclipse(mut self, body: EclipseBody, kind: EclipseType) -> Self {
        self.metadata.eclipse_body = Some(body);
        self.metadata.eclipse_type = Some(kind);
        self
    }

    pub fn with_planets(mut self, planets: &[&str]) -> Self {
        self.metadata.planets = planets.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_impact(mut self, fatalities: f64, damages_usd_millions: f64) -> Self {
        self.metadata.fatalities = Some(fatalities);
        self.metadata.damages_usd_millions = Some(damages_usd_millions);
        self
    }

    pub fn with_distance_to_earth_km(mut self, km: f64) -> Self {
        self.metadata.distance_to_earth_km = Some(km);
        self
    }

    pub fn is_lunar_eclipse(&self) -> bool {
        self.event_type == EventType::Eclipse && self.metadata.eclipse_body == Some(EclipseBody::Lunar)
    }

    pub fn is_solar_eclipse(&self) -> bool {
        self.event_type == EventType::Eclipse && self.metadata.eclipse_body == Some(EclipseBody::Solar)
    }

    pub fn is_total_lunar_eclipse(&self) -> bool {
        self.is_lunar_eclipse() && self.metadata.eclipse_type == Some(EclipseType::Total)
    }

    /// Case-insensitive planet membership
    pub fn involves(&self, body: &str) -> bool {
        self.metadata.planets.iter().any(|p| p.eq_ignore_ascii_case(body))
    }

    /// Every unordered pair of involved bodies, lowercased, each pair sorted
    pub fn planet_pairs(&self) -> Vec<(String, String)> {
        let mut bodies: Vec<String> = self.metadata.planets.iter().map(|p| p.to_lowercase()).collect();
        bodies.sort();
        bodies.dedup();

        let mut pairs = Vec::new();
        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                pairs.push((a.clone(), b.clone()));
            }
        }
        pairs
    }

    pub fn distance_to_reference_km(&self) -> Option<f64> {
        self.location.map(|loc| loc.distance_km(&GeoPoint::reference()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 9, 28, 2, 47, 0).unwrap()
    }

    #[test]
    fn test_event_type_ordinals_are_stable() {
        assert_eq!(EventType::Eclipse.ordinal(), 0);
        assert_eq!(EventType::Tsunami.ordinal(), 5);
        assert_eq!(EventType::Other.ordinal(), EventType::ALL.len() - 1);
    }

    #[test]
    fn test_event_type_parse() {
        assert_eq!("solar_flare".parse::<EventType>(), Ok(EventType::SolarFlare));
        assert_eq!(" Eclipse ".parse::<EventType>(), Ok(EventType::Eclipse));
        assert!("meteor".parse::<EventType>().is_err());
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = GeoPoint::reference();
        assert!(p.distance_km(&p).abs() < 1e-9);
    }

    #[test]
    fn test_distance_jerusalem_to_cairo() {
        let cairo = GeoPoint::new(30.0444, 31.2357);
        let d = GeoPoint::reference().distance_km(&cairo);
        assert!(d > 400.0 && d < 450.0, "got {}", d);
    }

    #[test]
    fn test_planet_pair_is_unordered() {
        let a = Event::new("a", EventType::Conjunction, ts()).with_planets(&["Saturn", "Jupiter"]);
        let b = Event::new("b", EventType::Conjunction, ts()).with_planets(&["jupiter", "saturn"]);
        assert_eq!(a.planet_pairs(), b.planet_pairs());
        assert_eq!(a.planet_pairs(), vec![("jupiter".to_string(), "saturn".to_string())]);
    }

    #[test]
    fn test_planet_pairs_for_massing() {
        let e = Event::new("m", EventType::Conjunction, ts()).with_planets(&["Venus", "Jupiter", "Regulus"]);
        assert_eq!(e.planet_pairs().len(), 3);
        let single = Event::new("s", EventType::Conjunction, ts()).with_planets(&["Venus"]);
        assert!(single.planet_pairs().is_empty());
    }

    #[test]
    fn test_total_lunar_eclipse() {
        let e = Event::new("e", EventType::Eclipse, ts()).with_eclipse(EclipseBody::Lunar, EclipseType::Total);
        assert!(e.is_total_lunar_eclipse());
        assert!(!e.is_solar_eclipse());
    }

    #[test]
    fn test_deserialize_minimal_event() {
        let json = r#"{"id":"q1","event_type":"earthquake","timestamp":"2011-03-11T05:46:00Z"}"#;
        let e: Event = serde_json::from_str(json).unwrap();
        assert_eq!(e.event_type, EventType::Earthquake);
        assert!(e.magnitude.is_none());
        assert!(e.metadata.planets.is_empty());
    }

    #[test]
    fn test_unknown_metadata_kept() {
        let json = r#"{"id":"q1","event_type":"earthquake","timestamp":"2011-03-11T05:46:00Z",
                       "metadata":{"fatalities":100,"depth_km":29}}"#;
        let e: Event = serde_json::from_str(json).unwrap();
        assert_eq!(e.metadata.fatalities, Some(100.0));
        assert!(e.metadata.extra.contains_key("depth_km"));
    }
}
