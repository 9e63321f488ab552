//! Hypothesis Catalogue
//!
//! One entry per celestial → terrestrial correlation rule. Constants only;
//! dataset construction lives in `dataset.rs`.

use serde::{Deserialize, Serialize};

use super::precursors::{
    PrecursorFeature, EARTHQUAKE_FEATURES, HURRICANE_FEATURES, TSUNAMI_FEATURES, VOLCANIC_FEATURES,
};
use crate::logic::events::{Event, EventType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Bootstrap-aggregated trees with balanced class weights
    BaggedForest,
    /// Gradient-boosted shallow trees
    BoostedTrees,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hypothesis {
    CelestialEarthquake,
    SolarVolcanic,
    PlanetaryHurricane,
    LunarTsunami,
}

#[derive(Debug, Clone, Copy)]
pub struct HypothesisSpec {
    /// Precursor category label
    pub source: &'static str,
    pub target: EventType,
    /// Minimum magnitude/VEI/category/intensity for a qualifying disaster
    pub target_threshold: f64,
    /// Forward horizon of the label, inclusive
    pub time_window_days: i64,
    pub history_years: u32,
    pub model: ModelKind,
    pub features: &'static [PrecursorFeature],
    /// Event types the historical stream must contain
    pub stream_types: &'static [EventType],
}

impl Hypothesis {
    pub const ALL: [Hypothesis; 4] = [
        Hypothesis::CelestialEarthquake,
        Hypothesis::SolarVolcanic,
        Hypothesis::PlanetaryHurricane,
        Hypothesis::LunarTsunami,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Hypothesis::CelestialEarthquake => "celestial_earthquake",
            Hypothesis::SolarVolcanic => "solar_volcanic",
            Hypothesis::PlanetaryHurricane => "planetary_hurricane",
            Hypothesis::LunarTsunami => "lunar_tsunami",
        }
    }

    pub fn from_id(id: &str) -> Option<Hypothesis> {
        Self::ALL.iter().copied().find(|h| h.id() == id)
    }

    pub fn spec(&self) -> HypothesisSpec {
        match self {
            Hypothesis::CelestialEarthquake => HypothesisSpec {
                source: "celestial",
                target: EventType::Earthquake,
                target_threshold: 6.0,
                time_window_days: 30,
                history_years: 100,
                model: ModelKind::BaggedForest,
                features: &EARTHQUAKE_FEATURES,
                stream_types: &[EventType::Eclipse, EventType::Conjunction, EventType::Earthquake],
            },
            Hypothesis::SolarVolcanic => HypothesisSpec {
                source: "solar",
                target: EventType::Volcanic,
                target_threshold: 4.0,
                time_window_days: 60,
                history_years: 50,
                model: ModelKind::BoostedTrees,
                features: &VOLCANIC_FEATURES,
                stream_types: &[EventType::Eclipse, EventType::SolarFlare, EventType::Volcanic],
            },
            Hypothesis::PlanetaryHurricane => HypothesisSpec {
                source: "planetary",
                target: EventType::Hurricane,
                target_threshold: 3.0,
                time_window_days: 30,
                history_years: 50,
                model: ModelKind::BaggedForest,
                features: &HURRICANE_FEATURES,
                stream_types: &[EventType::Conjunction, EventType::Hurricane],
            },
            Hypothesis::LunarTsunami => HypothesisSpec {
                source: "lunar",
                target: EventType::Tsunami,
                target_threshold: 2.0,
                time_window_days: 14,
                history_years: 50,
                model: ModelKind::BoostedTrees,
                features: &TSUNAMI_FEATURES,
                stream_types: &[EventType::Eclipse, EventType::Tsunami],
            },
        }
    }

    pub fn feature_count(&self) -> usize {
        self.spec().features.len()
    }

    pub fn feature_names(&self) -> Vec<&'static str> {
        self.spec().features.iter().map(|f| f.name).collect()
    }

    /// Target type and magnitude at or above threshold. Missing magnitude never qualifies.
    pub fn is_qualifying_disaster(&self, event: &Event) -> bool {
        let spec = self.spec();
        event.event_type == spec.target
            && event.magnitude.map(|m| m >= spec.target_threshold).unwrap_or(false)
    }
}

impl std::fmt::Display for Hypothesis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}
