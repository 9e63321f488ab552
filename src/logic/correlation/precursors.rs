//! Precursor Indexes
//!
//! Per-day precursor features are trailing-window aggregates over sorted day
//! numbers. Each hypothesis owns an ordered, named schema of extractors.

use chrono::NaiveDate;

use super::calendar::{cyclic, day_number, lunar_phase, season_phase, solar_cycle_phase};
use crate::logic::events::{EclipseType, Event, EventType};
use crate::logic::features::extract::OUTER_PLANETS;

/// Value used when an eclipse, conjunction or flare carries no magnitude
const DEFAULT_PRECURSOR_VALUE: f64 = 1.0;

// ============================================================================
// SERIES
// ============================================================================

/// Sorted day numbers with one value per occurrence
#[derive(Debug, Clone, Default)]
pub struct Series {
    days: Vec<i64>,
    values: Vec<f64>,
}

impl Series {
    fn from_events<'a>(events: impl Iterator<Item = &'a Event>) -> Self {
        let mut pairs: Vec<(i64, f64)> = events
            .map(|e| {
                (
                    day_number(e.timestamp.date_naive()),
                    e.magnitude.unwrap_or(DEFAULT_PRECURSOR_VALUE),
                )
            })
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));

        Self {
            days: pairs.iter().map(|p| p.0).collect(),
            values: pairs.iter().map(|p| p.1).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Occurrences on days (day - lookback, day]
    fn window(&self, day: i64, lookback: i64) -> &[f64] {
        let lo = self.days.partition_point(|&d| d <= day - lookback);
        let hi = self.days.partition_point(|&d| d <= day);
        &self.values[lo..hi.max(lo)]
    }

    pub fn count(&self, day: i64, lookback: i64) -> usize {
        self.window(day, lookback).len()
    }

    pub fn any(&self, day: i64, lookback: i64) -> bool {
        self.count(day, lookback) > 0
    }

    pub fn max(&self, day: i64, lookback: i64) -> Option<f64> {
        self.window(day, lookback).iter().copied().reduce(f64::max)
    }

    pub fn min(&self, day: i64, lookback: i64) -> Option<f64> {
        self.window(day, lookback).iter().copied().reduce(f64::min)
    }

    pub fn days_since_last(&self, day: i64) -> Option<i64> {
        let hi = self.days.partition_point(|&d| d <= day);
        (hi > 0).then(|| day - self.days[hi - 1])
    }
}

// ============================================================================
// PRECURSOR INDEX
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct PrecursorIndex {
    pub eclipses: Series,
    pub solar_eclipses: Series,
    pub lunar_eclipses: Series,
    pub total_solar_eclipses: Series,
    pub total_lunar_eclipses: Series,
    /// Value is angular separation in degrees
    pub conjunctions: Series,
    pub outer_conjunctions: Series,
    pub jupiter_saturn: Series,
    pub solar_flares: Series,
}

impl PrecursorIndex {
    pub fn new(events: &[Event]) -> Self {
        let eclipses = || events.iter().filter(|e| e.event_type == EventType::Eclipse);
        let conjunctions = || events.iter().filter(|e| e.event_type == EventType::Conjunction);
        let total = |e: &&Event| e.metadata.eclipse_type == Some(EclipseType::Total);

        Self {
            eclipses: Series::from_events(eclipses()),
            solar_eclipses: Series::from_events(eclipses().filter(|e| e.is_solar_eclipse())),
            lunar_eclipses: Series::from_events(eclipses().filter(|e| e.is_lunar_eclipse())),
            total_solar_eclipses: Series::from_events(eclipses().filter(|e| e.is_solar_eclipse()).filter(total)),
            total_lunar_eclipses: Series::from_events(eclipses().filter(|e| e.is_total_lunar_eclipse())),
            conjunctions: Series::from_events(conjunctions()),
            outer_conjunctions: Series::from_events(
                conjunctions().filter(|e| OUTER_PLANETS.iter().any(|p| e.involves(p))),
            ),
            jupiter_saturn: Series::from_events(
                conjunctions().filter(|e| e.involves("jupiter") && e.involves("saturn")),
            ),
            solar_flares: Series::from_events(events.iter().filter(|e| e.event_type == EventType::SolarFlare)),
        }
    }
}

// ============================================================================
// FEATURE SCHEMAS
// ============================================================================

#[derive(Clone, Copy)]
pub struct PrecursorFeature {
    pub name: &'static str,
    pub extract: fn(&PrecursorIndex, NaiveDate) -> f64,
}

impl std::fmt::Debug for PrecursorFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn ratio(count: usize, cap: f64) -> f64 {
    (count as f64 / cap).min(1.0)
}

fn recency(days: Option<i64>, horizon: f64) -> f64 {
    days.map(|d| (d as f64 / horizon).min(1.0)).unwrap_or(1.0)
}

fn d(date: NaiveDate) -> i64 {
    day_number(date)
}

pub const EARTHQUAKE_FEATURES: [PrecursorFeature; 10] = [
    PrecursorFeature { name: "eclipse_7d", extract: |ix, t| flag(ix.eclipses.any(d(t), 7)) },
    PrecursorFeature { name: "eclipse_count_30d", extract: |ix, t| ratio(ix.eclipses.count(d(t), 30), 3.0) },
    PrecursorFeature { name: "solar_eclipse_30d", extract: |ix, t| flag(ix.solar_eclipses.any(d(t), 30)) },
    PrecursorFeature { name: "lunar_eclipse_30d", extract: |ix, t| flag(ix.lunar_eclipses.any(d(t), 30)) },
    PrecursorFeature { name: "conjunction_count_30d", extract: |ix, t| ratio(ix.conjunctions.count(d(t), 30), 5.0) },
    PrecursorFeature { name: "outer_conjunction_60d", extract: |ix, t| flag(ix.outer_conjunctions.any(d(t), 60)) },
    PrecursorFeature {
        name: "max_eclipse_magnitude_30d",
        extract: |ix, t| ix.eclipses.max(d(t), 30).map(|m| (m / 1.5).clamp(0.0, 1.0)).unwrap_or(0.0),
    },
    PrecursorFeature {
        name: "min_conjunction_separation_30d",
        extract: |ix, t| ix.conjunctions.min(d(t), 30).map(|s| (s / 10.0).clamp(0.0, 1.0)).unwrap_or(1.0),
    },
    PrecursorFeature { name: "lunar_phase_sin", extract: |_, t| cyclic(lunar_phase(t)).0 },
    PrecursorFeature { name: "lunar_phase_cos", extract: |_, t| cyclic(lunar_phase(t)).1 },
];

pub const VOLCANIC_FEATURES: [PrecursorFeature; 8] = [
    PrecursorFeature { name: "solar_eclipse_30d", extract: |ix, t| flag(ix.solar_eclipses.any(d(t), 30)) },
    PrecursorFeature {
        name: "solar_eclipse_count_60d",
        extract: |ix, t| ratio(ix.solar_eclipses.count(d(t), 60), 2.0),
    },
    PrecursorFeature { name: "flare_count_30d", extract: |ix, t| ratio(ix.solar_flares.count(d(t), 30), 10.0) },
    PrecursorFeature {
        name: "max_flare_30d",
        extract: |ix, t| ix.solar_flares.max(d(t), 30).map(|m| (m / 10.0).clamp(0.0, 1.0)).unwrap_or(0.0),
    },
    PrecursorFeature { name: "solar_cycle_sin", extract: |_, t| cyclic(solar_cycle_phase(t)).0 },
    PrecursorFeature { name: "solar_cycle_cos", extract: |_, t| cyclic(solar_cycle_phase(t)).1 },
    PrecursorFeature {
        name: "days_since_solar_eclipse",
        extract: |ix, t| recency(ix.solar_eclipses.days_since_last(d(t)), 365.0),
    },
    PrecursorFeature {
        name: "total_solar_eclipse_60d",
        extract: |ix, t| flag(ix.total_solar_eclipses.any(d(t), 60)),
    },
];

pub const HURRICANE_FEATURES: [PrecursorFeature; 8] = [
    PrecursorFeature { name: "conjunction_14d", extract: |ix, t| flag(ix.conjunctions.any(d(t), 14)) },
    PrecursorFeature { name: "conjunction_count_30d", extract: |ix, t| ratio(ix.conjunctions.count(d(t), 30), 5.0) },
    PrecursorFeature { name: "outer_conjunction_30d", extract: |ix, t| flag(ix.outer_conjunctions.any(d(t), 30)) },
    PrecursorFeature { name: "jupiter_saturn_60d", extract: |ix, t| flag(ix.jupiter_saturn.any(d(t), 60)) },
    PrecursorFeature {
        name: "min_conjunction_separation_30d",
        extract: |ix, t| ix.conjunctions.min(d(t), 30).map(|s| (s / 10.0).clamp(0.0, 1.0)).unwrap_or(1.0),
    },
    PrecursorFeature { name: "season_sin", extract: |_, t| cyclic(season_phase(t)).0 },
    PrecursorFeature { name: "season_cos", extract: |_, t| cyclic(season_phase(t)).1 },
    PrecursorFeature { name: "conjunction_count_60d", extract: |ix, t| ratio(ix.conjunctions.count(d(t), 60), 8.0) },
];

pub const TSUNAMI_FEATURES: [PrecursorFeature; 8] = [
    PrecursorFeature { name: "lunar_eclipse_7d", extract: |ix, t| flag(ix.lunar_eclipses.any(d(t), 7)) },
    PrecursorFeature {
        name: "lunar_eclipse_count_30d",
        extract: |ix, t| ratio(ix.lunar_eclipses.count(d(t), 30), 2.0),
    },
    PrecursorFeature {
        name: "total_lunar_eclipse_30d",
        extract: |ix, t| flag(ix.total_lunar_eclipses.any(d(t), 30)),
    },
    PrecursorFeature { name: "lunar_phase_sin", extract: |_, t| cyclic(lunar_phase(t)).0 },
    PrecursorFeature { name: "lunar_phase_cos", extract: |_, t| cyclic(lunar_phase(t)).1 },
    PrecursorFeature { name: "near_full_moon", extract: |_, t| flag((lunar_phase(t) - 0.5).abs() < 0.05) },
    PrecursorFeature {
        name: "near_new_moon",
        extract: |_, t| {
            let p = lunar_phase(t);
            flag(p < 0.05 || p > 0.95)
        },
    },
    PrecursorFeature {
        name: "days_since_lunar_eclipse",
        extract: |ix, t| recency(ix.lunar_eclipses.days_since_last(d(t)), 180.0),
    },
];

/// Evaluate a schema for one day
pub fn evaluate(schema: &[PrecursorFeature], index: &PrecursorIndex, date: NaiveDate) -> Vec<f64> {
    schema.iter().map(|f| (f.extract)(index, date)).collect()
}
