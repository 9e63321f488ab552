//! Event Sources
//!
//! Collaborator seams for event retrieval. Engines only ever see these
//! traits; sample data lives in `SyntheticHistory`, never in engine code.

use std::path::Path;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::correlation::calendar::{lunar_phase, solar_cycle_phase, SYNODIC_MONTH_DAYS};
use super::correlation::hypothesis::Hypothesis;
use super::events::{EclipseBody, EclipseType, Event, EventType};
use crate::error::SourceError;

// ============================================================================
// TRAITS
// ============================================================================

/// Window fetch: events with `start <= timestamp < end`, optionally by type
pub trait EventSource {
    fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        event_types: Option<&[EventType]>,
    ) -> Result<Vec<Event>, SourceError>;
}

/// Long per-hypothesis history, used only by the trainer
pub trait HistoricalEventSource {
    fn fetch_history(&self, hypothesis: Hypothesis, years: u32) -> Result<HistoricalStream, SourceError>;
}

/// Events covering `start..=end` (calendar days)
#[derive(Debug, Clone)]
pub struct HistoricalStream {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub events: Vec<Event>,
}

/// First day of a `years`-long span ending at `end`. Spans reaching past the
/// calendar's lower bound are rejected.
fn span_start(end: NaiveDate, years: u32) -> Result<NaiveDate, SourceError> {
    end.checked_sub_signed(Duration::days((years as f64 * 365.25).round() as i64))
        .ok_or_else(|| SourceError::Unavailable(format!("no history {} years before {}", years, end)))
}

fn type_allowed(event: &Event, event_types: Option<&[EventType]>) -> bool {
    event_types.map(|types| types.contains(&event.event_type)).unwrap_or(true)
}

// ============================================================================
// IN-MEMORY SOURCE
// ============================================================================

/// Materialised events, e.g. an export from the persistence layer
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    events: Vec<Event>,
    as_of: Option<NaiveDate>,
}

impl InMemorySource {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events, as_of: None }
    }

    /// Anchor historical spans at `date` instead of the latest event
    pub fn with_as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    /// Load a JSON array of events
    pub fn from_json_file(path: &Path) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)?;
        let events: Vec<Event> = serde_json::from_str(&content)
            .map_err(|e| SourceError::Malformed(format!("{}: {}", path.display(), e)))?;
        log::info!("Loaded {} events from {}", events.len(), path.display());
        Ok(Self::new(events))
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn anchor(&self) -> NaiveDate {
        self.as_of
            .or_else(|| self.events.iter().map(|e| e.timestamp.date_naive()).max())
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

impl EventSource for InMemorySource {
    fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        event_types: Option<&[EventType]>,
    ) -> Result<Vec<Event>, SourceError> {
        Ok(self
            .events
            .iter()
            .filter(|e| e.timestamp >= start && e.timestamp < end)
            .filter(|e| type_allowed(e, event_types))
            .cloned()
            .collect())
    }
}

impl HistoricalEventSource for InMemorySource {
    fn fetch_history(&self, hypothesis: Hypothesis, years: u32) -> Result<HistoricalStream, SourceError> {
        let end = self.anchor();
        let start = span_start(end, years)?;
        let types = hypothesis.spec().stream_types;

        let events = self
            .events
            .iter()
            .filter(|e| {
                let day = e.timestamp.date_naive();
                day >= start && day <= end && types.contains(&e.event_type)
            })
            .cloned()
            .collect();

        Ok(HistoricalStream { start, end, events })
    }
}

// ============================================================================
// SYNTHETIC HISTORY
// ============================================================================

const ECLIPSE_SEASON_DAYS: f64 = 173.31;
const ECLIPSE_SEASON_HALF_WIDTH: f64 = 17.0;
const GREAT_CONJUNCTION_DAYS: f64 = 7253.4;

const CONJUNCTION_DAILY_P: f64 = 0.03;
const QUAKE_DAILY_P: f64 = 0.004;
const MINOR_QUAKE_DAILY_P: f64 = 0.01;
const VOLCANIC_DAILY_P: f64 = 0.0015;
const HURRICANE_SEASON_DAILY_P: f64 = 0.02;
const TSUNAMI_DAILY_P: f64 = 0.003;

/// Multiplier applied to disaster odds shortly after a matching precursor
const PRECURSOR_BOOST: f64 = 3.0;

const BODIES: [&str; 7] = ["mercury", "venus", "mars", "jupiter", "saturn", "uranus", "neptune"];

/// Seeded generator of plausible multi-decade event histories.
///
/// Eclipses follow the lunar phase and a 173-day eclipse season, so tetrads
/// appear on their own. Disasters carry a mild precursor coupling so trained
/// rules have signal to find. Identical seed and span give identical output.
#[derive(Debug, Clone)]
pub struct SyntheticHistory {
    seed: u64,
    end: NaiveDate,
}

impl SyntheticHistory {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
        }
    }

    pub fn with_end(mut self, end: NaiveDate) -> Self {
        self.end = end;
        self
    }

    /// All synthetic events on `start..=end`
    pub fn generate(&self, start: NaiveDate, end: NaiveDate) -> Vec<Event> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut events = Vec::new();

        let season_epoch = NaiveDate::from_ymd_opt(2014, 4, 15).unwrap_or_default();
        let great_epoch = NaiveDate::from_ymd_opt(2020, 12, 21).unwrap_or_default();
        let half_day = 0.5 / SYNODIC_MONTH_DAYS;

        let mut last_eclipse: Option<NaiveDate> = None;
        let mut last_solar: Option<NaiveDate> = None;
        let mut last_flare: Option<NaiveDate> = None;
        let mut last_conjunction: Option<NaiveDate> = None;
        let mut last_lunar: Option<NaiveDate> = None;

        let within = |last: Option<NaiveDate>, day: NaiveDate, days: i64| {
            last.map(|l| (day - l).num_days() <= days).unwrap_or(false)
        };

        let mut day = start;
        while day <= end {
            let stamp = |hour: u32| Utc.from_utc_datetime(&day.and_hms_opt(hour, 0, 0).unwrap_or_default());
            let tag = day.format("%Y%m%d").to_string();

            // Eclipses at syzygy inside an eclipse season
            let season = ((day - season_epoch).num_days() as f64).rem_euclid(ECLIPSE_SEASON_DAYS);
            let in_season = season < ECLIPSE_SEASON_HALF_WIDTH || season > ECLIPSE_SEASON_DAYS - ECLIPSE_SEASON_HALF_WIDTH;
            let phase = lunar_phase(day);

            if in_season && (phase - 0.5).abs() < half_day {
                let kind = *[EclipseType::Total, EclipseType::Partial, EclipseType::Penumbral]
                    .choose_weighted(&mut rng, |k| match k {
                        EclipseType::Total => 35,
                        _ => 30,
                    })
                    .unwrap_or(&EclipseType::Penumbral);
                events.push(
                    Event::new(format!("syn-lunar-{}", tag), EventType::Eclipse, stamp(20))
                        .with_eclipse(EclipseBody::Lunar, kind)
                        .with_magnitude(rng.gen_range(0.3..1.8))
                        .with_duration_hours(rng.gen_range(1.0..6.0))
                        .with_jerusalem_visible(rng.gen_bool(0.5)),
                );
                last_eclipse = Some(day);
                last_lunar = Some(day);
            }

            if in_season && (phase < half_day || phase >= 1.0 - half_day) {
                let kind = *[EclipseType::Total, EclipseType::Annular, EclipseType::Partial]
                    .choose(&mut rng)
                    .unwrap_or(&EclipseType::Partial);
                events.push(
                    Event::new(format!("syn-solar-{}", tag), EventType::Eclipse, stamp(12))
                        .with_eclipse(EclipseBody::Solar, kind)
                        .with_magnitude(rng.gen_range(0.5..1.08))
                        .with_duration_hours(rng.gen_range(0.05..0.12))
                        .with_jerusalem_visible(rng.gen_bool(0.2)),
                );
                last_eclipse = Some(day);
                last_solar = Some(day);
            }

            // Conjunctions
            if ((day - great_epoch).num_days() as f64).rem_euclid(GREAT_CONJUNCTION_DAYS) < 1.0 {
                events.push(
                    Event::new(format!("syn-great-{}", tag), EventType::Conjunction, stamp(18))
                        .with_planets(&["jupiter", "saturn"])
                        .with_magnitude(rng.gen_range(0.1..1.2)),
                );
                last_conjunction = Some(day);
            } else if rng.gen_bool(CONJUNCTION_DAILY_P) {
                let pair: Vec<&str> = BODIES.choose_multiple(&mut rng, 2).copied().collect();
                events.push(
                    Event::new(format!("syn-conj-{}", tag), EventType::Conjunction, stamp(18))
                        .with_planets(&pair)
                        .with_magnitude(rng.gen_range(0.1..6.0)),
                );
                last_conjunction = Some(day);
            }

            // Solar activity tracks the 11-year cycle
            let activity = (1.0 - (solar_cycle_phase(day) * std::f64::consts::TAU).cos()) / 2.0;
            if rng.gen_bool(0.02 + 0.06 * activity) {
                events.push(
                    Event::new(format!("syn-flare-{}", tag), EventType::SolarFlare, stamp(9))
                        .with_magnitude(rng.gen_range(1.0..10.0)),
                );
                last_flare = Some(day);
            }

            // Disasters
            let boost = |coupled: bool| if coupled { PRECURSOR_BOOST } else { 1.0 };

            if rng.gen_bool((QUAKE_DAILY_P * boost(within(last_eclipse, day, 7))).min(1.0)) {
                let magnitude = 6.0 + rng.gen::<f64>().powi(3) * 3.5;
                events.push(disaster(&mut rng, format!("syn-quake-{}", tag), EventType::Earthquake, stamp(3), magnitude));
            }
            if rng.gen_bool(MINOR_QUAKE_DAILY_P) {
                let magnitude = rng.gen_range(4.5..6.0);
                events.push(disaster(&mut rng, format!("syn-minor-{}", tag), EventType::Earthquake, stamp(4), magnitude));
            }

            let solar_coupled = within(last_solar, day, 30) || within(last_flare, day, 7);
            if rng.gen_bool((VOLCANIC_DAILY_P * boost(solar_coupled)).min(1.0)) {
                let vei = f64::from(rng.gen_range(2u8..=6));
                events.push(disaster(&mut rng, format!("syn-volcano-{}", tag), EventType::Volcanic, stamp(6), vei));
            }

            let month = chrono::Datelike::month(&day);
            if (6..=11).contains(&month)
                && rng.gen_bool((HURRICANE_SEASON_DAILY_P * boost(within(last_conjunction, day, 14))).min(1.0))
            {
                let category = f64::from(rng.gen_range(1u8..=5));
                events.push(disaster(&mut rng, format!("syn-storm-{}", tag), EventType::Hurricane, stamp(15), category));
            }

            let syzygy = phase < 0.05 || phase > 0.95 || (phase - 0.5).abs() < 0.05;
            if rng.gen_bool((TSUNAMI_DAILY_P * boost(syzygy || within(last_lunar, day, 7))).min(1.0)) {
                let intensity = f64::from(rng.gen_range(0u8..=4));
                events.push(disaster(&mut rng, format!("syn-tsunami-{}", tag), EventType::Tsunami, stamp(7), intensity));
            }

            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        events
    }
}

fn disaster(rng: &mut StdRng, id: String, event_type: EventType, timestamp: DateTime<Utc>, magnitude: f64) -> Event {
    let fatalities = (rng.gen::<f64>().powi(4) * 10_000.0).round();
    Event::new(id, event_type, timestamp)
        .with_location(rng.gen_range(-60.0..60.0), rng.gen_range(-180.0..180.0))
        .with_magnitude(magnitude)
        .with_impact(fatalities, fatalities * rng.gen_range(0.1..2.0))
}

impl EventSource for SyntheticHistory {
    fn fetch_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        event_types: Option<&[EventType]>,
    ) -> Result<Vec<Event>, SourceError> {
        Ok(self
            .generate(start.date_naive(), end.date_naive())
            .into_iter()
            .filter(|e| e.timestamp >= start && e.timestamp < end)
            .filter(|e| type_allowed(e, event_types))
            .collect())
    }
}

impl HistoricalEventSource for SyntheticHistory {
    fn fetch_history(&self, hypothesis: Hypothesis, years: u32) -> Result<HistoricalStream, SourceError> {
        let start = span_start(self.end, years)?;
        let types = hypothesis.spec().stream_types;
        let events = self
            .generate(start, self.end)
            .into_iter()
            .filter(|e| types.contains(&e.event_type))
            .collect();

        Ok(HistoricalStream { start, end: self.end, events })
    }
}
