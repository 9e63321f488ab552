//! Pattern Detection Entry Point
//!
//! One request = one in-memory event list. Clustering, pattern matching and
//! similarity search all run over the same extracted feature vectors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::clustering::{detect_clusters, Cluster, ClusterParams, MIN_POINTS_FOR_CLUSTERING};
use super::events::{Event, EventType};
use super::features::{EventPoint, LayoutInfo};
use super::patterns::{detect_conjunctions, detect_tetrads, ConjunctionPattern, PatternFilter, TetradPattern};
use super::similarity::{find_similar_pairs, HistoricalMatch};
use super::source::EventSource;
use crate::config::DetectionConfig;
use crate::error::CoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub clusters: Vec<Cluster>,
    /// Events in no cluster
    pub noise: Vec<String>,
    pub tetrads: Vec<TetradPattern>,
    pub conjunctions: Vec<ConjunctionPattern>,
    pub historical_matches: Vec<HistoricalMatch>,
    pub total_events: usize,
    pub date_range: DateRange,
    pub layout: LayoutInfo,
}

impl DetectionReport {
    pub fn cluster_of(&self, event_id: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.contains(event_id))
    }
}

/// Fetch `[start, end)` from the source and run every detector over it
pub fn detect_patterns(
    source: &dyn EventSource,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    event_types: Option<&[EventType]>,
    config: &DetectionConfig,
) -> CoreResult<DetectionReport> {
    // Reject bad parameters before touching the source
    ClusterParams::try_from(config)?;

    let events = source.fetch_events(start, end, event_types)?;
    detect_patterns_in(&events, start, end, config)
}

/// Run every detector over already materialised events
pub fn detect_patterns_in(
    events: &[Event],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    config: &DetectionConfig,
) -> CoreResult<DetectionReport> {
    let params = ClusterParams::try_from(config)?;
    let filter = PatternFilter::from_flag(config.distinct_patterns);

    let points: Vec<EventPoint> = events.iter().map(EventPoint::from_event).collect();
    let outcome = detect_clusters(&points, &params);

    // Too few events for any engine: everything stays empty
    let (tetrads, conjunctions, historical_matches) = if events.len() < MIN_POINTS_FOR_CLUSTERING {
        (vec![], vec![], vec![])
    } else {
        (
            filter.apply(detect_tetrads(events)),
            filter.apply(detect_conjunctions(events)),
            find_similar_pairs(&points, config.similarity_threshold, config.similarity_top_k),
        )
    };

    log::info!(
        "Detection {}..{}: {} events, {} clusters, {} tetrads, {} conjunction patterns, {} matches",
        start.date_naive(),
        end.date_naive(),
        events.len(),
        outcome.clusters.len(),
        tetrads.len(),
        conjunctions.len(),
        historical_matches.len()
    );

    Ok(DetectionReport {
        clusters: outcome.clusters,
        noise: outcome.noise,
        tetrads,
        conjunctions,
        historical_matches,
        total_events: events.len(),
        date_range: DateRange { start, end },
        layout: LayoutInfo::current(),
    })
}
