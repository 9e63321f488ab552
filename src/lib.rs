//! Celestial Core - event correlation engine
//!
//! Clusters celestial and geophysical events, matches named multi-event
//! patterns, trains precursor → disaster correlation rules and scores events.
//! All computation is synchronous over in-memory events; fetching them is the
//! job of an `EventSource` / `HistoricalEventSource` implementation.

pub mod constants;
pub mod config;
pub mod error;
pub mod logic;

pub use config::{Config, DetectionConfig, TrainingConfig};
pub use error::{CoreError, CoreResult, SourceError};
pub use logic::correlation::{
    load_registry, predict_risk, predict_risk_from_events, save_registry, train_all_correlations, Hypothesis,
    ModelRegistry, TrainingReport,
};
pub use logic::detection::{detect_patterns, detect_patterns_in, DetectionReport};
pub use logic::events::{Event, EventType};
pub use logic::features::{extract_features, FeatureVector};
pub use logic::scoring::{score_event, Alert, AlertLevel, ScoringContext};
pub use logic::source::{EventSource, HistoricalEventSource, HistoricalStream, InMemorySource, SyntheticHistory};
