//! Scoring Module - Severity & Significance
//!
//! ## Structure
//! - `rules`: constants, ladders and the reference table
//! - `types`: ScoringContext, Alert, AlertLevel
//! - `scorer`: score_event

pub mod rules;
pub mod types;
pub mod scorer;

pub use types::{Alert, AlertLevel, ScoringContext};
pub use scorer::score_event;
