//! Patterns Module - Named Multi-Event Sequences
//!
//! ## Structure
//! - `types`: Pattern data (TetradPattern, ConjunctionPattern, Feast)
//! - `tetrad`: four total lunar eclipses at ~6 month spacing
//! - `conjunction`: triple and grand conjunctions
//! - `filter`: post-filter deciding which overlapping windows survive

pub mod types;
pub mod tetrad;
pub mod conjunction;
pub mod filter;

pub use types::{
    ConjunctionKind,
    ConjunctionPattern,
    Feast,
    FeastAlignment,
    PatternIdentity,
    TetradPattern,
};

pub use tetrad::detect_tetrads;
pub use conjunction::detect_conjunctions;
pub use filter::PatternFilter;
