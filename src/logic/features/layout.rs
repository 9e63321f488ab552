//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema.** Clustering, similarity search and
//! scoring all index into the same 14-dimensional space, so the order below is
//! a contract.
//!
//! ## Rules
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use super::extract;
use crate::error::CoreError;
use crate::logic::events::Event;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

/// Total number of features
pub const FEATURE_COUNT: usize = 14;

// ============================================================================
// FEATURE SCHEMA (Authoritative source)
// ============================================================================

/// One named column of the event feature space
#[derive(Clone, Copy)]
pub struct FeatureDef {
    pub name: &'static str,
    pub extract: fn(&Event) -> f64,
}

impl std::fmt::Debug for FeatureDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureDef").field("name", &self.name).finish()
    }
}

/// Extractors in the exact order their values appear in the vector
pub const FEATURE_SCHEMA: [FeatureDef; FEATURE_COUNT] = [
    FeatureDef { name: "event_type_code", extract: extract::event_type_code },           // 0
    FeatureDef { name: "normalized_magnitude", extract: extract::normalized_magnitude }, // 1
    FeatureDef { name: "duration_24h", extract: extract::duration_24h },                 // 2
    FeatureDef { name: "jerusalem_proximity", extract: extract::jerusalem_proximity },   // 3
    FeatureDef { name: "feast_day", extract: extract::feast_day },                       // 4
    FeatureDef { name: "inverse_distance", extract: extract::inverse_distance },         // 5
    FeatureDef { name: "lunisolar_position", extract: extract::lunisolar_position },     // 6
    FeatureDef { name: "era_position", extract: extract::era_position },                 // 7
    FeatureDef { name: "solar_involved", extract: extract::solar_involved },             // 8
    FeatureDef { name: "lunar_involved", extract: extract::lunar_involved },             // 9
    FeatureDef { name: "outer_planet_involved", extract: extract::outer_planet_involved }, // 10
    FeatureDef { name: "historical_significance", extract: extract::historical_significance }, // 11
    FeatureDef { name: "prophecy_correlation", extract: extract::prophecy_correlation }, // 12
    FeatureDef { name: "combined_impact", extract: extract::combined_impact },           // 13
];

/// Index of the historical-significance prior (cluster ranking signal)
pub const HISTORICAL_SIGNIFICANCE_INDEX: usize = 11;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of version + ordered feature names
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for def in FEATURE_SCHEMA.iter() {
        hasher.update(def.name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Layout information for serialization/logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_SCHEMA.iter().map(|d| d.name.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

/// Validate that incoming data matches the current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), CoreError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(CoreError::LayoutMismatch {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_SCHEMA.iter().position(|d| d.name == name)
}

pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_SCHEMA.get(index).map(|d| d.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_len_matches_count() {
        assert_eq!(FEATURE_SCHEMA.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(layout_hash(), layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_validate_layout() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());
        assert!(validate_layout(FEATURE_VERSION + 1, layout_hash()).is_err());
        assert!(validate_layout(FEATURE_VERSION, layout_hash().wrapping_add(1)).is_err());
    }

    #[test]
    fn test_feature_lookup() {
        assert_eq!(feature_index("event_type_code"), Some(0));
        assert_eq!(feature_index("historical_significance"), Some(HISTORICAL_SIGNIFICANCE_INDEX));
        assert_eq!(feature_index("combined_impact"), Some(13));
        assert_eq!(feature_index("nonexistent"), None);
        assert_eq!(feature_name(5), Some("inverse_distance"));
        assert_eq!(feature_name(100), None);
    }

    #[test]
    fn test_names_unique() {
        let info = LayoutInfo::current();
        let mut names = info.feature_names.clone();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
    }
}
