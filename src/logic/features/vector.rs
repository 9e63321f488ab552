//! Feature Vector - Core data structure for clustering and similarity
//!
//! **Versioned feature vector with layout validation**

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::layout::{
    feature_index, layout_hash, validate_layout, FEATURE_COUNT, FEATURE_SCHEMA, FEATURE_VERSION,
};
use crate::error::CoreError;
use crate::logic::events::Event;

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout
    pub layout_hash: u32,
    /// Values in the order defined by FEATURE_SCHEMA
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        feature_index(name).and_then(|i| self.get(i))
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_layout(self.version, self.layout_hash)
    }

    /// JSON form with named values, for debug logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "named_values": FEATURE_SCHEMA.iter()
                .zip(self.values.iter())
                .map(|(def, value)| (def.name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Map one event into the shared 14-dim space. Pure and total.
pub fn extract_features(event: &Event) -> FeatureVector {
    let mut values = [0.0f64; FEATURE_COUNT];
    for (slot, def) in values.iter_mut().zip(FEATURE_SCHEMA.iter()) {
        *slot = (def.extract)(event);
    }
    FeatureVector::from_values(values)
}

/// An event id paired with its vector; the unit clustering and similarity work on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPoint {
    pub event_id: String,
    pub vector: FeatureVector,
}

impl EventPoint {
    pub fn from_event(event: &Event) -> Self {
        Self {
            event_id: event.id.clone(),
            vector: extract_features(event),
        }
    }
}

/// Stack vectors row-wise into an `n x FEATURE_COUNT` matrix
pub fn to_matrix<'a, I>(vectors: I) -> Array2<f64>
where
    I: IntoIterator<Item = &'a FeatureVector>,
    I::IntoIter: ExactSizeIterator,
{
    let vectors = vectors.into_iter();
    let mut matrix = Array2::<f64>::zeros((vectors.len(), FEATURE_COUNT));
    for (mut row, v) in matrix.rows_mut().into_iter().zip(vectors) {
        for (cell, value) in row.iter_mut().zip(v.values.iter()) {
            *cell = *value;
        }
    }
    matrix
}
