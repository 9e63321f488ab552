//! Features Module - Feature Extraction Engine
//!
//! Maps event records into one fixed 14-dim space shared by clustering,
//! similarity search and scoring.

pub mod layout;
pub mod extract;
pub mod vector;
pub mod scaler;

#[cfg(test)]
mod tests;

pub use layout::{LayoutInfo, FEATURE_COUNT, FEATURE_SCHEMA, FEATURE_VERSION};
pub use scaler::StandardScaler;
pub use vector::{extract_features, to_matrix, EventPoint, FeatureVector};
