//! Central Configuration Constants
//!
//! Single source of truth for fixed reference values and configuration defaults.
//! Runtime overrides are read in `config.rs`.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "celestial-core";

// ============================================
// Reference geography
// ============================================

/// Jerusalem latitude (degrees)
pub const REFERENCE_LAT: f64 = 31.7683;

/// Jerusalem longitude (degrees)
pub const REFERENCE_LON: f64 = 35.2137;

/// Mean Earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Events closer than this to the reference point count as near-Israel
pub const NEAR_REFERENCE_KM: f64 = 1000.0;

/// Mean Earth-Moon distance (km)
pub const LUNAR_DISTANCE_KM: f64 = 384_400.0;

// ============================================
// Detection defaults
// ============================================

/// Default clustering radius in time-equivalent days
pub const DEFAULT_EPS_DAYS: f64 = 30.0;

/// Default minimum neighbour count for a core point
pub const DEFAULT_MIN_SAMPLES: usize = 2;

/// Default cosine similarity floor for historical matches
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Default number of historical matches returned
pub const DEFAULT_SIMILARITY_TOP_K: usize = 10;

// ============================================
// Training defaults
// ============================================

pub const DEFAULT_TRAIN_SEED: u64 = 42;
pub const DEFAULT_N_ESTIMATORS: usize = 100;
pub const DEFAULT_MAX_DEPTH: usize = 10;
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
pub const DEFAULT_CV_FOLDS: usize = 5;
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Per-hypothesis accuracy acceptance bar
pub const DEFAULT_ACCURACY_TARGET: f64 = 0.75;

/// File name of the persisted registry
pub const MODEL_FILE_NAME: &str = "correlation_models_v1.json";
