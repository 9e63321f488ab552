//! Configuration module
//!
//! Library functions take `DetectionConfig` / `TrainingConfig` explicitly.
//! Only `Config::from_env` touches the process environment.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Parameters for one `detect_patterns` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Neighbourhood radius in time-equivalent days
    pub eps_days: f64,
    /// Minimum number of other points inside the radius for a core point
    pub min_samples: usize,
    /// Cosine similarity floor for historical matches
    pub similarity_threshold: f64,
    /// Maximum historical matches returned
    pub similarity_top_k: usize,
    /// Drop patterns that share an event with an earlier pattern of the same kind
    pub distinct_patterns: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            eps_days: DEFAULT_EPS_DAYS,
            min_samples: DEFAULT_MIN_SAMPLES,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            similarity_top_k: DEFAULT_SIMILARITY_TOP_K,
            distinct_patterns: false,
        }
    }
}

/// Parameters for the correlation batch job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub seed: u64,
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    pub cv_folds: usize,
    pub test_fraction: f64,
    pub accuracy_target: f64,
    /// Caps every hypothesis' history span (years) when set
    pub history_years: Option<u32>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_TRAIN_SEED,
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_depth: DEFAULT_MAX_DEPTH,
            learning_rate: DEFAULT_LEARNING_RATE,
            cv_folds: DEFAULT_CV_FOLDS,
            test_fraction: DEFAULT_TEST_FRACTION,
            accuracy_target: DEFAULT_ACCURACY_TARGET,
            history_years: None,
        }
    }
}

impl TrainingConfig {
    /// Small ensembles for quick runs and tests
    pub fn fast() -> Self {
        Self {
            n_estimators: 10,
            max_depth: 6,
            cv_folds: 3,
            ..Default::default()
        }
    }

    /// History span to request for a hypothesis whose catalogue span is `catalogue_years`
    pub fn years_for(&self, catalogue_years: u32) -> u32 {
        self.history_years.map(|cap| cap.min(catalogue_years)).unwrap_or(catalogue_years)
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub detection: DetectionConfig,
    pub training: TrainingConfig,
    /// Where the batch binary persists the trained registry
    pub model_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let detection = DetectionConfig {
            eps_days: env_parse("CELESTIAL_EPS_DAYS", DEFAULT_EPS_DAYS),
            min_samples: env_parse("CELESTIAL_MIN_SAMPLES", DEFAULT_MIN_SAMPLES),
            similarity_threshold: env_parse("CELESTIAL_SIMILARITY_THRESHOLD", DEFAULT_SIMILARITY_THRESHOLD),
            similarity_top_k: env_parse("CELESTIAL_SIMILARITY_TOP_K", DEFAULT_SIMILARITY_TOP_K),
            distinct_patterns: env_flag("CELESTIAL_DISTINCT_PATTERNS", false),
        };

        let training = TrainingConfig {
            seed: env_parse("CELESTIAL_TRAIN_SEED", DEFAULT_TRAIN_SEED),
            n_estimators: env_parse("CELESTIAL_N_ESTIMATORS", DEFAULT_N_ESTIMATORS),
            max_depth: env_parse("CELESTIAL_MAX_DEPTH", DEFAULT_MAX_DEPTH),
            learning_rate: env_parse("CELESTIAL_LEARNING_RATE", DEFAULT_LEARNING_RATE),
            cv_folds: env_parse("CELESTIAL_CV_FOLDS", DEFAULT_CV_FOLDS),
            test_fraction: env_parse("CELESTIAL_TEST_FRACTION", DEFAULT_TEST_FRACTION),
            accuracy_target: env_parse("CELESTIAL_ACCURACY_TARGET", DEFAULT_ACCURACY_TARGET),
            history_years: env::var("CELESTIAL_HISTORY_YEARS").ok().and_then(|s| s.parse().ok()),
        };

        let model_path = env::var("CELESTIAL_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_model_path());

        Self { detection, training, model_path }
    }
}

/// Get default registry path
pub fn default_model_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(MODEL_FILE_NAME)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|s| s.to_lowercase() == "true" || s == "1")
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.eps_days, 30.0);
        assert_eq!(config.min_samples, 2);
        assert_eq!(config.similarity_threshold, 0.85);
        assert_eq!(config.similarity_top_k, 10);
        assert!(!config.distinct_patterns);
    }

    #[test]
    fn test_training_fast_keeps_target() {
        let config = TrainingConfig::fast();
        assert_eq!(config.accuracy_target, 0.75);
        assert!(config.n_estimators < TrainingConfig::default().n_estimators);
        assert!(config.history_years.is_none());
    }

    #[test]
    fn test_years_for_respects_cap() {
        let mut config = TrainingConfig::default();
        assert_eq!(config.years_for(100), 100);
        config.history_years = Some(3);
        assert_eq!(config.years_for(100), 3);
    }

    #[test]
    fn test_default_model_path_file_name() {
        let path = default_model_path();
        assert!(path.ends_with(MODEL_FILE_NAME));
    }
}
