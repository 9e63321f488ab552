//! Model Registry
//!
//! Explicit value holding every trained correlation rule, passed to whoever
//! needs risk predictions. Absence of a rule means "untrained", never an error.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::dataset::current_features;
use super::hypothesis::Hypothesis;
use super::metrics::ClassificationMetrics;
use super::model::{Classifier, TrainedClassifier};
use crate::error::{CoreError, CoreResult};
use crate::logic::events::{Event, EventType};
use crate::logic::features::StandardScaler;

/// Bump when any precursor schema changes meaning
pub const REGISTRY_SCHEMA_VERSION: u8 = 1;

/// CRC32 over hypothesis ids and their ordered feature names
pub fn registry_schema_hash() -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(&[REGISTRY_SCHEMA_VERSION]);
    for hypothesis in Hypothesis::ALL {
        hasher.update(hypothesis.id().as_bytes());
        hasher.update(b":");
        for feature in hypothesis.spec().features {
            hasher.update(feature.name.as_bytes());
            hasher.update(b"|");
        }
    }
    hasher.finalize()
}

// ============================================================================
// RULE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub name: String,
    pub importance: f64,
}

/// Evaluation of one trained rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMetrics {
    #[serde(flatten)]
    pub test: ClassificationMetrics,
    pub cv_mean: f64,
    pub cv_std: f64,
    pub n_samples: usize,
    pub n_positive: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub meets_target: bool,
    pub feature_importances: Vec<FeatureImportance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationRule {
    pub rule_id: String,
    pub hypothesis: Hypothesis,
    pub source_event_type: String,
    pub target_disaster_type: EventType,
    pub time_window_days: i64,
    pub classifier: TrainedClassifier,
    pub scaler: StandardScaler,
    pub metrics: RuleMetrics,
    pub trained_at: DateTime<Utc>,
}

impl CorrelationRule {
    pub fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    /// Probability that a qualifying disaster follows within the rule's window
    pub fn predict(&self, features: &[f64]) -> CoreResult<f64> {
        if features.len() != self.n_features() {
            return Err(CoreError::FeatureWidth {
                hypothesis: self.rule_id.clone(),
                expected: self.n_features(),
                actual: features.len(),
            });
        }
        let scaled = self.scaler.transform_row(features);
        Ok(self.classifier.predict_proba_row(&scaled).clamp(0.0, 1.0))
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRegistry {
    pub schema_version: u8,
    pub schema_hash: u32,
    rules: BTreeMap<String, CorrelationRule>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            schema_version: REGISTRY_SCHEMA_VERSION,
            schema_hash: registry_schema_hash(),
            rules: BTreeMap::new(),
        }
    }

    /// Insert or replace the rule for its hypothesis
    pub fn insert(&mut self, rule: CorrelationRule) -> Option<CorrelationRule> {
        self.rules.insert(rule.rule_id.clone(), rule)
    }

    pub fn get(&self, hypothesis_id: &str) -> Option<&CorrelationRule> {
        self.rules.get(hypothesis_id)
    }

    pub fn is_trained(&self, hypothesis: Hypothesis) -> bool {
        self.rules.contains_key(hypothesis.id())
    }

    pub fn rules(&self) -> impl Iterator<Item = &CorrelationRule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn validate_schema(&self) -> CoreResult<()> {
        if self.schema_version != REGISTRY_SCHEMA_VERSION || self.schema_hash != registry_schema_hash() {
            return Err(CoreError::LayoutMismatch {
                expected_version: REGISTRY_SCHEMA_VERSION,
                expected_hash: registry_schema_hash(),
                actual_version: self.schema_version,
                actual_hash: self.schema_hash,
            });
        }
        Ok(())
    }
}

/// Risk in [0, 1] for a hypothesis id. 0.0 when no rule has been trained for it.
pub fn predict_risk(registry: &ModelRegistry, hypothesis_id: &str, features: &[f64]) -> CoreResult<f64> {
    match registry.get(hypothesis_id) {
        Some(rule) => rule.predict(features),
        None => {
            log::debug!("No trained rule for '{}', risk 0.0", hypothesis_id);
            Ok(0.0)
        }
    }
}

/// Build today's precursor vector from recent events, then predict
pub fn predict_risk_from_events(
    registry: &ModelRegistry,
    hypothesis: Hypothesis,
    recent_events: &[Event],
    date: NaiveDate,
) -> CoreResult<f64> {
    let features = current_features(hypothesis, recent_events, date);
    predict_risk(registry, hypothesis.id(), &features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingConfig;
    use ndarray::Array2;

    pub(crate) fn toy_rule(hypothesis: Hypothesis) -> CorrelationRule {
        let width = hypothesis.feature_count();
        let mut x = Array2::<f64>::zeros((40, width));
        let mut y = vec![0u8; 40];
        for i in 0..40 {
            x[[i, 0]] = i as f64;
            y[i] = u8::from(i >= 20);
        }
        let (scaler, scaled) = StandardScaler::fit_transform(&x);
        let spec = hypothesis.spec();
        let classifier = TrainedClassifier::fit(spec.model, &scaled, &y, &TrainingConfig::fast(), 1);

        CorrelationRule {
            rule_id: hypothesis.id().to_string(),
            hypothesis,
            source_event_type: spec.source.to_string(),
            target_disaster_type: spec.target,
            time_window_days: spec.time_window_days,
            classifier,
            scaler,
            metrics: RuleMetrics {
                test: ClassificationMetrics::default(),
                cv_mean: 0.0,
                cv_std: 0.0,
                n_samples: 40,
                n_positive: 20,
                n_train: 32,
                n_test: 8,
                meets_target: false,
                feature_importances: vec![],
            },
            trained_at: Utc::now(),
        }
    }

    #[test]
    fn test_untrained_risk_is_zero() {
        let registry = ModelRegistry::new();
        assert_eq!(predict_risk(&registry, "celestial_earthquake", &[0.0; 10]).unwrap(), 0.0);
        assert_eq!(predict_risk(&registry, "no_such_rule", &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_trained_risk_in_range() {
        let mut registry = ModelRegistry::new();
        registry.insert(toy_rule(Hypothesis::SolarVolcanic));
        assert!(registry.is_trained(Hypothesis::SolarVolcanic));

        let mut high = vec![0.0; 8];
        high[0] = 35.0;
        let low = vec![0.0; 8];
        let p_high = predict_risk(&registry, "solar_volcanic", &high).unwrap();
        let p_low = predict_risk(&registry, "solar_volcanic", &low).unwrap();
        assert!((0.0..=1.0).contains(&p_high));
        assert!(p_high > p_low);
    }

    #[test]
    fn test_width_mismatch_is_error() {
        let mut registry = ModelRegistry::new();
        registry.insert(toy_rule(Hypothesis::CelestialEarthquake));
        let err = predict_risk(&registry, "celestial_earthquake", &[0.0; 8]).unwrap_err();
        assert!(matches!(err, CoreError::FeatureWidth { expected: 10, actual: 8, .. }));
    }

    #[test]
    fn test_insert_replaces() {
        let mut registry = ModelRegistry::new();
        assert!(registry.insert(toy_rule(Hypothesis::LunarTsunami)).is_none());
        assert!(registry.insert(toy_rule(Hypothesis::LunarTsunami)).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_schema_validation() {
        let mut registry = ModelRegistry::new();
        assert!(registry.validate_schema().is_ok());
        registry.schema_hash ^= 1;
        assert!(matches!(registry.validate_schema(), Err(CoreError::LayoutMismatch { .. })));
    }

    #[test]
    fn test_risk_from_events_untrained() {
        let registry = ModelRegistry::new();
        let date = NaiveDate::from_ymd_opt(2024, 4, 8).unwrap();
        let risk = predict_risk_from_events(&registry, Hypothesis::LunarTsunami, &[], date).unwrap();
        assert_eq!(risk, 0.0);
    }
}
