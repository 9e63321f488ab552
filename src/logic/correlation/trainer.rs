//! Correlation Rule Trainer
//!
//! Batch job: one day-binned dataset and one classifier per hypothesis.
//! Falling short of the accuracy target is reported in the metrics; it does
//! not fail training.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::dataset::{build_dataset, TrainingSet};
use super::hypothesis::Hypothesis;
use super::metrics::{evaluate, mean_std, stratified_folds, stratified_split};
use super::model::{Classifier, TrainedClassifier};
use super::registry::{CorrelationRule, FeatureImportance, ModelRegistry, RuleMetrics};
use crate::config::TrainingConfig;
use crate::error::CoreResult;
use crate::logic::features::StandardScaler;
use crate::logic::source::{HistoricalEventSource, HistoricalStream};

/// Below this many day-samples a hypothesis is skipped
pub const MIN_TRAINING_SAMPLES: usize = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub per_hypothesis_metrics: BTreeMap<String, RuleMetrics>,
    /// Hypotheses with too little history to train
    pub skipped: Vec<String>,
    /// Fraction of all hypotheses whose test accuracy met the target
    pub success_rate: f64,
    pub trained_at: DateTime<Utc>,
}

fn select(x: &Array2<f64>, y: &[u8], rows: &[usize]) -> (Array2<f64>, Vec<u8>) {
    (x.select(Axis(0), rows), rows.iter().map(|&i| y[i]).collect())
}

/// Mean/std of fold accuracies over the (already scaled) training split
fn cross_validate(
    hypothesis: Hypothesis,
    x: &Array2<f64>,
    y: &[u8],
    config: &TrainingConfig,
    rng: &mut StdRng,
) -> (f64, f64) {
    let indices: Vec<usize> = (0..y.len()).collect();
    let folds = stratified_folds(&indices, y, config.cv_folds, rng);
    if folds.len() < 2 {
        return (0.0, 0.0);
    }

    let kind = hypothesis.spec().model;
    let scores: Vec<f64> = folds
        .iter()
        .enumerate()
        .map(|(k, held_out)| {
            let fit_rows: Vec<usize> = folds
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != k)
                .flat_map(|(_, f)| f.iter().copied())
                .collect();
            let (x_fit, y_fit) = select(x, y, &fit_rows);
            let (x_val, y_val) = select(x, y, held_out);

            let model = TrainedClassifier::fit(kind, &x_fit, &y_fit, config, config.seed.wrapping_add(k as u64 + 1));
            evaluate(&y_val, &model.predict(&x_val)).accuracy
        })
        .collect();

    mean_std(&scores)
}

/// Train one rule from a prepared dataset. `None` when there are too few samples.
pub fn train_on(set: &TrainingSet, config: &TrainingConfig) -> Option<CorrelationRule> {
    let hypothesis = set.hypothesis;
    let spec = hypothesis.spec();

    if set.n_samples() < MIN_TRAINING_SAMPLES {
        log::warn!(
            "Skipping {}: {} samples (need {})",
            hypothesis,
            set.n_samples(),
            MIN_TRAINING_SAMPLES
        );
        return None;
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let (train_rows, test_rows) = stratified_split(&set.labels, config.test_fraction, &mut rng);
    let (x_train, y_train) = select(&set.features, &set.labels, &train_rows);
    let (x_test, y_test) = select(&set.features, &set.labels, &test_rows);

    let (scaler, x_train) = StandardScaler::fit_transform(&x_train);
    let x_test = scaler.transform(&x_test);

    let classifier = TrainedClassifier::fit(spec.model, &x_train, &y_train, config, config.seed);
    let test = evaluate(&y_test, &classifier.predict(&x_test));
    let (cv_mean, cv_std) = cross_validate(hypothesis, &x_train, &y_train, config, &mut rng);

    let feature_importances = set
        .feature_names()
        .into_iter()
        .zip(classifier.feature_importances())
        .map(|(name, importance)| FeatureImportance { name: name.to_string(), importance })
        .collect();

    let metrics = RuleMetrics {
        test,
        cv_mean,
        cv_std,
        n_samples: set.n_samples(),
        n_positive: set.n_positive(),
        n_train: train_rows.len(),
        n_test: test_rows.len(),
        meets_target: test.accuracy >= config.accuracy_target,
        feature_importances,
    };

    log::info!(
        "Trained {}: accuracy {:.3} (target {:.2}, {}), f1 {:.3}, cv {:.3}±{:.3}, {}/{} positive",
        hypothesis,
        test.accuracy,
        config.accuracy_target,
        if metrics.meets_target { "met" } else { "missed" },
        test.f1,
        cv_mean,
        cv_std,
        metrics.n_positive,
        metrics.n_samples
    );

    Some(CorrelationRule {
        rule_id: hypothesis.id().to_string(),
        hypothesis,
        source_event_type: spec.source.to_string(),
        target_disaster_type: spec.target,
        time_window_days: spec.time_window_days,
        classifier,
        scaler,
        metrics,
        trained_at: Utc::now(),
    })
}

pub fn train_rule(hypothesis: Hypothesis, stream: &HistoricalStream, config: &TrainingConfig) -> Option<CorrelationRule> {
    let set = build_dataset(hypothesis, stream);
    log::debug!(
        "{}: {} days, {} events, {} positive days",
        hypothesis,
        set.n_samples(),
        stream.events.len(),
        set.n_positive()
    );
    train_on(&set, config)
}

/// Train every hypothesis in the catalogue into a fresh registry
pub fn train_all_correlations(
    source: &dyn HistoricalEventSource,
    config: &TrainingConfig,
) -> CoreResult<(ModelRegistry, TrainingReport)> {
    let mut registry = ModelRegistry::new();
    let mut per_hypothesis_metrics = BTreeMap::new();
    let mut skipped = Vec::new();

    for hypothesis in Hypothesis::ALL {
        let years = config.years_for(hypothesis.spec().history_years);
        log::info!("Training {} over {} years of history", hypothesis, years);

        let stream = source.fetch_history(hypothesis, years)?;
        match train_rule(hypothesis, &stream, config) {
            Some(rule) => {
                per_hypothesis_metrics.insert(hypothesis.id().to_string(), rule.metrics.clone());
                registry.insert(rule);
            }
            None => skipped.push(hypothesis.id().to_string()),
        }
    }

    let met = per_hypothesis_metrics.values().filter(|m| m.meets_target).count();
    let success_rate = met as f64 / Hypothesis::ALL.len() as f64;
    log::info!(
        "Correlation training finished: {}/{} rules met target (success rate {:.2})",
        met,
        Hypothesis::ALL.len(),
        success_rate
    );

    Ok((
        registry,
        TrainingReport {
            per_hypothesis_metrics,
            skipped,
            success_rate,
            trained_at: Utc::now(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, SourceError};
    use crate::logic::correlation::registry::predict_risk;
    use crate::logic::source::SyntheticHistory;
    use chrono::NaiveDate;

    fn quick_config() -> TrainingConfig {
        TrainingConfig {
            history_years: Some(4),
            ..TrainingConfig::fast()
        }
    }

    #[test]
    fn test_train_all_produces_four_rules() {
        let source = SyntheticHistory::new(11);
        let (registry, report) = train_all_correlations(&source, &quick_config()).unwrap();

        assert_eq!(registry.len(), 4);
        assert!(report.skipped.is_empty());
        assert_eq!(report.per_hypothesis_metrics.len(), 4);
        assert!((0.0..=1.0).contains(&report.success_rate));

        let met = report.per_hypothesis_metrics.values().filter(|m| m.meets_target).count();
        assert!((report.success_rate - met as f64 / 4.0).abs() < 1e-12);

        for hypothesis in Hypothesis::ALL {
            let rule = registry.get(hypothesis.id()).unwrap();
            assert_eq!(rule.n_features(), hypothesis.feature_count());
            assert_eq!(rule.metrics.n_train + rule.metrics.n_test, rule.metrics.n_samples);
            assert_eq!(rule.metrics.feature_importances.len(), hypothesis.feature_count());

            let risk = predict_risk(&registry, hypothesis.id(), &vec![0.0; hypothesis.feature_count()]).unwrap();
            assert!((0.0..=1.0).contains(&risk));
        }
    }

    #[test]
    fn test_training_is_reproducible() {
        let source = SyntheticHistory::new(5);
        let stream = source.fetch_history(Hypothesis::CelestialEarthquake, 3).unwrap();
        let a = train_rule(Hypothesis::CelestialEarthquake, &stream, &TrainingConfig::fast()).unwrap();
        let b = train_rule(Hypothesis::CelestialEarthquake, &stream, &TrainingConfig::fast()).unwrap();
        assert_eq!(a.metrics, b.metrics);
    }

    #[test]
    fn test_metrics_are_ratios() {
        let source = SyntheticHistory::new(9);
        let stream = source.fetch_history(Hypothesis::PlanetaryHurricane, 3).unwrap();
        let rule = train_rule(Hypothesis::PlanetaryHurricane, &stream, &TrainingConfig::fast()).unwrap();
        let m = &rule.metrics;
        for v in [m.test.accuracy, m.test.precision, m.test.recall, m.test.f1, m.cv_mean] {
            assert!((0.0..=1.0).contains(&v), "{}", v);
        }
        assert!(m.cv_std >= 0.0);
        assert_eq!(m.meets_target, m.test.accuracy >= 0.75);
    }

    #[test]
    fn test_short_history_is_skipped() {
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let stream = HistoricalStream { start: day, end: day, events: vec![] };
        assert!(train_rule(Hypothesis::SolarVolcanic, &stream, &TrainingConfig::fast()).is_none());
    }

    struct FailingSource;

    impl HistoricalEventSource for FailingSource {
        fn fetch_history(&self, _: Hypothesis, _: u32) -> Result<HistoricalStream, SourceError> {
            Err(SourceError::Unavailable("archive offline".into()))
        }
    }

    #[test]
    fn test_source_failure_propagates() {
        let result = train_all_correlations(&FailingSource, &quick_config());
        assert!(matches!(result, Err(CoreError::Source(SourceError::Unavailable(_)))));
    }
}
