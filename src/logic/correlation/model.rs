//! Classifier seam
//!
//! Rules hold a `TrainedClassifier`; everything downstream only needs
//! probability output and importances through `Classifier`.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::boosting::{BoostingParams, GradientBoosting};
use super::forest::{ForestParams, RandomForest};
use super::hypothesis::ModelKind;
use crate::config::TrainingConfig;

/// Probability at or above which a sample is predicted positive
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Depth used for boosted trees regardless of the forest depth
pub const BOOSTED_MAX_DEPTH: usize = 3;

pub trait Classifier {
    /// P(positive) for one raw (already scaled) feature row
    fn predict_proba_row(&self, row: &[f64]) -> f64;

    fn feature_importances(&self) -> Vec<f64>;

    fn n_features(&self) -> usize;

    fn predict_proba(&self, x: &Array2<f64>) -> Vec<f64> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_proba_row(&row.to_vec()))
            .collect()
    }

    fn predict(&self, x: &Array2<f64>) -> Vec<u8> {
        self.predict_proba(x)
            .into_iter()
            .map(|p| u8::from(p >= DECISION_THRESHOLD))
            .collect()
    }
}

/// Per-sample weights giving both classes equal total weight (n / (2 * n_class)).
/// Unit weights when either class is absent.
pub fn balanced_weights(y: &[u8]) -> Vec<f64> {
    let n = y.len() as f64;
    let positives = y.iter().filter(|&&v| v == 1).count() as f64;
    let negatives = n - positives;
    if positives == 0.0 || negatives == 0.0 {
        return vec![1.0; y.len()];
    }

    let (w_pos, w_neg) = (n / (2.0 * positives), n / (2.0 * negatives));
    y.iter().map(|&v| if v == 1 { w_pos } else { w_neg }).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainedClassifier {
    BaggedForest(RandomForest),
    BoostedTrees(GradientBoosting),
}

impl TrainedClassifier {
    pub fn fit(kind: ModelKind, x: &Array2<f64>, y: &[u8], config: &TrainingConfig, seed: u64) -> Self {
        match kind {
            ModelKind::BaggedForest => TrainedClassifier::BaggedForest(RandomForest::fit(
                x,
                y,
                &ForestParams {
                    n_estimators: config.n_estimators,
                    max_depth: config.max_depth,
                    seed,
                },
            )),
            ModelKind::BoostedTrees => TrainedClassifier::BoostedTrees(GradientBoosting::fit(
                x,
                y,
                &BoostingParams {
                    n_estimators: config.n_estimators,
                    learning_rate: config.learning_rate,
                    max_depth: BOOSTED_MAX_DEPTH.min(config.max_depth),
                    seed,
                },
            )),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedClassifier::BaggedForest(_) => ModelKind::BaggedForest,
            TrainedClassifier::BoostedTrees(_) => ModelKind::BoostedTrees,
        }
    }
}

impl Classifier for TrainedClassifier {
    fn predict_proba_row(&self, row: &[f64]) -> f64 {
        match self {
            TrainedClassifier::BaggedForest(m) => m.predict_proba_row(row),
            TrainedClassifier::BoostedTrees(m) => m.predict_proba_row(row),
        }
    }

    fn feature_importances(&self) -> Vec<f64> {
        match self {
            TrainedClassifier::BaggedForest(m) => m.feature_importances(),
            TrainedClassifier::BoostedTrees(m) => m.feature_importances(),
        }
    }

    fn n_features(&self) -> usize {
        match self {
            TrainedClassifier::BaggedForest(m) => m.n_features(),
            TrainedClassifier::BoostedTrees(m) => m.n_features(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// y = 1 when x0 > 0.5, x1 is noise
    pub(crate) fn threshold_data(n: usize, seed: u64) -> (Array2<f64>, Vec<u8>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut x = Array2::<f64>::zeros((n, 2));
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            x[[i, 0]] = rng.gen::<f64>();
            x[[i, 1]] = rng.gen::<f64>();
            y.push(u8::from(x[[i, 0]] > 0.5));
        }
        (x, y)
    }

    fn accuracy(model: &impl Classifier, x: &Array2<f64>, y: &[u8]) -> f64 {
        let pred = model.predict(x);
        pred.iter().zip(y).filter(|(a, b)| a == b).count() as f64 / y.len() as f64
    }

    #[test]
    fn test_balanced_weights() {
        let w = balanced_weights(&[1, 0, 0, 0]);
        assert!((w[0] - 2.0).abs() < 1e-12);
        assert!((w[1] - 4.0 / 6.0).abs() < 1e-12);
        let total_pos: f64 = w[..1].iter().sum();
        let total_neg: f64 = w[1..].iter().sum();
        assert!((total_pos - total_neg).abs() < 1e-12);
    }

    #[test]
    fn test_balanced_weights_single_class() {
        assert_eq!(balanced_weights(&[0, 0, 0]), vec![1.0, 1.0, 1.0]);
        assert_eq!(balanced_weights(&[1, 1]), vec![1.0, 1.0]);
        assert!(balanced_weights(&[]).is_empty());
    }

    #[test]
    fn test_both_kinds_learn_threshold() {
        let (x, y) = threshold_data(300, 1);
        let (x_test, y_test) = threshold_data(200, 2);
        let config = TrainingConfig::fast();

        for kind in [ModelKind::BaggedForest, ModelKind::BoostedTrees] {
            let model = TrainedClassifier::fit(kind, &x, &y, &config, 42);
            assert_eq!(model.kind(), kind);
            assert_eq!(model.n_features(), 2);
            let acc = accuracy(&model, &x_test, &y_test);
            assert!(acc >= 0.9, "{:?} accuracy {}", kind, acc);

            let importances = model.feature_importances();
            assert!(importances[0] > importances[1], "{:?} {:?}", kind, importances);
        }
    }

    #[test]
    fn test_serde_keeps_predictions() {
        let (x, y) = threshold_data(100, 3);
        let model = TrainedClassifier::fit(ModelKind::BoostedTrees, &x, &y, &TrainingConfig::fast(), 42);
        let json = serde_json::to_string(&model).unwrap();
        let restored: TrainedClassifier = serde_json::from_str(&json).unwrap();
        assert_eq!(model.predict_proba(&x), restored.predict_proba(&x));
    }
}
