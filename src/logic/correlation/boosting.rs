//! Gradient Boosting
//!
//! Logistic loss, balanced sample weights, shallow squared-error trees fit
//! to pseudo-residuals with Newton leaf values.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::model::balanced_weights;
use super::tree::{Criterion, DecisionTree, TreeInput, TreeParams};

const PROBABILITY_FLOOR: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoosting {
    /// Prior log-odds
    init: f64,
    learning_rate: f64,
    trees: Vec<DecisionTree>,
    n_features: usize,
}

pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl GradientBoosting {
    pub fn fit(x: &Array2<f64>, y: &[u8], params: &BoostingParams) -> Self {
        let n = y.len();
        let n_features = x.ncols();
        let targets: Vec<f64> = y.iter().map(|&v| f64::from(v)).collect();
        let weights = balanced_weights(y);

        let total_w: f64 = weights.iter().sum();
        let prior = if total_w > 0.0 {
            targets.iter().zip(&weights).map(|(t, w)| t * w).sum::<f64>() / total_w
        } else {
            0.5
        };
        let prior = prior.clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR);
        let init = (prior / (1.0 - prior)).ln();

        let mut model = Self {
            init,
            learning_rate: params.learning_rate,
            trees: Vec::with_capacity(params.n_estimators),
            n_features,
        };
        if n == 0 {
            return model;
        }

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            ..TreeParams::default()
        };
        let samples: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut scores = vec![init; n];

        for _ in 0..params.n_estimators {
            let probs: Vec<f64> = scores.iter().map(|&s| sigmoid(s)).collect();
            let residuals: Vec<f64> = targets.iter().zip(&probs).map(|(t, p)| t - p).collect();
            let hessians: Vec<f64> = probs.iter().map(|p| (p * (1.0 - p)).max(PROBABILITY_FLOOR)).collect();

            let input = TreeInput {
                x,
                y: &residuals,
                weights: &weights,
                hessians: Some(&hessians),
            };
            let tree = DecisionTree::fit(&input, &samples, Criterion::SquaredError, &tree_params, &mut rng);
            for (i, score) in scores.iter_mut().enumerate() {
                *score += params.learning_rate * tree.predict_at(x, i);
            }
            model.trees.push(tree);
        }

        model
    }

    pub fn decision_function(&self, row: &[f64]) -> f64 {
        self.init
            + self
                .trees
                .iter()
                .map(|t| self.learning_rate * t.predict_row(row))
                .sum::<f64>()
    }

    pub fn predict_proba_row(&self, row: &[f64]) -> f64 {
        sigmoid(self.decision_function(row))
    }

    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (t, v) in totals.iter_mut().zip(tree.feature_importances()) {
                *t += v;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|t| *t /= sum);
        }
        totals
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_rounds(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn params(rounds: usize) -> BoostingParams {
        BoostingParams { n_estimators: rounds, learning_rate: 0.1, max_depth: 3, seed: 1 }
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }

    #[test]
    fn test_balanced_prior_is_even() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let model = GradientBoosting::fit(&x, &[0, 0, 0, 1], &params(0));
        assert!(model.init.abs() < 1e-9);
        assert!((model.predict_proba_row(&[0.0]) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_rounds_sharpen_separation() {
        let x = array![[0.0], [1.0], [2.0], [3.0], [10.0], [11.0], [12.0], [13.0]];
        let y = [0, 0, 0, 0, 1, 1, 1, 1];
        let short = GradientBoosting::fit(&x, &y, &params(5));
        let long = GradientBoosting::fit(&x, &y, &params(50));

        assert!(long.predict_proba_row(&[12.0]) > short.predict_proba_row(&[12.0]));
        assert!(long.predict_proba_row(&[1.0]) < short.predict_proba_row(&[1.0]));
        assert!(long.predict_proba_row(&[12.0]) > 0.9);
        assert_eq!(long.n_rounds(), 50);
    }

    #[test]
    fn test_single_class_stays_bounded() {
        let x = array![[0.0], [1.0]];
        let model = GradientBoosting::fit(&x, &[0, 0], &params(10));
        let p = model.predict_proba_row(&[0.5]);
        assert!((0.0..0.5).contains(&p));
    }
}
