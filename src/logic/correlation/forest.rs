//! Bagged Forest
//!
//! Bootstrap-resampled Gini trees with balanced class weights and sqrt(d)
//! features per split. Probability is the mean leaf fraction across trees.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::model::balanced_weights;
use super::tree::{Criterion, DecisionTree, TreeInput, TreeParams};

#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    pub fn fit(x: &Array2<f64>, y: &[u8], params: &ForestParams) -> Self {
        let n = y.len();
        let n_features = x.ncols();
        if n == 0 {
            return Self { trees: vec![], n_features };
        }

        let targets: Vec<f64> = y.iter().map(|&v| f64::from(v)).collect();
        let weights = balanced_weights(y);
        let input = TreeInput { x, y: &targets, weights: &weights, hessians: None };

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            max_features: Some(((n_features as f64).sqrt().round() as usize).max(1)),
            ..TreeParams::default()
        };

        let mut rng = StdRng::seed_from_u64(params.seed);
        let trees = (0..params.n_estimators.max(1))
            .map(|_| {
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(&input, &bootstrap, Criterion::Gini, &tree_params, &mut rng)
            })
            .collect();

        Self { trees, n_features }
    }

    pub fn predict_proba_row(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        sum / self.trees.len() as f64
    }

    /// Mean of per-tree normalized importances, renormalized
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

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
