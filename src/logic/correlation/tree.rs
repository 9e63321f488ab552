//! CART Decision Tree
//!
//! Binary splits on `x <= threshold`, weighted samples. Gini for
//! classification (leaf = weighted positive fraction), squared error for
//! boosting residuals (leaf = Newton step when hessians are given).

use ndarray::Array2;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

const EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criterion {
    Gini,
    SquaredError,
}

#[derive(Debug, Clone)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features sampled per node; `None` = all
    pub max_features: Option<usize>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf { value: f64 },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
    importances: Vec<f64>,
}

/// Training inputs shared by every node
pub struct TreeInput<'a> {
    pub x: &'a Array2<f64>,
    /// Class labels as 0/1 for Gini, residuals for squared error
    pub y: &'a [f64],
    pub weights: &'a [f64],
    pub hessians: Option<&'a [f64]>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Stats {
    count: usize,
    w: f64,
    wy: f64,
    wyy: f64,
}

impl Stats {
    fn add(&mut self, y: f64, w: f64) {
        self.count += 1;
        self.w += w;
        self.wy += w * y;
        self.wyy += w * y * y;
    }

    fn minus(&self, other: &Stats) -> Stats {
        Stats {
            count: self.count - other.count,
            w: self.w - other.w,
            wy: self.wy - other.wy,
            wyy: self.wyy - other.wyy,
        }
    }

    /// Weighted total impurity (node weight times impurity)
    fn impurity(&self, criterion: Criterion) -> f64 {
        if self.w <= EPSILON {
            return 0.0;
        }
        match criterion {
            Criterion::Gini => {
                let p = (self.wy / self.w).clamp(0.0, 1.0);
                self.w * 2.0 * p * (1.0 - p)
            }
            Criterion::SquaredError => (self.wyy - self.wy * self.wy / self.w).max(0.0),
        }
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl DecisionTree {
    pub fn fit(
        input: &TreeInput<'_>,
        samples: &[usize],
        criterion: Criterion,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let n_features = input.x.ncols();
        let mut tree = Self {
            nodes: Vec::new(),
            n_features,
            importances: vec![0.0; n_features],
        };
        tree.grow(input, samples.to_vec(), 0, criterion, params, rng);

        let total: f64 = tree.importances.iter().sum();
        if total > EPSILON {
            tree.importances.iter_mut().for_each(|v| *v /= total);
        }
        tree
    }

    fn grow(
        &mut self,
        input: &TreeInput<'_>,
        samples: Vec<usize>,
        depth: usize,
        criterion: Criterion,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node::Leaf { value: leaf_value(input, &samples, criterion) });

        let mut stats = Stats::default();
        for &i in &samples {
            stats.add(input.y[i], input.weights[i]);
        }
        let parent_impurity = stats.impurity(criterion);

        if depth >= params.max_depth
            || samples.len() < params.min_samples_split.max(2)
            || parent_impurity <= EPSILON
        {
            return index;
        }

        let Some(best) = best_split(input, &samples, &stats, parent_impurity, criterion, params, rng) else {
            return index;
        };

        let (left, right): (Vec<usize>, Vec<usize>) =
            samples.iter().copied().partition(|&i| input.x[[i, best.feature]] <= best.threshold);
        if left.is_empty() || right.is_empty() {
            return index;
        }

        self.importances[best.feature] += best.gain;
        let left_index = self.grow(input, left, depth + 1, criterion, params, rng);
        let right_index = self.grow(input, right, depth + 1, criterion, params, rng);
        self.nodes[index] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: left_index,
            right: right_index,
        };
        index
    }

    /// Walk from the root, reading feature `f` through `value_of(f)`
    pub fn predict_with(&self, value_of: impl Fn(usize) -> f64) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split { feature, threshold, left, right }) => {
                    index = if value_of(*feature) <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.predict_with(|f| row.get(f).copied().unwrap_or(0.0))
    }

    pub fn predict_at(&self, x: &Array2<f64>, i: usize) -> f64 {
        self.predict_with(|f| x[[i, f]])
    }

    /// Normalized impurity decrease per feature (sums to 1 unless the tree is a stump)
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }
}

fn leaf_value(input: &TreeInput<'_>, samples: &[usize], criterion: Criterion) -> f64 {
    let (mut num, mut den) = (0.0, 0.0);
    for &i in samples {
        let w = input.weights[i];
        num += w * input.y[i];
        den += match (criterion, input.hessians) {
            (Criterion::SquaredError, Some(h)) => w * h[i],
            _ => w,
        };
    }
    if den <= EPSILON {
        0.0
    } else {
        num / den
    }
}

fn candidate_features(n_features: usize, params: &TreeParams, rng: &mut StdRng) -> Vec<usize> {
    match params.max_features {
        Some(k) if k < n_features => rand::seq::index::sample(rng, n_features, k.max(1)).into_vec(),
        _ => (0..n_features).collect(),
    }
}

fn best_split(
    input: &TreeInput<'_>,
    samples: &[usize],
    total: &Stats,
    parent_impurity: f64,
    criterion: Criterion,
    params: &TreeParams,
    rng: &mut StdRng,
) -> Option<SplitCandidate> {
    let min_leaf = params.min_samples_leaf.max(1);
    let mut best: Option<SplitCandidate> = None;
    let mut sorted = samples.to_vec();

    for feature in candidate_features(input.x.ncols(), params, rng) {
        sorted.sort_by(|&a, &b| input.x[[a, feature]].total_cmp(&input.x[[b, feature]]));

        let mut left = Stats::default();
        for pos in 0..sorted.len() - 1 {
            let i = sorted[pos];
            left.add(input.y[i], input.weights[i]);

            let here = input.x[[i, feature]];
            let next = input.x[[sorted[pos + 1], feature]];
            if next <= here {
                continue;
            }

            let right = total.minus(&left);
            if left.count < min_leaf || right.count < min_leaf || left.w <= EPSILON || right.w <= EPSILON {
                continue;
            }

            let gain = parent_impurity - left.impurity(criterion) - right.impurity(criterion);
            if gain > EPSILON && best.as_ref().map(|b| gain > b.gain).unwrap_or(true) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: here + (next - here) / 2.0,
                    gain,
                });
            }
        }
    }

    best
}
