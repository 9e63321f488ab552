//! Evaluation: stratified splits, folds and binary classification metrics.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Positive class is 1. Undefined ratios are 0.
pub fn evaluate(y_true: &[u8], y_pred: &[u8]) -> ClassificationMetrics {
    let (mut tp, mut fp, mut fn_, mut correct) = (0, 0, 0, 0);
    for (&t, &p) in y_true.iter().zip(y_pred) {
        match (t, p) {
            (1, 1) => tp += 1,
            (0, 1) => fp += 1,
            (1, 0) => fn_ += 1,
            _ => {}
        }
        if t == p {
            correct += 1;
        }
    }

    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    ClassificationMetrics {
        accuracy: ratio(correct, y_true.len().min(y_pred.len())),
        precision,
        recall,
        f1,
    }
}

fn class_indices(indices: &[usize], y: &[u8], rng: &mut StdRng) -> (Vec<usize>, Vec<usize>) {
    let (mut positives, mut negatives): (Vec<usize>, Vec<usize>) = indices.iter().copied().partition(|&i| y[i] == 1);
    positives.shuffle(rng);
    negatives.shuffle(rng);
    (positives, negatives)
}

/// Shuffled split keeping the class ratio in both halves. Returns (train, test), each sorted.
pub fn stratified_split(y: &[u8], test_fraction: f64, rng: &mut StdRng) -> (Vec<usize>, Vec<usize>) {
    let all: Vec<usize> = (0..y.len()).collect();
    let (positives, negatives) = class_indices(&all, y, rng);
    let fraction = test_fraction.clamp(0.0, 1.0);

    let mut train = Vec::with_capacity(y.len());
    let mut test = Vec::new();
    for group in [positives, negatives] {
        let n_test = (group.len() as f64 * fraction).round() as usize;
        test.extend_from_slice(&group[..n_test]);
        train.extend_from_slice(&group[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// `k` folds over `indices`, each class dealt round-robin. Empty folds are dropped.
pub fn stratified_folds(indices: &[usize], y: &[u8], k: usize, rng: &mut StdRng) -> Vec<Vec<usize>> {
    let k = k.max(1);
    let (positives, negatives) = class_indices(indices, y, rng);

    let mut folds = vec![Vec::new(); k];
    for (n, i) in positives.into_iter().chain(negatives).enumerate() {
        folds[n % k].push(i);
    }
    folds.retain(|f| !f.is_empty());
    folds.iter_mut().for_each(|f| f.sort_unstable());
    folds
}

/// Mean and population standard deviation. (0, 0) for empty input.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_metrics_basic() {
        let m = evaluate(&[1, 1, 0, 0], &[1, 0, 1, 0]);
        assert_eq!(m.accuracy, 0.5);
        assert_eq!(m.precision, 0.5);
        assert_eq!(m.recall, 0.5);
        assert_eq!(m.f1, 0.5);
    }

    #[test]
    fn test_zero_division_is_zero() {
        let m = evaluate(&[0, 0, 0], &[0, 0, 0]);
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1, 0.0);
        assert_eq!(evaluate(&[], &[]), ClassificationMetrics::default());
    }

    #[test]
    fn test_split_is_stratified_and_disjoint() {
        let y: Vec<u8> = (0..100).map(|i| u8::from(i % 10 == 0)).collect();
        let (train, test) = stratified_split(&y, 0.2, &mut StdRng::seed_from_u64(42));
        assert_eq!(train.len() + test.len(), 100);
        assert_eq!(test.len(), 20);
        assert_eq!(test.iter().filter(|&&i| y[i] == 1).count(), 2);
        assert!(train.iter().all(|i| !test.contains(i)));
    }

    #[test]
    fn test_split_reproducible() {
        let y: Vec<u8> = (0..50).map(|i| u8::from(i % 3 == 0)).collect();
        let a = stratified_split(&y, 0.2, &mut StdRng::seed_from_u64(42));
        let b = stratified_split(&y, 0.2, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_folds_cover_once() {
        let y: Vec<u8> = (0..23).map(|i| u8::from(i % 4 == 0)).collect();
        let indices: Vec<usize> = (0..23).collect();
        let folds = stratified_folds(&indices, &y, 5, &mut StdRng::seed_from_u64(1));
        assert_eq!(folds.len(), 5);
        let mut seen: Vec<usize> = folds.concat();
        seen.sort_unstable();
        assert_eq!(seen, indices);
        for fold in &folds {
            let pos = fold.iter().filter(|&&i| y[i] == 1).count();
            assert!((1..=2).contains(&pos));
        }
    }

    #[test]
    fn test_more_folds_than_samples() {
        let y = [0u8, 1];
        let folds = stratified_folds(&[0, 1], &y, 5, &mut StdRng::seed_from_u64(1));
        assert_eq!(folds.len(), 2);
    }

    #[test]
    fn test_mean_std() {
        let (m, s) = mean_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(m, 5.0);
        assert_eq!(s, 2.0);
    }
}
