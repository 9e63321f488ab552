//! Clustering Module - Density-Based Spatio-Temporal Grouping
//!
//! Standard density reachability over standardized feature vectors:
//! 1. Standardize all 14 columns (per call)
//! 2. A point is core if at least `min_samples` *other* points lie within
//!    `eps_days / 365`
//! 3. Core points chain into clusters through mutual reachability
//! 4. Non-core points join the cluster of their nearest core neighbour,
//!    everything else is noise
//!
//! Points are processed in event-id order (feature values break ties between
//! duplicated ids), so the partition does not depend on the order the caller
//! supplied them in.

use std::cmp::Ordering;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::DetectionConfig;
use crate::error::{CoreError, CoreResult};
use crate::logic::features::layout::HISTORICAL_SIGNIFICANCE_INDEX;
use crate::logic::features::{to_matrix, EventPoint, StandardScaler, FEATURE_COUNT};


/// Below this many points clustering is skipped
pub const MIN_POINTS_FOR_CLUSTERING: usize = 3;

const DAYS_PER_YEAR: f64 = 365.0;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterParams {
    pub eps_days: f64,
    pub min_samples: usize,
}

impl ClusterParams {
    pub fn new(eps_days: f64, min_samples: usize) -> CoreResult<Self> {
        if !eps_days.is_finite() || eps_days <= 0.0 {
            return Err(CoreError::InvalidParameter(format!(
                "eps_days must be positive, got {}",
                eps_days
            )));
        }
        Ok(Self { eps_days, min_samples })
    }

    /// Radius in the standardized feature space
    pub fn eps(&self) -> f64 {
        self.eps_days / DAYS_PER_YEAR
    }
}

impl TryFrom<&DetectionConfig> for ClusterParams {
    type Error = CoreError;

    fn try_from(config: &DetectionConfig) -> CoreResult<Self> {
        Self::new(config.eps_days, config.min_samples)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub cluster_id: usize,
    /// Sorted by event id
    pub member_event_ids: Vec<String>,
    /// Mean of the members' raw (unscaled) vectors
    pub centroid: [f64; FEATURE_COUNT],
    /// Mean historical-significance prior of the members. Ranking signal only.
    pub significance_score: f64,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.member_event_ids.len()
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.member_event_ids.iter().any(|id| id == event_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterOutcome {
    pub clusters: Vec<Cluster>,
    /// Ids reachable from no core point
    pub noise: Vec<String>,
}

// ============================================================================
// DETECTION
// ============================================================================

pub fn detect_clusters(points: &[EventPoint], params: &ClusterParams) -> ClusterOutcome {
    let n = points.len();
    if n < MIN_POINTS_FOR_CLUSTERING {
        log::debug!("Clustering skipped: {} points", n);
        return ClusterOutcome {
            clusters: vec![],
            noise: sorted_ids(points),
        };
    }

    // Canonical order: id, then vector values for duplicated ids
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        points[a]
            .event_id
            .cmp(&points[b].event_id)
            .then_with(|| compare_values(&points[a].vector.values, &points[b].vector.values))
    });
    let ordered: Vec<&EventPoint> = order.iter().map(|&i| &points[i]).collect();

    let raw = to_matrix(ordered.iter().map(|p| &p.vector));
    let (_, scaled) = StandardScaler::fit_transform(&raw);
    let eps = params.eps();

    // Pairwise neighbourhoods (self excluded)
    let mut neighbours: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = scaled
                .row(i)
                .iter()
                .zip(scaled.row(j).iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            if d <= eps {
                neighbours[i].push((j, d));
                neighbours[j].push((i, d));
            }
        }
    }

    let is_core: Vec<bool> = neighbours.iter().map(|nb| nb.len() >= params.min_samples).collect();

    // Chain core points
    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut next_label = 0usize;
    for seed in 0..n {
        if !is_core[seed] || labels[seed].is_some() {
            continue;
        }
        labels[seed] = Some(next_label);
        let mut queue = VecDeque::from([seed]);
        while let Some(p) = queue.pop_front() {
            for &(q, _) in &neighbours[p] {
                if is_core[q] && labels[q].is_none() {
                    labels[q] = Some(next_label);
                    queue.push_back(q);
                }
            }
        }
        next_label += 1;
    }

    // Border points: nearest core neighbour wins, ties to the lower canonical index
    for i in 0..n {
        if is_core[i] {
            continue;
        }
        let nearest = neighbours[i]
            .iter()
            .filter(|(q, _)| is_core[*q])
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        if let Some(&(q, _)) = nearest {
            labels[i] = labels[q];
        }
    }

    let mut clusters: Vec<Cluster> = (0..next_label)
        .map(|label| {
            let members: Vec<usize> = (0..n).filter(|&i| labels[i] == Some(label)).collect();
            build_cluster(label, &members, &ordered)
        })
        .collect();
    clusters.retain(|c| !c.member_event_ids.is_empty());

    let noise: Vec<String> = (0..n)
        .filter(|&i| labels[i].is_none())
        .map(|i| ordered[i].event_id.clone())
        .collect();

    log::debug!(
        "Clustering: {} points -> {} clusters, {} noise (eps={:.4}, min_samples={})",
        n,
        clusters.len(),
        noise.len(),
        eps,
        params.min_samples
    );

    ClusterOutcome { clusters, noise }
}

fn build_cluster(cluster_id: usize, members: &[usize], ordered: &[&EventPoint]) -> Cluster {
    let mut centroid = [0.0f64; FEATURE_COUNT];
    for &i in members {
        for (c, v) in centroid.iter_mut().zip(ordered[i].vector.values.iter()) {
            *c += v;
        }
    }
    let count = members.len().max(1) as f64;
    for c in centroid.iter_mut() {
        *c /= count;
    }

    Cluster {
        cluster_id,
        member_event_ids: members.iter().map(|&i| ordered[i].event_id.clone()).collect(),
        significance_score: centroid[HISTORICAL_SIGNIFICANCE_INDEX],
        centroid,
    }
}

fn compare_values(a: &[f64], b: &[f64]) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn sorted_ids(points: &[EventPoint]) -> Vec<String> {
    let mut ids: Vec<String> = points.iter().map(|p| p.event_id.clone()).collect();
    ids.sort();
    ids
}
