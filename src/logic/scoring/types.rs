//! Scoring types: context in, alert out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::detection::DetectionReport;
use crate::logic::events::EventType;
use crate::logic::patterns::{ConjunctionKind, PatternIdentity};

// ============================================================================
// ALERT LEVEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    Low,
    Medium,
    High,
    Critical,
}

// ============================================================================
// SCORING CONTEXT
// ============================================================================

/// Cluster and pattern membership of one event within its detection window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringContext {
    pub cluster_id: Option<usize>,
    pub cluster_size: usize,
    pub in_tetrad: bool,
    pub in_triple_conjunction: bool,
    pub in_grand_conjunction: bool,
    /// Pattern kinds the event belongs to, e.g. "tetrad"
    pub pattern_types: Vec<String>,
}

impl ScoringContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cluster(mut self, cluster_id: usize, size: usize) -> Self {
        self.cluster_id = Some(cluster_id);
        self.cluster_size = size;
        self
    }

    pub fn with_tetrad(mut self) -> Self {
        self.in_tetrad = true;
        self.add_pattern_type("tetrad");
        self
    }

    pub fn with_conjunction(mut self, kind: ConjunctionKind) -> Self {
        match kind {
            ConjunctionKind::Triple => self.in_triple_conjunction = true,
            ConjunctionKind::Grand => self.in_grand_conjunction = true,
        }
        self.add_pattern_type(kind.as_str());
        self
    }

    fn add_pattern_type(&mut self, kind: &str) {
        if !self.pattern_types.iter().any(|p| p == kind) {
            self.pattern_types.push(kind.to_string());
        }
    }

    pub fn in_conjunction_pattern(&self) -> bool {
        self.in_triple_conjunction || self.in_grand_conjunction
    }

    /// Collect everything the report knows about `event_id`
    pub fn for_event(report: &DetectionReport, event_id: &str) -> Self {
        let mut context = Self::new();

        if let Some(cluster) = report.cluster_of(event_id) {
            context = context.with_cluster(cluster.cluster_id, cluster.size());
        }
        if report.tetrads.iter().any(|t| t.member_ids().iter().any(|id| id == event_id)) {
            context = context.with_tetrad();
        }
        for pattern in &report.conjunctions {
            if pattern.member_ids().iter().any(|id| id == event_id) {
                context = context.with_conjunction(pattern.kind);
            }
        }
        context
    }
}

// ============================================================================
// ALERT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub alert_id: Uuid,
    pub event_ref: String,
    pub event_type: EventType,
    /// 0-100
    pub severity_score: f64,
    /// 0-1
    pub significance_score: f64,
    pub level: AlertLevel,
    pub cluster_id: Option<usize>,
    pub pattern_types: Vec<String>,
    pub references: Vec<String>,
    /// Human-readable contributions, in the order they fired
    pub reasons: Vec<String>,
    pub created_at: DateTime<Utc>,
}
