//! Correlation Module - Precursor → Disaster Rule Training
//!
//! Day-binned datasets per hypothesis, tree-ensemble classifiers, evaluation,
//! and the registry that serves risk predictions.

pub mod hypothesis;
pub mod calendar;
pub mod precursors;
pub mod dataset;
pub mod tree;
pub mod forest;
pub mod boosting;
pub mod model;
pub mod metrics;
pub mod registry;
pub mod storage;
pub mod trainer;

pub use hypothesis::{Hypothesis, HypothesisSpec, ModelKind};
pub use model::{Classifier, TrainedClassifier};
pub use metrics::ClassificationMetrics;
pub use registry::{predict_risk, predict_risk_from_events, CorrelationRule, ModelRegistry, RuleMetrics};
pub use storage::{load_registry, save_registry};
pub use trainer::{train_all_correlations, train_rule, TrainingReport};
