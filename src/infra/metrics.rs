// ============================================================
// Layer 6 — Metrics Document
// ============================================================
// The structured record written to metrics.json after each run.
//
// Example (abridged):
//   {
//     "train_accuracy": 1.0,
//     "test_accuracy": 1.0,
//     "training_samples": 24,
//     "test_samples": 6,
//     "features_used": ["sepal_length", ...],
//     "classes": ["setosa", "versicolor", "virginica"],
//     "classification_report": {
//       "per_class": { "setosa": { "precision": 1.0, ... }, ... },
//       "accuracy": 1.0,
//       "macro_avg": { ... },
//       "weighted_avg": { ... }
//     },
//     "feature_importances": [
//       { "feature": "petal_width", "importance": 0.45 }, ...
//     ],
//     "config": { "train_fraction": 0.8, "seed": 42, ... }
//   }
//
// Derived once from the fitted model and the test partition,
// never mutated afterwards.

use serde::{Deserialize, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::ml::evaluation::{ClassificationReport, Evaluation, FeatureImportance};

/// Subset of the run configuration recorded next to the metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub data_path:      String,
    pub train_fraction: f64,
    pub seed:           u64,
    pub n_trees:        usize,
    pub max_depth:      Option<usize>,
    pub max_features:   Option<usize>,
}

impl From<&TrainConfig> for RunConfig {
    fn from(cfg: &TrainConfig) -> Self {
        Self {
            data_path:      cfg.data_path.clone(),
            train_fraction: cfg.train_fraction,
            seed:           cfg.seed,
            n_trees:        cfg.n_trees,
            max_depth:      cfg.max_depth,
            max_features:   cfg.max_features,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub train_accuracy:        f64,
    pub test_accuracy:         f64,
    pub training_samples:      usize,
    pub test_samples:          usize,
    pub features_used:         Vec<String>,
    pub classes:               Vec<String>,
    pub classification_report: ClassificationReport,
    pub feature_importances:   Vec<FeatureImportance>,
    pub config:                RunConfig,
}

impl MetricsReport {
    pub fn new(
        evaluation:    Evaluation,
        features_used: Vec<String>,
        classes:       Vec<String>,
        split_sizes:   (usize, usize),
        config:        RunConfig,
    ) -> Self {
        Self {
            train_accuracy:        evaluation.train_accuracy,
            test_accuracy:         evaluation.test_accuracy,
            training_samples:      split_sizes.0,
            test_samples:          split_sizes.1,
            features_used,
            classes,
            classification_report: evaluation.report,
            feature_importances:   evaluation.feature_importances,
            config,
        }
    }
}
