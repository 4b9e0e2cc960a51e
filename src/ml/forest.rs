// ============================================================
// Layer 5 — Random Forest Classifier
// ============================================================
// A bagged ensemble of CART decision trees (see tree.rs).
//
// Fitting, for each of n_trees trees:
//   1. Draw a bootstrap sample of the training rows
//      (n draws with replacement)
//   2. Grow a Gini tree on it, drawing max_features candidate
//      columns at every split
//
// Every random draw comes from a single StdRng seeded with
// ForestParams::seed, and tree growth itself is order-stable,
// so the same training rows and params give the same forest,
// tree for tree and bit for bit.
//
// Prediction is a majority vote over trees. Ties go to the
// class that sorts first. The vote share of the winning class
// doubles as the prediction confidence.
//
// Feature importance is each tree's normalised impurity
// decrease, summed over trees and normalised to 1.0.
//
// Reference: Breiman (2001) Random Forests

use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{majority, DecisionTree, TreeParams};

use crate::domain::dataset::{sorted_classes, Sample};
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::Classifier;

// ─── Hyperparameters ──────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees in the ensemble
    pub n_trees: usize,

    /// Maximum depth of each tree; None grows until leaves are pure
    pub max_depth: Option<usize>,

    /// Candidate feature columns drawn per split; None uses every column
    pub max_features: Option<usize>,

    /// Seed for bootstrap and feature draws
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees:      100,
            max_depth:    None,
            max_features: None,
            seed:         42,
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> PipelineResult<()> {
        if self.n_trees == 0 {
            return Err(PipelineError::Config("n_trees must be at least 1".into()));
        }
        if self.max_depth == Some(0) {
            return Err(PipelineError::Config("max_depth must be at least 1".into()));
        }
        if self.max_features == Some(0) {
            return Err(PipelineError::Config("max_features must be at least 1".into()));
        }
        Ok(())
    }
}

// ─── RandomForest ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    feature_names: Vec<String>,
    classes:       Vec<String>,
    members:       Vec<DecisionTree>,
    importances:   Vec<f64>,
    params:        ForestParams,
}

impl RandomForest {
    /// Fit a forest on `samples`, whose features follow `feature_names`.
    pub fn fit(
        feature_names: &[String],
        samples:       &[Sample],
        params:        &ForestParams,
    ) -> PipelineResult<Self> {
        params.validate()?;

        if samples.is_empty() {
            return Err(PipelineError::Fit("training partition is empty".into()));
        }

        let n_features = feature_names.len();
        if n_features == 0 {
            return Err(PipelineError::Fit("no feature columns".into()));
        }
        if let Some(bad) = samples.iter().find(|s| s.features.len() != n_features) {
            return Err(PipelineError::Fit(format!(
                "sample has {} features, expected {}",
                bad.features.len(),
                n_features
            )));
        }

        let classes = sorted_classes(samples.iter().map(|s| s.label.as_str()));
        if classes.len() < 2 {
            return Err(PipelineError::Fit(format!(
                "need at least two classes to fit, found {}",
                classes.len()
            )));
        }

        let records = to_records(samples.iter().map(|s| s.features.as_slice()), n_features)?;
        let targets: Vec<usize> = samples
            .iter()
            .map(|s| class_index(&classes, &s.label))
            .collect();

        let max_features = params.max_features.unwrap_or(n_features).min(n_features);
        let n_rows       = samples.len();
        let tree_params  = TreeParams {
            max_depth: params.max_depth,
            max_features,
        };

        let mut rng         = StdRng::seed_from_u64(params.seed);
        let mut members     = Vec::with_capacity(params.n_trees);
        let mut importances = vec![0.0f64; n_features];

        for _ in 0..params.n_trees {
            let rows: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();
            let tree             = DecisionTree::fit(
                &records,
                &targets,
                &rows,
                classes.len(),
                tree_params,
                &mut rng,
            );

            accumulate_importance(&mut importances, tree.feature_importance());
            members.push(tree);
        }

        normalize(&mut importances);

        tracing::debug!(
            "Fitted {} trees on {} rows × {} features ({} per split)",
            members.len(),
            n_rows,
            n_features,
            max_features,
        );

        Ok(Self {
            feature_names: feature_names.to_vec(),
            classes,
            members,
            importances,
            params: params.clone(),
        })
    }

    pub fn n_trees(&self) -> usize {
        self.members.len()
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Per-class vote share for one feature vector, in `classes()` order.
    pub fn predict_proba(&self, features: &[f64]) -> PipelineResult<Vec<f64>> {
        self.check_width(features)?;
        let records = to_records(std::iter::once(features), self.feature_names.len())?;
        let votes   = self.vote_counts(&records);
        let total   = self.members.len().max(1) as f64;
        Ok(votes[0].iter().map(|&v| v as f64 / total).collect())
    }

    /// Predicted label and its vote share.
    pub fn predict_with_confidence(&self, features: &[f64]) -> PipelineResult<(String, f64)> {
        let proba = self.predict_proba(features)?;
        let best  = argmax(&proba);
        Ok((self.classes[best].clone(), proba[best]))
    }

    /// Label and vote share for every row, voting each tree over the
    /// whole batch. Errors name the offending row.
    pub fn predict_all_with_confidence(
        &self,
        rows: &[Vec<f64>],
    ) -> PipelineResult<Vec<(String, f64)>> {
        for (i, row) in rows.iter().enumerate() {
            self.check_width(row).map_err(|e| match e {
                PipelineError::Config(msg) => PipelineError::Config(format!("row {i}: {msg}")),
                other => other,
            })?;
        }
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let records = to_records(rows.iter().map(Vec::as_slice), self.feature_names.len())?;
        let total   = self.members.len().max(1) as f64;
        Ok(self
            .vote_counts(&records)
            .iter()
            .map(|v| {
                let best = majority(v);
                (self.classes[best].clone(), v[best] as f64 / total)
            })
            .collect())
    }

    fn check_width(&self, features: &[f64]) -> PipelineResult<()> {
        if features.len() != self.feature_names.len() {
            return Err(PipelineError::Config(format!(
                "expected {} feature values ({}), got {}",
                self.feature_names.len(),
                self.feature_names.join(", "),
                features.len()
            )));
        }
        if let Some((i, v)) = features.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(PipelineError::Config(format!(
                "feature '{}' must be finite, got {v}",
                self.feature_names[i]
            )));
        }
        Ok(())
    }

    /// votes[row][class] = number of trees predicting `class` for `row`.
    fn vote_counts(&self, records: &Array2<f64>) -> Vec<Vec<usize>> {
        let mut votes = vec![vec![0usize; self.classes.len()]; records.nrows()];
        for tree in &self.members {
            for (row, record) in records.rows().into_iter().enumerate() {
                votes[row][tree.predict_row(record)] += 1;
            }
        }
        votes
    }
}

impl Classifier for RandomForest {
    fn predict(&self, features: &[f64]) -> PipelineResult<String> {
        self.predict_with_confidence(features).map(|(label, _)| label)
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    fn predict_all(&self, rows: &[Vec<f64>]) -> PipelineResult<Vec<String>> {
        Ok(self
            .predict_all_with_confidence(rows)?
            .into_iter()
            .map(|(label, _)| label)
            .collect())
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn to_records<'a>(
    rows:       impl Iterator<Item = &'a [f64]>,
    n_features: usize,
) -> PipelineResult<Array2<f64>> {
    let flat: Vec<f64> = rows.flat_map(|r| r.iter().copied()).collect();
    let n_rows         = flat.len() / n_features;
    Array2::from_shape_vec((n_rows, n_features), flat)
        .map_err(|e| PipelineError::Fit(format!("cannot build feature matrix: {e}")))
}

fn class_index(classes: &[String], label: &str) -> usize {
    // `classes` is sorted and built from these very labels
    classes
        .binary_search_by(|c| c.as_str().cmp(label))
        .unwrap_or_default()
}

/// Add one tree's importances into the forest totals. A tree that
/// never split reports all zeros and contributes nothing.
fn accumulate_importance(total: &mut [f64], tree_importance: &[f64]) {
    for (sum, &value) in total.iter_mut().zip(tree_importance) {
        *sum += value;
    }
}

/// Scale to sum 1.0; an all-zero vector becomes uniform.
fn normalize(values: &mut [f64]) {
    let sum: f64 = values.iter().sum();
    if sum > 0.0 {
        values.iter_mut().for_each(|v| *v /= sum);
    } else if !values.is_empty() {
        let uniform = 1.0 / values.len() as f64;
        values.iter_mut().for_each(|v| *v = uniform);
    }
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
