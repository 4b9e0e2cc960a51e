// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Reloads the artifacts of a previous training run and:
//   - predicts a label (plus vote-share confidence) for one
//     feature vector
//   - predicts every row of a CSV batch file, keeping row order
//   - describes the stored model (features, classes, recorded
//     accuracies)
//
// Both are one-shot: load, answer, exit.

use std::path::Path;

use anyhow::{Context, Result};

use crate::data::loader::read_feature_rows;
use crate::domain::traits::Classifier;
use crate::infra::{artifacts::ArtifactStore, metrics::MetricsReport};
use crate::ml::forest::{ForestParams, RandomForest};

/// Result of a single prediction.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub label:      String,
    pub confidence: f64,
    /// (feature name, value) in model column order
    pub inputs:     Vec<(String, f64)>,
}

/// One row of a batch prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPrediction {
    /// Zero-based position of the row in the input file
    pub index:      usize,
    pub label:      String,
    pub confidence: f64,
}

/// Description of a stored model.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub model_type: &'static str,
    pub n_trees:    usize,
    pub features:   Vec<String>,
    pub classes:    Vec<String>,
    pub params:     ForestParams,
    pub metrics:    Option<MetricsReport>,
}

pub struct PredictUseCase {
    store: ArtifactStore,
    model: RandomForest,
}

impl PredictUseCase {
    /// Load the model from `model_dir`; fails if `train` never ran there.
    pub fn new(model_dir: impl Into<String>) -> Result<Self> {
        let dir: String = model_dir.into();
        let store       = ArtifactStore::new(dir);
        let model       = store.load_model()?;
        tracing::info!(
            "Model loaded: {} trees, features {:?}",
            model.n_trees(),
            model.feature_names()
        );
        Ok(Self { store, model })
    }

    pub fn predict(&self, features: &[f64]) -> Result<Prediction> {
        let (label, confidence) = self.model.predict_with_confidence(features)?;
        tracing::info!("Prediction: {} (confidence {:.4})", label, confidence);

        let inputs = self
            .model
            .feature_names()
            .iter()
            .cloned()
            .zip(features.iter().copied())
            .collect();

        Ok(Prediction { label, confidence, inputs })
    }

    /// Predict every row of `input`, a CSV whose header names the
    /// model's features.
    pub fn predict_batch(&self, input: &Path) -> Result<Vec<BatchPrediction>> {
        let rows    = read_feature_rows(input, self.model.feature_names())?;
        let results = self
            .model
            .predict_all_with_confidence(&rows)
            .with_context(|| format!("Batch prediction failed for '{}'", input.display()))?;

        tracing::info!("Predicted {} rows", results.len());

        Ok(results
            .into_iter()
            .enumerate()
            .map(|(index, (label, confidence))| BatchPrediction { index, label, confidence })
            .collect())
    }

    pub fn info(&self) -> Result<ModelInfo> {
        let metrics = self.store.load_metrics()?;
        if metrics.is_none() {
            tracing::warn!(
                "No metrics document at '{}'",
                self.store.metrics_path().display()
            );
        }
        Ok(ModelInfo {
            model_type: "Random Forest Classifier",
            n_trees:    self.model.n_trees(),
            features:   self.model.feature_names().to_vec(),
            classes:    self.model.classes().to_vec(),
            params:     self.model.params().clone(),
            metrics,
        })
    }
}
