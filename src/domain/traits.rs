// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer only talks to these traits, so the
// loader or the learner can be swapped without touching the
// pipeline itself:
//   - CsvLoader    implements DatasetSource
//   - RandomForest implements Classifier
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::domain::dataset::Dataset;
use crate::domain::error::PipelineResult;

// ─── DatasetSource ────────────────────────────────────────────────────────────
/// Any component that can produce a labelled dataset.
pub trait DatasetSource {
    /// Load the full dataset, validating every row.
    fn load(&self) -> PipelineResult<Dataset>;

    /// Human-readable location, used in logs and error messages.
    fn location(&self) -> String;
}

// ─── Classifier ───────────────────────────────────────────────────────────────
/// A fitted classifier over fixed-width numeric feature vectors.
pub trait Classifier {
    /// Predict the class label for one feature vector.
    fn predict(&self, features: &[f64]) -> PipelineResult<String>;

    /// Class labels the model can emit, in canonical (sorted) order.
    fn classes(&self) -> &[String];

    /// Feature names the model was trained on, in column order.
    fn feature_names(&self) -> &[String];

    /// Per-feature importance scores in column order, summing to 1.0.
    fn feature_importances(&self) -> &[f64];

    /// Predict a label for every row.
    fn predict_all(&self, rows: &[Vec<f64>]) -> PipelineResult<Vec<String>> {
        rows.iter().map(|r| self.predict(r)).collect()
    }
}
