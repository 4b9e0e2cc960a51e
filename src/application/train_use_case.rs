// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate configuration    (before any I/O)
//   Step 2: Load the CSV dataset      (Layer 4 - data)
//   Step 3: Stratified train/test     (Layer 4 - data)
//   Step 4: Fit the random forest     (Layer 5 - ml)
//   Step 5: Evaluate train + test     (Layer 5 - ml)
//   Step 6: Persist model + metrics   (Layer 6 - infra)
//
// Printing the summary is Layer 1's job; this layer only
// returns a TrainOutcome describing what happened.
//
// Any step failing aborts the run. Steps after the failing one
// never execute, so a failed load or fit never touches the
// output directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    loader::{CsvLoader, DEFAULT_LABEL_COLUMN},
    splitter::split_train_test,
};
use crate::domain::dataset::Dataset;
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::{Classifier, DatasetSource};
use crate::infra::{
    artifacts::{ArtifactStore, SavedArtifacts},
    metrics::{MetricsReport, RunConfig},
};
use crate::ml::{
    evaluation::evaluate,
    forest::{ForestParams, RandomForest},
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Every knob of a training run. Serialisable so the relevant part
// can be recorded next to the metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:      String,
    pub output_dir:     String,
    pub label_column:   String,
    pub train_fraction: f64,
    pub seed:           u64,
    pub n_trees:        usize,
    pub max_depth:      Option<usize>,
    pub max_features:   Option<usize>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        let forest = ForestParams::default();
        Self {
            data_path:      "data/dataset.csv".to_string(),
            output_dir:     "models".to_string(),
            label_column:   DEFAULT_LABEL_COLUMN.to_string(),
            train_fraction: 0.8,
            seed:           forest.seed,
            n_trees:        forest.n_trees,
            max_depth:      forest.max_depth,
            max_features:   forest.max_features,
        }
    }
}

impl TrainConfig {
    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees:      self.n_trees,
            max_depth:    self.max_depth,
            max_features: self.max_features,
            seed:         self.seed,
        }
    }

    /// Reject out-of-range options before anything is read or written.
    pub fn validate(&self) -> PipelineResult<()> {
        // NaN fails both comparisons, so it is rejected too
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(PipelineError::Config(format!(
                "train fraction must be strictly between 0 and 1, got {}",
                self.train_fraction
            )));
        }
        if self.label_column.trim().is_empty() {
            return Err(PipelineError::Config("label column name is empty".into()));
        }
        if self.output_dir.trim().is_empty() {
            return Err(PipelineError::Config("output directory is empty".into()));
        }
        self.forest_params().validate()
    }
}

// ─── Outcome ──────────────────────────────────────────────────────────────────
/// What a successful run produced, for the CLI to report.
#[derive(Debug)]
pub struct TrainOutcome {
    pub shape:     (usize, usize),
    pub columns:   Vec<String>,
    pub classes:   Vec<String>,
    pub metrics:   MetricsReport,
    pub artifacts: SavedArtifacts,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainOutcome> {
        let cfg = &self.config;

        // ── Step 1: Validate configuration ────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Load the dataset ──────────────────────────────────────────
        let loader = CsvLoader::new(&cfg.data_path, &cfg.label_column);
        tracing::info!("Loading dataset from '{}'", loader.location());
        let dataset = loader.load()?;
        let shape   = dataset.shape();
        let columns = dataset.column_names();
        let classes = dataset.classes();
        let Dataset { feature_names, label_name, samples } = dataset;

        tracing::info!("Features: {:?}, target '{}' with classes {:?}", feature_names, label_name, classes);

        // ── Step 3: Stratified split ──────────────────────────────────────────
        let (train, test) = split_train_test(samples, cfg.train_fraction, cfg.seed);
        tracing::info!("Split: {} train, {} test", train.len(), test.len());

        // ── Step 4: Fit ───────────────────────────────────────────────────────
        tracing::info!("Training random forest ({} trees)", cfg.n_trees);
        let model = RandomForest::fit(&feature_names, &train, &cfg.forest_params())?;
        tracing::info!("Model training completed");

        // ── Step 5: Evaluate ──────────────────────────────────────────────────
        let evaluation = evaluate(&model, &train, &test)?;
        let metrics    = MetricsReport::new(
            evaluation,
            feature_names,
            model.classes().to_vec(),
            (train.len(), test.len()),
            RunConfig::from(cfg),
        );

        // ── Step 6: Persist ───────────────────────────────────────────────────
        let store     = ArtifactStore::new(&cfg.output_dir);
        let artifacts = store
            .save(&model, &metrics)
            .with_context(|| format!("Cannot write artifacts to '{}'", cfg.output_dir))?;

        Ok(TrainOutcome {
            shape,
            columns,
            classes,
            metrics,
            artifacts,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    use crate::infra::artifacts::{METRICS_FILE, MODEL_FILE};

    fn iris_csv() -> String {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("data")
            .join("dataset.csv")
            .display()
            .to_string()
    }

    fn config_for(data_path: String, output_dir: &Path) -> TrainConfig {
        TrainConfig {
            data_path,
            output_dir: output_dir.display().to_string(),
            ..TrainConfig::default()
        }
    }

    fn pipeline_error(err: &anyhow::Error) -> &PipelineError {
        err.downcast_ref::<PipelineError>()
            .expect("error should carry a PipelineError")
    }

    #[test]
    fn test_end_to_end_on_iris() {
        let out     = tempdir().unwrap();
        let outcome = TrainUseCase::new(config_for(iris_csv(), out.path()))
            .execute()
            .unwrap();

        assert_eq!(outcome.shape, (30, 5));
        let m = &outcome.metrics;
        assert_eq!(m.training_samples, 24);
        assert_eq!(m.test_samples, 6);
        assert!((0.0..=1.0).contains(&m.test_accuracy));
        assert!(m.test_accuracy >= 0.5, "test accuracy {}", m.test_accuracy);

        let report = &m.classification_report;
        assert_eq!(report.per_class.len(), 3);
        for c in report.per_class.values() {
            assert!((0.0..=1.0).contains(&c.precision));
            assert!((0.0..=1.0).contains(&c.recall));
            assert!((0.0..=1.0).contains(&c.f1_score));
            assert_eq!(c.support, 2);
        }

        assert_eq!(m.feature_importances.len(), 4);
        let total: f64 = m.feature_importances.iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(m
            .feature_importances
            .windows(2)
            .all(|w| w[0].importance >= w[1].importance));

        // The artifact reloads and predicts
        let model = ArtifactStore::new(out.path()).load_model().unwrap();
        let label = model.predict(&[5.9, 3.0, 5.1, 1.8]).unwrap();
        assert!(outcome.classes.contains(&label));
    }

    #[test]
    fn test_metrics_document_has_expected_keys() {
        let out = tempdir().unwrap();
        TrainUseCase::new(config_for(iris_csv(), out.path())).execute().unwrap();

        let raw  = std::fs::read_to_string(out.path().join(METRICS_FILE)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        for key in [
            "train_accuracy",
            "test_accuracy",
            "classification_report",
            "feature_importances",
            "training_samples",
            "test_samples",
            "classes",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["feature_importances"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let a = tempdir().unwrap();
        let b = tempdir().unwrap();
        let ra = TrainUseCase::new(config_for(iris_csv(), a.path())).execute().unwrap();
        let rb = TrainUseCase::new(config_for(iris_csv(), b.path())).execute().unwrap();

        assert_eq!(ra.metrics.test_accuracy, rb.metrics.test_accuracy);
        assert_eq!(ra.metrics.classification_report, rb.metrics.classification_report);
        assert_eq!(ra.metrics.feature_importances, rb.metrics.feature_importances);

        let ma    = ArtifactStore::new(a.path()).load_model().unwrap();
        let mb    = ArtifactStore::new(b.path()).load_model().unwrap();
        let probe = vec![
            vec![6.0, 2.9, 4.5, 1.5],
            vec![6.1, 3.0, 4.9, 1.8],
            vec![5.6, 2.8, 4.9, 2.0],
            vec![5.0, 3.4, 1.5, 0.2],
        ];
        assert_eq!(ma.predict_all(&probe).unwrap(), mb.predict_all(&probe).unwrap());

        // Tree growth is order-stable, so the artifacts match byte for byte
        let read = |dir: &Path, file: &str| std::fs::read(dir.join(file)).unwrap();
        assert_eq!(read(a.path(), MODEL_FILE), read(b.path(), MODEL_FILE));
        assert_eq!(read(a.path(), METRICS_FILE), read(b.path(), METRICS_FILE));
    }

    #[test]
    fn test_missing_dataset_leaves_no_model() {
        let out     = tempdir().unwrap();
        let models  = out.path().join("models");
        let missing = out.path().join("nope.csv").display().to_string();

        let err = TrainUseCase::new(config_for(missing, &models)).execute().unwrap_err();
        assert!(matches!(pipeline_error(&err), PipelineError::DataLoad { .. }));
        assert!(!models.join(MODEL_FILE).exists());
    }

    #[test]
    fn test_missing_dataset_keeps_previous_model() {
        let out = tempdir().unwrap();
        TrainUseCase::new(config_for(iris_csv(), out.path())).execute().unwrap();
        let before = std::fs::read(out.path().join(MODEL_FILE)).unwrap();

        let missing = out.path().join("nope.csv").display().to_string();
        assert!(TrainUseCase::new(config_for(missing, out.path())).execute().is_err());
        assert_eq!(std::fs::read(out.path().join(MODEL_FILE)).unwrap(), before);
    }

    #[test]
    fn test_bad_fraction_is_config_error() {
        let out = tempdir().unwrap();
        for f in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            let cfg = TrainConfig { train_fraction: f, ..config_for(iris_csv(), out.path()) };
            let err = TrainUseCase::new(cfg).execute().unwrap_err();
            assert!(
                matches!(pipeline_error(&err), PipelineError::Config(_)),
                "fraction {f} gave {err:?}"
            );
        }
        assert!(!out.path().join(MODEL_FILE).exists());
    }

    #[test]
    fn test_single_class_dataset_is_fit_error() {
        let out  = tempdir().unwrap();
        let data = out.path().join("one_class.csv");
        std::fs::write(
            &data,
            "sepal_length,sepal_width,petal_length,petal_width,species\n\
             5.1,3.5,1.4,0.2,setosa\n\
             4.9,3.0,1.4,0.2,setosa\n\
             4.7,3.2,1.3,0.2,setosa\n\
             5.0,3.6,1.4,0.2,setosa\n\
             5.4,3.9,1.7,0.4,setosa\n",
        )
        .unwrap();

        let models = out.path().join("models");
        let err    = TrainUseCase::new(config_for(data.display().to_string(), &models))
            .execute()
            .unwrap_err();
        assert!(matches!(pipeline_error(&err), PipelineError::Fit(_)));
        assert!(!models.exists());
    }
}
