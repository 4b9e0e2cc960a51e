// ============================================================
// Layer 6 — Artifact Store
// ============================================================
// Writes and reads the two artifacts of a training run:
//
//   <output_dir>/
//     model.bin     ← bincode-serialised RandomForest
//     metrics.json  ← MetricsReport, pretty-printed JSON
//
// Both files are overwritten on every run.
//
// Writes are staged: each file is written to "<name>.tmp" first
// and only renamed into place once both staged writes succeeded.
// If anything fails, the staged files are removed, and a model
// already renamed into place is removed again when the metrics
// rename fails. A failed run therefore never leaves a fresh
// model/metrics pair behind that looks valid.
//
// Reference: Rust Book §9 (Error Handling)
//            bincode / serde_json documentation

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::domain::error::{PipelineError, PipelineResult};
use crate::infra::metrics::MetricsReport;
use crate::ml::forest::RandomForest;

pub const MODEL_FILE:   &str = "model.bin";
pub const METRICS_FILE: &str = "metrics.json";

/// Paths and sizes of a successful save.
#[derive(Debug, Clone)]
pub struct SavedArtifacts {
    pub model_path:   PathBuf,
    pub metrics_path: PathBuf,
    pub model_bytes:  u64,
}

/// Owns the output directory of the pipeline.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Does not touch the filesystem; the directory is created on save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.dir.join(METRICS_FILE)
    }

    /// Persist both artifacts, all or nothing.
    pub fn save(&self, model: &RandomForest, metrics: &MetricsReport) -> PipelineResult<SavedArtifacts> {
        let model_path   = self.model_path();
        let metrics_path = self.metrics_path();

        fs::create_dir_all(&self.dir).map_err(|e| PipelineError::persist(&self.dir, e))?;

        let model_bytes = bincode::serialize(model)
            .map_err(|e| PipelineError::persist(&model_path, e))?;
        let metrics_json = serde_json::to_string_pretty(metrics)
            .map_err(|e| PipelineError::persist(&metrics_path, e))?;

        let model_tmp   = staging_path(&model_path);
        let metrics_tmp = staging_path(&metrics_path);

        let staged = write_file(&model_tmp, &model_bytes)
            .and_then(|_| write_file(&metrics_tmp, metrics_json.as_bytes()));
        if let Err(e) = staged {
            remove_quietly(&[model_tmp.as_path(), metrics_tmp.as_path()]);
            return Err(e);
        }

        if let Err(e) = fs::rename(&model_tmp, &model_path) {
            remove_quietly(&[model_tmp.as_path(), metrics_tmp.as_path()]);
            return Err(PipelineError::persist(&model_path, e));
        }
        if let Err(e) = fs::rename(&metrics_tmp, &metrics_path) {
            remove_quietly(&[metrics_tmp.as_path(), model_path.as_path()]);
            return Err(PipelineError::persist(&metrics_path, e));
        }

        tracing::info!(
            "Saved model ({:.2} KB) to '{}' and metrics to '{}'",
            model_bytes.len() as f64 / 1024.0,
            model_path.display(),
            metrics_path.display(),
        );

        Ok(SavedArtifacts {
            model_path,
            metrics_path,
            model_bytes: model_bytes.len() as u64,
        })
    }

    /// Load the model written by a previous `save`.
    pub fn load_model(&self) -> PipelineResult<RandomForest> {
        let path  = self.model_path();
        let bytes = fs::read(&path).map_err(|e| {
            PipelineError::artifact(&path, format!("{e}. Have you run 'train' first?"))
        })?;
        let model: RandomForest = bincode::deserialize(&bytes)
            .map_err(|e| PipelineError::artifact(&path, format!("not a valid model file: {e}")))?;
        tracing::debug!("Loaded model from '{}'", path.display());
        Ok(model)
    }

    /// Load the metrics document if one exists.
    pub fn load_metrics(&self) -> PipelineResult<Option<MetricsReport>> {
        let path = self.metrics_path();
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .map_err(|e| PipelineError::artifact(&path, e.to_string()))?;
        let report = serde_json::from_str(&json)
            .map_err(|e| PipelineError::artifact(&path, format!("not a valid metrics file: {e}")))?;
        Ok(Some(report))
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_file(path: &Path, bytes: &[u8]) -> PipelineResult<()> {
    fs::write(path, bytes).map_err(|e| PipelineError::persist(path, e))
}

fn remove_quietly(paths: &[&Path]) {
    for path in paths {
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!("Could not remove '{}': {}", path.display(), e);
            }
        }
    }
}
