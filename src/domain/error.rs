// ============================================================
// Layer 3 — Pipeline Errors
// ============================================================
// Every failure the pipeline can report. Each variant aborts the
// run: there is no retry and no partial success.
//
//   DataLoad — dataset missing, unreadable or malformed
//   Config   — invalid options (fraction, tree count, ...)
//   Fit      — the learner received degenerate input or failed
//   Persist  — output directory or artifact could not be written
//   Artifact — a previously written artifact could not be read back

use std::path::PathBuf;

/// Boxed source error for persistence failures, which can come from
/// the filesystem or from a serializer.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The dataset could not be loaded or violates the row-shape invariant.
    #[error("failed to load dataset '{path}': {reason}")]
    DataLoad { path: PathBuf, reason: String },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Model fitting failed.
    #[error("model fitting failed: {0}")]
    Fit(String),

    /// An output artifact could not be written.
    #[error("failed to persist '{path}': {source}")]
    Persist {
        path:   PathBuf,
        #[source]
        source: BoxError,
    },

    /// A model artifact could not be read back.
    #[error("failed to read model artifact '{path}': {reason}")]
    Artifact { path: PathBuf, reason: String },
}

impl PipelineError {
    pub fn data_load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DataLoad {
            path:   path.into(),
            reason: reason.into(),
        }
    }

    pub fn persist(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::Persist {
            path:   path.into(),
            source: source.into(),
        }
    }

    pub fn artifact(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Artifact {
            path:   path.into(),
            reason: reason.into(),
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
