// ============================================================
// Layer 4 — CSV Dataset Loader
// ============================================================
// Reads a labelled CSV file into a Dataset.
//
// Expected layout (header row required):
//   sepal_length,sepal_width,petal_length,petal_width,species
//   5.1,3.5,1.4,0.2,setosa
//   ...
//
// The label column is chosen by name; every other column is a
// numeric feature. Any row that breaks the shape invariant
// (wrong column count, non-numeric or non-finite value, empty
// label) fails the whole load. Unlike a document corpus, a
// training set with a silently skipped row is a different
// training set, so nothing is skipped.
//
// read_feature_rows applies the same rules to an unlabelled
// batch file for `predict --input`. Columns are matched to the
// model's features by header name, so a file with extra columns
// (the training CSV itself, say) is accepted.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use std::path::{Path, PathBuf};

use crate::domain::dataset::{Dataset, Sample};
use crate::domain::error::{PipelineError, PipelineResult};
use crate::domain::traits::DatasetSource;

/// Default name of the label column.
pub const DEFAULT_LABEL_COLUMN: &str = "species";

/// Loads a labelled dataset from a CSV file.
/// Implements the DatasetSource trait from Layer 3.
pub struct CsvLoader {
    /// Path to the CSV file
    path: PathBuf,

    /// Header name of the label column
    label_column: String,
}

impl CsvLoader {
    pub fn new(path: impl Into<PathBuf>, label_column: impl Into<String>) -> Self {
        Self {
            path:         path.into(),
            label_column: label_column.into(),
        }
    }

    fn fail(&self, reason: impl Into<String>) -> PipelineError {
        PipelineError::data_load(&self.path, reason)
    }
}

impl DatasetSource for CsvLoader {
    fn load(&self) -> PipelineResult<Dataset> {
        if !self.path.is_file() {
            return Err(self.fail("file not found"));
        }

        // flexible(true) so ragged rows reach our own check below and
        // get a message naming the line, rather than a generic csv error
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.fail(e.to_string()))?;

        let headers = reader
            .headers()
            .map_err(|e| self.fail(format!("cannot read header row: {e}")))?
            .clone();

        if headers.iter().all(str::is_empty) {
            return Err(self.fail("missing header row"));
        }

        let label_idx = headers
            .iter()
            .position(|h| h == self.label_column)
            .ok_or_else(|| {
                self.fail(format!("label column '{}' not found in header", self.label_column))
            })?;

        let feature_names: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != label_idx)
            .map(|(_, h)| h.to_string())
            .collect();

        if feature_names.is_empty() {
            return Err(self.fail("no feature columns besides the label"));
        }

        let mut samples = Vec::new();

        for (row_no, record) in reader.records().enumerate() {
            // +2: one for the header, one for 1-based line numbers
            let line   = row_no + 2;
            let record = record.map_err(|e| self.fail(format!("line {line}: {e}")))?;

            if record.len() != headers.len() {
                return Err(self.fail(format!(
                    "line {line}: expected {} columns, found {}",
                    headers.len(),
                    record.len()
                )));
            }

            let mut features = Vec::with_capacity(feature_names.len());
            let mut label    = String::new();

            for (i, field) in record.iter().enumerate() {
                if i == label_idx {
                    label = field.to_string();
                    continue;
                }
                let value = parse_feature(field, line, &headers[i])
                    .map_err(|reason| self.fail(reason))?;
                features.push(value);
            }

            if label.is_empty() {
                return Err(self.fail(format!("line {line}: empty label")));
            }

            samples.push(Sample::new(features, label));
        }

        if samples.is_empty() {
            return Err(self.fail("dataset has no rows"));
        }

        let dataset = Dataset::new(feature_names, self.label_column.clone(), samples);

        tracing::info!(
            "Loaded '{}': shape {:?}, columns {:?}",
            self.path.display(),
            dataset.shape(),
            dataset.column_names(),
        );

        Ok(dataset)
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Read rows of feature values from a CSV whose header names every
/// entry of `feature_names`. Values come back in `feature_names` order;
/// other columns are ignored.
pub fn read_feature_rows(path: &Path, feature_names: &[String]) -> PipelineResult<Vec<Vec<f64>>> {
    let fail = |reason: String| PipelineError::data_load(path, reason);

    if !path.is_file() {
        return Err(fail("file not found".into()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| fail(e.to_string()))?;

    let headers = reader
        .headers()
        .map_err(|e| fail(format!("cannot read header row: {e}")))?
        .clone();

    let positions = feature_names
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| fail(format!("feature column '{name}' not found in header")))
        })
        .collect::<PipelineResult<Vec<usize>>>()?;

    let mut rows = Vec::new();

    for (row_no, record) in reader.records().enumerate() {
        let line   = row_no + 2;
        let record = record.map_err(|e| fail(format!("line {line}: {e}")))?;

        if record.len() != headers.len() {
            return Err(fail(format!(
                "line {line}: expected {} columns, found {}",
                headers.len(),
                record.len()
            )));
        }

        let row = positions
            .iter()
            .map(|&i| parse_feature(&record[i], line, &headers[i]).map_err(&fail))
            .collect::<PipelineResult<Vec<f64>>>()?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(fail("no rows to predict".into()));
    }

    tracing::info!("Read {} rows from '{}'", rows.len(), path.display());
    Ok(rows)
}

/// A finite f64, or the reason it is not one.
fn parse_feature(field: &str, line: usize, column: &str) -> Result<f64, String> {
    let value: f64 = field
        .parse()
        .map_err(|_| format!("line {line}, column '{column}': '{field}' is not a number"))?;
    if !value.is_finite() {
        return Err(format!("line {line}, column '{column}': value must be finite"));
    }
    Ok(value)
}
