// ============================================================
// Layer 3 — Dataset Domain Types
// ============================================================
// A Dataset is an ordered list of Samples plus the column
// metadata read from the CSV header.
//
// Example (Iris):
//   feature_names = [sepal_length, sepal_width, petal_length, petal_width]
//   label_name    = species
//   samples[0]    = Sample { features: [5.1, 3.5, 1.4, 0.2], label: "setosa" }
//
// Invariants (enforced by the loader, relied on everywhere else):
//   - every sample has exactly feature_names.len() features
//   - every feature value is finite
//   - every label is non-empty

use std::collections::BTreeSet;

/// One row of the dataset: numeric features and a class label.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Feature values, in the same order as `Dataset::feature_names`
    pub features: Vec<f64>,

    /// The class label (e.g. "setosa")
    pub label: String,
}

impl Sample {
    pub fn new(features: Vec<f64>, label: impl Into<String>) -> Self {
        Self {
            features,
            label: label.into(),
        }
    }
}

/// A labelled tabular dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Names of the feature columns, in column order
    pub feature_names: Vec<String>,

    /// Name of the label column (e.g. "species")
    pub label_name: String,

    /// All rows, in file order
    pub samples: Vec<Sample>,
}

impl Dataset {
    pub fn new(
        feature_names: Vec<String>,
        label_name:    impl Into<String>,
        samples:       Vec<Sample>,
    ) -> Self {
        Self {
            feature_names,
            label_name: label_name.into(),
            samples,
        }
    }

    /// (rows, columns) where columns counts the label column too,
    /// matching how the file looks on disk.
    pub fn shape(&self) -> (usize, usize) {
        (self.samples.len(), self.feature_names.len() + 1)
    }

    /// All column names in file order: features first, then the label.
    pub fn column_names(&self) -> Vec<String> {
        let mut cols = self.feature_names.clone();
        cols.push(self.label_name.clone());
        cols
    }

    /// Distinct labels, sorted. This is the canonical class order
    /// used by the model and by every report.
    pub fn classes(&self) -> Vec<String> {
        sorted_classes(self.samples.iter().map(|s| s.label.as_str()))
    }
}

/// Collect the distinct labels from an iterator, sorted ascending.
pub fn sorted_classes<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    labels
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
