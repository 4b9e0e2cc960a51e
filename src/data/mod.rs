// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the CSV on disk and the rows the forest
// is fitted on.
//
// The pipeline flows in this order:
//
//   dataset.csv
//       │
//       ▼
//   CsvLoader         → parses and validates rows into a Dataset
//       │
//       ▼
//   split_train_test  → seeded, stratified train/test partition
//       │
//       ▼
//   Layer 5 (forest fit and evaluation)
//
// Each module is responsible for exactly one step and is
// tested on its own.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Loads a labelled CSV file using the csv crate
pub mod loader;

/// Stratified, seeded train/test split
pub mod splitter;
