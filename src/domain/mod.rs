// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, enums and traits describing what the
// pipeline works with:
//
//   dataset.rs — a labelled tabular dataset (rows of numeric
//                features plus one categorical label)
//   error.rs   — the error taxonomy shared by every layer
//   traits.rs  — seams the other layers implement
//
// Rules for this layer:
//   - NO ndarray types here
//   - NO file I/O
//   - Only plain data and behaviour over that data
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A loaded dataset and its rows
pub mod dataset;

// PipelineError: DataLoad / Config / Fit / Persist / Artifact
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
