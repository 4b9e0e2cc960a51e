// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles the concerns that touch the filesystem once the
// model exists:
//
//   artifacts.rs — Model and metrics persistence
//                  Serialises the forest with bincode and the
//                  metrics as pretty JSON. Both files are
//                  staged and renamed so a failed run never
//                  leaves a half-written pair behind.
//
//   metrics.rs   — The metrics record written next to the
//                  model: accuracies, split sizes, the
//                  classification report, ranked importances
//                  and the run configuration.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Model + metrics saving and loading
pub mod artifacts;

/// Serializable metrics record
pub mod metrics;
