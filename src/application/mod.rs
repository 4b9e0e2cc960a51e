// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers to accomplish one goal per
// command (train, predict, info).
//
// Rules for this layer:
//   - No tree or metric math here (that's Layer 5)
//   - No printing here (that's Layer 1)
//   - No direct file access (that's Layers 4 and 6)
//   - Only workflow coordination

// The training workflow: load → split → fit → evaluate → persist
pub mod train_use_case;

// Reload a trained model to predict or describe it
pub mod predict_use_case;
