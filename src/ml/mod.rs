// ============================================================
// Layer 5 — ML / Model Layer
// ============================================================
// This layer contains ALL model code. The feature matrix is an
// ndarray Array2; no other layer touches ndarray directly.
//
// What's in this layer:
//
//   tree.rs       — CART decision tree
//                   Gini splits over a node arena, seeded
//                   per-split feature draws, order-stable so
//                   one seed always grows one tree.
//
//   forest.rs     — Random forest classifier
//                   Bagged trees, each grown on a bootstrap
//                   sample. Predicts by majority vote and
//                   reports normalised importances.
//
//   evaluation.rs — Model evaluation
//                   Accuracy, per-class precision / recall /
//                   F1 with macro and weighted averages, and
//                   ranked feature importances.
//
// Reference: Breiman (2001) Random Forests

/// Gini decision tree grown on row indices
pub mod tree;

/// Random forest built from those trees
pub mod forest;

/// Accuracy, classification report and importance ranking
pub mod evaluation;
