// ============================================================
// Layer 5 — CART Decision Tree
// ============================================================
// A binary classification tree grown with the Gini criterion.
//
// Nodes live in a flat arena (Vec<Node>) and refer to their
// children by index, so a fitted tree is plain data and
// serialises as-is.
//
// Growing a node:
//   1. Stop if the node is pure, has fewer than 2 rows, or sits
//      at max_depth. The leaf predicts its majority class.
//   2. Draw max_features candidate columns from the caller's RNG
//      (all columns when max_features >= n_features).
//   3. For each candidate, sort the rows by value and sweep every
//      boundary between distinct values, tracking left / right
//      class counts incrementally.
//   4. Keep the split with the lowest weighted child impurity.
//      The first candidate found wins a tie.
//
// Class counts are indexed vectors and every sum runs in a fixed
// order, so the same rows and the same RNG state always grow the
// same tree, bit for bit.
//
// Importance of a column = sum over its splits of
//   (node rows / root rows) × (parent gini − weighted child gini)
// normalised to 1.0 per tree (all zeros for a tree that never split).
//
// Reference: Breiman et al. (1984) Classification and Regression Trees

use ndarray::{Array2, ArrayView1};
use rand::{rngs::StdRng, seq::index};
use serde::{Deserialize, Serialize};

/// Growth limits for one tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    /// Deepest level a split may happen at; None grows until pure
    pub max_depth: Option<usize>,

    /// Candidate columns drawn per split
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        class: usize,
    },
    Split {
        feature:   usize,
        threshold: f64,
        /// Rows with value <= threshold
        left:      usize,
        right:     usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes:       Vec<Node>,
    importances: Vec<f64>,
}

struct BestSplit {
    feature:   usize,
    threshold: f64,
    impurity:  f64,
}

/// Mutable state shared by the recursive grower.
struct Grower<'a> {
    records:   &'a Array2<f64>,
    targets:   &'a [usize],
    n_classes: usize,
    params:    TreeParams,
    root_rows: f64,
    nodes:     Vec<Node>,
    gains:     Vec<f64>,
}

impl DecisionTree {
    /// Grow a tree on the given `rows` of `records` (duplicates allowed,
    /// as in a bootstrap sample). `targets[r]` is the class of row `r`.
    pub fn fit(
        records:   &Array2<f64>,
        targets:   &[usize],
        rows:      &[usize],
        n_classes: usize,
        params:    TreeParams,
        rng:       &mut StdRng,
    ) -> Self {
        let n_features = records.ncols();
        let mut grower = Grower {
            records,
            targets,
            n_classes,
            params: TreeParams {
                max_features: params.max_features.clamp(1, n_features.max(1)),
                ..params
            },
            root_rows: rows.len().max(1) as f64,
            nodes:     Vec::new(),
            gains:     vec![0.0; n_features],
        };

        grower.grow(rows.to_vec(), 0, rng);

        let mut importances = grower.gains;
        let total: f64      = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }

        Self {
            nodes: grower.nodes,
            importances,
        }
    }

    /// Class index predicted for one row.
    pub fn predict_row(&self, row: ArrayView1<f64>) -> usize {
        let mut at = 0;
        loop {
            match &self.nodes[at] {
                Node::Leaf { class } => return *class,
                Node::Split { feature, threshold, left, right } => {
                    at = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Per-column impurity decrease, summing to 1.0 (or all zeros).
    pub fn feature_importance(&self) -> &[f64] {
        &self.importances
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], at: usize) -> usize {
            match &nodes[at] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }
}

impl Grower<'_> {
    /// Push the subtree for `rows` and return its root index.
    fn grow(&mut self, rows: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let counts   = self.class_counts(&rows);
        let impurity = gini(&counts, rows.len());

        let at_limit = self.params.max_depth.is_some_and(|d| depth >= d);
        if rows.len() < 2 || impurity == 0.0 || at_limit {
            return self.leaf(&counts);
        }

        let Some(best) = self.best_split(&rows, &counts, rng) else {
            return self.leaf(&counts);
        };

        let gain = (impurity - best.impurity).max(0.0);
        self.gains[best.feature] += rows.len() as f64 / self.root_rows * gain;

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&r| self.records[[r, best.feature]] <= best.threshold);

        // Reserve this node's slot before the children so the root stays at 0
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { class: 0 });

        let left  = self.grow(left_rows, depth + 1, rng);
        let right = self.grow(right_rows, depth + 1, rng);

        self.nodes[id] = Node::Split {
            feature:   best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        id
    }

    fn leaf(&mut self, counts: &[usize]) -> usize {
        self.nodes.push(Node::Leaf { class: majority(counts) });
        self.nodes.len() - 1
    }

    fn class_counts(&self, rows: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &r in rows {
            counts[self.targets[r]] += 1;
        }
        counts
    }

    fn candidate_features(&self, rng: &mut StdRng) -> Vec<usize> {
        let n_features = self.records.ncols();
        if self.params.max_features >= n_features {
            return (0..n_features).collect();
        }
        let mut picked = index::sample(rng, n_features, self.params.max_features).into_vec();
        picked.sort_unstable();
        picked
    }

    fn best_split(&self, rows: &[usize], counts: &[usize], rng: &mut StdRng) -> Option<BestSplit> {
        let n                          = rows.len();
        let mut best: Option<BestSplit> = None;

        for feature in self.candidate_features(rng) {
            let mut sorted = rows.to_vec();
            // Stable sort: equal values keep their incoming order
            sorted.sort_by(|&a, &b| {
                self.records[[a, feature]].total_cmp(&self.records[[b, feature]])
            });

            let mut left  = vec![0usize; self.n_classes];
            let mut right = counts.to_vec();

            for i in 0..n - 1 {
                let class = self.targets[sorted[i]];
                left[class]  += 1;
                right[class] -= 1;

                let here = self.records[[sorted[i], feature]];
                let next = self.records[[sorted[i + 1], feature]];
                if here == next {
                    continue;
                }

                let n_left   = i + 1;
                let n_right  = n - n_left;
                let impurity = (n_left as f64 * gini(&left, n_left)
                    + n_right as f64 * gini(&right, n_right))
                    / n as f64;

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    best = Some(BestSplit {
                        feature,
                        threshold: midpoint(here, next),
                        impurity,
                    });
                }
            }
        }
        best
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Index of the largest count; ties go to the lowest index.
pub fn majority(counts: &[usize]) -> usize {
    let mut best = 0;
    for (i, &c) in counts.iter().enumerate() {
        if c > counts[best] {
            best = i;
        }
    }
    best
}

/// A threshold strictly below `hi` and not below `lo`.
fn midpoint(lo: f64, hi: f64) -> f64 {
    let mid = lo + (hi - lo) / 2.0;
    if mid < hi { mid } else { lo }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    fn all_rows(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    fn full(n_features: usize) -> TreeParams {
        TreeParams { max_depth: None, max_features: n_features }
    }

    #[test]
    fn test_separable_data_is_fit_exactly() {
        let x       = array![[1.0, 0.0], [2.0, 0.0], [3.0, 1.0], [4.0, 1.0]];
        let y       = [0, 0, 1, 1];
        let mut rng = StdRng::seed_from_u64(1);
        let tree    = DecisionTree::fit(&x, &y, &all_rows(4), 2, full(2), &mut rng);

        for (i, &label) in y.iter().enumerate() {
            assert_eq!(tree.predict_row(x.row(i)), label);
        }
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.n_nodes(), 3);
    }

    #[test]
    fn test_threshold_sits_between_values() {
        let x       = array![[1.0], [3.0]];
        let mut rng = StdRng::seed_from_u64(1);
        let tree    = DecisionTree::fit(&x, &[0, 1], &all_rows(2), 2, full(1), &mut rng);
        assert_eq!(tree.predict_row(array![2.0].view()), 0);
        assert_eq!(tree.predict_row(array![2.1].view()), 1);
    }

    #[test]
    fn test_xor_needs_two_levels() {
        let x       = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y       = [0, 1, 1, 0];
        let mut rng = StdRng::seed_from_u64(3);
        let tree    = DecisionTree::fit(&x, &y, &all_rows(4), 2, full(2), &mut rng);
        for (i, &label) in y.iter().enumerate() {
            assert_eq!(tree.predict_row(x.row(i)), label);
        }
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_max_depth_is_respected() {
        let x       = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y       = [0, 1, 1, 0];
        let mut rng = StdRng::seed_from_u64(3);
        let params  = TreeParams { max_depth: Some(1), max_features: 2 };
        let tree    = DecisionTree::fit(&x, &y, &all_rows(4), 2, params, &mut rng);
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn test_pure_node_is_single_leaf_with_zero_importance() {
        let x       = array![[1.0], [2.0], [3.0]];
        let mut rng = StdRng::seed_from_u64(0);
        let tree    = DecisionTree::fit(&x, &[1, 1, 1], &all_rows(3), 2, full(1), &mut rng);
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_row(x.row(0)), 1);
        assert_eq!(tree.feature_importance(), &[0.0]);
    }

    #[test]
    fn test_constant_features_make_a_leaf() {
        let x       = array![[5.0], [5.0], [5.0], [5.0]];
        let mut rng = StdRng::seed_from_u64(0);
        let tree    = DecisionTree::fit(&x, &[0, 1, 1, 0], &all_rows(4), 2, full(1), &mut rng);
        assert_eq!(tree.n_nodes(), 1);
        // 2 vs 2 tie goes to the lower class
        assert_eq!(tree.predict_row(x.row(0)), 0);
    }

    #[test]
    fn test_importance_goes_to_informative_column() {
        let x       = array![[9.0, 1.0], [1.0, 2.0], [5.0, 3.0], [3.0, 4.0]];
        let y       = [0, 0, 1, 1];
        let mut rng = StdRng::seed_from_u64(0);
        let tree    = DecisionTree::fit(&x, &y, &all_rows(4), 2, full(2), &mut rng);
        assert_eq!(tree.feature_importance(), &[0.0, 1.0]);
    }

    #[test]
    fn test_duplicate_rows_from_bootstrap() {
        let x       = array![[1.0], [2.0], [3.0]];
        let y       = [0, 1, 1];
        let mut rng = StdRng::seed_from_u64(0);
        let tree    = DecisionTree::fit(&x, &y, &[0, 0, 2, 2], 2, full(1), &mut rng);
        assert_eq!(tree.predict_row(x.row(0)), 0);
        assert_eq!(tree.predict_row(x.row(2)), 1);
    }

    #[test]
    fn test_same_rng_state_grows_identical_tree() {
        let x = array![
            [5.1, 3.5, 1.4], [4.9, 3.0, 1.4], [7.0, 3.2, 4.7],
            [6.4, 3.2, 4.5], [6.3, 3.3, 6.0], [7.1, 3.0, 5.9],
        ];
        let y      = [0, 0, 1, 1, 2, 2];
        let params = TreeParams { max_depth: None, max_features: 1 };
        let grow   = || {
            let mut rng = StdRng::seed_from_u64(11);
            DecisionTree::fit(&x, &y, &all_rows(6), 3, params, &mut rng)
        };
        let (a, b) = (grow(), grow());
        assert_eq!(a.nodes, b.nodes);
        assert_eq!(a.importances, b.importances);
    }

    #[test]
    fn test_majority_ties_go_low() {
        assert_eq!(majority(&[2, 3, 3]), 1);
        assert_eq!(majority(&[0, 0, 0]), 0);
    }
}
