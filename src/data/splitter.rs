// ============================================================
// Layer 4 — Stratified Train/Test Splitter
// ============================================================
// Splits samples into two disjoint sets:
//   - Training set: used to fit the forest
//   - Test set:     held out, used for the classification report
//
// Sizes are fixed by the fraction alone:
//   n_train = round(N * train_fraction)
//   n_test  = N - n_train
//
// The split is stratified. Each class gets a share of n_train
// proportional to its size (largest-remainder apportionment),
// then shares are nudged so that every class with at least two
// rows lands in both sets, as long as the totals allow it.
//
// Rows inside each class are shuffled with a StdRng seeded from
// the configured seed, so the same (data, fraction, seed) always
// yields the same partitions.
//
// Reference: rand crate documentation (SeedableRng, SliceRandom)

use std::collections::BTreeMap;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::dataset::Sample;

/// Number of training rows for `total` rows at `train_fraction`.
pub fn train_size(total: usize, train_fraction: f64) -> usize {
    let n = ((total as f64) * train_fraction).round();
    // Clamp to valid range; NaN and negatives become 0
    if n.is_nan() || n <= 0.0 {
        0
    } else {
        (n as usize).min(total)
    }
}

/// Split `samples` into (train, test), stratified on the label.
///
/// # Example
/// ```ignore
/// let (train, test) = split_train_test(samples, 0.8, 42);
/// // 30 rows → 24 train, 6 test
/// ```
pub fn split_train_test(
    samples:        Vec<Sample>,
    train_fraction: f64,
    seed:           u64,
) -> (Vec<Sample>, Vec<Sample>) {
    let labels: Vec<&str> = samples.iter().map(|s| s.label.as_str()).collect();
    let (train_idx, test_idx) = stratified_indices(&labels, train_fraction, seed);

    // Move samples out by index without cloning
    let mut slots: Vec<Option<Sample>> = samples.into_iter().map(Some).collect();
    let mut take  = |idx: &[usize]| -> Vec<Sample> {
        idx.iter().filter_map(|&i| slots[i].take()).collect()
    };
    let train = take(train_idx.as_slice());
    let test  = take(test_idx.as_slice());

    let total = train.len() + test.len();
    tracing::debug!(
        "Dataset split: {} train, {} test ({}% / {}%)",
        train.len(),
        test.len(),
        (train.len() * 100) / total.max(1),
        (test.len()  * 100) / total.max(1),
    );

    (train, test)
}

/// Index-level stratified split. Returns (train_indices, test_indices)
/// into `labels`; together they cover every index exactly once.
pub fn stratified_indices(
    labels:         &[&str],
    train_fraction: f64,
    seed:           u64,
) -> (Vec<usize>, Vec<usize>) {
    let n_train = train_size(labels.len(), train_fraction);

    // BTreeMap keeps class order stable (sorted by label)
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        groups.entry(*label).or_default().push(i);
    }

    let sizes: Vec<usize> = groups.values().map(Vec::len).collect();
    let quotas            = apportion(&sizes, n_train);

    let mut rng   = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n_train);
    let mut test  = Vec::with_capacity(labels.len() - n_train);

    for (mut members, quota) in groups.into_values().zip(quotas) {
        members.shuffle(&mut rng);
        let rest = members.split_off(quota);
        train.extend(members);
        test.extend(rest);
    }

    // Interleave classes so neither set is ordered by label
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    (train, test)
}

/// Per-class training quotas summing to exactly `n_train`.
fn apportion(sizes: &[usize], n_train: usize) -> Vec<usize> {
    let total: usize = sizes.iter().sum();
    if total == 0 {
        return vec![0; sizes.len()];
    }

    // Floor of each exact share, then hand out the leftover rows to
    // the classes with the largest remainders (ties: lower class index)
    let mut quotas: Vec<usize> = sizes.iter().map(|&s| s * n_train / total).collect();
    let assigned: usize        = quotas.iter().sum();

    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = (sizes[a] * n_train) % total;
        let rb = (sizes[b] * n_train) % total;
        rb.cmp(&ra).then(a.cmp(&b))
    });
    for &i in order.iter().take(n_train - assigned) {
        quotas[i] += 1;
    }

    ensure_both_sides(sizes, &mut quotas);
    quotas
}

/// Move single rows between classes until every class with >= 2 rows
/// has at least one row on each side, or no legal move remains.
/// A move never creates a new violation, so this terminates.
fn ensure_both_sides(sizes: &[usize], quotas: &mut [usize]) {
    let k = sizes.len();
    loop {
        let mut moved = false;

        for i in 0..k {
            if sizes[i] < 2 {
                continue;
            }

            if quotas[i] == 0 {
                // Needs a training row: take one from a class that keeps
                // at least one training row afterwards
                let donor = (0..k)
                    .filter(|&d| d != i && quotas[d] >= 2)
                    .max_by_key(|&d| quotas[d]);
                if let Some(d) = donor {
                    quotas[d] -= 1;
                    quotas[i] += 1;
                    moved = true;
                }
            } else if quotas[i] == sizes[i] {
                // Needs a test row: give a training slot to a class that
                // keeps at least one test row afterwards
                let recipient = (0..k)
                    .filter(|&d| d != i && sizes[d] - quotas[d] >= 2)
                    .max_by_key(|&d| sizes[d] - quotas[d]);
                if let Some(d) = recipient {
                    quotas[i] -= 1;
                    quotas[d] += 1;
                    moved = true;
                }
            }
        }

        if !moved {
            break;
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn labels(counts: &[(&'static str, usize)]) -> Vec<&'static str> {
        counts
            .iter()
            .flat_map(|&(l, n)| std::iter::repeat(l).take(n))
            .collect()
    }

    fn count(idx: &[usize], labels: &[&str], class: &str) -> usize {
        idx.iter().filter(|&&i| labels[i] == class).count()
    }

    #[test]
    fn test_correct_split_sizes() {
        let l            = labels(&[("setosa", 10), ("versicolor", 10), ("virginica", 10)]);
        let (train, val) = stratified_indices(&l, 0.8, 42);
        assert_eq!(train.len(), 24);
        assert_eq!(val.len(),   6);
    }

    #[test]
    fn test_sizes_follow_rounding_for_uneven_classes() {
        let l = labels(&[("a", 7), ("b", 13), ("c", 4)]);
        for f in [0.1, 0.33, 0.5, 0.66, 0.75, 0.9] {
            let (train, test) = stratified_indices(&l, f, 7);
            assert_eq!(train.len(), train_size(24, f), "fraction {f}");
            assert_eq!(train.len() + test.len(), 24);
        }
    }

    #[test]
    fn test_all_items_preserved_without_duplicates() {
        let l             = labels(&[("a", 9), ("b", 11), ("c", 5)]);
        let (train, test) = stratified_indices(&l, 0.7, 3);
        let all: BTreeSet<usize> = train.iter().chain(test.iter()).copied().collect();
        assert_eq!(all.len(), l.len());
        assert_eq!(train.len() + test.len(), l.len());
        assert_eq!(all, (0..l.len()).collect());
    }

    #[test]
    fn test_same_seed_same_partitions() {
        let l = labels(&[("a", 10), ("b", 10), ("c", 10)]);
        assert_eq!(stratified_indices(&l, 0.8, 42), stratified_indices(&l, 0.8, 42));
    }

    #[test]
    fn test_every_class_on_both_sides() {
        let l             = labels(&[("setosa", 10), ("versicolor", 10), ("virginica", 10)]);
        let (train, test) = stratified_indices(&l, 0.8, 42);
        for class in ["setosa", "versicolor", "virginica"] {
            assert_eq!(count(&train, &l, class), 8);
            assert_eq!(count(&test,  &l, class), 2);
        }
    }

    #[test]
    fn test_small_class_pushed_into_both_sides() {
        // Proportional shares would give "rare" both rows in train
        let l             = labels(&[("common", 18), ("rare", 2)]);
        let (train, test) = stratified_indices(&l, 0.9, 1);
        assert_eq!(train.len(), 18);
        assert_eq!(count(&train, &l, "rare"), 1);
        assert_eq!(count(&test,  &l, "rare"), 1);
    }

    #[test]
    fn test_impossible_coverage_is_not_an_error() {
        // One test slot cannot hold two classes
        let l             = labels(&[("a", 2), ("b", 8)]);
        let (train, test) = stratified_indices(&l, 0.9, 1);
        assert_eq!(train.len(), 9);
        assert_eq!(test.len(),  1);
    }

    #[test]
    fn test_empty_dataset() {
        let (train, test) = stratified_indices(&[], 0.8, 42);
        assert!(train.is_empty());
        assert!(test.is_empty());
    }

    #[test]
    fn test_split_moves_samples() {
        let samples: Vec<Sample> = (0..10)
            .map(|i| Sample::new(vec![i as f64], if i % 2 == 0 { "even" } else { "odd" }))
            .collect();
        let (train, test) = split_train_test(samples, 0.6, 5);
        assert_eq!(train.len(), 6);
        assert_eq!(test.len(),  4);
        let mut seen: Vec<f64> = train.iter().chain(test.iter()).map(|s| s.features[0]).collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(seen, (0..10).map(|i| i as f64).collect::<Vec<_>>());
    }
}
