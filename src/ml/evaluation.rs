// ============================================================
// Layer 5 — Evaluation
// ============================================================
// Turns predictions into the numbers that end up in the
// metrics document:
//
//   accuracy   = correct / total           (0.0 when total = 0)
//   precision  = TP / predicted positives  (0.0 when denominator = 0)
//   recall     = TP / actual positives     (0.0 when denominator = 0)
//   f1         = 2PR / (P + R)             (0.0 when P + R = 0)
//   macro avg  = unweighted mean over classes
//   weighted   = mean weighted by support  (0.0 when total support = 0)
//
// The text rendering follows the familiar sklearn layout.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::dataset::{sorted_classes, Sample};
use crate::domain::error::PipelineResult;
use crate::domain::traits::Classifier;

/// Precision / recall / F1 / support for one class or one average row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall:    f64,
    pub f1_score:  f64,
    pub support:   usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    /// Keyed by class label, sorted
    pub per_class:    BTreeMap<String, ClassMetrics>,
    pub accuracy:     f64,
    pub macro_avg:    ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature:    String,
    pub importance: f64,
}

/// Everything computed in the evaluate step.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub train_accuracy:      f64,
    pub test_accuracy:       f64,
    pub report:              ClassificationReport,
    pub feature_importances: Vec<FeatureImportance>,
}

/// Fraction of exact label matches.
pub fn accuracy(actual: &[String], predicted: &[String]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let correct = actual
        .iter()
        .zip(predicted)
        .filter(|(a, p)| a == p)
        .count();
    correct as f64 / actual.len() as f64
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn harmonic_mean(p: f64, r: f64) -> f64 {
    if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
}

/// Build the per-class report. `classes` is the model's class list;
/// labels seen only in `actual` are added so nothing is dropped.
pub fn classification_report(
    classes:   &[String],
    actual:    &[String],
    predicted: &[String],
) -> ClassificationReport {
    let labels = sorted_classes(
        classes
            .iter()
            .chain(actual.iter())
            .chain(predicted.iter())
            .map(String::as_str),
    );

    let mut per_class = BTreeMap::new();
    for label in &labels {
        let tp = actual
            .iter()
            .zip(predicted)
            .filter(|(a, p)| *a == label && *p == label)
            .count();
        let predicted_pos = predicted.iter().filter(|p| *p == label).count();
        let actual_pos    = actual.iter().filter(|a| *a == label).count();

        let precision = ratio(tp, predicted_pos);
        let recall    = ratio(tp, actual_pos);
        per_class.insert(
            label.clone(),
            ClassMetrics {
                precision,
                recall,
                f1_score: harmonic_mean(precision, recall),
                support:  actual_pos,
            },
        );
    }

    let total_support: usize = per_class.values().map(|m| m.support).sum();
    let n_classes            = per_class.len().max(1) as f64;

    let macro_avg = ClassMetrics {
        precision: per_class.values().map(|m| m.precision).sum::<f64>() / n_classes,
        recall:    per_class.values().map(|m| m.recall).sum::<f64>() / n_classes,
        f1_score:  per_class.values().map(|m| m.f1_score).sum::<f64>() / n_classes,
        support:   total_support,
    };

    let weighted = |f: fn(&ClassMetrics) -> f64| -> f64 {
        if total_support == 0 {
            return 0.0;
        }
        per_class
            .values()
            .map(|m| f(m) * m.support as f64)
            .sum::<f64>()
            / total_support as f64
    };
    let weighted_avg = ClassMetrics {
        precision: weighted(|m| m.precision),
        recall:    weighted(|m| m.recall),
        f1_score:  weighted(|m| m.f1_score),
        support:   total_support,
    };

    ClassificationReport {
        per_class,
        accuracy: accuracy(actual, predicted),
        macro_avg,
        weighted_avg,
    }
}

/// Pair feature names with scores, sorted by importance descending.
/// Equal scores keep column order.
pub fn ranked_importances(names: &[String], scores: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = names
        .iter()
        .zip(scores)
        .map(|(feature, &importance)| FeatureImportance {
            feature: feature.clone(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}

/// Run the full evaluate step for a fitted classifier.
pub fn evaluate<C: Classifier>(
    model: &C,
    train: &[Sample],
    test:  &[Sample],
) -> PipelineResult<Evaluation> {
    let split = |samples: &[Sample]| -> (Vec<Vec<f64>>, Vec<String>) {
        samples
            .iter()
            .map(|s| (s.features.clone(), s.label.clone()))
            .unzip()
    };
    let (train_x, train_y) = split(train);
    let (test_x,  test_y)  = split(test);

    let train_pred = model.predict_all(&train_x)?;
    let test_pred  = model.predict_all(&test_x)?;

    let train_accuracy = accuracy(&train_y, &train_pred);
    let test_accuracy  = accuracy(&test_y, &test_pred);
    tracing::info!("Train accuracy {:.4}, test accuracy {:.4}", train_accuracy, test_accuracy);

    Ok(Evaluation {
        train_accuracy,
        test_accuracy,
        report: classification_report(model.classes(), &test_y, &test_pred),
        feature_importances: ranked_importances(model.feature_names(), model.feature_importances()),
    })
}

// ─── Text rendering ───────────────────────────────────────────────────────────

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .per_class
            .keys()
            .map(String::len)
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        writeln!(f, "{:>width$} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for (label, m) in &self.per_class {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                label, m.precision, m.recall, m.f1_score, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1_score, m.support
            )?;
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_accuracy_is_exact_fraction() {
        let actual    = s(&["a", "b", "c", "a"]);
        let predicted = s(&["a", "b", "a", "a"]);
        assert_eq!(accuracy(&actual, &predicted), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_per_class_metrics() {
        let classes   = s(&["a", "b", "c"]);
        let actual    = s(&["a", "a", "b", "b", "c", "c"]);
        let predicted = s(&["a", "b", "b", "b", "c", "a"]);
        let r         = classification_report(&classes, &actual, &predicted);

        let a = r.per_class["a"];
        assert_eq!(a.precision, 0.5); // 1 of 2 predicted "a" is right
        assert_eq!(a.recall,    0.5);
        assert_eq!(a.support,   2);

        let b = r.per_class["b"];
        assert!((b.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(b.recall, 1.0);
        assert!((b.f1_score - 0.8).abs() < 1e-12);

        assert!((r.accuracy - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(r.macro_avg.support, 6);
    }

    #[test]
    fn test_zero_denominators_are_zero() {
        // "c" is never predicted and never present
        let classes   = s(&["a", "b", "c"]);
        let actual    = s(&["a", "b"]);
        let predicted = s(&["b", "b"]);
        let r         = classification_report(&classes, &actual, &predicted);

        let c = r.per_class["c"];
        assert_eq!((c.precision, c.recall, c.f1_score, c.support), (0.0, 0.0, 0.0, 0));
        let a = r.per_class["a"];
        assert_eq!((a.precision, a.recall, a.f1_score), (0.0, 0.0, 0.0));
        for m in r.per_class.values() {
            assert!((0.0..=1.0).contains(&m.precision));
            assert!((0.0..=1.0).contains(&m.recall));
        }
    }

    #[test]
    fn test_empty_partition_report() {
        let r = classification_report(&s(&["a", "b"]), &[], &[]);
        assert_eq!(r.per_class.len(), 2);
        assert_eq!(r.accuracy, 0.0);
        assert_eq!(r.weighted_avg.precision, 0.0);
    }

    #[test]
    fn test_macro_and_weighted_differ_with_imbalance() {
        let classes   = s(&["a", "b"]);
        let actual    = s(&["a", "a", "a", "b"]);
        let predicted = s(&["a", "a", "a", "a"]);
        let r         = classification_report(&classes, &actual, &predicted);
        // recall: a = 1.0, b = 0.0
        assert_eq!(r.macro_avg.recall, 0.5);
        assert_eq!(r.weighted_avg.recall, 0.75);
    }

    #[test]
    fn test_importances_ranked_descending() {
        let names  = s(&["w", "x", "y", "z"]);
        let ranked = ranked_importances(&names, &[0.1, 0.4, 0.2, 0.3]);
        let order: Vec<&str> = ranked.iter().map(|f| f.feature.as_str()).collect();
        assert_eq!(order, vec!["x", "z", "y", "w"]);
    }

    #[test]
    fn test_report_renders_all_rows() {
        let classes = s(&["setosa", "versicolor"]);
        let r       = classification_report(&classes, &classes, &classes);
        let text    = r.to_string();
        for needle in ["precision", "setosa", "versicolor", "accuracy", "macro avg", "weighted avg"] {
            assert!(text.contains(needle), "missing {needle}");
        }
    }
}
