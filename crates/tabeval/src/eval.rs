//! Evaluation metrics for classifier output.
//!
//! All metrics compare a [`PredictionResult`] against the true label ids of
//! the evaluated rows (both indexed by the same class vocabulary).
//!
//! # Available Metrics
//!
//! - [`accuracy`]: fraction of rows predicted correctly
//! - [`ConfusionMatrix`]: counts indexed by (true class, predicted class)
//! - [`RocCurve`]: threshold sweep over the positive-class probabilities,
//!   with trapezoidal [`auc`](RocCurve::auc). Defined for two classes;
//!   reduce a multi-class result first with
//!   [`PredictionResult::one_vs_rest`].

use std::cmp::Ordering;
use std::fmt;

use thiserror::Error;

use crate::model::PredictionResult;
use crate::table::LabelMap;

/// Errors that can occur while computing metrics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Prediction row count and truth label count disagree.
    #[error("prediction has {result} rows but {truth} true labels were provided")]
    LengthMismatch { result: usize, truth: usize },

    /// ROC curves are only defined for binary problems.
    #[error(
        "ROC is defined for exactly 2 classes, found {n_classes}; reduce with one_vs_rest first"
    )]
    UnsupportedMultiClass { n_classes: usize },

    /// The named class is not in the result's vocabulary.
    #[error("unknown class `{0}`")]
    UnknownClass(String),

    /// The truth labels contain no rows of a class the metric needs.
    #[error("true labels contain no `{class}` rows")]
    MissingClass { class: String },

    /// A truth label id does not index into the result's vocabulary.
    #[error("label id {id} out of range for {n_classes} classes")]
    LabelOutOfRange { id: u32, n_classes: usize },
}

fn check_labels(result: &PredictionResult, truth: &[u32]) -> Result<(), EvalError> {
    if result.n_samples() != truth.len() {
        return Err(EvalError::LengthMismatch {
            result: result.n_samples(),
            truth: truth.len(),
        });
    }
    let n_classes = result.classes().n_classes();
    if let Some(&id) = truth.iter().find(|&&id| (id as usize) >= n_classes) {
        return Err(EvalError::LabelOutOfRange { id, n_classes });
    }
    Ok(())
}

/// Fraction of rows whose predicted class equals the true class.
///
/// # Errors
///
/// Returns [`EvalError::LengthMismatch`] if `truth` and the result disagree
/// on row count, and [`EvalError::LabelOutOfRange`] for a truth id outside
/// the result's vocabulary.
pub fn accuracy(result: &PredictionResult, truth: &[u32]) -> Result<f64, EvalError> {
    check_labels(result, truth)?;
    if truth.is_empty() {
        return Ok(0.0);
    }
    let correct = result
        .predicted()
        .iter()
        .zip(truth)
        .filter(|(p, t)| p == t)
        .count();
    Ok(correct as f64 / truth.len() as f64)
}

/// Counts of true-vs-predicted class pairs.
///
/// The cell sum always equals the number of evaluated rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    classes: LabelMap,
    /// Row-major `[true_class * n_classes + predicted_class]`.
    counts: Vec<usize>,
}

impl ConfusionMatrix {
    /// Tally a prediction result against the true labels.
    pub fn from_result(result: &PredictionResult, truth: &[u32]) -> Result<Self, EvalError> {
        check_labels(result, truth)?;
        let classes = result.classes().clone();
        let n = classes.n_classes();
        let mut counts = vec![0usize; n * n];
        for (&predicted, &actual) in result.predicted().iter().zip(truth) {
            counts[actual as usize * n + predicted as usize] += 1;
        }
        Ok(Self { classes, counts })
    }

    /// The class vocabulary indexing both axes.
    pub fn classes(&self) -> &LabelMap {
        &self.classes
    }

    /// Number of classes along each axis.
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.classes.n_classes()
    }

    /// Rows counted as `true_class` and predicted as `predicted_class`.
    ///
    /// # Panics
    ///
    /// Panics if either id is out of range.
    pub fn count(&self, true_class: u32, predicted_class: u32) -> usize {
        let n = self.n_classes();
        self.counts[true_class as usize * n + predicted_class as usize]
    }

    /// Total number of evaluated rows.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Rows on the diagonal (predicted correctly).
    pub fn correct(&self) -> usize {
        let n = self.n_classes();
        (0..n).map(|c| self.counts[c * n + c]).sum()
    }

    /// Accuracy derived from the matrix.
    pub fn accuracy(&self) -> f64 {
        self.correct() as f64 / self.total() as f64
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(str::len)
            .max()
            .unwrap_or(0)
            .max(8);
        write!(f, "{:>width$}", "true\\pred")?;
        for name in self.classes.iter() {
            write!(f, " {name:>width$}")?;
        }
        writeln!(f)?;
        for (row, name) in self.classes.iter().enumerate() {
            write!(f, "{name:>width$}")?;
            for col in 0..self.n_classes() {
                write!(f, " {:>width$}", self.counts[row * self.n_classes() + col])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// One point of a ROC curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocPoint {
    /// Rows are classified positive when their probability is >= this.
    pub threshold: f64,
    pub false_positive_rate: f64,
    pub true_positive_rate: f64,
}

/// A receiver operating characteristic curve.
///
/// Produced by sweeping the decision threshold over the distinct predicted
/// probabilities of the positive class, in descending order. The curve
/// always starts at (0, 0) (threshold `+inf`) and ends at (1, 1).
#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    points: Vec<RocPoint>,
}

impl RocCurve {
    /// Sweep the ROC curve of a two-class result for `positive_class`.
    ///
    /// # Errors
    ///
    /// - [`EvalError::UnsupportedMultiClass`] if the result has more than two
    ///   classes; reduce it first with [`PredictionResult::one_vs_rest`].
    /// - [`EvalError::UnknownClass`] if `positive_class` is not in the
    ///   vocabulary.
    /// - [`EvalError::MissingClass`] if the truth labels are all positive or
    ///   all negative (either rate would be 0/0).
    pub fn from_result(
        result: &PredictionResult,
        truth: &[u32],
        positive_class: &str,
    ) -> Result<Self, EvalError> {
        check_labels(result, truth)?;
        let n_classes = result.classes().n_classes();
        if n_classes != 2 {
            return Err(EvalError::UnsupportedMultiClass { n_classes });
        }
        let positive = result
            .classes()
            .index_of(positive_class)
            .ok_or_else(|| EvalError::UnknownClass(positive_class.to_string()))?;

        let n_pos = truth.iter().filter(|&&t| t == positive).count();
        let n_neg = truth.len() - n_pos;
        if n_pos == 0 {
            return Err(EvalError::MissingClass {
                class: positive_class.to_string(),
            });
        }
        if n_neg == 0 {
            return Err(EvalError::MissingClass {
                class: result.classes().name(1 - positive).to_string(),
            });
        }

        let mut scored: Vec<(f64, bool)> = truth
            .iter()
            .enumerate()
            .map(|(row, &t)| (result.probability(row, positive), t == positive))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

        let mut points = vec![RocPoint {
            threshold: f64::INFINITY,
            false_positive_rate: 0.0,
            true_positive_rate: 0.0,
        }];
        let mut true_positives = 0usize;
        let mut false_positives = 0usize;
        let mut idx = 0;
        while idx < scored.len() {
            let threshold = scored[idx].0;
            // Consume the whole tie group; one point per distinct threshold.
            while idx < scored.len() && scored[idx].0 == threshold {
                if scored[idx].1 {
                    true_positives += 1;
                } else {
                    false_positives += 1;
                }
                idx += 1;
            }
            points.push(RocPoint {
                threshold,
                false_positive_rate: false_positives as f64 / n_neg as f64,
                true_positive_rate: true_positives as f64 / n_pos as f64,
            });
        }

        Ok(Self { points })
    }

    /// The swept points, ordered by ascending false-positive rate.
    pub fn points(&self) -> &[RocPoint] {
        &self.points
    }

    /// Area under the curve, by the trapezoidal rule.
    pub fn auc(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| {
                let (a, b) = (pair[0], pair[1]);
                (b.false_positive_rate - a.false_positive_rate)
                    * (a.true_positive_rate + b.true_positive_rate)
                    / 2.0
            })
            .sum()
    }
}

/// Map truth label ids onto the `[positive, rest]` vocabulary produced by
/// [`PredictionResult::one_vs_rest`].
///
/// # Errors
///
/// Returns [`EvalError::UnknownClass`] if `positive_class` is not in
/// `classes`.
pub fn one_vs_rest_labels(
    classes: &LabelMap,
    truth: &[u32],
    positive_class: &str,
) -> Result<Vec<u32>, EvalError> {
    let positive = classes
        .index_of(positive_class)
        .ok_or_else(|| EvalError::UnknownClass(positive_class.to_string()))?;
    Ok(truth.iter().map(|&t| u32::from(t != positive)).collect())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    use super::*;

    /// Build a binary result from positive-class probabilities, predicting
    /// positive at 0.5.
    fn binary_result(positive_probs: &[f64]) -> PredictionResult {
        let n = positive_probs.len();
        let mut probabilities = Array2::zeros((n, 2));
        let mut predicted = Vec::with_capacity(n);
        for (row, &p) in positive_probs.iter().enumerate() {
            probabilities[[row, 0]] = 1.0 - p;
            probabilities[[row, 1]] = p;
            predicted.push(u32::from(p >= 0.5));
        }
        PredictionResult::new(
            LabelMap::from_names(["neg", "pos"]),
            predicted,
            probabilities,
        )
    }

    #[test]
    fn accuracy_counts_exact_matches() {
        let result = binary_result(&[0.9, 0.2, 0.8, 0.4]);
        // Predicted: 1, 0, 1, 0.
        assert_abs_diff_eq!(accuracy(&result, &[1, 0, 0, 0]).unwrap(), 0.75);
        assert_abs_diff_eq!(accuracy(&result, &[1, 0, 1, 0]).unwrap(), 1.0);
    }

    #[test]
    fn accuracy_validates_inputs() {
        let result = binary_result(&[0.9, 0.2]);
        assert_eq!(
            accuracy(&result, &[1]).unwrap_err(),
            EvalError::LengthMismatch { result: 2, truth: 1 }
        );
        assert_eq!(
            accuracy(&result, &[1, 7]).unwrap_err(),
            EvalError::LabelOutOfRange { id: 7, n_classes: 2 }
        );
    }

    #[test]
    fn confusion_matrix_cells_sum_to_row_count() {
        let result = binary_result(&[0.9, 0.2, 0.8, 0.4, 0.6]);
        let truth = [1, 0, 0, 1, 1];
        let matrix = ConfusionMatrix::from_result(&result, &truth).unwrap();
        assert_eq!(matrix.total(), 5);
        assert_eq!(matrix.count(1, 1), 2); // 0.9 and 0.6 predicted pos
        assert_eq!(matrix.count(0, 1), 1); // 0.8 predicted pos, truly neg
        assert_eq!(matrix.count(1, 0), 1); // 0.4 predicted neg, truly pos
        assert_eq!(matrix.count(0, 0), 1);
        assert_abs_diff_eq!(matrix.accuracy(), 3.0 / 5.0);
    }

    #[test]
    fn confusion_matrix_display_names_the_classes() {
        let result = binary_result(&[0.9, 0.2]);
        let matrix = ConfusionMatrix::from_result(&result, &[1, 0]).unwrap();
        let rendered = matrix.to_string();
        assert!(rendered.contains("neg"), "{rendered}");
        assert!(rendered.contains("pos"), "{rendered}");
    }

    #[test]
    fn perfectly_separated_probabilities_give_a_single_step() {
        // True positives at 0.9, true negatives at 0.1.
        let result = binary_result(&[0.9, 0.9, 0.1, 0.1, 0.9]);
        let truth = [1, 1, 0, 0, 1];
        let curve = RocCurve::from_result(&result, &truth, "pos").unwrap();

        let coords: Vec<(f64, f64)> = curve
            .points()
            .iter()
            .map(|p| (p.false_positive_rate, p.true_positive_rate))
            .collect();
        assert_eq!(coords, vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
        assert_abs_diff_eq!(curve.auc(), 1.0);
    }

    #[test]
    fn roc_sweeps_distinct_thresholds_in_descending_order() {
        let result = binary_result(&[0.9, 0.7, 0.7, 0.3]);
        let truth = [1, 1, 0, 0];
        let curve = RocCurve::from_result(&result, &truth, "pos").unwrap();

        let thresholds: Vec<f64> = curve.points().iter().map(|p| p.threshold).collect();
        assert_eq!(thresholds[0], f64::INFINITY);
        assert_eq!(&thresholds[1..], &[0.9, 0.7, 0.3]);
        // Rates are cumulative and end at (1, 1).
        let last = curve.points().last().unwrap();
        assert_abs_diff_eq!(last.false_positive_rate, 1.0);
        assert_abs_diff_eq!(last.true_positive_rate, 1.0);
        // The 0.7 tie group adds one true and one false positive at once.
        assert_abs_diff_eq!(curve.points()[2].true_positive_rate, 1.0);
        assert_abs_diff_eq!(curve.points()[2].false_positive_rate, 0.5);
        assert_abs_diff_eq!(curve.auc(), 0.875);
    }

    #[test]
    fn roc_requires_two_classes_unless_reduced() {
        let mut probabilities = Array2::zeros((3, 3));
        for row in 0..3 {
            probabilities[[row, row]] = 0.8;
            probabilities[[row, (row + 1) % 3]] = 0.1;
            probabilities[[row, (row + 2) % 3]] = 0.1;
        }
        let result = PredictionResult::new(
            LabelMap::from_names(["a", "b", "c"]),
            vec![0, 1, 2],
            probabilities,
        );
        let truth = [0, 1, 2];

        let err = RocCurve::from_result(&result, &truth, "a").unwrap_err();
        assert_eq!(err, EvalError::UnsupportedMultiClass { n_classes: 3 });

        // The explicit one-vs-rest reduction makes it well-defined.
        let reduced = result.one_vs_rest("a").unwrap();
        let reduced_truth = one_vs_rest_labels(result.classes(), &truth, "a").unwrap();
        assert_eq!(reduced_truth, vec![0, 1, 1]);
        let curve = RocCurve::from_result(&reduced, &reduced_truth, "a").unwrap();
        assert_abs_diff_eq!(curve.auc(), 1.0);
    }

    #[test]
    fn roc_rejects_single_class_truth() {
        let result = binary_result(&[0.9, 0.2]);
        let err = RocCurve::from_result(&result, &[1, 1], "pos").unwrap_err();
        assert!(matches!(err, EvalError::MissingClass { .. }));
    }
}
