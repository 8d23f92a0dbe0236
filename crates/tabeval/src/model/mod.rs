//! Classifier adapters.
//!
//! Every classifier implements the [`Classifier`] trait: `fit` consumes a
//! training [`Table`] and produces a structured, serializable model; `predict`
//! consumes that model plus a table with the same feature columns and yields
//! a [`PredictionResult`] with a predicted class and a full per-class
//! probability vector for every row.
//!
//! The adapters own the translation between the [`Table`] container and each
//! solver's native representation — the linear-algebra-backed variants (LDA,
//! logistic regression) hand `nalgebra` matrices to their solvers, while
//! k-NN scans the raw feature values directly.
//!
//! # Available Classifiers
//!
//! - [`LinearDiscriminant`]: Gaussian discriminants over a pooled covariance
//! - [`KNearestNeighbors`]: full-scan Euclidean voting; `k` is required
//! - [`LogisticRegression`]: binary IRLS/Newton

mod knn;
mod lda;
mod logistic;

pub use knn::{KNearestNeighbors, KnnModel};
pub use lda::{LdaModel, LinearDiscriminant};
pub use logistic::{LogisticModel, LogisticRegression};

use ndarray::{Array2, ArrayView2};

use crate::eval::EvalError;
use crate::table::{LabelMap, Table, TableSchema};

/// Errors surfaced by classifier adapters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// The training table cannot support the requested fit.
    #[error("insufficient training data: {detail}")]
    InsufficientData { detail: String },

    /// The underlying solver failed to converge; reported, never retried.
    #[error("solver failed to converge: {detail}")]
    Convergence { detail: String },

    /// The prediction table does not carry the feature columns seen at fit.
    #[error("schema mismatch: {detail}")]
    SchemaMismatch { detail: String },

    /// The classifier does not support this many classes.
    #[error("{classifier} supports exactly 2 classes, found {n_classes}")]
    UnsupportedMultiClass {
        classifier: &'static str,
        n_classes: usize,
    },
}

/// A classification algorithm that can be fitted to a training [`Table`] and
/// queried for per-class probabilities on new rows.
///
/// The fitted artifact is an explicit value owned by the caller; it is only
/// meaningful to the adapter that produced it.
pub trait Classifier {
    /// The fitted artifact produced by [`fit`](Classifier::fit).
    type Model;

    /// Short human-readable name, used in reports and logs.
    fn name(&self) -> &'static str;

    /// Train on all feature columns of `train` against its label column.
    fn fit(&self, train: &Table) -> Result<Self::Model, ModelError>;

    /// Predict a class and per-class probabilities for every row of `table`.
    ///
    /// `table` must carry exactly the feature columns used at fit time.
    fn predict(&self, model: &Self::Model, table: &Table) -> Result<PredictionResult, ModelError>;
}

/// Per-row predictions: a class and a full probability vector.
///
/// Probabilities are stored as `[n_samples, n_classes]`; every row sums to 1
/// (within floating tolerance).
#[derive(Debug, Clone)]
pub struct PredictionResult {
    classes: LabelMap,
    predicted: Vec<u32>,
    probabilities: Array2<f64>,
}

impl PredictionResult {
    pub(crate) fn new(classes: LabelMap, predicted: Vec<u32>, probabilities: Array2<f64>) -> Self {
        debug_assert_eq!(predicted.len(), probabilities.nrows());
        debug_assert_eq!(classes.n_classes(), probabilities.ncols());
        debug_assert!(probabilities
            .rows()
            .into_iter()
            .all(|row| (row.sum() - 1.0).abs() < 1e-6));
        Self {
            classes,
            predicted,
            probabilities,
        }
    }

    /// Number of predicted rows.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.predicted.len()
    }

    /// The class vocabulary the probabilities are indexed by.
    pub fn classes(&self) -> &LabelMap {
        &self.classes
    }

    /// Predicted class ids, one per row.
    pub fn predicted(&self) -> &[u32] {
        &self.predicted
    }

    /// The `[n_samples, n_classes]` probability matrix.
    pub fn probabilities(&self) -> ArrayView2<'_, f64> {
        self.probabilities.view()
    }

    /// Probability assigned to `class` for `row`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `class` is out of range.
    pub fn probability(&self, row: usize, class: u32) -> f64 {
        self.probabilities[[row, class as usize]]
    }

    /// Name of the predicted class for `row`.
    pub fn predicted_name(&self, row: usize) -> &str {
        self.classes.name(self.predicted[row])
    }

    /// Probability share of the predicted (winning) class for `row`.
    pub fn winning_probability(&self, row: usize) -> f64 {
        self.probability(row, self.predicted[row])
    }

    /// Reduce a multi-class result to a binary one-vs-rest result for
    /// `positive_class`.
    ///
    /// The reduced vocabulary is `[positive_class, "rest"]`; the positive
    /// probability is carried over unchanged and the rest of the mass is
    /// pooled. Use this to compute a ROC curve for one class of a
    /// multi-class problem.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::UnknownClass`] if `positive_class` is not in the
    /// vocabulary.
    pub fn one_vs_rest(&self, positive_class: &str) -> Result<PredictionResult, EvalError> {
        let positive = self
            .classes
            .index_of(positive_class)
            .ok_or_else(|| EvalError::UnknownClass(positive_class.to_string()))?;

        let n = self.n_samples();
        let mut probabilities = Array2::zeros((n, 2));
        for row in 0..n {
            let p = self.probability(row, positive);
            probabilities[[row, 0]] = p;
            probabilities[[row, 1]] = 1.0 - p;
        }
        let predicted = self
            .predicted
            .iter()
            .map(|&c| u32::from(c != positive))
            .collect();
        Ok(PredictionResult::new(
            LabelMap::from_names([positive_class, "rest"]),
            predicted,
            probabilities,
        ))
    }
}

/// Reject prediction tables whose feature columns differ from the fitted
/// schema.
pub(crate) fn check_schema(fitted: &TableSchema, table: &Table) -> Result<(), ModelError> {
    match fitted.mismatch(table.schema()) {
        Some(detail) => Err(ModelError::SchemaMismatch { detail }),
        None => Ok(()),
    }
}

/// In-place softmax with max-shift for numerical stability.
pub(crate) fn softmax(scores: &mut [f64]) {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for s in scores.iter_mut() {
        *s = (*s - max).exp();
        sum += *s;
    }
    for s in scores.iter_mut() {
        *s /= sum;
    }
}

/// Index of the largest score; the first wins on exact ties.
pub(crate) fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (idx, &s) in scores.iter().enumerate().skip(1) {
        if s > scores[best] {
            best = idx;
        }
    }
    best
}
