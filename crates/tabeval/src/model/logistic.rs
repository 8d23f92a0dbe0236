//! Binary logistic regression fitted with IRLS.
//!
//! Newton iterations on the log-likelihood: at each step the working
//! responses `z = eta + (y - p) / w` are regressed onto the design matrix
//! under weights `w = p (1 - p)`. Defaults match the classic GLM solver
//! settings (25 iterations, tolerance 1e-8). Failure to converge — including
//! the diverging coefficients of perfectly separable data — is reported as an
//! error, never retried.

use nalgebra::{DMatrix, DVector};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::table::{LabelMap, Table, TableSchema};

use super::{check_schema, Classifier, ModelError, PredictionResult};

const DEFAULT_MAX_ITER: usize = 25;
const DEFAULT_TOL: f64 = 1e-8;

/// Minimum IRLS weight; keeps the working response finite when fitted
/// probabilities saturate.
const MIN_WEIGHT: f64 = 1e-10;

/// Binary logistic regression. The second class of the label vocabulary
/// (id 1) is modelled as the positive outcome.
#[derive(Debug, Clone, Copy)]
pub struct LogisticRegression {
    max_iter: usize,
    tol: f64,
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOL,
        }
    }

    /// Cap the number of IRLS iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Convergence tolerance on the largest coefficient update.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

/// A fitted binary logistic model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    schema: TableSchema,
    classes: LabelMap,
    /// Intercept followed by one coefficient per feature column.
    coefficients: Vec<f64>,
}

impl LogisticModel {
    /// Intercept and per-feature coefficients.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }
}

#[inline]
fn sigmoid(eta: f64) -> f64 {
    1.0 / (1.0 + (-eta).exp())
}

impl Classifier for LogisticRegression {
    type Model = LogisticModel;

    fn name(&self) -> &'static str {
        "logistic regression"
    }

    fn fit(&self, train: &Table) -> Result<LogisticModel, ModelError> {
        let classes = train.classes().clone();
        if classes.n_classes() != 2 {
            return Err(ModelError::UnsupportedMultiClass {
                classifier: "logistic regression",
                n_classes: classes.n_classes(),
            });
        }

        let n = train.n_samples();
        let p = train.n_features();
        if n <= p + 1 {
            return Err(ModelError::InsufficientData {
                detail: format!("{n} rows for {p} features; need more rows than coefficients"),
            });
        }

        // Design matrix with a leading intercept column.
        let x = DMatrix::from_fn(n, p + 1, |i, j| {
            if j == 0 {
                1.0
            } else {
                train.sample(i)[j - 1]
            }
        });
        let y = DVector::from_iterator(n, train.labels().iter().map(|&l| f64::from(l)));

        let mut beta = DVector::<f64>::zeros(p + 1);
        for _ in 0..self.max_iter {
            let eta = &x * &beta;
            let mu = eta.map(sigmoid);
            let weights = mu.map(|m| (m * (1.0 - m)).max(MIN_WEIGHT));

            // Weighted normal equations: (X' W X) beta = X' W z.
            let mut xw = x.clone();
            for i in 0..n {
                let mut row = xw.row_mut(i);
                row *= weights[i];
            }
            let xtwx = x.transpose() * &xw;
            let wz = DVector::from_fn(n, |i, _| weights[i] * (eta[i] + (y[i] - mu[i]) / weights[i]));
            let xtwz = x.transpose() * wz;

            let next = match xtwx.clone().cholesky() {
                Some(chol) => chol.solve(&xtwz),
                None => xtwx.lu().solve(&xtwz).ok_or_else(|| ModelError::Convergence {
                    detail: "weighted normal equations are singular".to_string(),
                })?,
            };
            if next.iter().any(|b| !b.is_finite()) {
                return Err(ModelError::Convergence {
                    detail: "coefficients diverged".to_string(),
                });
            }

            let delta = (&next - &beta).amax();
            beta = next;
            if delta < self.tol {
                return Ok(LogisticModel {
                    schema: train.schema().clone(),
                    classes,
                    coefficients: beta.iter().copied().collect(),
                });
            }
        }

        Err(ModelError::Convergence {
            detail: format!("IRLS did not converge within {} iterations", self.max_iter),
        })
    }

    fn predict(
        &self,
        model: &LogisticModel,
        table: &Table,
    ) -> Result<PredictionResult, ModelError> {
        check_schema(&model.schema, table)?;

        let n = table.n_samples();
        let mut probabilities = Array2::zeros((n, 2));
        let mut predicted = Vec::with_capacity(n);

        for row in 0..n {
            let x = table.sample(row);
            let mut eta = model.coefficients[0];
            for (j, &v) in x.iter().enumerate() {
                eta += model.coefficients[j + 1] * v;
            }
            let positive = sigmoid(eta);
            probabilities[[row, 0]] = 1.0 - positive;
            probabilities[[row, 1]] = positive;
            predicted.push(u32::from(positive >= 0.5));
        }

        Ok(PredictionResult::new(
            model.classes.clone(),
            predicted,
            probabilities,
        ))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    /// Overlapping classes along one axis; IRLS converges in a few steps.
    fn overlap_table() -> Table {
        Table::builder()
            .numeric_column("x", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .labels("outcome", &["no", "no", "yes", "no", "yes", "yes"])
            .build()
            .unwrap()
    }

    #[test]
    fn fits_a_monotone_probability_curve() {
        let adapter = LogisticRegression::new();
        let model = adapter.fit(&overlap_table()).unwrap();
        let result = adapter.predict(&model, &overlap_table()).unwrap();

        // Probability of `yes` must increase with x.
        for row in 1..result.n_samples() {
            assert!(result.probability(row, 1) > result.probability(row - 1, 1));
        }
        assert_eq!(result.predicted()[0], 0);
        assert_eq!(result.predicted()[5], 1);
        for row in 0..result.n_samples() {
            assert_abs_diff_eq!(
                result.probability(row, 0) + result.probability(row, 1),
                1.0,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn iteration_cap_is_reported_as_convergence_failure() {
        let err = LogisticRegression::new()
            .with_max_iter(1)
            .fit(&overlap_table())
            .unwrap_err();
        match err {
            ModelError::Convergence { detail } => assert!(detail.contains("1 iteration"), "{detail}"),
            other => panic!("expected Convergence, got {other}"),
        }
    }

    #[test]
    fn rejects_more_than_two_classes() {
        let table = Table::builder()
            .numeric_column("x", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .labels("class", &["a", "b", "c", "a", "b", "c"])
            .build()
            .unwrap();
        let err = LogisticRegression::new().fit(&table).unwrap_err();
        assert_eq!(
            err,
            ModelError::UnsupportedMultiClass {
                classifier: "logistic regression",
                n_classes: 3
            }
        );
    }

    #[test]
    fn rejects_underdetermined_fits() {
        let table = Table::builder()
            .numeric_column("x", vec![1.0, 2.0, 3.0])
            .numeric_column("y", vec![4.0, 5.0, 6.0])
            .labels("class", &["a", "b", "a"])
            .build()
            .unwrap();
        let err = LogisticRegression::new().fit(&table).unwrap_err();
        assert!(matches!(err, ModelError::InsufficientData { .. }));
    }

    #[test]
    fn predict_rejects_missing_columns() {
        let adapter = LogisticRegression::new();
        let model = adapter.fit(&overlap_table()).unwrap();
        let probe = Table::builder()
            .numeric_column("x", vec![1.0])
            .numeric_column("extra", vec![0.0])
            .labels("outcome", &["no"])
            .build()
            .unwrap();
        let err = adapter.predict(&model, &probe).unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch { .. }));
    }
}
