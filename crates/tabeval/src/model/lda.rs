//! Linear discriminant analysis.
//!
//! Fits per-class Gaussian discriminants with a pooled within-class
//! covariance matrix. The discriminant for class `k` is
//! `x' S^-1 mu_k - mu_k' S^-1 mu_k / 2 + ln(prior_k)`; because the quadratic
//! term is shared by every class, posteriors are the softmax of the
//! discriminant scores.

use nalgebra::{DMatrix, DVector};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::table::{LabelMap, Table, TableSchema};

use super::{argmax, check_schema, softmax, Classifier, ModelError, PredictionResult};

/// Linear discriminant analysis with empirical class priors.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearDiscriminant;

impl LinearDiscriminant {
    pub fn new() -> Self {
        Self
    }
}

/// A fitted linear discriminant model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdaModel {
    schema: TableSchema,
    classes: LabelMap,
    /// Discriminant coefficients `S^-1 mu_k`, one row per class.
    coefficients: Vec<Vec<f64>>,
    /// Per-class intercepts `ln(prior_k) - mu_k' S^-1 mu_k / 2`.
    intercepts: Vec<f64>,
}

impl Classifier for LinearDiscriminant {
    type Model = LdaModel;

    fn name(&self) -> &'static str {
        "linear discriminant"
    }

    fn fit(&self, train: &Table) -> Result<LdaModel, ModelError> {
        let n = train.n_samples();
        let p = train.n_features();
        let classes = train.classes().clone();
        let n_classes = classes.n_classes();

        if n_classes < 2 {
            return Err(ModelError::InsufficientData {
                detail: format!("at least 2 classes are required, found {n_classes}"),
            });
        }
        let counts = train.label_counts();
        if let Some(empty) = counts.iter().position(|&c| c == 0) {
            return Err(ModelError::InsufficientData {
                detail: format!("class `{}` has no training rows", classes.name(empty as u32)),
            });
        }
        if n <= n_classes {
            return Err(ModelError::InsufficientData {
                detail: format!(
                    "{n} rows for {n_classes} classes; the pooled covariance needs more rows than classes"
                ),
            });
        }

        // Class means.
        let mut means = vec![DVector::<f64>::zeros(p); n_classes];
        for (row, &label) in train.labels().iter().enumerate() {
            let x = train.sample(row);
            let mean = &mut means[label as usize];
            for (j, &v) in x.iter().enumerate() {
                mean[j] += v;
            }
        }
        for (class, mean) in means.iter_mut().enumerate() {
            *mean /= counts[class] as f64;
        }

        // Pooled within-class covariance, n - K divisor.
        let mut scatter = DMatrix::<f64>::zeros(p, p);
        let mut centered = DVector::<f64>::zeros(p);
        for (row, &label) in train.labels().iter().enumerate() {
            let x = train.sample(row);
            let mean = &means[label as usize];
            for j in 0..p {
                centered[j] = x[j] - mean[j];
            }
            scatter += &centered * centered.transpose();
        }
        let sigma = scatter / (n - n_classes) as f64;

        let chol = sigma.cholesky().ok_or_else(|| ModelError::Convergence {
            detail: "pooled covariance matrix is singular".to_string(),
        })?;

        let mut coefficients = Vec::with_capacity(n_classes);
        let mut intercepts = Vec::with_capacity(n_classes);
        for (class, mean) in means.iter().enumerate() {
            let coef = chol.solve(mean);
            let prior = counts[class] as f64 / n as f64;
            intercepts.push(prior.ln() - 0.5 * mean.dot(&coef));
            coefficients.push(coef.iter().copied().collect());
        }

        Ok(LdaModel {
            schema: train.schema().clone(),
            classes,
            coefficients,
            intercepts,
        })
    }

    fn predict(&self, model: &LdaModel, table: &Table) -> Result<PredictionResult, ModelError> {
        check_schema(&model.schema, table)?;

        let n = table.n_samples();
        let n_classes = model.classes.n_classes();
        let mut probabilities = Array2::zeros((n, n_classes));
        let mut predicted = Vec::with_capacity(n);
        let mut scores = vec![0.0; n_classes];

        for row in 0..n {
            let x = table.sample(row);
            for (class, score) in scores.iter_mut().enumerate() {
                let mut s = model.intercepts[class];
                for (j, &v) in x.iter().enumerate() {
                    s += model.coefficients[class][j] * v;
                }
                *score = s;
            }
            softmax(&mut scores);
            predicted.push(argmax(&scores) as u32);
            for (class, &score) in scores.iter().enumerate() {
                probabilities[[row, class]] = score;
            }
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

    /// Two well-separated square clusters with identical within-class spread.
    fn clusters() -> Table {
        Table::builder()
            .numeric_column("x", vec![0.0, 1.0, 0.0, 1.0, 5.0, 6.0, 5.0, 6.0])
            .numeric_column("y", vec![0.0, 1.0, 1.0, 0.0, 5.0, 6.0, 6.0, 5.0])
            .labels("class", &["a", "a", "a", "a", "b", "b", "b", "b"])
            .build()
            .unwrap()
    }

    #[test]
    fn separable_clusters_are_classified_exactly() {
        let adapter = LinearDiscriminant::new();
        let model = adapter.fit(&clusters()).unwrap();
        let result = adapter.predict(&model, &clusters()).unwrap();

        assert_eq!(result.predicted(), &[0, 0, 0, 0, 1, 1, 1, 1]);
        for row in 0..result.n_samples() {
            assert!(result.winning_probability(row) > 0.5);
            assert_abs_diff_eq!(
                result.probability(row, 0) + result.probability(row, 1),
                1.0,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn posteriors_favor_the_nearer_mean() {
        let adapter = LinearDiscriminant::new();
        let model = adapter.fit(&clusters()).unwrap();
        let probe = Table::builder()
            .numeric_column("x", vec![0.2, 5.7])
            .numeric_column("y", vec![0.8, 5.1])
            .labels("class", &["a", "b"])
            .build()
            .unwrap();
        let result = adapter.predict(&model, &probe).unwrap();
        assert_eq!(result.predicted(), &[0, 1]);
        assert!(result.probability(0, 0) > 0.99);
        assert!(result.probability(1, 1) > 0.99);
    }

    #[test]
    fn fit_requires_two_classes_and_enough_rows() {
        let single = Table::builder()
            .numeric_column("x", vec![1.0, 2.0, 3.0])
            .labels("class", &["a", "a", "a"])
            .build()
            .unwrap();
        let err = LinearDiscriminant::new().fit(&single).unwrap_err();
        assert!(matches!(err, ModelError::InsufficientData { .. }));

        let tiny = Table::builder()
            .numeric_column("x", vec![1.0, 2.0])
            .labels("class", &["a", "b"])
            .build()
            .unwrap();
        let err = LinearDiscriminant::new().fit(&tiny).unwrap_err();
        assert!(matches!(err, ModelError::InsufficientData { .. }));
    }

    #[test]
    fn degenerate_covariance_is_reported_as_convergence_failure() {
        // `y` duplicates `x`, so the pooled covariance is rank deficient.
        let table = Table::builder()
            .numeric_column("x", vec![0.0, 1.0, 2.0, 5.0, 6.0, 7.0])
            .numeric_column("y", vec![0.0, 1.0, 2.0, 5.0, 6.0, 7.0])
            .numeric_column("z", vec![0.0, 2.0, 1.0, 5.0, 7.0, 6.0])
            .labels("class", &["a", "a", "a", "b", "b", "b"])
            .build()
            .unwrap();
        let err = LinearDiscriminant::new().fit(&table).unwrap_err();
        assert!(matches!(err, ModelError::Convergence { .. }));
    }

    #[test]
    fn predict_rejects_reordered_columns() {
        let adapter = LinearDiscriminant::new();
        let model = adapter.fit(&clusters()).unwrap();
        let swapped = Table::builder()
            .numeric_column("y", vec![0.0, 5.0])
            .numeric_column("x", vec![0.0, 5.0])
            .labels("class", &["a", "b"])
            .build()
            .unwrap();
        let err = adapter.predict(&model, &swapped).unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch { .. }));
    }
}
