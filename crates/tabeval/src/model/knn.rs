//! k-nearest-neighbors classification.
//!
//! A full scan over the training rows; no index structure. The per-class
//! probability vector is the neighbor vote fraction `votes(class) / k`, which
//! sums to exactly 1 for any number of classes. The neighbor count `k` has no
//! default: larger k smooths the decision boundary (less variance, more
//! bias), and that trade-off belongs to the caller.

use std::cmp::Ordering;
use std::num::NonZeroUsize;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::table::{LabelMap, Table, TableSchema};

use super::{check_schema, Classifier, ModelError, PredictionResult};

/// k-nearest-neighbors with Euclidean distance and vote-fraction
/// probabilities.
#[derive(Debug, Clone, Copy)]
pub struct KNearestNeighbors {
    k: NonZeroUsize,
}

impl KNearestNeighbors {
    /// Create an adapter voting over `k` neighbors.
    pub fn new(k: NonZeroUsize) -> Self {
        Self { k }
    }

    /// The configured neighbor count.
    pub fn k(&self) -> usize {
        self.k.get()
    }
}

/// A fitted k-NN model: the training rows themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnModel {
    schema: TableSchema,
    classes: LabelMap,
    k: usize,
    n_features: usize,
    /// Training feature values, sample-major.
    samples: Vec<f64>,
    labels: Vec<u32>,
}

impl Classifier for KNearestNeighbors {
    type Model = KnnModel;

    fn name(&self) -> &'static str {
        "k-nearest neighbors"
    }

    fn fit(&self, train: &Table) -> Result<KnnModel, ModelError> {
        let n = train.n_samples();
        let k = self.k.get();
        if k > n {
            return Err(ModelError::InsufficientData {
                detail: format!("k = {k} exceeds the {n} training rows"),
            });
        }

        let p = train.n_features();
        let mut samples = Vec::with_capacity(n * p);
        for row in 0..n {
            samples.extend(train.sample(row).iter().copied());
        }

        Ok(KnnModel {
            schema: train.schema().clone(),
            classes: train.classes().clone(),
            k,
            n_features: p,
            samples,
            labels: train.labels().to_vec(),
        })
    }

    fn predict(&self, model: &KnnModel, table: &Table) -> Result<PredictionResult, ModelError> {
        check_schema(&model.schema, table)?;

        let n = table.n_samples();
        let n_train = model.labels.len();
        let n_classes = model.classes.n_classes();
        let p = model.n_features;
        let k = model.k;

        let mut probabilities = Array2::zeros((n, n_classes));
        let mut predicted = Vec::with_capacity(n);

        for row in 0..n {
            let x = table.sample(row);
            let distances: Vec<f64> = (0..n_train)
                .map(|t| {
                    let base = t * p;
                    x.iter()
                        .zip(&model.samples[base..base + p])
                        .map(|(&a, &b)| (a - b) * (a - b))
                        .sum::<f64>()
                })
                .collect();

            let mut order: Vec<usize> = (0..n_train).collect();
            if k < n_train {
                order.select_nth_unstable_by(k - 1, |&a, &b| {
                    distances[a]
                        .partial_cmp(&distances[b])
                        .unwrap_or(Ordering::Equal)
                });
            }

            let mut votes = vec![0usize; n_classes];
            let mut nearest = vec![f64::INFINITY; n_classes];
            for &t in &order[..k] {
                let class = model.labels[t] as usize;
                votes[class] += 1;
                if distances[t] < nearest[class] {
                    nearest[class] = distances[t];
                }
            }

            // Majority vote; ties go to the class with the closest neighbor.
            let max_votes = *votes.iter().max().expect("at least one class");
            let mut winner = 0;
            let mut winner_distance = f64::INFINITY;
            for class in 0..n_classes {
                if votes[class] == max_votes && nearest[class] < winner_distance {
                    winner = class;
                    winner_distance = nearest[class];
                }
            }

            predicted.push(winner as u32);
            for (class, &count) in votes.iter().enumerate() {
                probabilities[[row, class]] = count as f64 / k as f64;
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

    fn k(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn line_table() -> Table {
        Table::builder()
            .numeric_column("x", vec![0.0, 0.1, 0.2, 10.0, 10.1, 10.2])
            .labels("class", &["a", "a", "a", "b", "b", "b"])
            .build()
            .unwrap()
    }

    #[test]
    fn nearest_cluster_wins_unanimously() {
        let adapter = KNearestNeighbors::new(k(3));
        let model = adapter.fit(&line_table()).unwrap();
        let probe = Table::builder()
            .numeric_column("x", vec![0.05, 9.9])
            .labels("class", &["a", "b"])
            .build()
            .unwrap();
        let result = adapter.predict(&model, &probe).unwrap();
        assert_eq!(result.predicted(), &[0, 1]);
        assert_abs_diff_eq!(result.probability(0, 0), 1.0);
        assert_abs_diff_eq!(result.probability(1, 1), 1.0);
    }

    #[test]
    fn probabilities_are_vote_fractions() {
        let train = Table::builder()
            .numeric_column("x", vec![0.0, 1.0, 2.0])
            .labels("class", &["a", "a", "b"])
            .build()
            .unwrap();
        let adapter = KNearestNeighbors::new(k(3));
        let model = adapter.fit(&train).unwrap();
        let probe = Table::builder()
            .numeric_column("x", vec![0.5])
            .labels("class", &["a"])
            .build()
            .unwrap();
        let result = adapter.predict(&model, &probe).unwrap();
        assert_eq!(result.predicted(), &[0]);
        assert_abs_diff_eq!(result.probability(0, 0), 2.0 / 3.0);
        assert_abs_diff_eq!(result.probability(0, 1), 1.0 / 3.0);
        assert_abs_diff_eq!(result.winning_probability(0), 2.0 / 3.0);
    }

    #[test]
    fn vote_ties_go_to_the_closest_neighbor() {
        let train = Table::builder()
            .numeric_column("x", vec![0.0, 1.0])
            .labels("class", &["a", "b"])
            .build()
            .unwrap();
        let adapter = KNearestNeighbors::new(k(2));
        let model = adapter.fit(&train).unwrap();
        let probe = Table::builder()
            .numeric_column("x", vec![0.4, 0.6])
            .labels("class", &["a", "b"])
            .build()
            .unwrap();
        let result = adapter.predict(&model, &probe).unwrap();
        assert_eq!(result.predicted(), &[0, 1]);
        // Both probes still report the tied 1/2 vote split.
        assert_abs_diff_eq!(result.probability(0, 0), 0.5);
        assert_abs_diff_eq!(result.probability(1, 0), 0.5);
    }

    #[test]
    fn fit_rejects_k_larger_than_the_training_set() {
        let err = KNearestNeighbors::new(k(7)).fit(&line_table()).unwrap_err();
        assert!(matches!(err, ModelError::InsufficientData { .. }));
    }

    #[test]
    fn predict_rejects_unknown_columns() {
        let adapter = KNearestNeighbors::new(k(1));
        let model = adapter.fit(&line_table()).unwrap();
        let probe = Table::builder()
            .numeric_column("renamed", vec![0.0])
            .labels("class", &["a"])
            .build()
            .unwrap();
        let err = adapter.predict(&model, &probe).unwrap_err();
        assert!(matches!(err, ModelError::SchemaMismatch { .. }));
    }
}
