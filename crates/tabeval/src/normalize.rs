//! Training-derived feature standardization.
//!
//! [`NormalizationParams::fit`] computes per-feature mean and standard
//! deviation from the **training** table only; [`NormalizationParams::apply`]
//! replays the same affine transform on any table with the same schema.
//! Computing the statistics once, on training rows alone, is what keeps test
//! data out of the fitted parameters.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::table::{Table, TableSchema};

/// Errors that can occur while applying normalization parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    /// The table's feature columns differ from the ones the parameters were
    /// fitted on.
    #[error("schema mismatch: {detail}")]
    SchemaMismatch { detail: String },
}

/// How a single feature column is transformed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FeatureScale {
    /// Pass the column through untouched (categorical, or zero variance in
    /// the training rows).
    Identity,
    /// Standardize to `(x - mean) / std`.
    Standard { mean: f64, std: f64 },
}

/// Per-feature standardization parameters, computed once from training data.
///
/// Immutable after [`fit`](NormalizationParams::fit); apply the same
/// parameters to the training and test subsets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationParams {
    schema: TableSchema,
    scales: Vec<FeatureScale>,
}

impl NormalizationParams {
    /// Compute mean and (sample) standard deviation for every numeric
    /// feature column of `train`.
    ///
    /// Categorical columns are never scaled. A numeric column whose training
    /// standard deviation is zero — a constant column, or a single training
    /// row — is left unscaled and reported with a warning, instead of
    /// dividing by zero and poisoning the table with NaNs.
    pub fn fit(train: &Table) -> Self {
        let scales = (0..train.n_features())
            .map(|idx| {
                let meta = train.schema().column(idx);
                if !meta.kind.is_numeric() {
                    return FeatureScale::Identity;
                }
                let (mean, std) = mean_and_std(train.feature(idx));
                if std == 0.0 || !std.is_finite() {
                    log::warn!(
                        "feature `{}` has zero variance in training data; leaving it unscaled",
                        meta.name
                    );
                    FeatureScale::Identity
                } else {
                    FeatureScale::Standard { mean, std }
                }
            })
            .collect();
        Self {
            schema: train.schema().clone(),
            scales,
        }
    }

    /// The per-feature scales, in schema order.
    pub fn scales(&self) -> &[FeatureScale] {
        &self.scales
    }

    /// The schema the parameters were fitted on.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Return a new table with every standardized column replaced by
    /// `(x - mean) / std`.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::SchemaMismatch`] if `table` does not carry
    /// exactly the feature columns the parameters were fitted on.
    pub fn apply(&self, table: &Table) -> Result<Table, NormalizeError> {
        if let Some(detail) = self.schema.mismatch(table.schema()) {
            return Err(NormalizeError::SchemaMismatch { detail });
        }
        let mut features = table.features().to_owned();
        for (idx, scale) in self.scales.iter().enumerate() {
            if let FeatureScale::Standard { mean, std } = *scale {
                features
                    .row_mut(idx)
                    .mapv_inplace(|v| (v - mean) / std);
            }
        }
        Ok(table.replace_features(features))
    }
}

/// Mean and sample standard deviation (n − 1 divisor) of a column.
///
/// A single-value column has no spread to estimate; its std is reported as 0
/// so the caller falls back to the identity scale.
fn mean_and_std(values: ArrayView1<'_, f64>) -> (f64, f64) {
    let n = values.len();
    let mean = values.sum() / n as f64;
    if n < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, var.sqrt())
}
