//! Table container and builder.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use super::error::TableError;
use super::schema::{ColumnMeta, LabelMap, TableSchema};

/// A labelled in-memory table: named feature columns plus one label column.
///
/// # Storage Layout
///
/// Features are stored in **feature-major** layout: `[n_features, n_samples]`.
/// Each feature's values across all samples are contiguous in memory, which
/// is the access pattern of every pipeline stage (normalization statistics,
/// per-feature scans).
///
/// Labels are stored as class ids into the table's [`LabelMap`]; the
/// vocabulary is fixed when the table is created and shared by every table
/// derived from it (splits, normalized copies).
#[derive(Debug, Clone)]
pub struct Table {
    /// Feature data: `[n_features, n_samples]` (feature-major).
    features: Array2<f64>,
    /// Feature metadata.
    schema: TableSchema,
    /// Label ids, one per sample.
    labels: Vec<u32>,
    /// Class vocabulary for the label column.
    classes: LabelMap,
}

impl Table {
    /// Create a table from feature-major data.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the feature matrix shape disagrees with the
    /// schema or label count, or if a label id falls outside `classes`.
    pub fn new(
        features: Array2<f64>,
        schema: TableSchema,
        labels: Vec<u32>,
        classes: LabelMap,
    ) -> Result<Self, TableError> {
        if features.nrows() != schema.n_features() {
            return Err(TableError::LengthMismatch {
                column: "<features>".to_string(),
                expected: schema.n_features(),
                found: features.nrows(),
            });
        }
        if features.ncols() != labels.len() {
            return Err(TableError::LengthMismatch {
                column: schema.label_name().to_string(),
                expected: features.ncols(),
                found: labels.len(),
            });
        }
        if let Some(&id) = labels.iter().find(|&&id| (id as usize) >= classes.n_classes()) {
            return Err(TableError::LabelOutOfRange {
                id,
                n_classes: classes.n_classes(),
            });
        }
        Ok(Self {
            features,
            schema,
            labels,
            classes,
        })
    }

    /// Start building a table column by column.
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    /// Number of samples (rows).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.features.ncols()
    }

    /// Number of feature columns.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.nrows()
    }

    /// Returns true if the table has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_samples() == 0
    }

    /// Feature metadata.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Class vocabulary of the label column.
    pub fn classes(&self) -> &LabelMap {
        &self.classes
    }

    /// Label ids, one per sample.
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// The full feature matrix, `[n_features, n_samples]`.
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    /// All values of feature `idx` (contiguous).
    ///
    /// # Panics
    ///
    /// Panics if `idx >= n_features()`.
    pub fn feature(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.features.row(idx)
    }

    /// All feature values of sample `idx` (strided).
    ///
    /// # Panics
    ///
    /// Panics if `idx >= n_samples()`.
    pub fn sample(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.features.column(idx)
    }

    /// Number of samples carrying each class id.
    pub fn label_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.n_classes()];
        for &id in &self.labels {
            counts[id as usize] += 1;
        }
        counts
    }

    /// A new table containing only the samples at `indices`, in the given
    /// order. Schema and class vocabulary are shared with `self`.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        Table {
            features: self.features.select(Axis(1), indices),
            schema: self.schema.clone(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            classes: self.classes.clone(),
        }
    }

    /// Replace the feature matrix, keeping schema, labels and classes.
    ///
    /// The replacement must have the same shape; used by transforms that
    /// rewrite values without touching the schema.
    pub(crate) fn replace_features(&self, features: Array2<f64>) -> Table {
        debug_assert_eq!(features.dim(), self.features.dim());
        Table {
            features,
            schema: self.schema.clone(),
            labels: self.labels.clone(),
            classes: self.classes.clone(),
        }
    }
}

/// Fluent builder for [`Table`] construction from columns.
///
/// # Example
///
/// ```
/// use tabeval::table::Table;
///
/// let table = Table::builder()
///     .numeric_column("sepal_len", vec![5.1, 4.9, 6.3, 5.8])
///     .numeric_column("sepal_wid", vec![3.5, 3.0, 3.3, 2.7])
///     .labels("species", &["setosa", "setosa", "virginica", "virginica"])
///     .build()
///     .unwrap();
///
/// assert_eq!(table.n_samples(), 4);
/// assert_eq!(table.n_features(), 2);
/// assert_eq!(table.classes().n_classes(), 2);
/// ```
#[derive(Debug, Default)]
pub struct TableBuilder {
    columns: Vec<(ColumnMeta, Vec<f64>)>,
    labels: Option<(String, Vec<String>)>,
}

impl TableBuilder {
    /// Append a numeric feature column.
    pub fn numeric_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.columns.push((ColumnMeta::numeric(name), values));
        self
    }

    /// Append a categorical feature column; categories are interned in order
    /// of first appearance.
    pub fn categorical_column(mut self, name: impl Into<String>, values: &[&str]) -> Self {
        let mut categories: Vec<String> = Vec::new();
        let ids = values
            .iter()
            .map(|v| {
                (match categories.iter().position(|c| c == v) {
                    Some(id) => id,
                    None => {
                        categories.push((*v).to_string());
                        categories.len() - 1
                    }
                }) as f64
            })
            .collect();
        self.columns
            .push((ColumnMeta::categorical(name, categories), ids));
        self
    }

    /// Set the label column. Class names are interned in order of first
    /// appearance.
    pub fn labels(mut self, name: impl Into<String>, values: &[&str]) -> Self {
        self.labels = Some((
            name.into(),
            values.iter().map(|v| (*v).to_string()).collect(),
        ));
        self
    }

    /// Build the table.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if no label column was set, no feature columns
    /// were added, the table is empty, or column lengths disagree.
    pub fn build(self) -> Result<Table, TableError> {
        let (label_name, raw_labels) = self.labels.ok_or(TableError::MissingLabels)?;
        if self.columns.is_empty() {
            return Err(TableError::NoFeatures);
        }
        let n_samples = raw_labels.len();
        if n_samples == 0 {
            return Err(TableError::EmptyTable);
        }

        let mut metas = Vec::with_capacity(self.columns.len());
        let mut data = Vec::with_capacity(self.columns.len() * n_samples);
        for (meta, values) in self.columns {
            if values.len() != n_samples {
                return Err(TableError::LengthMismatch {
                    column: meta.name,
                    expected: n_samples,
                    found: values.len(),
                });
            }
            data.extend_from_slice(&values);
            metas.push(meta);
        }

        let mut classes = LabelMap::new();
        let labels = raw_labels.iter().map(|v| classes.intern(v)).collect();

        let n_features = metas.len();
        let features = Array2::from_shape_vec((n_features, n_samples), data)
            .expect("column data length was validated above");
        Table::new(features, TableSchema::new(metas, label_name), labels, classes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnKind;

    fn small_table() -> Table {
        Table::builder()
            .numeric_column("x", vec![1.0, 2.0, 3.0, 4.0])
            .numeric_column("y", vec![10.0, 20.0, 30.0, 40.0])
            .labels("class", &["a", "b", "a", "b"])
            .build()
            .unwrap()
    }

    #[test]
    fn builder_assembles_feature_major_storage() {
        let table = small_table();
        assert_eq!(table.n_samples(), 4);
        assert_eq!(table.n_features(), 2);
        assert_eq!(table.feature(0).to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(table.sample(2).to_vec(), vec![3.0, 30.0]);
        assert_eq!(table.labels(), &[0, 1, 0, 1]);
        assert_eq!(table.schema().label_name(), "class");
    }

    #[test]
    fn builder_interns_categorical_columns() {
        let table = Table::builder()
            .categorical_column("color", &["red", "blue", "red"])
            .labels("class", &["a", "a", "b"])
            .build()
            .unwrap();
        assert_eq!(table.feature(0).to_vec(), vec![0.0, 1.0, 0.0]);
        match &table.schema().column(0).kind {
            ColumnKind::Categorical { categories } => {
                assert_eq!(categories, &["red", "blue"]);
            }
            other => panic!("expected categorical, got {other}"),
        }
    }

    #[test]
    fn builder_rejects_ragged_columns() {
        let err = Table::builder()
            .numeric_column("x", vec![1.0, 2.0])
            .labels("class", &["a", "b", "a"])
            .build()
            .unwrap_err();
        assert!(matches!(err, TableError::LengthMismatch { .. }));
    }

    #[test]
    fn builder_requires_labels_and_features() {
        let err = Table::builder()
            .numeric_column("x", vec![1.0])
            .build()
            .unwrap_err();
        assert!(matches!(err, TableError::MissingLabels));

        let err = Table::builder()
            .labels("class", &["a"])
            .build()
            .unwrap_err();
        assert!(matches!(err, TableError::NoFeatures));
    }

    #[test]
    fn select_rows_keeps_order_and_vocabulary() {
        let table = small_table();
        let picked = table.select_rows(&[3, 1]);
        assert_eq!(picked.n_samples(), 2);
        assert_eq!(picked.feature(0).to_vec(), vec![4.0, 2.0]);
        assert_eq!(picked.labels(), &[1, 1]);
        assert_eq!(picked.classes(), table.classes());
    }

    #[test]
    fn label_counts_cover_all_classes() {
        let table = small_table();
        assert_eq!(table.label_counts(), vec![2, 2]);
    }
}
