//! Column metadata and class vocabulary types.

use serde::{Deserialize, Serialize};

/// Logical column types.
///
/// Feature values are stored as `f64` regardless of kind. `Categorical`
/// columns hold category ids (`0.0, 1.0, ...`) indexing into the column's
/// category vocabulary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Continuous numeric column.
    Numeric,
    /// Categorical column stored as float category ids.
    Categorical {
        /// Category names, in order of first appearance.
        categories: Vec<String>,
    },
}

impl ColumnKind {
    /// Returns true if this is a numeric column.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Numeric)
    }

    /// Returns true if this is a categorical column.
    #[inline]
    pub fn is_categorical(&self) -> bool {
        !self.is_numeric()
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Categorical { .. } => write!(f, "categorical"),
        }
    }
}

/// Metadata for a single feature column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Column name, from the file header or the builder.
    pub name: String,
    /// Column type.
    pub kind: ColumnKind,
}

impl ColumnMeta {
    /// Metadata for a numeric column.
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Numeric,
        }
    }

    /// Metadata for a categorical column with the given vocabulary.
    pub fn categorical(name: impl Into<String>, categories: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: ColumnKind::Categorical { categories },
        }
    }
}

/// Ordered feature-column metadata plus the name of the label column.
///
/// A schema describes the feature columns only; labels live beside the
/// features in [`Table`](crate::table::Table) as class ids into a
/// [`LabelMap`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    columns: Vec<ColumnMeta>,
    label_name: String,
}

impl TableSchema {
    /// Create a schema from column metadata and the label column's name.
    pub fn new(columns: Vec<ColumnMeta>, label_name: impl Into<String>) -> Self {
        Self {
            columns,
            label_name: label_name.into(),
        }
    }

    /// Number of feature columns.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    /// All feature-column metadata, in storage order.
    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    /// Metadata for feature column `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= n_features()`.
    pub fn column(&self, idx: usize) -> &ColumnMeta {
        &self.columns[idx]
    }

    /// Name of the label column.
    pub fn label_name(&self) -> &str {
        &self.label_name
    }

    /// Index of the feature column named `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Describe the first difference against `other`, if any.
    pub(crate) fn mismatch(&self, other: &TableSchema) -> Option<String> {
        if self.columns.len() != other.columns.len() {
            return Some(format!(
                "expected {} feature columns, found {}",
                self.columns.len(),
                other.columns.len()
            ));
        }
        for (idx, (a, b)) in self.columns.iter().zip(other.columns.iter()).enumerate() {
            if a != b {
                return Some(format!(
                    "feature column {idx}: expected `{}` ({}), found `{}` ({})",
                    a.name, a.kind, b.name, b.kind
                ));
            }
        }
        None
    }
}

/// The fixed class vocabulary of a labelled table.
///
/// Label ids are indices into the vocabulary, assigned in order of first
/// appearance when the table is loaded or built.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMap {
    names: Vec<String>,
}

impl LabelMap {
    /// An empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vocabulary from class names, keeping their order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Return the id for `name`, inserting it if unseen.
    pub fn intern(&mut self, name: &str) -> u32 {
        match self.index_of(name) {
            Some(id) => id,
            None => {
                self.names.push(name.to_string());
                (self.names.len() - 1) as u32
            }
        }
    }

    /// The id of `name`, if present.
    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.names.iter().position(|n| n == name).map(|i| i as u32)
    }

    /// The name of class `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn name(&self, id: u32) -> &str {
        &self.names[id as usize]
    }

    /// Number of known classes.
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no classes are known.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over class names in id order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
