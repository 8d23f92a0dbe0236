//! Errors for table construction and loading.

use thiserror::Error;

/// Errors that can occur while building or loading a [`Table`](super::Table).
#[derive(Debug, Error)]
pub enum TableError {
    /// The underlying reader failed (I/O, encoding).
    #[error("failed to read delimited input: {0}")]
    Read(#[from] csv::Error),

    /// A data row does not fit the inferred schema.
    #[error("malformed input at row {row}: {detail}")]
    MalformedInput { row: usize, detail: String },

    /// The named column does not exist.
    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    /// The input contains no data rows.
    #[error("table has no data rows")]
    EmptyTable,

    /// The input contains no feature columns.
    #[error("table has no feature columns")]
    NoFeatures,

    /// A table cannot be built without a label column.
    #[error("no label column was provided")]
    MissingLabels,

    /// A column's value count disagrees with the rest of the table.
    #[error("column `{column}` has {found} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// A label id does not index into the class vocabulary.
    #[error("label id {id} out of range for {n_classes} classes")]
    LabelOutOfRange { id: u32, n_classes: usize },
}
