//! Delimited-text loader.
//!
//! Column names come from the header row; column types are inferred from the
//! first data row (a cell that parses as `f64` makes the column numeric,
//! anything else makes it categorical). Every later row must fit the inferred
//! type, and every row must have the header's width.

use std::path::Path;

use ndarray::Array2;

use super::error::TableError;
use super::schema::{ColumnMeta, LabelMap, TableSchema};
use super::table::Table;

/// Load a delimited-text file into a [`Table`].
///
/// `label_column` names the column holding the class labels; all other
/// columns become features.
///
/// # Errors
///
/// - [`TableError::UnknownColumn`] if `label_column` is not in the header.
/// - [`TableError::EmptyTable`] if the file has no data rows.
/// - [`TableError::MalformedInput`] on inconsistent row width or a cell that
///   does not fit its column's inferred type.
/// - [`TableError::Read`] for I/O and other reader failures.
pub fn load_delimited(
    path: impl AsRef<Path>,
    delimiter: u8,
    label_column: &str,
) -> Result<Table, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let label_idx = headers
        .iter()
        .position(|h| h == label_column)
        .ok_or_else(|| TableError::UnknownColumn(label_column.to_string()))?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|err| match err.kind() {
            csv::ErrorKind::UnequalLengths {
                expected_len, len, ..
            } => TableError::MalformedInput {
                row: row + 1,
                detail: format!("expected {expected_len} fields, found {len}"),
            },
            _ => TableError::Read(err),
        })?;
        records.push(record);
    }
    if records.is_empty() {
        return Err(TableError::EmptyTable);
    }

    let feature_cols: Vec<usize> = (0..headers.len()).filter(|&c| c != label_idx).collect();
    if feature_cols.is_empty() {
        return Err(TableError::NoFeatures);
    }

    let n_samples = records.len();
    let mut metas = Vec::with_capacity(feature_cols.len());
    let mut data = Vec::with_capacity(feature_cols.len() * n_samples);

    for &col in &feature_cols {
        let name = headers[col].as_str();
        let numeric = records[0]
            .get(col)
            .is_some_and(|cell| cell.parse::<f64>().is_ok());

        if numeric {
            for (row, record) in records.iter().enumerate() {
                let cell = record.get(col).unwrap_or("");
                let value = cell.parse::<f64>().map_err(|_| TableError::MalformedInput {
                    row: row + 1,
                    detail: format!("column `{name}`: `{cell}` is not a number"),
                })?;
                data.push(value);
            }
            metas.push(ColumnMeta::numeric(name));
        } else {
            let mut categories: Vec<String> = Vec::new();
            for record in &records {
                let cell = record.get(col).unwrap_or("");
                let id = match categories.iter().position(|c| c == cell) {
                    Some(id) => id,
                    None => {
                        categories.push(cell.to_string());
                        categories.len() - 1
                    }
                };
                data.push(id as f64);
            }
            metas.push(ColumnMeta::categorical(name, categories));
        }
    }

    let mut classes = LabelMap::new();
    let labels: Vec<u32> = records
        .iter()
        .map(|record| classes.intern(record.get(label_idx).unwrap_or("")))
        .collect();

    let features = Array2::from_shape_vec((feature_cols.len(), n_samples), data)
        .expect("every column contributed n_samples values");
    Table::new(
        features,
        TableSchema::new(metas, headers[label_idx].clone()),
        labels,
        classes,
    )
}
