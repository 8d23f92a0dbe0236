//! Tabular data containers and the delimited-text loader.
//!
//! # Key Types
//!
//! - [`Table`]: the pipeline's data container (feature-major storage, label
//!   ids, class vocabulary)
//! - [`TableBuilder`]: fluent column-by-column construction
//! - [`TableSchema`] / [`ColumnMeta`] / [`ColumnKind`]: feature metadata
//! - [`LabelMap`]: the fixed class vocabulary of the label column
//! - [`load_delimited`]: read a delimited-text file into a [`Table`]

mod error;
mod loader;
mod schema;
#[allow(clippy::module_inception)]
mod table;

pub use error::TableError;
pub use loader::load_delimited;
pub use schema::{ColumnKind, ColumnMeta, LabelMap, TableSchema};
pub use table::{Table, TableBuilder};
