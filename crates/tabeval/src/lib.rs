//! tabeval: a train/test evaluation pipeline for tabular classifiers.
//!
//! Loads a delimited-text dataset into a typed [`Table`], partitions it with
//! a seeded stratified split, standardizes features with training-only
//! statistics, fits a pluggable classifier, and reports accuracy, confusion
//! matrix, and ROC metrics on the held-out rows.
//!
//! # Key Types
//!
//! - [`Table`] / [`load_delimited`] - data loading and containers
//! - [`SplitConfig`] / [`stratified_split`] - seeded stratified partitioning
//! - [`NormalizationParams`] - leakage-free feature standardization
//! - [`Classifier`] - the fit/predict adapter trait, implemented by
//!   [`LinearDiscriminant`], [`KNearestNeighbors`], [`LogisticRegression`]
//! - [`ConfusionMatrix`] / [`RocCurve`] - evaluation metrics
//! - [`EvalPipeline`] - the whole flow in one call, with per-stage error
//!   attribution
//!
//! # Example
//!
//! ```
//! use std::num::NonZeroUsize;
//!
//! use tabeval::model::KNearestNeighbors;
//! use tabeval::pipeline::EvalPipeline;
//! use tabeval::testing::two_cluster_table;
//!
//! let table = two_cluster_table(30, 2, 8.0, 11);
//! let pipeline = EvalPipeline::builder()
//!     .train_fraction(0.75)
//!     .seed(11)
//!     .build()
//!     .unwrap();
//!
//! let knn = KNearestNeighbors::new(NonZeroUsize::new(5).unwrap());
//! let report = pipeline.run(&table, &knn).unwrap();
//!
//! assert!(report.accuracy > 0.9);
//! println!("{report}");
//! ```
//!
//! # Reproducibility
//!
//! The split is the only randomized step, and its generator is seeded from
//! an explicit configuration parameter. No stage reads global state; the
//! same table, seed, and classifier always produce the same report.

pub mod error;
pub mod eval;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod split;
pub mod table;
pub mod testing;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use error::{ConfigError, Error};
pub use eval::{accuracy, ConfusionMatrix, EvalError, RocCurve, RocPoint};
pub use model::{
    Classifier, KNearestNeighbors, LinearDiscriminant, LogisticRegression, ModelError,
    PredictionResult,
};
pub use normalize::{FeatureScale, NormalizationParams, NormalizeError};
pub use pipeline::{EvalPipeline, EvalReport, PipelineError, Stage};
pub use split::{stratified_split, Split, SplitConfig, SplitError};
pub use table::{load_delimited, LabelMap, Table, TableBuilder, TableError, TableSchema};
