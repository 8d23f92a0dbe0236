//! Crate-wide error types.

use thiserror::Error;

use crate::eval::EvalError;
use crate::model::ModelError;
use crate::normalize::NormalizeError;
use crate::split::SplitError;
use crate::table::TableError;

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// `train_fraction` must leave rows on both sides of the split.
    #[error("train_fraction must be in (0, 1), got {0}")]
    InvalidTrainFraction(f64),
}

/// Top-level error unifying the per-stage error enums.
///
/// Each pipeline stage has its own error type; this enum exists so callers
/// driving the stages manually can use one `Result` type, and so
/// [`PipelineError`](crate::pipeline::PipelineError) can attribute any
/// failure to the stage that produced it.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Split(#[from] SplitError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}
