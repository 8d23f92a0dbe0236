//! End-to-end evaluation pipeline.
//!
//! [`EvalPipeline`] wires the stages together — split, normalize, fit,
//! predict, evaluate — and attributes any failure to the stage that produced
//! it. Every stage consumes its input fully before the next one starts, and
//! all randomness flows from the explicit seed.
//!
//! # Example
//!
//! ```
//! use tabeval::model::LinearDiscriminant;
//! use tabeval::pipeline::EvalPipeline;
//! use tabeval::testing::two_cluster_table;
//!
//! let table = two_cluster_table(40, 3, 6.0, 7);
//! let pipeline = EvalPipeline::builder().seed(7).build().unwrap();
//! let report = pipeline.run(&table, &LinearDiscriminant::new()).unwrap();
//!
//! assert!(report.accuracy > 0.9);
//! assert_eq!(report.n_train + report.n_test, table.n_samples());
//! ```

use std::fmt;
use std::path::Path;

use bon::Builder;

use crate::error::{ConfigError, Error};
use crate::eval::{accuracy, ConfusionMatrix, RocCurve};
use crate::model::Classifier;
use crate::normalize::NormalizationParams;
use crate::split::{stratified_split, SplitConfig};
use crate::table::{load_delimited, Table};

/// The pipeline stage a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Split,
    Normalize,
    Fit,
    Predict,
    Evaluate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Split => "split",
            Stage::Normalize => "normalize",
            Stage::Fit => "fit",
            Stage::Predict => "predict",
            Stage::Evaluate => "evaluate",
        };
        f.write_str(name)
    }
}

/// A pipeline failure, carrying the failing stage and the underlying error.
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl PipelineError {
    fn new(stage: Stage, source: impl Into<Error>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// Configuration for one evaluation run.
///
/// Defaults: 75% training fraction, seed 42, normalization on.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct EvalPipeline {
    /// Fraction of each class assigned to training. Default: 0.75.
    #[builder(default = 0.75)]
    pub train_fraction: f64,

    /// Seed for the stratified shuffle. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    /// Standardize numeric features with training-derived statistics.
    /// Default: true.
    #[builder(default = true)]
    pub normalize: bool,

    /// Class treated as positive for the ROC curve. When unset, two-class
    /// problems use the second class (id 1) as positive and multi-class
    /// problems skip the ROC.
    pub roc_positive_class: Option<String>,
}

impl<S: eval_pipeline_builder::IsComplete> EvalPipelineBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `train_fraction` is outside `(0, 1)`.
    pub fn build(self) -> Result<EvalPipeline, ConfigError> {
        let pipeline = self.__build_internal();
        if !(pipeline.train_fraction > 0.0 && pipeline.train_fraction < 1.0) {
            return Err(ConfigError::InvalidTrainFraction(pipeline.train_fraction));
        }
        Ok(pipeline)
    }
}

impl Default for EvalPipeline {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}

impl EvalPipeline {
    /// Run the full pipeline on an already-loaded table.
    pub fn run<C: Classifier>(
        &self,
        table: &Table,
        classifier: &C,
    ) -> Result<EvalReport, PipelineError> {
        let config = SplitConfig::builder()
            .train_fraction(self.train_fraction)
            .seed(self.seed)
            .build()
            .map_err(|e| PipelineError::new(Stage::Split, e))?;
        let split = stratified_split(table, &config)
            .map_err(|e| PipelineError::new(Stage::Split, e))?;
        log::debug!(
            "split {} rows into {} train / {} test (seed {})",
            table.n_samples(),
            split.train.n_samples(),
            split.test.n_samples(),
            self.seed
        );

        let (train, test) = if self.normalize {
            let params = NormalizationParams::fit(&split.train);
            let train = params
                .apply(&split.train)
                .map_err(|e| PipelineError::new(Stage::Normalize, e))?;
            let test = params
                .apply(&split.test)
                .map_err(|e| PipelineError::new(Stage::Normalize, e))?;
            (train, test)
        } else {
            (split.train, split.test)
        };

        let model = classifier
            .fit(&train)
            .map_err(|e| PipelineError::new(Stage::Fit, e))?;
        let result = classifier
            .predict(&model, &test)
            .map_err(|e| PipelineError::new(Stage::Predict, e))?;

        let truth = test.labels();
        let accuracy = accuracy(&result, truth)
            .map_err(|e| PipelineError::new(Stage::Evaluate, e))?;
        let confusion = ConfusionMatrix::from_result(&result, truth)
            .map_err(|e| PipelineError::new(Stage::Evaluate, e))?;

        let n_classes = result.classes().n_classes();
        let roc = match (&self.roc_positive_class, n_classes) {
            (Some(positive), 2) => Some(
                RocCurve::from_result(&result, truth, positive)
                    .map_err(|e| PipelineError::new(Stage::Evaluate, e))?,
            ),
            (Some(positive), _) => {
                let reduced = result
                    .one_vs_rest(positive)
                    .map_err(|e| PipelineError::new(Stage::Evaluate, e))?;
                let reduced_truth =
                    crate::eval::one_vs_rest_labels(result.classes(), truth, positive)
                        .map_err(|e| PipelineError::new(Stage::Evaluate, e))?;
                Some(
                    RocCurve::from_result(&reduced, &reduced_truth, positive)
                        .map_err(|e| PipelineError::new(Stage::Evaluate, e))?,
                )
            }
            (None, 2) => {
                let positive = result.classes().name(1).to_string();
                Some(
                    RocCurve::from_result(&result, truth, &positive)
                        .map_err(|e| PipelineError::new(Stage::Evaluate, e))?,
                )
            }
            (None, _) => None,
        };

        Ok(EvalReport {
            classifier: classifier.name().to_string(),
            n_train: train.n_samples(),
            n_test: test.n_samples(),
            accuracy,
            confusion,
            roc,
        })
    }

    /// Load a delimited-text file and run the pipeline on it.
    pub fn run_file<C: Classifier>(
        &self,
        path: impl AsRef<Path>,
        delimiter: u8,
        label_column: &str,
        classifier: &C,
    ) -> Result<EvalReport, PipelineError> {
        let table = load_delimited(path, delimiter, label_column)
            .map_err(|e| PipelineError::new(Stage::Load, e))?;
        self.run(&table, classifier)
    }
}

/// The outcome of one evaluation run.
#[derive(Debug, Clone)]
pub struct EvalReport {
    /// Classifier name, from [`Classifier::name`].
    pub classifier: String,
    pub n_train: usize,
    pub n_test: usize,
    /// Test-set accuracy in `[0, 1]`.
    pub accuracy: f64,
    /// Test-set confusion matrix.
    pub confusion: ConfusionMatrix,
    /// ROC curve, present for two-class problems or when a positive class
    /// was configured.
    pub roc: Option<RocCurve>,
}

impl EvalReport {
    /// Area under the ROC curve, if one was computed.
    pub fn auc(&self) -> Option<f64> {
        self.roc.as_ref().map(RocCurve::auc)
    }
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: accuracy {:.4} ({} train / {} test)",
            self.classifier, self.accuracy, self.n_train, self.n_test
        )?;
        write!(f, "{}", self.confusion)?;
        if let Some(auc) = self.auc() {
            writeln!(f, "auc: {auc:.4}")?;
        }
        Ok(())
    }
}
