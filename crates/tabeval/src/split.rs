//! Stratified train/test splitting.
//!
//! [`stratified_split`] partitions a [`Table`] into training and test
//! subsets so that each class keeps (approximately) its share of rows on
//! both sides. The shuffle is driven entirely by the explicit seed in
//! [`SplitConfig`]; identical inputs and seeds always produce identical
//! splits.

use bon::Builder;
use rand::prelude::*;
use thiserror::Error;

use crate::error::ConfigError;
use crate::table::Table;

/// Errors that can occur while splitting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    /// A class is too small to appear on both sides of the split.
    #[error("class `{class}` has {count} rows; at least 2 are required to stratify")]
    InsufficientData { class: String, count: usize },

    /// The input table has no rows.
    #[error("cannot split an empty table")]
    EmptyTable,
}

/// Configuration for [`stratified_split`].
///
/// # Example
///
/// ```
/// use tabeval::split::SplitConfig;
///
/// // Defaults: 75% training, seed 42.
/// let config = SplitConfig::builder().build().unwrap();
/// assert_eq!(config.train_fraction, 0.75);
///
/// let config = SplitConfig::builder()
///     .train_fraction(0.8)
///     .seed(7)
///     .build()
///     .unwrap();
/// assert_eq!(config.seed, 7);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct SplitConfig {
    /// Fraction of each class assigned to the training subset. Default: 0.75.
    #[builder(default = 0.75)]
    pub train_fraction: f64,

    /// Seed for the per-class shuffle. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,
}

impl<S: split_config_builder::IsComplete> SplitConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `train_fraction` is outside `(0, 1)`.
    pub fn build(self) -> Result<SplitConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl SplitConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(ConfigError::InvalidTrainFraction(self.train_fraction));
        }
        Ok(())
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}

/// A disjoint train/test partition of one parent table.
///
/// Every parent row appears in exactly one of the two subsets.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Table,
    pub test: Table,
}

/// Partition `table` into stratified training and test subsets.
///
/// Rows are grouped by class; each group is shuffled with a generator seeded
/// from `config.seed` (classes visited in label-id order, so the result is a
/// pure function of the table and the seed) and
/// `round(train_fraction * class_size)` of its rows go to training, clamped
/// so every class keeps at least one row on each side. Row order within each
/// subset preserves the parent table's order.
///
/// # Errors
///
/// Returns [`SplitError::InsufficientData`] if any class has fewer than 2
/// rows, and [`SplitError::EmptyTable`] for an empty input.
pub fn stratified_split(table: &Table, config: &SplitConfig) -> Result<Split, SplitError> {
    if table.is_empty() {
        return Err(SplitError::EmptyTable);
    }

    let n_classes = table.classes().n_classes();
    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for (row, &label) in table.labels().iter().enumerate() {
        by_class[label as usize].push(row);
    }
    for (class, rows) in by_class.iter().enumerate() {
        if rows.len() < 2 {
            return Err(SplitError::InsufficientData {
                class: table.classes().name(class as u32).to_string(),
                count: rows.len(),
            });
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut train_rows = Vec::new();
    let mut test_rows = Vec::new();
    for mut rows in by_class {
        let count = rows.len();
        rows.shuffle(&mut rng);
        let n_train = ((config.train_fraction * count as f64).round() as usize).clamp(1, count - 1);
        train_rows.extend_from_slice(&rows[..n_train]);
        test_rows.extend_from_slice(&rows[n_train..]);
    }
    train_rows.sort_unstable();
    test_rows.sort_unstable();

    Ok(Split {
        train: table.select_rows(&train_rows),
        test: table.select_rows(&test_rows),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;

    /// 100 rows, 60 of class `a`, 40 of class `b`.
    fn sixty_forty() -> Table {
        let labels: Vec<&str> = (0..100).map(|i| if i < 60 { "a" } else { "b" }).collect();
        Table::builder()
            .numeric_column("x", (0..100).map(f64::from).collect())
            .labels("class", &labels)
            .build()
            .unwrap()
    }

    fn sorted_rows(table: &Table) -> Vec<i64> {
        let mut rows: Vec<i64> = table.feature(0).iter().map(|&v| v as i64).collect();
        rows.sort_unstable();
        rows
    }

    #[test]
    fn split_partitions_rows_exactly() {
        let table = sixty_forty();
        let split = stratified_split(&table, &SplitConfig::default()).unwrap();
        assert_eq!(split.train.n_samples() + split.test.n_samples(), 100);

        let mut all = sorted_rows(&split.train);
        all.extend(sorted_rows(&split.test));
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<i64>>());
    }

    #[test]
    fn split_preserves_class_proportions() {
        let table = sixty_forty();
        let split = stratified_split(&table, &SplitConfig::default()).unwrap();
        assert_eq!(split.train.label_counts(), vec![45, 30]);
        assert_eq!(split.test.label_counts(), vec![15, 10]);
    }

    #[test]
    fn split_is_deterministic_per_seed() {
        let table = sixty_forty();
        let config = SplitConfig::builder().seed(7).build().unwrap();
        let first = stratified_split(&table, &config).unwrap();
        let second = stratified_split(&table, &config).unwrap();
        assert_eq!(sorted_rows(&first.train), sorted_rows(&second.train));

        let other = SplitConfig::builder().seed(8).build().unwrap();
        let third = stratified_split(&table, &other).unwrap();
        assert_ne!(sorted_rows(&first.train), sorted_rows(&third.train));
    }

    #[test]
    fn split_keeps_small_classes_on_both_sides() {
        let table = Table::builder()
            .numeric_column("x", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .labels("class", &["a", "a", "a", "a", "b", "b"])
            .build()
            .unwrap();
        let split = stratified_split(&table, &SplitConfig::default()).unwrap();
        // round(0.75 * 2) = 2 would starve the test side; the clamp keeps one.
        assert_eq!(split.train.label_counts(), vec![3, 1]);
        assert_eq!(split.test.label_counts(), vec![1, 1]);
    }

    #[test]
    fn split_rejects_single_row_classes() {
        let table = Table::builder()
            .numeric_column("x", vec![1.0, 2.0, 3.0])
            .labels("class", &["a", "a", "b"])
            .build()
            .unwrap();
        let err = stratified_split(&table, &SplitConfig::default()).unwrap_err();
        assert_eq!(
            err,
            SplitError::InsufficientData {
                class: "b".to_string(),
                count: 1
            }
        );
    }

    #[rstest::rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(-0.5)]
    #[case(1.5)]
    fn config_rejects_degenerate_fractions(#[case] fraction: f64) {
        let err = SplitConfig::builder()
            .train_fraction(fraction)
            .build()
            .unwrap_err();
        assert_eq!(err, crate::error::ConfigError::InvalidTrainFraction(fraction));
    }
}
