//! Synthetic dataset generators for tests and examples.
//!
//! All generators are deterministic given their seed.

use rand::prelude::*;

use crate::table::Table;

/// A table of uniform clusters, one per class, spaced `separation` apart
/// along every feature axis.
///
/// Class `c` gets `class_sizes[c]` rows named `c0, c1, ...` centered at
/// `c * separation`, with uniform noise in `[-1, 1]` per feature. Feature
/// columns are named `f0, f1, ...`; the label column is `class`.
pub fn cluster_table(class_sizes: &[usize], n_features: usize, separation: f64, seed: u64) -> Table {
    let mut rng = StdRng::seed_from_u64(seed);
    let n_samples: usize = class_sizes.iter().sum();

    let mut columns = vec![Vec::with_capacity(n_samples); n_features];
    let mut labels = Vec::with_capacity(n_samples);
    for (class, &size) in class_sizes.iter().enumerate() {
        let center = class as f64 * separation;
        for _ in 0..size {
            for column in columns.iter_mut() {
                column.push(center + rng.gen_range(-1.0..1.0));
            }
            labels.push(format!("c{class}"));
        }
    }

    let mut builder = Table::builder();
    for (idx, values) in columns.into_iter().enumerate() {
        builder = builder.numeric_column(format!("f{idx}"), values);
    }
    let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
    builder
        .labels("class", &label_refs)
        .build()
        .expect("generated columns are rectangular")
}

/// Two equally-sized clusters (`c0`, `c1`), the common binary fixture.
pub fn two_cluster_table(n_per_class: usize, n_features: usize, separation: f64, seed: u64) -> Table {
    cluster_table(&[n_per_class, n_per_class], n_features, separation, seed)
}
