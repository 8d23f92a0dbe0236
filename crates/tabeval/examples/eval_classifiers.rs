//! Evaluate all three classifiers on a synthetic two-cluster dataset.
//!
//! Run with:
//! ```bash
//! cargo run --example eval_classifiers
//! ```

use std::num::NonZeroUsize;

use tabeval::model::{KNearestNeighbors, LinearDiscriminant, LogisticRegression};
use tabeval::pipeline::EvalPipeline;
use tabeval::testing::two_cluster_table;

fn main() {
    env_logger::init();

    // 60 rows per class, 4 features, clusters 6 apart.
    let table = two_cluster_table(60, 4, 6.0, 42);
    let pipeline = EvalPipeline::builder()
        .train_fraction(0.75)
        .seed(42)
        .build()
        .expect("valid config");

    let report = pipeline
        .run(&table, &LinearDiscriminant::new())
        .expect("lda run");
    println!("{report}");

    let knn = KNearestNeighbors::new(NonZeroUsize::new(7).expect("nonzero"));
    let report = pipeline.run(&table, &knn).expect("knn run");
    println!("{report}");

    // Cleanly separated clusters can push the logistic MLE to infinity; the
    // failure is reported, not retried.
    match pipeline.run(&table, &LogisticRegression::new()) {
        Ok(report) => println!("{report}"),
        Err(err) => eprintln!("{err}"),
    }
}
