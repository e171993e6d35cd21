use anyhow::{Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::model::Dataset;

/// Seed used by the pipeline so the split is reproducible run to run.
pub const DEFAULT_SEED: u64 = 123;

/// Fraction of rows that go to the training table.
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;

/// Shuffle the row order with a seeded RNG and cut it into (train, test).
///
/// The split is a uniform permutation of the rows, not stratified on the
/// target. The training table gets `round(len * train_fraction)` rows.
pub fn train_test_split(
    dataset: &Dataset,
    train_fraction: f64,
    seed: u64,
) -> Result<(Dataset, Dataset)> {
    if !(0.0..=1.0).contains(&train_fraction) {
        bail!("train fraction must be within [0, 1], got {train_fraction}");
    }

    let mut order: Vec<usize> = (0..dataset.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let split_at = ((dataset.len() as f64) * train_fraction).round() as usize;
    let split_at = split_at.min(dataset.len());
    let (train_idx, test_idx) = order.split_at(split_at);

    log::debug!(
        "Dataset split: {} training rows, {} test rows",
        train_idx.len(),
        test_idx.len()
    );

    Ok((dataset.select_rows(train_idx), dataset.select_rows(test_idx)))
}
