//! Validation split policy
//!
//! Sample counts here are routinely a handful of competitors, so the
//! holdout size is an explicit policy function of N rather than an
//! "if enough rows" branch buried in the trainer.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Holdout size for a given sample count.
///
/// - N <= 1: no split is possible.
/// - 1 < N < 5: 20% rounded, at least one row.
/// - N >= 5: 30%, rounded up.
pub fn holdout_size(n: usize) -> usize {
    if n <= 1 {
        0
    } else if n < 5 {
        ((0.2 * n as f64).round() as usize).max(1)
    } else {
        (0.3 * n as f64).ceil() as usize
    }
}

/// Deterministic (train, holdout) index split: a seed-shuffled permutation
/// of 0..n with the last `holdout_size(n)` indices held out.
pub fn split_indices(n: usize, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let holdout = holdout_size(n);
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices[..n - holdout].to_vec();
    let held = indices[n - holdout..].to_vec();
    (train, held)
}
