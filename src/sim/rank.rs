//! Rank computation and aggregation
//!
//! Ranks are assigned by an explicit stable transform rather than a
//! library sort's tie-breaking defaults, so a fixed seed stream always
//! reproduces the same standings.

use crate::DriverCode;
use serde::Serialize;

/// Integer ranks for one trial: the smallest score gets rank 1, ties are
/// broken by original row order.
pub fn stable_ranks(scores: &[f64]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]).then(a.cmp(&b)));

    let mut ranks = vec![0u32; scores.len()];
    for (position, &index) in order.iter().enumerate() {
        ranks[index] = position as u32 + 1;
    }
    ranks
}

/// Percentile by linear interpolation between closest order statistics.
/// `sorted` must be ascending and non-empty; `q` in [0, 1].
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let position = q * (n - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

/// Aggregated rank statistics for one competitor
#[derive(Debug, Clone, Serialize)]
pub struct RankStats {
    pub driver: DriverCode,
    pub win_probability: f64,
    pub podium_probability: f64,
    pub mean_rank: f64,
    pub p5_rank: f64,
    pub p95_rank: f64,
}

/// Per-competitor accumulator; merging is commutative and associative, so
/// trial batches can be reduced in any order.
#[derive(Debug, Clone, Default)]
pub struct RankAccumulator {
    wins: usize,
    podiums: usize,
    rank_sum: f64,
    ranks: Vec<u32>,
}

impl RankAccumulator {
    pub fn record(&mut self, rank: u32) {
        if rank == 1 {
            self.wins += 1;
        }
        if rank <= 3 {
            self.podiums += 1;
        }
        self.rank_sum += rank as f64;
        self.ranks.push(rank);
    }

    pub fn merge(&mut self, other: RankAccumulator) {
        self.wins += other.wins;
        self.podiums += other.podiums;
        self.rank_sum += other.rank_sum;
        self.ranks.extend(other.ranks);
    }

    /// Finalize over the realized trial count
    pub fn into_stats(mut self, driver: DriverCode, trials: usize) -> RankStats {
        self.ranks.sort_unstable();
        let sorted: Vec<f64> = self.ranks.iter().map(|&r| r as f64).collect();
        RankStats {
            driver,
            win_probability: self.wins as f64 / trials as f64,
            podium_probability: self.podiums as f64 / trials as f64,
            mean_rank: self.rank_sum / trials as f64,
            p5_rank: percentile(&sorted, 0.05),
            p95_rank: percentile(&sorted, 0.95),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lower_score_gets_better_rank() {
        assert_eq!(stable_ranks(&[93.5, 92.0, 94.1]), vec![2, 1, 3]);
    }

    #[test]
    fn test_ties_broken_by_row_order() {
        assert_eq!(stable_ranks(&[93.0, 93.0, 93.0]), vec![1, 2, 3]);
        assert_eq!(stable_ranks(&[94.0, 93.0, 93.0]), vec![3, 1, 2]);
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(percentile(&sorted, 0.0), 1.0);
        assert_relative_eq!(percentile(&sorted, 0.5), 3.0);
        assert_relative_eq!(percentile(&sorted, 1.0), 5.0);
        assert_relative_eq!(percentile(&sorted, 0.95), 4.8);
    }

    #[test]
    fn test_percentile_degenerate_single_sample() {
        assert_relative_eq!(percentile(&[2.0], 0.05), 2.0);
        assert_relative_eq!(percentile(&[2.0], 0.95), 2.0);
    }

    #[test]
    fn test_accumulator_merge_matches_sequential() {
        let mut sequential = RankAccumulator::default();
        for rank in [1, 3, 2, 1, 5] {
            sequential.record(rank);
        }

        let mut left = RankAccumulator::default();
        left.record(1);
        left.record(3);
        let mut right = RankAccumulator::default();
        right.record(2);
        right.record(1);
        right.record(5);
        left.merge(right);

        let a = sequential.into_stats(crate::DriverCode::from("VER"), 5);
        let b = left.into_stats(crate::DriverCode::from("VER"), 5);
        assert_relative_eq!(a.win_probability, b.win_probability);
        assert_relative_eq!(a.mean_rank, b.mean_rank);
        assert_relative_eq!(a.p95_rank, b.p95_rank);
    }

    #[test]
    fn test_stats_bounds() {
        let mut acc = RankAccumulator::default();
        for rank in [1, 2, 2, 4] {
            acc.record(rank);
        }
        let stats = acc.into_stats(crate::DriverCode::from("NOR"), 4);
        assert!(stats.win_probability <= stats.podium_probability);
        assert!(stats.p5_rank <= stats.mean_rank);
        assert!(stats.mean_rank <= stats.p95_rank);
    }
}
