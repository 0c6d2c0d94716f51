//! Monte Carlo race simulation
//!
//! Perturbs pace- and pit-loss-sensitive features across many independent
//! trials, scores each perturbed matrix with the borrowed fitted model and
//! aggregates rank statistics. Trials draw from index-seeded RNG streams,
//! so results do not depend on execution order; chunks of trials run in
//! parallel over the shared read-only model and base matrix.

use crate::features::{FeatureMatrix, PACE_COLUMN, PIT_COLUMN};
use crate::model::{FittedModel, MedianImputer};
use crate::sim::rank::{stable_ranks, RankAccumulator, RankStats};
use crate::{DriverCode, RaceError, Result, SimulationConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Trials dispatched per batch; the deadline is checked between batches
const CHUNK_SIZE: usize = 64;

/// Simulation settings
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    pub trials: usize,
    pub pace_sigma: f64,
    pub pit_sigma: f64,
    pub seed: u64,
    pub timeout: Option<Duration>,
}

impl From<&SimulationConfig> for SimulationOptions {
    fn from(config: &SimulationConfig) -> Self {
        SimulationOptions {
            trials: config.trials,
            pace_sigma: config.pace_sigma,
            pit_sigma: config.pit_sigma,
            seed: config.seed,
            timeout: config.timeout_ms.map(Duration::from_millis),
        }
    }
}

impl SimulationOptions {
    fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(RaceError::InvalidTrialCount);
        }
        for (name, sigma) in [("pace_sigma", self.pace_sigma), ("pit_sigma", self.pit_sigma)] {
            if !(sigma >= 0.0 && sigma.is_finite()) {
                return Err(RaceError::InvalidParameter { name, value: sigma });
            }
        }
        Ok(())
    }
}

/// Per-competitor standings plus the trial counts actually used.
/// `realized_trials` falls short of `requested_trials` only on timeout.
#[derive(Debug)]
pub struct SimulationReport {
    /// Sorted by descending win probability, ties by ascending mean rank
    pub standings: Vec<RankStats>,
    pub requested_trials: usize,
    pub realized_trials: usize,
}

/// Run the Monte Carlo simulation.
///
/// `model` and `imputer` must come from the same training call; the matrix
/// is imputed once here with the already-fitted imputer, never refit.
/// All preconditions are checked before the first trial runs.
pub fn simulate(
    model: &FittedModel,
    imputer: &MedianImputer,
    features: &FeatureMatrix,
    drivers: &[DriverCode],
    options: &SimulationOptions,
) -> Result<SimulationReport> {
    options.validate()?;
    if drivers.len() != features.n_rows() {
        return Err(RaceError::RowMismatch {
            left: features.n_rows(),
            right: drivers.len(),
            what: "competitor codes",
        });
    }
    let mut seen = HashSet::new();
    for driver in drivers {
        if !seen.insert(driver) {
            return Err(RaceError::DuplicateCompetitor(driver.clone()));
        }
    }
    model.schema().check_matches(features.schema())?;

    let base = imputer.transform(features)?;
    let pace_idx = features.schema().index_of(PACE_COLUMN)?;
    let pit_idx = features.schema().index_of(PIT_COLUMN)?;
    let pace_noise = noise("pace_sigma", options.pace_sigma)?;
    let pit_noise = noise("pit_sigma", options.pit_sigma)?;

    let run_trial = |trial: usize| -> Result<Vec<u32>> {
        // Index-seeded stream: independent draws per trial regardless of
        // which worker runs it
        let mut rng =
            StdRng::seed_from_u64(options.seed ^ (trial as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        let mut rows = base.clone();
        for row in &mut rows {
            if let Some(noise) = pace_noise {
                row[pace_idx] += noise.sample(&mut rng);
            }
            if let Some(noise) = pit_noise {
                row[pit_idx] += noise.sample(&mut rng);
            }
        }
        let scores = model.predict(&rows)?;
        Ok(stable_ranks(&scores))
    };

    let deadline = options.timeout.map(|t| Instant::now() + t);
    let mut accumulators: Vec<RankAccumulator> = vec![RankAccumulator::default(); drivers.len()];
    let mut realized = 0;

    while realized < options.trials {
        // The first chunk always runs, so a report reflects at least one trial
        if realized > 0 {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    break;
                }
            }
        }
        let end = (realized + CHUNK_SIZE).min(options.trials);
        let chunk: Vec<Vec<u32>> = (realized..end)
            .into_par_iter()
            .map(run_trial)
            .collect::<Result<_>>()?;
        for ranks in &chunk {
            for (i, &rank) in ranks.iter().enumerate() {
                accumulators[i].record(rank);
            }
        }
        realized = end;
    }

    if realized < options.trials {
        log::warn!(
            "simulation deadline hit: {} of {} trials completed",
            realized,
            options.trials
        );
    }

    let mut standings: Vec<RankStats> = accumulators
        .into_iter()
        .zip(drivers)
        .map(|(acc, driver)| acc.into_stats(driver.clone(), realized))
        .collect();
    standings.sort_by(|a, b| {
        b.win_probability
            .total_cmp(&a.win_probability)
            .then(a.mean_rank.total_cmp(&b.mean_rank))
    });

    Ok(SimulationReport {
        standings,
        requested_trials: options.trials,
        realized_trials: realized,
    })
}

fn noise(name: &'static str, sigma: f64) -> Result<Option<Normal<f64>>> {
    if sigma == 0.0 {
        return Ok(None);
    }
    Normal::new(0.0, sigma)
        .map(Some)
        .map_err(|_| RaceError::InvalidParameter { name, value: sigma })
}
