//! Feature assembly
//!
//! Joins per-competitor attributes into one merged table and derives the
//! feature matrix and target vector from it. Pure transform: no I/O.

use crate::data::loader::mean_lap_times;
use crate::data::{Frame, LapRecord};
use crate::features::{FeatureMatrix, FeatureSchema};
use crate::{RaceError, Result};

/// Output of feature assembly
#[derive(Debug, Clone)]
pub struct AssembledData {
    /// Merged competitor table (enriched qualifying rows with lap history)
    pub merged: Frame,
    /// Feature matrix, aligned row-for-row with `targets`
    pub features: FeatureMatrix,
    /// Mean observed lap time per competitor, seconds
    pub targets: Vec<f64>,
    /// Competitors dropped for lacking lap history
    pub excluded: usize,
}

/// Join qualifying data, sector aggregates and lap history into a training
/// dataset.
///
/// Sector times are a left join (enrichment only); competitors without lap
/// history are dropped from the merged table, since no target exists for
/// them. The exclusion count is returned for observability.
pub fn assemble(
    qualifying: &Frame,
    sectors: &Frame,
    laps: &[LapRecord],
    rain_probability: f64,
    temperature: f64,
) -> Result<AssembledData> {
    if !(0.0..=1.0).contains(&rain_probability) {
        return Err(RaceError::InvalidParameter {
            name: "rain_probability",
            value: rain_probability,
        });
    }

    let mut merged = qualifying.clone();
    merged.left_join(sectors, &["TotalSectorTime"])?;
    merged.push_constant("RainProbability", rain_probability);
    merged.push_constant("Temperature", temperature);

    let lap_means = mean_lap_times(laps);
    let (merged, excluded) = merged.filter_rows(|driver| lap_means.contains_key(driver));
    if excluded > 0 {
        log::info!(
            "excluded {} competitors without lap history ({} remain)",
            excluded,
            merged.len()
        );
    }

    let targets = merged
        .drivers()
        .iter()
        .map(|driver| lap_means[driver])
        .collect();
    let features = FeatureMatrix::from_frame(&merged, &FeatureSchema::default())?;

    Ok(AssembledData {
        merged,
        features,
        targets,
        excluded,
    })
}
