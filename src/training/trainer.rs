//! Model training
//!
//! Imputes, splits, fits and evaluates in one call. Data sparsity degrades
//! gracefully: with nothing to hold out, the validation error is the
//! infinite sentinel and training still succeeds.

use crate::features::FeatureMatrix;
use crate::model::{FittedModel, GbmParams, MedianImputer};
use crate::training::metrics::mean_absolute_error;
use crate::training::split::split_indices;
use crate::{RaceError, Result};

/// Everything produced by one training call. The model and imputer are a
/// matched pair and must be threaded together into simulation.
pub struct TrainingOutcome {
    pub model: FittedModel,
    pub imputer: MedianImputer,
    /// Predictions over the full imputed matrix, train and holdout alike
    pub predictions: Vec<f64>,
    /// Holdout MAE, or infinity when no holdout was possible
    pub validation_mae: f64,
}

/// Impute, split, fit and predict.
///
/// The returned predictions cover every input row, scored by the model
/// fitted on the training partition.
pub fn fit_and_predict(
    features: &FeatureMatrix,
    targets: &[f64],
    params: &GbmParams,
) -> Result<TrainingOutcome> {
    params.validate()?;
    let n = features.n_rows();
    if n != targets.len() {
        return Err(RaceError::RowMismatch {
            left: n,
            right: targets.len(),
            what: "targets",
        });
    }

    let (imputer, dense) = MedianImputer::fit_transform(features)?;
    let (train_idx, holdout_idx) = split_indices(n, params.seed);

    let train_rows: Vec<Vec<f64>> = train_idx.iter().map(|&i| dense[i].clone()).collect();
    let train_targets: Vec<f64> = train_idx.iter().map(|&i| targets[i]).collect();

    let model = FittedModel::fit(params, features.schema(), &train_rows, &train_targets)?;

    let validation_mae = if holdout_idx.is_empty() {
        log::debug!("no holdout possible for {} samples, skipping validation", n);
        f64::INFINITY
    } else {
        let holdout_rows: Vec<Vec<f64>> = holdout_idx.iter().map(|&i| dense[i].clone()).collect();
        let holdout_targets: Vec<f64> = holdout_idx.iter().map(|&i| targets[i]).collect();
        mean_absolute_error(&model.predict(&holdout_rows)?, &holdout_targets)
    };

    let predictions = model.predict(&dense)?;
    log::info!(
        "trained on {}/{} rows, holdout MAE {:.3}",
        train_idx.len(),
        n,
        validation_mae
    );

    Ok(TrainingOutcome {
        model,
        imputer,
        predictions,
        validation_mae,
    })
}
