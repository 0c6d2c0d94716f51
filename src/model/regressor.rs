//! Gradient-boosted regression
//!
//! Wraps the `gbdt` squared-error regressor behind an immutable fitted
//! value. With one training row or fewer, boosted trees have nothing to
//! split on and the model degenerates to a constant predictor; that keeps
//! the "never fail on small samples" contract intact.

use crate::features::FeatureSchema;
use crate::training::metrics::mean_absolute_error;
use crate::{ModelConfig, RaceError, Result};
use gbdt::config::Config as GbdtConfig;
use gbdt::decision_tree::{Data, DataVec, ValueType};
use gbdt::gradient_boost::GBDT;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashMap;

/// Shuffles per column when estimating permutation importance
const IMPORTANCE_REPEATS: usize = 5;

/// Validated gradient-boosting hyperparameters
#[derive(Debug, Clone)]
pub struct GbmParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub seed: u64,
}

impl From<&ModelConfig> for GbmParams {
    fn from(config: &ModelConfig) -> Self {
        GbmParams {
            n_estimators: config.n_estimators,
            learning_rate: config.learning_rate,
            max_depth: config.max_depth,
            seed: config.seed,
        }
    }
}

impl GbmParams {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(RaceError::InvalidParameter {
                name: "n_estimators",
                value: 0.0,
            });
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(RaceError::InvalidParameter {
                name: "learning_rate",
                value: self.learning_rate,
            });
        }
        if self.max_depth == 0 {
            return Err(RaceError::InvalidParameter {
                name: "max_depth",
                value: 0.0,
            });
        }
        Ok(())
    }
}

enum ModelKind {
    /// Degenerate fit for one row or fewer: predicts the mean target
    Constant(f64),
    Boosted(GBDT),
}

/// An immutable fitted regressor, bound to the schema it was trained on
pub struct FittedModel {
    schema: FeatureSchema,
    kind: ModelKind,
    importance: Vec<f64>,
}

impl FittedModel {
    /// Fit on dense (already imputed) rows
    pub fn fit(
        params: &GbmParams,
        schema: &FeatureSchema,
        rows: &[Vec<f64>],
        targets: &[f64],
    ) -> Result<Self> {
        params.validate()?;
        if rows.len() != targets.len() {
            return Err(RaceError::RowMismatch {
                left: rows.len(),
                right: targets.len(),
                what: "targets",
            });
        }

        let kind = if rows.len() <= 1 {
            let mean = if targets.is_empty() {
                0.0
            } else {
                targets.iter().sum::<f64>() / targets.len() as f64
            };
            ModelKind::Constant(mean)
        } else {
            let mut config = GbdtConfig::new();
            config.set_feature_size(schema.len());
            config.set_max_depth(params.max_depth as u32);
            config.set_iterations(params.n_estimators);
            config.set_shrinkage(params.learning_rate as ValueType);
            config.set_loss("SquaredError");
            // Full sampling keeps the fit deterministic
            config.set_data_sample_ratio(1.0);
            config.set_feature_sample_ratio(1.0);
            config.set_training_optimization_level(2);
            config.set_debug(false);

            let mut training: DataVec = rows
                .iter()
                .zip(targets)
                .map(|(row, &target)| {
                    let feature = row.iter().map(|&v| v as ValueType).collect();
                    Data::new_training_data(feature, 1.0, target as ValueType, None)
                })
                .collect();

            let mut model = GBDT::new(&config);
            model.fit(&mut training);
            ModelKind::Boosted(model)
        };

        let mut fitted = FittedModel {
            schema: schema.clone(),
            kind,
            importance: vec![0.0; schema.len()],
        };
        fitted.importance = fitted.permutation_importance(rows, targets, params.seed)?;
        Ok(fitted)
    }

    /// Score dense rows in schema column order
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        if let Some(row) = rows.first() {
            if row.len() != self.schema.len() {
                return Err(RaceError::RowMismatch {
                    left: self.schema.len(),
                    right: row.len(),
                    what: "feature columns",
                });
            }
        }
        match &self.kind {
            ModelKind::Constant(mean) => Ok(vec![*mean; rows.len()]),
            ModelKind::Boosted(model) => {
                let test: DataVec = rows
                    .iter()
                    .map(|row| {
                        let feature = row.iter().map(|&v| v as ValueType).collect();
                        Data::new_test_data(feature, None)
                    })
                    .collect();
                Ok(model.predict(&test).into_iter().map(f64::from).collect())
            }
        }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Learned importance per feature name: the mean MAE degradation when
    /// that column is shuffled, clamped at zero. Scores do not sum to 1.
    pub fn feature_importance(&self) -> HashMap<String, f64> {
        self.schema
            .names()
            .zip(self.importance.iter())
            .map(|(name, &score)| (name.to_string(), score))
            .collect()
    }

    fn permutation_importance(
        &self,
        rows: &[Vec<f64>],
        targets: &[f64],
        seed: u64,
    ) -> Result<Vec<f64>> {
        let n = rows.len();
        if n < 2 {
            return Ok(vec![0.0; self.schema.len()]);
        }
        let baseline = mean_absolute_error(&self.predict(rows)?, targets);

        let mut importance = Vec::with_capacity(self.schema.len());
        for col in 0..self.schema.len() {
            let mut degradation = 0.0;
            for repeat in 0..IMPORTANCE_REPEATS {
                let mut rng =
                    StdRng::seed_from_u64(seed ^ ((col * IMPORTANCE_REPEATS + repeat) as u64 + 1));
                let mut shuffled: Vec<usize> = (0..n).collect();
                shuffled.shuffle(&mut rng);

                let permuted: Vec<Vec<f64>> = rows
                    .iter()
                    .enumerate()
                    .map(|(i, row)| {
                        let mut row = row.clone();
                        row[col] = rows[shuffled[i]][col];
                        row
                    })
                    .collect();
                degradation += mean_absolute_error(&self.predict(&permuted)?, targets) - baseline;
            }
            importance.push((degradation / IMPORTANCE_REPEATS as f64).max(0.0));
        }
        Ok(importance)
    }
}
