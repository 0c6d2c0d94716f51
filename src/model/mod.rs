//! Imputation and the gradient-boosted regressor

pub mod imputer;
pub mod regressor;

pub use imputer::MedianImputer;
pub use regressor::{FittedModel, GbmParams};
