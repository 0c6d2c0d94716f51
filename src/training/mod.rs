//! Training: split policy, metrics, and the fit-and-predict entry point

pub mod metrics;
pub mod split;
pub mod trainer;

pub use trainer::{fit_and_predict, TrainingOutcome};
