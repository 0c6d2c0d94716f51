//! Evaluation metrics

/// Mean absolute error between predictions and observed targets.
/// An empty holdout has no meaningful error; the infinite sentinel marks
/// "no validation performed" and must never be plotted as zero.
pub fn mean_absolute_error(predictions: &[f64], targets: &[f64]) -> f64 {
    if predictions.is_empty() || predictions.len() != targets.len() {
        return f64::INFINITY;
    }
    predictions
        .iter()
        .zip(targets)
        .map(|(p, t)| (p - t).abs())
        .sum::<f64>()
        / predictions.len() as f64
}
