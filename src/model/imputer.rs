//! Median imputation
//!
//! Medians are learned once from the training matrix and reused verbatim
//! for every later transform, including Monte Carlo trial inputs. Refitting
//! on simulation inputs would silently shift the feature distribution the
//! model was trained against.

use crate::features::FeatureMatrix;
use crate::{RaceError, Result};

/// Per-column median fill for missing feature values
#[derive(Debug, Clone)]
pub struct MedianImputer {
    medians: Vec<f64>,
}

impl MedianImputer {
    /// Learn per-column medians from a feature matrix.
    /// A column with no observed values imputes to 0.0, with a warning.
    pub fn fit(matrix: &FeatureMatrix) -> Self {
        let n_cols = matrix.schema().len();
        let mut medians = Vec::with_capacity(n_cols);

        for col in 0..n_cols {
            let mut observed: Vec<f64> = matrix
                .rows()
                .iter()
                .filter_map(|row| row[col])
                .collect();
            if observed.is_empty() {
                let name: Vec<&str> = matrix.schema().names().collect();
                log::warn!("column {} has no observed values, imputing 0.0", name[col]);
                medians.push(0.0);
                continue;
            }
            observed.sort_by(f64::total_cmp);
            medians.push(median_of_sorted(&observed));
        }

        MedianImputer { medians }
    }

    /// Fill missing values with the fitted medians, producing dense rows
    pub fn transform(&self, matrix: &FeatureMatrix) -> Result<Vec<Vec<f64>>> {
        if matrix.schema().len() != self.medians.len() {
            return Err(RaceError::RowMismatch {
                left: self.medians.len(),
                right: matrix.schema().len(),
                what: "feature columns",
            });
        }
        Ok(matrix
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(col, value)| value.unwrap_or(self.medians[col]))
                    .collect()
            })
            .collect())
    }

    /// Fit on a matrix and transform it in one pass
    pub fn fit_transform(matrix: &FeatureMatrix) -> Result<(Self, Vec<Vec<f64>>)> {
        let imputer = Self::fit(matrix);
        let dense = imputer.transform(matrix)?;
        Ok((imputer, dense))
    }

    pub fn medians(&self) -> &[f64] {
        &self.medians
    }
}

/// Median of a sorted slice; even lengths average the two middle values
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Frame;
    use crate::features::{FeatureSchema, FEATURE_COLUMNS};
    use crate::DriverCode;
    use approx::assert_relative_eq;

    fn matrix_with_first_column(values: Vec<Option<f64>>) -> FeatureMatrix {
        let n = values.len();
        let drivers = (0..n).map(|i| DriverCode::new(format!("D{}", i))).collect();
        let mut frame = Frame::new(drivers);
        frame.push_column(FEATURE_COLUMNS[0], values).unwrap();
        for name in &FEATURE_COLUMNS[1..] {
            frame.push_column(*name, vec![Some(1.0); n]).unwrap();
        }
        FeatureMatrix::from_frame(&frame, &FeatureSchema::default()).unwrap()
    }

    #[test]
    fn test_median_fill() {
        let matrix = matrix_with_first_column(vec![Some(70.0), None, Some(72.0), Some(71.0)]);
        let (imputer, dense) = MedianImputer::fit_transform(&matrix).unwrap();

        assert_relative_eq!(imputer.medians()[0], 71.0);
        assert_relative_eq!(dense[1][0], 71.0);
        // Observed values pass through untouched
        assert_relative_eq!(dense[0][0], 70.0);
    }

    #[test]
    fn test_even_count_averages_middle_pair() {
        let matrix = matrix_with_first_column(vec![Some(70.0), Some(71.0), Some(73.0), Some(74.0)]);
        let imputer = MedianImputer::fit(&matrix);
        assert_relative_eq!(imputer.medians()[0], 72.0);
    }

    #[test]
    fn test_fitted_medians_reused_not_refit() {
        let train = matrix_with_first_column(vec![Some(70.0), Some(72.0), None]);
        let imputer = MedianImputer::fit(&train);

        // A later matrix with different observed values must still be
        // filled with the training medians.
        let later = matrix_with_first_column(vec![None, Some(99.0)]);
        let dense = imputer.transform(&later).unwrap();
        assert_relative_eq!(dense[0][0], 71.0);
    }

    #[test]
    fn test_all_missing_column_imputes_zero() {
        let matrix = matrix_with_first_column(vec![None, None]);
        let (imputer, dense) = MedianImputer::fit_transform(&matrix).unwrap();
        assert_relative_eq!(imputer.medians()[0], 0.0);
        assert_relative_eq!(dense[0][0], 0.0);
    }
}
