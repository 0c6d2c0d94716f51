//! Feature schema and matrix
//!
//! The schema is an explicit ordered-column contract. The trained model's
//! importances only make sense if fit and predict see the same column
//! order, so the order is validated at every boundary instead of relying
//! on incidental table layout.

use crate::data::Frame;
use crate::{RaceError, Result};

/// Column perturbed with driver/consistency noise during simulation
pub const PACE_COLUMN: &str = "CleanAirRacePace";
/// Column perturbed with crew/strategy noise during simulation
pub const PIT_COLUMN: &str = "PitLossTime";

/// Model feature columns, in fit/predict order
pub const FEATURE_COLUMNS: [&str; 8] = [
    "QualifyingTime",
    "RainProbability",
    "Temperature",
    "TeamPerformanceScore",
    PACE_COLUMN,
    "AveragePositionChange",
    "TrackDownforce",
    PIT_COLUMN,
];

/// Ordered list of feature column names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        FeatureSchema {
            columns: FEATURE_COLUMNS.iter().map(|&c| c.to_string()).collect(),
        }
    }
}

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| RaceError::SchemaMismatch(name.to_string()))
    }

    /// Check that `other` declares exactly these columns in this order.
    /// Names the first column that is absent or out of place.
    pub fn check_matches(&self, other: &FeatureSchema) -> Result<()> {
        for (i, name) in self.columns.iter().enumerate() {
            if other.columns.get(i) != Some(name) {
                return Err(RaceError::SchemaMismatch(name.clone()));
            }
        }
        if other.columns.len() > self.columns.len() {
            return Err(RaceError::SchemaMismatch(
                other.columns[self.columns.len()].clone(),
            ));
        }
        Ok(())
    }
}

/// Feature matrix: one row per competitor, columns in schema order
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    schema: FeatureSchema,
    rows: Vec<Vec<Option<f64>>>,
}

impl FeatureMatrix {
    /// Extract the schema's columns from a frame, in schema order.
    /// Fails fast on the first missing column.
    pub fn from_frame(frame: &Frame, schema: &FeatureSchema) -> Result<Self> {
        let mut columns = Vec::with_capacity(schema.len());
        for name in schema.names() {
            columns.push(frame.column(name)?);
        }

        let rows = (0..frame.len())
            .map(|i| columns.iter().map(|col| col[i]).collect())
            .collect();

        Ok(FeatureMatrix {
            schema: schema.clone(),
            rows,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }
}
