//! Ordered tabular data keyed by competitor
//!
//! A `Frame` is one driver key column plus named nullable numeric columns.
//! Row and column order are preserved; missing values are legal everywhere.

use crate::{DriverCode, RaceError, Result};

/// Tabular data: one row per competitor, named numeric columns
#[derive(Debug, Clone, Default)]
pub struct Frame {
    drivers: Vec<DriverCode>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl Frame {
    /// Create a frame with the given key column and no data columns
    pub fn new(drivers: Vec<DriverCode>) -> Self {
        Frame {
            drivers,
            columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn drivers(&self) -> &[DriverCode] {
        &self.drivers
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// Append a data column; its length must match the key column
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        if values.len() != self.drivers.len() {
            return Err(RaceError::RowMismatch {
                left: self.drivers.len(),
                right: values.len(),
                what: "column values",
            });
        }
        self.columns.push((name.into(), values));
        Ok(())
    }

    /// Append a column holding the same value in every row
    pub fn push_constant(&mut self, name: impl Into<String>, value: f64) {
        let values = vec![Some(value); self.drivers.len()];
        self.columns.push((name.into(), values));
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Result<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .ok_or_else(|| RaceError::SchemaMismatch(name.to_string()))
    }

    /// Value at (driver row, column), if the row exists and the value is set
    pub fn value(&self, driver: &DriverCode, name: &str) -> Result<Option<f64>> {
        let col = self.column(name)?;
        Ok(self
            .drivers
            .iter()
            .position(|d| d == driver)
            .and_then(|i| col[i]))
    }

    /// Left join: pull the named columns from `other` by driver code.
    /// Drivers absent from `other` get nulls; no rows are dropped.
    pub fn left_join(&mut self, other: &Frame, names: &[&str]) -> Result<()> {
        for &name in names {
            let source = other.column(name)?;
            let values = self
                .drivers
                .iter()
                .map(|d| {
                    other
                        .drivers
                        .iter()
                        .position(|o| o == d)
                        .and_then(|i| source[i])
                })
                .collect();
            self.push_column(name, values)?;
        }
        Ok(())
    }

    /// Keep only rows whose driver satisfies the predicate, preserving order.
    /// Returns the filtered frame and the number of rows dropped.
    pub fn filter_rows<F>(&self, keep: F) -> (Frame, usize)
    where
        F: Fn(&DriverCode) -> bool,
    {
        let kept: Vec<usize> = (0..self.drivers.len())
            .filter(|&i| keep(&self.drivers[i]))
            .collect();
        let dropped = self.drivers.len() - kept.len();

        let drivers = kept.iter().map(|&i| self.drivers[i].clone()).collect();
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| (name.clone(), kept.iter().map(|&i| values[i]).collect()))
            .collect();

        (Frame { drivers, columns }, dropped)
    }
}
