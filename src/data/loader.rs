//! Session data loading and aggregation
//!
//! Lap history and qualifying times arrive as JSON fixtures from the
//! telemetry collaborator; this module parses them and derives the
//! per-driver aggregates the assembler consumes.

use crate::data::Frame;
use crate::{DriverCode, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A lap as delivered by the session loader; any field may be missing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLap {
    pub driver: DriverCode,
    pub lap_time: Option<f64>,
    pub sector1: Option<f64>,
    pub sector2: Option<f64>,
    pub sector3: Option<f64>,
}

/// A lap with all timing fields present, in seconds
#[derive(Debug, Clone)]
pub struct LapRecord {
    pub driver: DriverCode,
    pub lap_time: f64,
    pub sector1: f64,
    pub sector2: f64,
    pub sector3: f64,
}

impl RawLap {
    /// Convert to a complete record, or None if any timing field is missing
    pub fn complete(&self) -> Option<LapRecord> {
        Some(LapRecord {
            driver: self.driver.clone(),
            lap_time: self.lap_time?,
            sector1: self.sector1?,
            sector2: self.sector2?,
            sector3: self.sector3?,
        })
    }
}

/// Drop laps with any missing timing field
pub fn filter_complete(laps: &[RawLap]) -> Vec<LapRecord> {
    let complete: Vec<LapRecord> = laps.iter().filter_map(RawLap::complete).collect();
    let dropped = laps.len() - complete.len();
    if dropped > 0 {
        log::debug!("dropped {} incomplete laps of {}", dropped, laps.len());
    }
    complete
}

/// One qualifying result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualifyingEntry {
    pub driver: DriverCode,
    pub qualifying_time: Option<f64>,
}

/// Build a frame with a `QualifyingTime` column from qualifying entries
pub fn qualifying_frame(entries: &[QualifyingEntry]) -> Result<Frame> {
    let drivers = entries.iter().map(|e| e.driver.clone()).collect();
    let times = entries.iter().map(|e| e.qualifying_time).collect();
    let mut frame = Frame::new(drivers);
    frame.push_column("QualifyingTime", times)?;
    Ok(frame)
}

/// Per-driver mean of summed sector times, as a `TotalSectorTime` frame
pub fn aggregate_sector_times(laps: &[LapRecord]) -> Result<Frame> {
    let mut order: Vec<DriverCode> = Vec::new();
    let mut sums: HashMap<DriverCode, (f64, usize)> = HashMap::new();

    for lap in laps {
        let entry = sums.entry(lap.driver.clone()).or_insert_with(|| {
            order.push(lap.driver.clone());
            (0.0, 0)
        });
        entry.0 += lap.sector1 + lap.sector2 + lap.sector3;
        entry.1 += 1;
    }

    let totals = order
        .iter()
        .map(|d| {
            let (sum, count) = sums[d];
            Some(sum / count as f64)
        })
        .collect();

    let mut frame = Frame::new(order);
    frame.push_column("TotalSectorTime", totals)?;
    Ok(frame)
}

/// Per-driver mean lap time in seconds
pub fn mean_lap_times(laps: &[LapRecord]) -> HashMap<DriverCode, f64> {
    let mut sums: HashMap<DriverCode, (f64, usize)> = HashMap::new();
    for lap in laps {
        let entry = sums.entry(lap.driver.clone()).or_insert((0.0, 0));
        entry.0 += lap.lap_time;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(driver, (sum, count))| (driver, sum / count as f64))
        .collect()
}

/// Load lap history from a JSON fixture, keeping only complete laps
pub fn load_laps(path: &Path) -> Result<Vec<LapRecord>> {
    let content = std::fs::read_to_string(path)?;
    let raw: Vec<RawLap> = serde_json::from_str(&content)?;
    Ok(filter_complete(&raw))
}

/// Load qualifying results from a JSON fixture
pub fn load_qualifying(path: &Path) -> Result<Vec<QualifyingEntry>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
