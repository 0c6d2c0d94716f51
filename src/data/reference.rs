//! Static reference data
//!
//! Driver/team mappings, team points, pace baselines, per-track traits and
//! the event schedule. Supplied by the reference-data collaborator as a
//! JSON fixture; the engine treats it as read-only.

use crate::data::Frame;
use crate::{DriverCode, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Per-track characteristics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackTraits {
    /// Downforce rating (higher = more downforce-dependent)
    pub downforce: f64,
    /// Estimated pit-stop time cost in seconds
    pub pit_loss: f64,
}

/// A scheduled event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventInfo {
    pub name: String,
    pub venue: String,
    pub round: u8,
    pub date: NaiveDate,
}

/// Static reference store: mappings keyed by driver code, team or track name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceData {
    pub driver_teams: HashMap<String, String>,
    pub team_points: HashMap<String, f64>,
    pub clean_air_pace: HashMap<String, f64>,
    pub average_position_change: HashMap<String, f64>,
    /// Track-specific position-change overrides
    #[serde(default)]
    pub track_position_change: HashMap<String, HashMap<String, f64>>,
    pub tracks: HashMap<String, TrackTraits>,
    #[serde(default)]
    pub schedule: Vec<EventInfo>,
}

impl ReferenceData {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Team strength normalized to [0, 1] by the best team's points
    pub fn team_performance_scores(&self) -> HashMap<String, f64> {
        let max_points = self
            .team_points
            .values()
            .fold(0.0_f64, |acc, &p| acc.max(p));
        if max_points <= 0.0 {
            return HashMap::new();
        }
        self.team_points
            .iter()
            .map(|(team, &points)| (team.clone(), points / max_points))
            .collect()
    }

    /// Position-change tendencies for a track, falling back to season averages
    fn position_changes(&self, track: &str) -> &HashMap<String, f64> {
        self.track_position_change
            .get(track)
            .unwrap_or(&self.average_position_change)
    }

    /// Enrich a qualifying frame with team strength, pace baselines,
    /// position-change tendency and track traits. Unknown drivers or tracks
    /// yield nulls, to be imputed at training time.
    pub fn enrich(&self, frame: &mut Frame, track: &str) -> Result<()> {
        let scores = self.team_performance_scores();
        let changes = self.position_changes(track);
        let drivers: Vec<DriverCode> = frame.drivers().to_vec();

        let team_score = |d: &DriverCode| {
            self.driver_teams
                .get(d.as_str())
                .and_then(|team| scores.get(team))
                .copied()
        };

        frame.push_column(
            "TeamPerformanceScore",
            drivers.iter().map(team_score).collect(),
        )?;
        frame.push_column(
            "CleanAirRacePace",
            drivers
                .iter()
                .map(|d| self.clean_air_pace.get(d.as_str()).copied())
                .collect(),
        )?;
        frame.push_column(
            "AveragePositionChange",
            drivers
                .iter()
                .map(|d| changes.get(d.as_str()).copied())
                .collect(),
        )?;

        let traits = self.tracks.get(track);
        if traits.is_none() {
            log::warn!("no track traits for {}, using nulls", track);
        }
        frame.push_column(
            "TrackDownforce",
            vec![traits.map(|t| t.downforce); drivers.len()],
        )?;
        frame.push_column(
            "PitLossTime",
            vec![traits.map(|t| t.pit_loss); drivers.len()],
        )?;

        Ok(())
    }
}
