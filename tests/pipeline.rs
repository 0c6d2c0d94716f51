//! End-to-end pipeline tests: assemble -> train -> simulate

use approx::assert_relative_eq;
use racecast::data::loader::{aggregate_sector_times, filter_complete, qualifying_frame};
use racecast::data::loader::{QualifyingEntry, RawLap};
use racecast::data::reference::TrackTraits;
use racecast::data::ReferenceData;
use racecast::features::assemble;
use racecast::model::GbmParams;
use racecast::sim::{simulate, SimulationOptions};
use racecast::training::fit_and_predict;
use racecast::DriverCode;

const DRIVERS: [&str; 13] = [
    "VER", "NOR", "PIA", "RUS", "SAI", "ALB", "LEC", "OCO", "HAM", "STR", "GAS", "ALO", "HUL",
];

fn reference() -> ReferenceData {
    let mut reference = ReferenceData::default();
    for (i, driver) in DRIVERS.iter().enumerate() {
        let team = format!("Team{}", i / 2);
        reference.driver_teams.insert(driver.to_string(), team.clone());
        reference
            .team_points
            .insert(team, 280.0 - 40.0 * (i / 2) as f64);
        reference
            .clean_air_pace
            .insert(driver.to_string(), 93.0 + 0.2 * i as f64);
        reference
            .average_position_change
            .insert(driver.to_string(), (i as f64 - 6.0) / 6.0);
    }
    reference.tracks.insert(
        "Monaco".to_string(),
        TrackTraits {
            downforce: 0.9,
            pit_loss: 19.5,
        },
    );
    reference
}

fn laps() -> Vec<racecast::data::LapRecord> {
    let mut raw = Vec::new();
    for (i, driver) in DRIVERS.iter().enumerate() {
        for lap in 0..3 {
            let time = 93.0 + 0.25 * i as f64 + 0.1 * lap as f64;
            raw.push(RawLap {
                driver: DriverCode::from(*driver),
                lap_time: Some(time),
                sector1: Some(time * 0.3),
                sector2: Some(time * 0.35),
                sector3: Some(time * 0.35),
            });
        }
    }
    filter_complete(&raw)
}

fn qualifying() -> Vec<QualifyingEntry> {
    DRIVERS
        .iter()
        .enumerate()
        .map(|(i, driver)| QualifyingEntry {
            driver: DriverCode::from(*driver),
            // RUS is missing a qualifying time; imputation must cover it
            qualifying_time: if *driver == "RUS" {
                None
            } else {
                Some(70.0 + 0.15 * i as f64)
            },
        })
        .collect()
}

fn params() -> GbmParams {
    GbmParams {
        n_estimators: 100,
        learning_rate: 0.7,
        max_depth: 3,
        seed: 37,
    }
}

#[test]
fn missing_qualifying_time_is_imputed_not_dropped() {
    let laps = laps();
    let mut frame = qualifying_frame(&qualifying()).unwrap();
    reference().enrich(&mut frame, "Monaco").unwrap();
    let sectors = aggregate_sector_times(&laps).unwrap();

    let assembled = assemble(&frame, &sectors, &laps, 0.1, 24.0).unwrap();
    assert_eq!(assembled.excluded, 0);
    assert_eq!(assembled.features.n_rows(), 13);

    let outcome = fit_and_predict(&assembled.features, &assembled.targets, &params()).unwrap();
    assert!(outcome.validation_mae.is_finite());
    assert_eq!(outcome.predictions.len(), 13);

    // The driver with the missing value keeps their row and prediction
    let rus = assembled
        .merged
        .drivers()
        .iter()
        .position(|d| d.as_str() == "RUS")
        .expect("RUS still present");
    assert!(outcome.predictions[rus].is_finite());
}

#[test]
fn full_pipeline_simulation_is_deterministic() {
    let laps = laps();
    let mut frame = qualifying_frame(&qualifying()).unwrap();
    reference().enrich(&mut frame, "Monaco").unwrap();
    let sectors = aggregate_sector_times(&laps).unwrap();
    let assembled = assemble(&frame, &sectors, &laps, 0.0, 22.0).unwrap();
    let outcome = fit_and_predict(&assembled.features, &assembled.targets, &params()).unwrap();

    let options = SimulationOptions {
        trials: 250,
        pace_sigma: 0.15,
        pit_sigma: 0.5,
        seed: 37,
        timeout: None,
    };

    let run = || {
        simulate(
            &outcome.model,
            &outcome.imputer,
            &assembled.features,
            assembled.merged.drivers(),
            &options,
        )
        .unwrap()
    };
    let a = run();
    let b = run();

    assert_eq!(a.realized_trials, 250);
    assert_eq!(a.standings.len(), 13);
    for (x, y) in a.standings.iter().zip(&b.standings) {
        assert_eq!(x.driver, y.driver);
        assert_eq!(x.win_probability, y.win_probability);
        assert_eq!(x.mean_rank, y.mean_rank);
        assert_eq!(x.p5_rank, y.p5_rank);
        assert_eq!(x.p95_rank, y.p95_rank);
    }

    let win_sum: f64 = a.standings.iter().map(|s| s.win_probability).sum();
    assert_relative_eq!(win_sum, 1.0, epsilon = 1e-9);
}

#[test]
fn competitor_without_history_is_excluded_and_reported() {
    let laps = laps();
    let mut entries = qualifying();
    entries.push(QualifyingEntry {
        driver: DriverCode::from("TSU"),
        qualifying_time: Some(71.0),
    });
    let mut frame = qualifying_frame(&entries).unwrap();
    reference().enrich(&mut frame, "Monaco").unwrap();
    let sectors = aggregate_sector_times(&laps).unwrap();

    let assembled = assemble(&frame, &sectors, &laps, 0.0, 22.0).unwrap();
    assert_eq!(assembled.excluded, 1);
    assert_eq!(assembled.features.n_rows(), 13);
    assert!(assembled
        .merged
        .drivers()
        .iter()
        .all(|d| d.as_str() != "TSU"));
}
