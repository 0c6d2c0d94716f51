//! Race prediction CLI
//!
//! Thin harness over the prediction engine: loads JSON fixtures, trains,
//! simulates and prints standings.

use clap::{Parser, Subcommand};
use racecast::data::loader::{aggregate_sector_times, load_laps, load_qualifying, qualifying_frame};
use racecast::data::ReferenceData;
use racecast::features::assemble;
use racecast::model::GbmParams;
use racecast::sim::{simulate, SimulationOptions};
use racecast::training::fit_and_predict;
use racecast::{Config, Result};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "racecast")]
#[command(about = "Race result prediction with Monte Carlo rank simulation", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default config file
    Init,
    /// List scheduled events from reference data
    Schedule {
        /// Reference data JSON
        #[arg(long)]
        reference: PathBuf,
    },
    /// Train on session data and simulate the race
    Predict {
        /// Qualifying results JSON
        #[arg(long)]
        qualifying: PathBuf,
        /// Lap history JSON
        #[arg(long)]
        laps: PathBuf,
        /// Reference data JSON
        #[arg(long)]
        reference: PathBuf,
        /// Track name for reference lookups
        #[arg(long)]
        track: String,
        /// Rain probability in the event window (0-1)
        #[arg(long, default_value = "0.0")]
        rain: f64,
        /// Forecast air temperature, Celsius
        #[arg(long, default_value = "20.0")]
        temperature: f64,
        /// Override the configured trial count
        #[arg(long)]
        trials: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Init => {
            Config::default().save(&cli.config)?;
            println!("Created default config at {}", cli.config);
            Ok(())
        }
        Commands::Schedule { reference } => {
            let reference = ReferenceData::load(reference)?;
            print_schedule(&reference);
            Ok(())
        }
        Commands::Predict {
            qualifying,
            laps,
            reference,
            track,
            rain,
            temperature,
            trials,
        } => {
            let config = load_config(&cli.config);
            predict(
                &config,
                qualifying,
                laps,
                reference,
                track,
                *rain,
                *temperature,
                *trials,
            )
        }
    }
}

fn load_config(path: &str) -> Config {
    if Path::new(path).exists() {
        match Config::load(path) {
            Ok(config) => return config,
            Err(e) => log::warn!("{}; using defaults", e),
        }
    } else {
        log::debug!("no config at {}, using defaults", path);
    }
    Config::default()
}

fn print_schedule(reference: &ReferenceData) {
    if reference.schedule.is_empty() {
        println!("No scheduled events in reference data");
        return;
    }
    println!("{:<5} {:<20} {:<35} Date", "Round", "Event", "Venue");
    for event in &reference.schedule {
        println!(
            "{:<5} {:<20} {:<35} {}",
            event.round, event.name, event.venue, event.date
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn predict(
    config: &Config,
    qualifying_path: &Path,
    laps_path: &Path,
    reference_path: &Path,
    track: &str,
    rain: f64,
    temperature: f64,
    trials: Option<usize>,
) -> Result<()> {
    let reference = ReferenceData::load(reference_path)?;
    let laps = load_laps(laps_path)?;
    let entries = load_qualifying(qualifying_path)?;
    println!(
        "Loaded {} laps and {} qualifying entries",
        laps.len(),
        entries.len()
    );

    let mut qualifying = qualifying_frame(&entries)?;
    reference.enrich(&mut qualifying, track)?;
    let sectors = aggregate_sector_times(&laps)?;
    let assembled = assemble(&qualifying, &sectors, &laps, rain, temperature)?;
    if assembled.excluded > 0 {
        println!(
            "Note: {} competitors excluded (no lap history)",
            assembled.excluded
        );
    }

    let params = GbmParams::from(&config.model);
    let outcome = fit_and_predict(&assembled.features, &assembled.targets, &params)?;
    if outcome.validation_mae.is_finite() {
        println!("Holdout MAE: {:.3} s", outcome.validation_mae);
    } else {
        println!("Holdout MAE: n/a (too few samples to validate)");
    }

    println!("\nPredicted race pace:");
    let mut by_pace: Vec<_> = assembled
        .merged
        .drivers()
        .iter()
        .zip(&outcome.predictions)
        .collect();
    by_pace.sort_by(|a, b| a.1.total_cmp(b.1));
    for (position, (driver, pace)) in by_pace.iter().enumerate() {
        println!("{:>3}. {:<5} {:.3} s", position + 1, driver, pace);
    }

    println!("\nFeature importance:");
    let mut importance: Vec<_> = outcome.model.feature_importance().into_iter().collect();
    importance.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (name, score) in importance {
        println!("  {:<22} {:.4}", name, score);
    }

    let mut options = SimulationOptions::from(&config.simulation);
    if let Some(trials) = trials {
        options.trials = trials;
    }
    let report = simulate(
        &outcome.model,
        &outcome.imputer,
        &assembled.features,
        assembled.merged.drivers(),
        &options,
    )?;

    println!(
        "\nSimulated standings ({} trials{}):",
        report.realized_trials,
        if report.realized_trials < report.requested_trials {
            ", truncated by deadline"
        } else {
            ""
        }
    );
    println!(
        "{:<5} {:>6} {:>8} {:>10} {:>12}",
        "", "Win%", "Podium%", "Mean rank", "p5-p95"
    );
    for stats in &report.standings {
        println!(
            "{:<5} {:>5.1}% {:>7.1}% {:>10.2} {:>5.1}-{:.1}",
            stats.driver,
            stats.win_probability * 100.0,
            stats.podium_probability * 100.0,
            stats.mean_rank,
            stats.p5_rank,
            stats.p95_rank
        );
    }

    Ok(())
}
