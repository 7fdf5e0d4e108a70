#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line driver for the outbreak simulation.

mod logging;
mod noise;
mod settings;

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use log::info;
use outbreak_core::{Event, PopulationStats};
use outbreak_simulation::Simulation;

use crate::{
    noise::FractalNoise,
    settings::{RunSettings, Settings},
};

/// Runs the plague simulation without a display and prints census lines.
#[derive(Debug, Parser)]
#[command(name = "outbreak", version)]
struct Cli {
    /// Grid columns.
    #[arg(long)]
    width: Option<u32>,
    /// Grid rows.
    #[arg(long)]
    height: Option<u32>,
    /// Number of ticks to simulate.
    #[arg(long)]
    ticks: Option<u64>,
    /// Seed for the noise field and every random draw.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated milliseconds per tick.
    #[arg(long = "frame-ms")]
    frame_ms: Option<u64>,
    /// Report every this many spread passes.
    #[arg(long = "report-every")]
    report_every: Option<u64>,
    /// TOML settings file with `[run]` and `[simulation]` tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply_to(&self, run: &mut RunSettings) {
        if let Some(width) = self.width {
            run.width = width;
        }
        if let Some(height) = self.height {
            run.height = height;
        }
        if let Some(ticks) = self.ticks {
            run.ticks = ticks;
        }
        if let Some(frame_ms) = self.frame_ms {
            run.frame_ms = frame_ms;
        }
        if let Some(report_every) = self.report_every {
            run.report_every = report_every;
        }
    }
}

/// Entry point for the outbreak command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    cli.apply_to(&mut settings.run);
    if let Some(seed) = cli.seed {
        settings.simulation.seed = seed;
    }

    let run = settings.run;
    ensure!(
        run.width > 0 && run.height > 0,
        "grid must be at least 1x1, got {}x{}",
        run.width,
        run.height
    );

    let field = FractalNoise::default()
        .generate(run.width, run.height, settings.simulation.seed)
        .context("failed to generate the noise field")?;
    let mut simulation =
        Simulation::new(settings.simulation, field).context("failed to start the simulation")?;
    info!(
        "running {} ticks of {} ms on a {}x{} grid",
        run.ticks, run.frame_ms, run.width, run.height
    );

    let frame = Duration::from_millis(run.frame_ms);
    let report_every = run.report_every.max(1);
    for _ in 0..run.ticks {
        let events = simulation.tick(frame).context("tick rejected")?;
        for event in &events {
            if let Event::SpreadPassCompleted { pass, .. } = event {
                if pass % report_every == 0 {
                    println!("{}", report(*pass, &simulation.stats()));
                }
            }
        }
        let _ = simulation.take_dirty_cells();
    }

    let census = simulation.census();
    println!("{}", report(census.passes(), &simulation.stats()));
    info!(
        "finished after {} passes, {:.0} plague deaths",
        census.passes(),
        census.plague_deaths()
    );
    Ok(())
}

fn report(pass: u64, stats: &PopulationStats) -> String {
    format!(
        "pass {pass:>7}  healthy {:>12.0}  infected {:>12.0}  dead {:>12.0}  casualties {:>10.0}  in flight {:>8.0}",
        stats.healthy(),
        stats.infected(),
        stats.cell_healthy_dead + stats.cell_infected_dead,
        stats.casualties,
        stats.in_flight_healthy + stats.in_flight_infected,
    )
}
