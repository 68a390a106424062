//! Headless driver: run a grid and export it, or reload an exported folder

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use pendulum_rs::config::SimulationConfig;
use pendulum_rs::models::Component;
use pendulum_rs::output::{export_history, load_folder};
use pendulum_rs::physics::{PhaseQuadrant, PhysicalSystem};
use pendulum_rs::solver::{MethodKind, ParallelCoordinator};

/// pendulum-grid - grids of double pendulums
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of columns (overrides config file)
    #[arg(long, value_name = "N")]
    size_x: Option<usize>,

    /// Number of rows (overrides config file)
    #[arg(long, value_name = "N")]
    size_y: Option<usize>,

    /// Simulated time in seconds
    #[arg(short = 't', long, value_name = "SECONDS")]
    max_time: Option<f64>,

    /// Sub-step h in seconds
    #[arg(long, value_name = "SECONDS")]
    integration_step: Option<f64>,

    /// Number of recorded coarse steps
    #[arg(short, long, value_name = "COUNT")]
    steps: Option<usize>,

    /// Integration method (euler, rk4, merson)
    #[arg(short, long, value_name = "METHOD")]
    method: Option<MethodKind>,

    /// Worker threads (default: available parallelism)
    #[arg(short, long, value_name = "COUNT")]
    workers: Option<usize>,

    /// Folder receiving one state file per recorded time
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Reload an exported folder instead of running
    #[arg(long, value_name = "DIR", conflicts_with = "output")]
    load: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply_to(&self, config: &mut SimulationConfig) {
        if let Some(size_x) = self.size_x {
            config.grid.size_x = size_x;
        }
        if let Some(size_y) = self.size_y {
            config.grid.size_y = size_y;
        }
        if let Some(max_time) = self.max_time {
            config.run.max_time = max_time;
        }
        if let Some(integration_step) = self.integration_step {
            config.run.integration_step = integration_step;
        }
        if let Some(steps) = self.steps {
            config.run.step_count = steps;
        }
        if let Some(method) = self.method {
            config.run.method = method;
        }
        if let Some(workers) = self.workers {
            config.run.workers = Some(workers);
        }
        if let Some(output) = &self.output {
            config.output.folder = output.clone();
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> pendulum_rs::Result<()> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    args.apply_to(&mut config);
    config.validate()?;

    match &args.load {
        Some(folder) => inspect(folder, &config),
        None => simulate(&config),
    }
}

fn simulate(config: &SimulationConfig) -> pendulum_rs::Result<()> {
    let mut grid = config.build_grid()?;
    let coordinator = ParallelCoordinator::new(config.worker_count(), config.solver_configuration())?;

    let summary = coordinator.run(&mut grid, config.run.max_time)?;
    let files = export_history(&grid, &config.output.folder)?;

    println!(
        "{}×{} grid, {} workers, {} steps{}: t = {}, {} files in {}",
        grid.size_x(),
        grid.size_y(),
        summary.workers(),
        summary.steps_completed(),
        if summary.cancelled() { " (cancelled)" } else { "" },
        grid.time(),
        files.len(),
        config.output.folder.display()
    );
    print_phase_counts(&grid, grid.time())
}

fn inspect(folder: &std::path::Path, config: &SimulationConfig) -> pendulum_rs::Result<()> {
    let session = load_folder(folder, config.grid.parameters, config.grid.bounds)?;
    let grid = &session.grid;

    let first = grid.history().first_time().unwrap_or(0.0);
    let last = grid.history().last_time().unwrap_or(0.0);
    println!(
        "{}×{} grid, {} snapshots from t = {} to t = {}, {} files skipped",
        grid.size_x(),
        grid.size_y(),
        grid.history().len(),
        first,
        last,
        session.skipped.len()
    );

    let omega = grid.component_field(Component::Omega1, last)?;
    let peak = omega.iter().fold(0.0_f64, |peak, w| peak.max(w.abs()));
    info!("Largest |ω₁| at t = {last}: {peak}");

    print_phase_counts(grid, last)
}

fn print_phase_counts(grid: &pendulum_rs::models::PendulumGrid, time: f64) -> pendulum_rs::Result<()> {
    let map = grid.phase_map(time)?;
    let count = |quadrant: PhaseQuadrant| map.iter().filter(|q| **q == quadrant).count();
    println!(
        "phase quadrants at t = {time}: low/low {}, low/high {}, high/low {}, high/high {}",
        count(PhaseQuadrant::LowLow),
        count(PhaseQuadrant::LowHigh),
        count(PhaseQuadrant::HighLow),
        count(PhaseQuadrant::HighHigh)
    );
    Ok(())
}
