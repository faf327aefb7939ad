// crates/lb3d-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lb3d_core::config::RunConfig;
use lb3d_halo::{Comm, PeriodicHook, Topology};
use lb3d_snapshot::{GlobalLayout, SnapshotWriter};
use lb3d_solver::Solver;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "lb3d",
    about = "Distributed D3Q19 lattice-Boltzmann solver",
    long_about = "Distributed D3Q19 lattice-Boltzmann solver.\n\nRun under mpirun with exactly Px*Py*Pz ranks, or serially for a 1x1x1 process grid.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run the configured number of LB steps and write snapshots.
    Run {
        /// Path to the JSON run configuration
        #[arg(long)]
        config: PathBuf,

        /// Override the configured snapshot directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Validate a configuration without allocating or running.
    Check {
        /// Path to the JSON run configuration
        #[arg(long)]
        config: PathBuf,
    },

    /// Write an example configuration to start from.
    InitConfig {
        /// Output path for the example JSON configuration
        #[arg(long, default_value = "lb3d.json")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Run { config, output_dir } => run(config, output_dir),
        Cmd::Check { config } => check(config),
        Cmd::InitConfig { out } => init_config(out),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn load_config(path: &Path, output_dir: Option<PathBuf>) -> Result<RunConfig> {
    let mut cfg =
        RunConfig::from_file(path).with_context(|| format!("reading {}", path.display()))?;
    if let Some(dir) = output_dir {
        cfg.output_dir = dir;
    }
    cfg.validate()
        .with_context(|| format!("invalid configuration {}", path.display()))?;
    Ok(cfg)
}

fn check(config: PathBuf) -> Result<()> {
    let cfg = load_config(&config, None)?;
    println!(
        "OK: {}: {}x{}x{} lattice on a {}x{}x{} process grid, {} steps",
        config.display(),
        cfg.nx,
        cfg.ny,
        cfg.nz,
        cfg.px,
        cfg.py,
        cfg.pz,
        cfg.steps
    );
    Ok(())
}

fn init_config(out: PathBuf) -> Result<()> {
    let cfg = RunConfig::example();
    cfg.to_file(&out)
        .with_context(|| format!("writing {}", out.display()))?;
    println!("Wrote example configuration to {}", out.display());
    Ok(())
}

/// Build the solver over `comm` and drive the whole run.
fn drive<C: Comm>(cfg: RunConfig, topo: Topology, comm: C) -> Result<()> {
    let layout = GlobalLayout::from_config(&cfg);
    let is_root = comm.rank() == 0;
    let writer = SnapshotWriter::new(&cfg.output_dir, layout, is_root)
        .with_context(|| format!("preparing {}", cfg.output_dir.display()))?;
    let steps = cfg.steps;
    let mut solver = Solver::new(cfg, topo, comm, PeriodicHook, writer)?;
    solver.run()?;
    if is_root {
        println!("Completed {steps} steps");
    }
    Ok(())
}

#[cfg(feature = "mpi")]
fn run(config: PathBuf, output_dir: Option<PathBuf>) -> Result<()> {
    use lb3d_halo::{abort_world, initialize_mpi, MpiComm};
    use tracing::{error, info};

    let cfg = load_config(&config, output_dir)?;
    let universe = initialize_mpi()?;
    let comm = MpiComm::new(
        &universe,
        [cfg.px as i32, cfg.py as i32, cfg.pz as i32],
        cfg.periodic,
    )?;
    let topo = comm.topology()?;
    let rank = topo.rank();
    info!(rank, ranks = topo.size(), "rank online");

    if let Err(err) = drive(cfg, topo, comm) {
        // Rank-identified diagnostic, then take the whole run down.
        error!(rank, error = %format!("{err:#}"), "fatal");
        abort_world(&universe, 1);
    }
    Ok(())
}

#[cfg(not(feature = "mpi"))]
fn run(config: PathBuf, output_dir: Option<PathBuf>) -> Result<()> {
    use anyhow::ensure;
    use lb3d_halo::SerialComm;

    let cfg = load_config(&config, output_dir)?;
    ensure!(
        cfg.ranks() == 1,
        "built without MPI support: process grid must be 1x1x1, got {}x{}x{}",
        cfg.px,
        cfg.py,
        cfg.pz
    );
    let topo = Topology::single(cfg.periodic);
    drive(cfg, topo, SerialComm)
}
