//! lb3d-bench-harness
//!
//! Run small end-to-end throughput benchmarks (initialize -> step loop) on
//! a single periodic rank and append CSV rows into
//! `benchmarks/reports/bench-<unix>.csv`. The figure of merit is MLUPS
//! (million lattice-site updates per second).
//!
//! Usage examples:
//!   cargo run --release -p lb3d-bench-harness -- --profile configs/profiles/small.toml

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::Deserialize;

use lb3d_core::config::{InitialSpec, RunConfig};
use lb3d_halo::{PeriodicHook, SerialComm, Topology};
use lb3d_solver::{NullSink, Solver};

#[derive(Debug, Deserialize)]
struct Profile {
    /// Cubic box edge lengths to sweep
    sizes: Vec<usize>,
    /// LB steps per measurement
    steps: u64,
    /// BGK relaxation time
    tau: f64,
    /// Repetitions per size
    repeats: u32,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            sizes: vec![16, 32],
            steps: 50,
            tau: 0.8,
            repeats: 3,
        }
    }
}

fn parse_flag(name: &str, default: &str) -> String {
    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        if k == format!("--{name}") {
            return it.next().unwrap_or_else(|| default.to_string());
        }
    }
    default.to_string()
}

fn config_for(n: usize, steps: u64, tau: f64) -> RunConfig {
    let mut cfg = RunConfig::example();
    cfg.nx = n;
    cfg.ny = n;
    cfg.nz = n;
    cfg.tau = Some(tau);
    cfg.steps = steps;
    cfg.output_every = steps + 1; // never snapshot mid-run
    cfg.check_every = 0;
    cfg.initial = InitialSpec::TaylorGreen {
        velocity_scale: 0.02,
    };
    cfg
}

fn main() -> Result<()> {
    let profile_path = PathBuf::from(parse_flag("profile", ""));
    let profile: Profile = if profile_path.as_os_str().is_empty() {
        Profile::default()
    } else {
        let src = fs::read_to_string(&profile_path)
            .with_context(|| format!("read profile {profile_path:?}"))?;
        toml::from_str(&src).context("parse profile toml")?
    };
    println!(
        "Profile: sizes={:?}, steps={}, tau={}, repeats={}",
        profile.sizes, profile.steps, profile.tau, profile.repeats
    );

    fs::create_dir_all("benchmarks/reports").ok();
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let csv_path = PathBuf::from(format!("benchmarks/reports/bench-{ts}.csv"));
    let mut csv = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&csv_path)?;
    writeln!(csv, "timestamp,n,steps,tau,repeat,ms,mlups")?;

    for &n in &profile.sizes {
        for rep in 0..profile.repeats {
            let cfg = config_for(n, profile.steps, profile.tau);
            let topo = Topology::single(cfg.periodic);
            let mut solver = Solver::new(cfg, topo, SerialComm, PeriodicHook, NullSink)
                .context("build solver")?;

            let t0 = Instant::now();
            solver.run().context("run")?;
            let elapsed = t0.elapsed();

            let updates = (n * n * n) as f64 * profile.steps as f64;
            let mlups = updates / elapsed.as_secs_f64() / 1e6;
            println!("n={n:3} rep={rep}: {:6} ms, {mlups:.2} MLUPS", elapsed.as_millis());
            writeln!(
                csv,
                "{ts},{n},{},{},{rep},{},{mlups:.3}",
                profile.steps,
                profile.tau,
                elapsed.as_millis()
            )?;
        }
    }

    println!("Wrote {}", csv_path.display());
    Ok(())
}
