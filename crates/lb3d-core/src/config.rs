// crates/lb3d-core/src/config.rs

//! Run configuration: global lattice, process grid, relaxation, cadences.
//!
//! JSON read/write via serde; [`RunConfig::validate`] runs before any field
//! allocation and each failure names the offending field.

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Initial-condition descriptor, forwarded to the initializer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialSpec {
    /// Uniform density and velocity, distributions at equilibrium.
    Uniform {
        /// Initial density ρ₀.
        rho: f64,
        /// Initial velocity (u, v, w).
        velocity: [f64; 3],
    },
    /// Taylor–Green-like sinusoidal shear in the x–y plane.
    TaylorGreen {
        /// Peak velocity magnitude (lattice units; keep ≪ c_s).
        velocity_scale: f64,
    },
}

/// Full run configuration as read from the JSON config file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Global interior voxel count along x.
    pub nx: usize,
    /// Global interior voxel count along y.
    pub ny: usize,
    /// Global interior voxel count along z.
    pub nz: usize,

    /// Process grid extent along x; must divide `nx`.
    pub px: usize,
    /// Process grid extent along y; must divide `ny`.
    pub py: usize,
    /// Process grid extent along z; must divide `nz`.
    pub pz: usize,

    /// Periodicity per axis (x, y, z).
    pub periodic: [bool; 3],

    /// Ghost layer thickness; D3Q19 needs 1.
    #[serde(default = "default_ghost")]
    pub ghost: usize,

    /// BGK relaxation time τ (> 0.5). Exactly one of `tau`/`nu` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tau: Option<f64>,
    /// Kinematic viscosity ν (> 0); τ = 3ν + 0.5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nu: Option<f64>,

    /// Total number of LB steps.
    pub steps: u64,
    /// Snapshot cadence in steps.
    pub output_every: u64,
    /// NaN/divergence check cadence in steps (0 disables).
    #[serde(default = "default_check_every")]
    pub check_every: u64,

    /// Density floor for the velocity division.
    #[serde(default = "default_rho_floor")]
    pub rho_floor: f64,

    /// Voxel spacing (dx, dy, dz) declared in snapshot descriptors.
    #[serde(default = "default_spacing")]
    pub spacing: [f64; 3],

    /// Initial condition.
    pub initial: InitialSpec,

    /// Directory snapshots are written into.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

const fn default_ghost() -> usize {
    1
}

const fn default_check_every() -> u64 {
    10
}

const fn default_rho_floor() -> f64 {
    1e-10
}

const fn default_spacing() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

impl RunConfig {
    /// Read a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let cfg = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(cfg)
    }

    /// Write a configuration as pretty JSON.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(f), self).context("serialize config")?;
        Ok(())
    }

    /// Total rank count `px·py·pz`.
    #[inline]
    #[must_use]
    pub const fn ranks(&self) -> usize {
        self.px * self.py * self.pz
    }

    /// Interior voxel extents of one subdomain.
    #[inline]
    #[must_use]
    pub const fn local_extent(&self) -> [usize; 3] {
        [self.nx / self.px, self.ny / self.py, self.nz / self.pz]
    }

    /// The relaxation time, from `tau` directly or derived from `nu`.
    pub fn relaxation_tau(&self) -> Result<f64> {
        match (self.tau, self.nu) {
            (Some(tau), None) => Ok(tau),
            (None, Some(nu)) => Ok(3.0 * nu + 0.5),
            (Some(_), Some(_)) => bail!("config: give either tau or nu, not both"),
            (None, None) => bail!("config: one of tau or nu is required"),
        }
    }

    /// Validate every field; called before any allocation.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.nx >= 1, "nx must be positive, got {}", self.nx);
        ensure!(self.ny >= 1, "ny must be positive, got {}", self.ny);
        ensure!(self.nz >= 1, "nz must be positive, got {}", self.nz);
        ensure!(self.px >= 1, "px must be positive, got {}", self.px);
        ensure!(self.py >= 1, "py must be positive, got {}", self.py);
        ensure!(self.pz >= 1, "pz must be positive, got {}", self.pz);
        ensure!(
            self.nx % self.px == 0,
            "px ({}) must divide nx ({})",
            self.px,
            self.nx
        );
        ensure!(
            self.ny % self.py == 0,
            "py ({}) must divide ny ({})",
            self.py,
            self.ny
        );
        ensure!(
            self.nz % self.pz == 0,
            "pz ({}) must divide nz ({})",
            self.pz,
            self.nz
        );
        ensure!(self.ghost >= 1, "ghost must be >= 1, got {}", self.ghost);
        let [mx, my, mz] = self.local_extent();
        ensure!(
            mx >= self.ghost && my >= self.ghost && mz >= self.ghost,
            "ghost ({}) exceeds a subdomain extent ({mx}, {my}, {mz}); decompose less finely",
            self.ghost
        );

        let tau = self.relaxation_tau()?;
        ensure!(
            tau > 0.5,
            "tau must exceed 0.5 for stability, got {tau}"
        );
        ensure!(
            self.rho_floor > 0.0,
            "rho_floor must be positive, got {}",
            self.rho_floor
        );
        ensure!(self.steps >= 1, "steps must be >= 1, got {}", self.steps);
        ensure!(
            self.output_every >= 1,
            "output_every must be >= 1, got {}",
            self.output_every
        );
        for (axis, d) in ["dx", "dy", "dz"].iter().zip(self.spacing) {
            ensure!(d > 0.0, "spacing {axis} must be positive, got {d}");
        }
        if let InitialSpec::Uniform { rho, .. } = self.initial {
            ensure!(
                rho >= self.rho_floor,
                "initial rho ({rho}) must not be below rho_floor ({})",
                self.rho_floor
            );
        }
        Ok(())
    }

    /// A small fully-periodic box; what `lb3d init-config` writes.
    #[must_use]
    pub fn example() -> Self {
        Self {
            nx: 16,
            ny: 16,
            nz: 16,
            px: 1,
            py: 1,
            pz: 1,
            periodic: [true, true, true],
            ghost: default_ghost(),
            tau: Some(1.0),
            nu: None,
            steps: 100,
            output_every: 100,
            check_every: default_check_every(),
            rho_floor: default_rho_floor(),
            spacing: default_spacing(),
            initial: InitialSpec::Uniform {
                rho: 1.0,
                velocity: [0.0, 0.0, 0.0],
            },
            output_dir: default_output_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_config_validates() {
        RunConfig::example().validate().unwrap();
    }

    #[test]
    fn validation_names_the_offending_field() {
        let mut cfg = RunConfig::example();
        cfg.px = 3; // does not divide nx = 16
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("px"), "expected 'px' in {err:?}");

        let mut cfg = RunConfig::example();
        cfg.tau = Some(0.5);
        let err = cfg.validate().unwrap_err().to_string();
        assert!(err.contains("tau"), "expected 'tau' in {err:?}");
    }

    #[test]
    fn tau_from_nu() {
        let mut cfg = RunConfig::example();
        cfg.tau = None;
        cfg.nu = Some(0.1);
        let tau = cfg.relaxation_tau().unwrap();
        assert!((tau - 0.8).abs() < 1e-15);
    }

    #[test]
    fn json_roundtrip() {
        let cfg = RunConfig::example();
        let text = serde_json::to_string(&cfg).unwrap();
        let back: RunConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.nx, cfg.nx);
        assert_eq!(back.initial, cfg.initial);
        assert_eq!(back.relaxation_tau().unwrap(), 1.0);
    }
}
