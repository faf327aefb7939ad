// crates/lb3d-solver/src/stepper.rs

//! Orchestration of one LB step and the run loop.
//!
//! Step `t → t+1`, all ranks in lockstep:
//! 1. distribution halo exchange, 2. boundary hook, 3. stream + buffer
//! swap, 4. macroscopic reduction, 5. macroscopic halo exchange + hook,
//! 6. BGK collision, 7. snapshot at the output cadence. The monitor runs
//! at its own cadence after collision.

use anyhow::{ensure, Context, Result};
use lb3d_core::config::RunConfig;
use lb3d_core::field::{DistributionField, MacroFields};
use lb3d_core::grid::{Face, Grid};
use lb3d_halo::{BoundaryHook, Comm, HaloExchanger, Topology};
use tracing::{debug, info};

use crate::monitor::Monitor;
use crate::output::SnapshotSink;
use crate::{collide, init, stream};

/// One rank's solver state: fields, exchanger, transport, hook, and sink.
pub struct Solver<C, H, S> {
    cfg: RunConfig,
    grid: Grid,
    topo: Topology,
    comm: C,
    hook: H,
    sink: S,
    exchanger: HaloExchanger,
    f: DistributionField,
    f_next: DistributionField,
    macros: MacroFields,
    monitor: Monitor,
    boundary_faces: Vec<Face>,
    tau: f64,
}

impl<C: Comm, H: BoundaryHook, S: SnapshotSink> Solver<C, H, S> {
    /// Validate the configuration, allocate every field once, and apply the
    /// initial condition.
    pub fn new(cfg: RunConfig, topo: Topology, comm: C, hook: H, sink: S) -> Result<Self> {
        cfg.validate().context("invalid configuration")?;
        let tau = cfg.relaxation_tau()?;
        ensure!(
            topo.dims() == [cfg.px as i32, cfg.py as i32, cfg.pz as i32],
            "topology {:?} does not match configured process grid ({}, {}, {})",
            topo.dims(),
            cfg.px,
            cfg.py,
            cfg.pz
        );
        ensure!(
            comm.size() as usize == cfg.ranks(),
            "transport has {} ranks, configuration needs {}",
            comm.size(),
            cfg.ranks()
        );

        let [mx, my, mz] = cfg.local_extent();
        let grid = Grid::new(cfg.ghost, mx, my, mz)?;
        let mut f = DistributionField::new(&grid);
        let f_next = DistributionField::new(&grid);
        let mut macros = MacroFields::new(&grid);
        init::apply(
            &cfg.initial,
            &grid,
            &topo,
            [cfg.nx, cfg.ny, cfg.nz],
            &mut f,
            &mut macros,
        )?;

        let exchanger = HaloExchanger::new(&grid);
        let monitor = Monitor {
            check_every: cfg.check_every,
            rho_floor: cfg.rho_floor,
        };
        let boundary_faces = topo.boundary_faces();
        debug!(
            rank = topo.rank(),
            ?boundary_faces,
            interior = ?grid.interior(),
            "solver ready"
        );
        Ok(Self {
            cfg,
            grid,
            topo,
            comm,
            hook,
            sink,
            exchanger,
            f,
            f_next,
            macros,
            monitor,
            boundary_faces,
            tau,
        })
    }

    /// Advance one step; `t` is 1-based.
    pub fn step(&mut self, t: u64) -> Result<()> {
        self.exchanger
            .exchange_distribution(&self.topo, &mut self.comm, &mut self.f)?;
        self.hook
            .fill_distribution(&self.grid, &self.topo, &self.boundary_faces, &mut self.f)?;

        stream::stream(&self.grid, &self.f, &mut self.f_next);
        std::mem::swap(&mut self.f, &mut self.f_next);

        collide::reduce_macros(&self.grid, &self.f, &mut self.macros, self.cfg.rho_floor);
        self.exchanger
            .exchange_macros(&self.topo, &mut self.comm, &mut self.macros)?;
        self.hook
            .fill_macros(&self.grid, &self.topo, &self.boundary_faces, &mut self.macros)?;

        collide::relax(&self.grid, &mut self.f, &self.macros, self.tau);

        if t % self.cfg.output_every == 0 {
            self.sink
                .write(&mut self.comm, &self.topo, &self.grid, &self.macros, t)
                .with_context(|| format!("snapshot at step {t}"))?;
        }
        self.monitor
            .check(&self.grid, &mut self.comm, &self.macros, t)?;
        Ok(())
    }

    /// Run all configured steps; the final state is always snapshotted.
    pub fn run(&mut self) -> Result<u64> {
        let steps = self.cfg.steps;
        info!(
            rank = self.topo.rank(),
            steps,
            tau = self.tau,
            "starting run"
        );
        for t in 1..=steps {
            self.step(t)?;
        }
        if steps % self.cfg.output_every != 0 {
            self.sink
                .write(&mut self.comm, &self.topo, &self.grid, &self.macros, steps)
                .context("final snapshot")?;
        }
        info!(rank = self.topo.rank(), steps, "run complete");
        Ok(steps)
    }

    /// The padded grid of this rank.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// This rank's topology.
    #[must_use]
    pub const fn topology(&self) -> &Topology {
        &self.topo
    }

    /// The authoritative macroscopic state of the last completed step.
    #[must_use]
    pub const fn macros(&self) -> &MacroFields {
        &self.macros
    }
}
