// crates/lb3d-solver/src/output.rs

//! The seam between the time loop and snapshot output.
//!
//! The solver only knows it hands `(ρ, u, v, w)` plus the step index to a
//! sink at the output cadence; the XDMF/HDF5 writer implements this in
//! `lb3d-snapshot`, and tests plug in [`NullSink`].

use anyhow::Result;
use lb3d_core::field::MacroFields;
use lb3d_core::grid::Grid;
use lb3d_halo::{Comm, Topology};

/// Collective consumer of one macroscopic snapshot.
pub trait SnapshotSink {
    /// Emit the interior of `macros` as the global snapshot for `step`.
    /// Collective: every rank calls this in the same order.
    fn write<C: Comm>(
        &mut self,
        comm: &mut C,
        topo: &Topology,
        grid: &Grid,
        macros: &MacroFields,
        step: u64,
    ) -> Result<()>;
}

/// Discards snapshots; used by tests and benchmarks.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn write<C: Comm>(
        &mut self,
        _comm: &mut C,
        _topo: &Topology,
        _grid: &Grid,
        _macros: &MacroFields,
        _step: u64,
    ) -> Result<()> {
        Ok(())
    }
}
