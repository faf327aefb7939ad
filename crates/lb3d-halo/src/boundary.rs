// crates/lb3d-halo/src/boundary.rs

//! The boundary hook: ghost slabs on global-boundary faces.
//!
//! The exchange skips faces whose neighbor slot holds the sentinel; after
//! each exchange the hook is handed the padded fields plus the list of
//! those faces. Wall/inflow/outflow catalogues plug in here; the core
//! ships only the periodic/no-op default (periodic faces never reach the
//! hook because the wrap gives them a real neighbor).

use anyhow::Result;
use lb3d_core::field::{DistributionField, MacroFields};
use lb3d_core::grid::{Face, Grid};

use crate::topology::Topology;

/// Fills ghost slabs on domain-boundary faces, once after the distribution
/// exchange and once after the macroscopic exchange.
pub trait BoundaryHook {
    /// Populate ghost slabs of `f` on `faces`.
    fn fill_distribution(
        &mut self,
        grid: &Grid,
        topo: &Topology,
        faces: &[Face],
        f: &mut DistributionField,
    ) -> Result<()> {
        let _ = (grid, topo, faces, f);
        Ok(())
    }

    /// Populate ghost slabs of the macroscopic fields on `faces`.
    fn fill_macros(
        &mut self,
        grid: &Grid,
        topo: &Topology,
        faces: &[Face],
        macros: &mut MacroFields,
    ) -> Result<()> {
        let _ = (grid, topo, faces, macros);
        Ok(())
    }
}

/// Default hook: nothing to do. Fully periodic domains have no boundary
/// faces, and open faces keep whatever the initializer put there.
#[derive(Clone, Copy, Debug, Default)]
pub struct PeriodicHook;

impl BoundaryHook for PeriodicHook {}
