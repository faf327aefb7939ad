// crates/lb3d-halo/src/exchange.rs

//! The six-phase halo-exchange protocol.
//!
//! Per ghost layer `ℓ`, in this fixed order: +Z, −Z, +X, −X, +Y, −Y. Each
//! phase packs the interior slab of the send face, runs one combined
//! send/receive with the face neighbors, and unpacks the received slab into
//! the ghost slab of the opposite face. Sweeping a full layer before moving
//! to `ℓ+1` makes edge and corner ghosts correct by transitive exchange:
//! a diagonal neighbor's value reaches the local corner through two face
//! hops (Z first, then X, then Y).
//!
//! The distribution field is exchanged as `Q` scalar exchanges, each
//! component transposed through a long-lived scratch buffer owned by the
//! exchanger.

use anyhow::{ensure, Context, Result};
use lb3d_core::field::{pack_slab, unpack_slab, DistributionField, MacroFields};
use lb3d_core::grid::{Axis, Face, Grid};
use lb3d_core::lattice::Q;
use tracing::trace;

use crate::comm::Comm;
use crate::topology::Topology;

/// Send faces of the six phases, in protocol order. The phase index is the
/// message tag, so +/− exchanges between the same pair never collide.
pub const PHASE_ORDER: [Face; 6] = [
    Face::Top,
    Face::Bottom,
    Face::East,
    Face::West,
    Face::North,
    Face::South,
];

/// Runs the halo protocol over a fixed grid; owns every transient buffer it
/// needs so no allocation happens per call.
#[derive(Debug)]
pub struct HaloExchanger {
    grid: Grid,
    /// Component transpose buffer for the distribution mode (`len3`).
    scratch: Vec<f64>,
    send: Vec<f64>,
    recv: Vec<f64>,
}

impl HaloExchanger {
    /// Build an exchanger for `grid`, allocating the scratch and slab
    /// buffers once.
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        let max_slab = Axis::ALL
            .into_iter()
            .map(|axis| grid.slab_len(axis))
            .max()
            .unwrap_or(0);
        Self {
            grid: *grid,
            scratch: vec![0.0; grid.len3()],
            send: vec![0.0; max_slab],
            recv: vec![0.0; max_slab],
        }
    }

    /// One ordered phase: pack, exchange, unpack.
    ///
    /// Exposed so lockstep harnesses can drive ranks phase-by-phase; solver
    /// code goes through [`Self::exchange_scalar`] and friends.
    pub fn run_phase<C: Comm>(
        &mut self,
        topo: &Topology,
        comm: &mut C,
        field: &mut [f64],
        send_face: Face,
        layer: usize,
        tag: i32,
    ) -> Result<()> {
        let recv_face = send_face.opposite();
        let to = topo.neighbor(send_face);
        let from = topo.neighbor(recv_face);
        let axis = send_face.axis();
        let len = self.grid.slab_len(axis);

        if to.is_some() {
            let fixed = self.grid.interior_slab_index(send_face, layer);
            pack_slab(&self.grid, field, axis, fixed, &mut self.send[..len]);
        }
        comm.send_receive(to, from, tag, &self.send[..len], &mut self.recv[..len])
            .with_context(|| format!("halo exchange failed on face {send_face:?} layer {layer}"))?;
        if from.is_some() {
            let fixed = self.grid.ghost_slab_index(recv_face, layer);
            unpack_slab(&self.grid, field, axis, fixed, &self.recv[..len]);
        }
        Ok(())
    }

    /// Exchange every ghost layer of one scalar field.
    pub fn exchange_scalar<C: Comm>(
        &mut self,
        topo: &Topology,
        comm: &mut C,
        field: &mut [f64],
    ) -> Result<()> {
        ensure!(
            field.len() == self.grid.len3(),
            "scalar field length {} does not match padded grid {}",
            field.len(),
            self.grid.len3()
        );
        for layer in 0..self.grid.ghost() {
            for (tag, face) in PHASE_ORDER.into_iter().enumerate() {
                self.run_phase(topo, comm, field, face, layer, tag as i32)?;
            }
        }
        Ok(())
    }

    /// Exchange the four macroscopic fields (ρ, u, v, w) in scalar mode.
    pub fn exchange_macros<C: Comm>(
        &mut self,
        topo: &Topology,
        comm: &mut C,
        macros: &mut MacroFields,
    ) -> Result<()> {
        self.exchange_scalar(topo, comm, macros.rho.data_mut())?;
        self.exchange_scalar(topo, comm, macros.u.data_mut())?;
        self.exchange_scalar(topo, comm, macros.v.data_mut())?;
        self.exchange_scalar(topo, comm, macros.w.data_mut())?;
        Ok(())
    }

    /// Exchange the distribution field: `Q` scalar exchanges through the
    /// retained transpose scratch.
    pub fn exchange_distribution<C: Comm>(
        &mut self,
        topo: &Topology,
        comm: &mut C,
        f: &mut DistributionField,
    ) -> Result<()> {
        ensure!(
            f.data().len() == self.grid.len4(),
            "distribution field length {} does not match padded grid {}",
            f.data().len(),
            self.grid.len4()
        );
        trace!(rank = topo.rank(), "distribution halo exchange");
        let mut scratch = std::mem::take(&mut self.scratch);
        let mut outcome = Ok(());
        for a in 0..Q {
            f.gather_component(a, &mut scratch);
            outcome = self.exchange_scalar(topo, comm, &mut scratch);
            if outcome.is_err() {
                break;
            }
            f.scatter_component(a, &scratch);
        }
        self.scratch = scratch;
        outcome
    }
}
