// crates/lb3d-halo/src/mpi_comm.rs

//! MPI transport: a Cartesian communicator behind the [`Comm`] seam.
//!
//! Phases map onto `MPI_Sendrecv` when both partners exist; at a domain
//! boundary the remaining half degrades to a tagged send or a plain
//! receive, which cannot deadlock because every dependency chain ends at a
//! rank that only receives. Reductions and the snapshot gather use the
//! standard collectives.

use anyhow::{anyhow, ensure, Result};
use mpi::collective::SystemOperation;
use mpi::environment::Universe;
use mpi::point_to_point as p2p;
use mpi::topology::{CartesianCommunicator, CartesianLayout};
use mpi::traits::*;
use tracing::debug;

use crate::comm::Comm;
use crate::topology::Topology;

/// Initialize the MPI environment; hold the returned [`Universe`] for the
/// lifetime of the run (finalization happens on drop).
pub fn initialize_mpi() -> Result<Universe> {
    mpi::initialize().ok_or_else(|| anyhow!("MPI initialization failed (already initialized?)"))
}

/// Abort every rank of the run with `code`; once one rank cannot continue,
/// the whole job comes down.
pub fn abort_world(universe: &Universe, code: i32) -> ! {
    universe.world().abort(code)
}

/// MPI-backed transport over a non-reordered Cartesian communicator.
pub struct MpiComm {
    comm: CartesianCommunicator,
}

impl MpiComm {
    /// Create the Cartesian communicator for a `dims` process grid with the
    /// given per-axis periodicity. Fails unless the launcher provided
    /// exactly `Px·Py·Pz` ranks.
    pub fn new(universe: &Universe, dims: [i32; 3], periodic: [bool; 3]) -> Result<Self> {
        let world = universe.world();
        let want: i32 = dims.iter().product();
        ensure!(
            world.size() == want,
            "process grid {dims:?} needs {want} ranks, launched with {}",
            world.size()
        );
        let comm = world
            .create_cartesian_communicator(&dims, &periodic, false)
            .ok_or_else(|| anyhow!("failed to create cartesian communicator for {dims:?}"))?;
        debug!(rank = comm.rank(), ?dims, "cartesian communicator ready");
        Ok(Self { comm })
    }

    /// Resolve this rank's topology from the communicator layout.
    pub fn topology(&self) -> Result<Topology> {
        let CartesianLayout {
            dims,
            periods,
            coords,
        } = self.comm.get_layout();
        let dims: [i32; 3] = dims
            .try_into()
            .map_err(|_| anyhow!("cartesian layout is not three-dimensional"))?;
        let coords: [i32; 3] = coords
            .try_into()
            .map_err(|_| anyhow!("cartesian coordinates are not three-dimensional"))?;
        let periodic: [bool; 3] = periods
            .try_into()
            .map_err(|_| anyhow!("cartesian periods are not three-dimensional"))?;
        Topology::from_parts(dims, coords, periodic)
    }

    /// Abort every rank of the run with `code`.
    pub fn abort(&self, code: i32) -> ! {
        self.comm.abort(code)
    }
}

impl Comm for MpiComm {
    fn rank(&self) -> i32 {
        self.comm.rank()
    }

    fn size(&self) -> i32 {
        self.comm.size()
    }

    fn send_receive(
        &mut self,
        to: Option<i32>,
        from: Option<i32>,
        tag: i32,
        send: &[f64],
        recv: &mut [f64],
    ) -> Result<()> {
        match (to, from) {
            (Some(to), Some(from)) => {
                let _status = p2p::send_receive_with_tags_into(
                    send,
                    &self.comm.process_at_rank(to),
                    tag,
                    recv,
                    &self.comm.process_at_rank(from),
                    tag,
                );
            }
            (Some(to), None) => {
                self.comm.process_at_rank(to).send_with_tag(send, tag);
            }
            (None, Some(from)) => {
                let _status = self.comm.process_at_rank(from).receive_into(recv);
            }
            (None, None) => {}
        }
        Ok(())
    }

    fn any_true(&mut self, local: bool) -> Result<bool> {
        let local = u8::from(local);
        let mut global = 0u8;
        self.comm
            .all_reduce_into(&local, &mut global, SystemOperation::max());
        Ok(global != 0)
    }

    fn sum_f64(&mut self, local: f64) -> Result<f64> {
        let mut global = 0.0f64;
        self.comm
            .all_reduce_into(&local, &mut global, SystemOperation::sum());
        Ok(global)
    }

    fn gather_root(&mut self, send: &[f64], recv: Option<&mut [f64]>) -> Result<()> {
        let root = self.comm.process_at_rank(0);
        if self.comm.rank() == 0 {
            let recv = recv.ok_or_else(|| anyhow!("gather on rank 0 requires the root buffer"))?;
            ensure!(
                recv.len() == send.len() * self.comm.size() as usize,
                "gather buffer holds {} elements, expected {}",
                recv.len(),
                send.len() * self.comm.size() as usize
            );
            root.gather_into_root(send, recv);
        } else {
            root.gather_into(send);
        }
        Ok(())
    }
}
