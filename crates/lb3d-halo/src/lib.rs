// crates/lb3d-halo/src/lib.rs

//! Domain decomposition and halo exchange.
//!
//! [`Topology`] resolves the Cartesian process grid and the six face
//! neighbors of each rank; [`Comm`] is the transport seam (MPI or serial);
//! [`HaloExchanger`] runs the fixed six-phase, layer-by-layer exchange that
//! keeps ghost layers coherent; [`BoundaryHook`] fills ghost slabs on faces
//! the exchange skipped.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod boundary;
pub mod comm;
pub mod exchange;
pub mod topology;

#[cfg(feature = "mpi")]
pub mod mpi_comm;

pub use boundary::{BoundaryHook, PeriodicHook};
pub use comm::{Comm, SerialComm};
pub use exchange::{HaloExchanger, PHASE_ORDER};
pub use topology::Topology;

#[cfg(feature = "mpi")]
pub use mpi_comm::{abort_world, initialize_mpi, MpiComm};
