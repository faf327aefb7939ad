// crates/lb3d-snapshot/src/lib.rs

//! Parallel structured-grid output: one HDF5 container per snapshot holding
//! the logically global `(ρ, u, v, w)` arrays, plus XDMF descriptors a
//! standard visualizer opens directly.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod layout;
pub mod writer;
pub mod xdmf;

pub use layout::GlobalLayout;
pub use writer::SnapshotWriter;
