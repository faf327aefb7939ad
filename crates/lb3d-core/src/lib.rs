// crates/lb3d-core/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod config;
pub mod field;
pub mod grid;
pub mod lattice;

// ---- Re-exports for workspace compatibility ----
pub use config::*;
pub use field::*;
pub use grid::*;
pub use lattice::{opposite, CS2, C, Q, W};
