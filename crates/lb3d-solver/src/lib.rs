// crates/lb3d-solver/src/lib.rs

//! The LB time-step pipeline: streaming, collision with macroscopic
//! reduction, initial conditions, the numerical monitor, and the lockstep
//! step orchestration.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod collide;
pub mod init;
pub mod monitor;
pub mod output;
pub mod stepper;
pub mod stream;

pub use monitor::Monitor;
pub use output::{NullSink, SnapshotSink};
pub use stepper::Solver;
