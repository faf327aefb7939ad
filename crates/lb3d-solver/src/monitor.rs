// crates/lb3d-solver/src/monitor.rs

//! Numerical health checks at a configured cadence.
//!
//! A local scan of the interior macroscopic state feeds one global OR: any
//! NaN, infinity, or density below the floor on any rank aborts the run,
//! naming the step. On healthy checks the global mass and momentum are
//! reduced and logged.

use anyhow::{bail, Result};
use lb3d_core::field::MacroFields;
use lb3d_core::grid::{Axis, Grid};
use lb3d_halo::Comm;
use tracing::info;

/// Cadenced divergence/NaN detector.
#[derive(Clone, Copy, Debug)]
pub struct Monitor {
    /// Steps between checks; 0 disables.
    pub check_every: u64,
    /// Interior densities below this are treated as divergence.
    pub rho_floor: f64,
}

impl Monitor {
    /// Run the check if `step` is on the cadence.
    pub fn check<C: Comm>(
        &self,
        grid: &Grid,
        comm: &mut C,
        macros: &MacroFields,
        step: u64,
    ) -> Result<()> {
        if self.check_every == 0 || step % self.check_every != 0 {
            return Ok(());
        }

        let mut bad = false;
        let mut mass = 0.0;
        let mut momentum = [0.0f64; 3];
        for k in grid.interior_range(Axis::Z) {
            for j in grid.interior_range(Axis::Y) {
                for i in grid.interior_range(Axis::X) {
                    let at = grid.idx3(i, j, k);
                    let rho = macros.rho.data()[at];
                    let u = macros.u.data()[at];
                    let v = macros.v.data()[at];
                    let w = macros.w.data()[at];
                    if !(rho.is_finite() && u.is_finite() && v.is_finite() && w.is_finite())
                        || rho < self.rho_floor
                    {
                        bad = true;
                    }
                    mass += rho;
                    momentum[0] += rho * u;
                    momentum[1] += rho * v;
                    momentum[2] += rho * w;
                }
            }
        }

        if comm.any_true(bad)? {
            bail!(
                "numerical failure detected at step {step}: NaN or density below floor {}",
                self.rho_floor
            );
        }

        let mass = comm.sum_f64(mass)?;
        let mx = comm.sum_f64(momentum[0])?;
        let my = comm.sum_f64(momentum[1])?;
        let mz = comm.sum_f64(momentum[2])?;
        info!(step, mass, momentum_x = mx, momentum_y = my, momentum_z = mz, "health check");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lb3d_core::field::MacroFields;
    use lb3d_halo::SerialComm;

    #[test]
    fn nan_is_fatal_on_cadence_only() {
        let grid = Grid::new(1, 2, 2, 2).unwrap();
        let mut macros = MacroFields::new(&grid);
        macros.rho.fill(1.0);
        let at = grid.idx3(1, 1, 1);
        macros.u.data_mut()[at] = f64::NAN;

        let monitor = Monitor {
            check_every: 5,
            rho_floor: 1e-10,
        };
        let mut comm = SerialComm;
        // Off-cadence steps skip the scan.
        monitor.check(&grid, &mut comm, &macros, 4).unwrap();
        let err = monitor.check(&grid, &mut comm, &macros, 5).unwrap_err();
        assert!(err.to_string().contains("step 5"));
    }

    #[test]
    fn vacuum_density_is_fatal() {
        let grid = Grid::new(1, 2, 2, 2).unwrap();
        let mut macros = MacroFields::new(&grid);
        macros.rho.fill(1.0);
        macros.rho.data_mut()[grid.idx3(1, 2, 1)] = 0.0;

        let monitor = Monitor {
            check_every: 1,
            rho_floor: 1e-10,
        };
        let mut comm = SerialComm;
        assert!(monitor.check(&grid, &mut comm, &macros, 1).is_err());
    }
}
