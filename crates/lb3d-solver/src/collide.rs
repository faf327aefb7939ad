// crates/lb3d-solver/src/collide.rs

//! Macroscopic reduction and the BGK collision.
//!
//! Per interior voxel: reduce `(ρ, u, v, w)` from the distributions, then
//! relax each component toward the second-order Maxwell–Boltzmann
//! equilibrium with rate `1/τ`. The reduction output is the authoritative
//! macroscopic state handed to output and boundary hooks; collision
//! conserves it exactly.

use lb3d_core::field::{DistributionField, MacroFields};
use lb3d_core::grid::{Axis, Grid};
use lb3d_core::lattice::{C, Q, W};

/// Second-order equilibrium `f_a^eq(ρ, u)`.
#[inline]
#[must_use]
pub fn equilibrium(a: usize, rho: f64, u: f64, v: f64, w: f64) -> f64 {
    let cu = f64::from(C[a][0]) * u + f64::from(C[a][1]) * v + f64::from(C[a][2]) * w;
    let usq = u * u + v * v + w * w;
    W[a] * rho * (1.0 + 3.0 * cu + 4.5 * cu * cu - 1.5 * usq)
}

/// Reduce distributions to `(ρ, u, v, w)` over the interior.
///
/// The velocity division is floored at `rho_floor`; the stored density is
/// the raw zeroth moment.
pub fn reduce_macros(grid: &Grid, f: &DistributionField, macros: &mut MacroFields, rho_floor: f64) {
    let fd = f.data();
    for k in grid.interior_range(Axis::Z) {
        for j in grid.interior_range(Axis::Y) {
            for i in grid.interior_range(Axis::X) {
                let mut rho = 0.0;
                let mut mu = 0.0;
                let mut mv = 0.0;
                let mut mw = 0.0;
                for a in 0..Q {
                    let fa = fd[grid.idx4(i, j, k, a)];
                    rho += fa;
                    mu += f64::from(C[a][0]) * fa;
                    mv += f64::from(C[a][1]) * fa;
                    mw += f64::from(C[a][2]) * fa;
                }
                let div = rho.max(rho_floor);
                let at = grid.idx3(i, j, k);
                macros.rho.data_mut()[at] = rho;
                macros.u.data_mut()[at] = mu / div;
                macros.v.data_mut()[at] = mv / div;
                macros.w.data_mut()[at] = mw / div;
            }
        }
    }
}

/// BGK relaxation in place over the interior, using the macroscopic fields
/// produced by [`reduce_macros`].
pub fn relax(grid: &Grid, f: &mut DistributionField, macros: &MacroFields, tau: f64) {
    let omega = 1.0 / tau;
    let fd = f.data_mut();
    for k in grid.interior_range(Axis::Z) {
        for j in grid.interior_range(Axis::Y) {
            for i in grid.interior_range(Axis::X) {
                let at = grid.idx3(i, j, k);
                let rho = macros.rho.data()[at];
                let u = macros.u.data()[at];
                let v = macros.v.data()[at];
                let w = macros.w.data()[at];
                for a in 0..Q {
                    let feq = equilibrium(a, rho, u, v, w);
                    let fa = fd[grid.idx4(i, j, k, a)];
                    let next = fa - omega * (fa - feq);
                    // Negative populations mean the regime is under-resolved.
                    debug_assert!(
                        next >= -1e-12,
                        "negative distribution {next} at ({i},{j},{k},{a})"
                    );
                    fd[grid.idx4(i, j, k, a)] = next;
                }
            }
        }
    }
}
