// crates/lb3d-solver/src/init.rs

//! Reference initial conditions.
//!
//! Fields are seeded from *global* coordinates so every decomposition of
//! the same box starts from the same state. All padded voxels are filled
//! (wrapping periodically outside the box); the first halo exchange of the
//! run makes the ghosts authoritative.

use anyhow::Result;
use lb3d_core::config::InitialSpec;
use lb3d_core::field::{DistributionField, MacroFields};
use lb3d_core::grid::Grid;
use lb3d_core::lattice::Q;
use lb3d_halo::Topology;
use std::f64::consts::TAU;

use crate::collide::equilibrium;

/// Apply `spec` to the padded fields of the rank at `topo`.
pub fn apply(
    spec: &InitialSpec,
    grid: &Grid,
    topo: &Topology,
    global: [usize; 3],
    f: &mut DistributionField,
    macros: &mut MacroFields,
) -> Result<()> {
    match *spec {
        InitialSpec::Uniform { rho, velocity } => {
            fill(grid, topo, global, f, macros, |_| (rho, velocity));
        }
        InitialSpec::TaylorGreen { velocity_scale } => {
            let kx = TAU / global[0] as f64;
            let ky = TAU / global[1] as f64;
            fill(grid, topo, global, f, macros, |g| {
                let x = kx * (g[0] as f64 + 0.5);
                let y = ky * (g[1] as f64 + 0.5);
                let u = velocity_scale * x.sin() * y.cos();
                let v = -velocity_scale * (kx / ky) * x.cos() * y.sin();
                // Pressure-matched density removes the acoustic transient.
                let rho = 1.0
                    - 0.75 * velocity_scale * velocity_scale * ((2.0 * x).cos() + (2.0 * y).cos());
                (rho, [u, v, 0.0])
            });
        }
    }
    Ok(())
}

/// Fill every padded voxel from a `global coordinate → (ρ, velocity)` map,
/// distributions at equilibrium.
fn fill<F>(
    grid: &Grid,
    topo: &Topology,
    global: [usize; 3],
    f: &mut DistributionField,
    macros: &mut MacroFields,
    state: F,
) where
    F: Fn([usize; 3]) -> (f64, [f64; 3]),
{
    let [mxp, myp, mzp] = grid.padded();
    let local = grid.interior();
    let coords = topo.coords();
    let at_global = |p: [usize; 3]| {
        let mut g = [0usize; 3];
        for d in 0..3 {
            let offset = i64::from(coords[d]) * local[d] as i64;
            let rel = p[d] as i64 - grid.ghost() as i64;
            g[d] = (offset + rel).rem_euclid(global[d] as i64) as usize;
        }
        g
    };
    for k in 0..mzp {
        for j in 0..myp {
            for i in 0..mxp {
                let (rho, vel) = state(at_global([i, j, k]));
                let at = grid.idx3(i, j, k);
                macros.rho.data_mut()[at] = rho;
                macros.u.data_mut()[at] = vel[0];
                macros.v.data_mut()[at] = vel[1];
                macros.w.data_mut()[at] = vel[2];
                for a in 0..Q {
                    f.data_mut()[grid.idx4(i, j, k, a)] =
                        equilibrium(a, rho, vel[0], vel[1], vel[2]);
                }
            }
        }
    }
}
