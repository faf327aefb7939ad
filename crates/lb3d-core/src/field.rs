// crates/lb3d-core/src/field.rs

//! Per-rank field storage and the slab copy primitives the halo exchange
//! is built from.
//!
//! Fields are flat `Vec<f64>` sized once by the [`Grid`] and addressed only
//! through its linearization. Slab packing honors the memory layout per
//! axis: a Z slab is one contiguous run, a Y slab is `mzp` contiguous rows,
//! an X slab is a strided selection of single elements.

use crate::grid::{Axis, Grid};
use crate::lattice::Q;

/// Contiguous scalar field over the padded subdomain (`len3` doubles).
#[derive(Clone, Debug)]
pub struct ScalarField {
    data: Vec<f64>,
}

impl ScalarField {
    /// Allocate a zeroed field for `grid`.
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        Self {
            data: vec![0.0; grid.len3()],
        }
    }

    /// Read-only view of the padded data.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable view of the padded data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Overwrite every padded voxel with `value`.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }
}

/// Distribution field over the padded subdomain (`len3 · Q` doubles,
/// direction index innermost).
#[derive(Clone, Debug)]
pub struct DistributionField {
    data: Vec<f64>,
}

impl DistributionField {
    /// Allocate a zeroed distribution field for `grid`.
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        Self {
            data: vec![0.0; grid.len4()],
        }
    }

    /// Read-only view of the padded data.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable view of the padded data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Transpose component `a` into a contiguous `len3` scratch buffer.
    pub fn gather_component(&self, a: usize, scratch: &mut [f64]) {
        debug_assert!(a < Q);
        debug_assert_eq!(scratch.len() * Q, self.data.len());
        for (voxel, out) in scratch.iter_mut().enumerate() {
            *out = self.data[a + Q * voxel];
        }
    }

    /// Write a contiguous `len3` scratch buffer back as component `a`.
    pub fn scatter_component(&mut self, a: usize, scratch: &[f64]) {
        debug_assert!(a < Q);
        debug_assert_eq!(scratch.len() * Q, self.data.len());
        for (voxel, value) in scratch.iter().enumerate() {
            self.data[a + Q * voxel] = *value;
        }
    }
}

/// The macroscopic variables the solver exposes to output and boundary
/// hooks: density and the three velocity components.
#[derive(Clone, Debug)]
pub struct MacroFields {
    /// Density ρ.
    pub rho: ScalarField,
    /// Velocity x-component.
    pub u: ScalarField,
    /// Velocity y-component.
    pub v: ScalarField,
    /// Velocity z-component.
    pub w: ScalarField,
}

impl MacroFields {
    /// Allocate zeroed macroscopic fields for `grid`.
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        Self {
            rho: ScalarField::new(grid),
            u: ScalarField::new(grid),
            v: ScalarField::new(grid),
            w: ScalarField::new(grid),
        }
    }
}

/// Copy the slab with fixed coordinate `fixed` on `axis` out of a padded
/// scalar array into `out` (`grid.slab_len(axis)` elements).
pub fn pack_slab(grid: &Grid, src: &[f64], axis: Axis, fixed: usize, out: &mut [f64]) {
    let [mxp, myp, mzp] = grid.padded();
    debug_assert_eq!(src.len(), grid.len3());
    debug_assert_eq!(out.len(), grid.slab_len(axis));
    match axis {
        Axis::Z => {
            let base = grid.idx3(0, 0, fixed);
            out.copy_from_slice(&src[base..base + mxp * myp]);
        }
        Axis::Y => {
            for k in 0..mzp {
                let base = grid.idx3(0, fixed, k);
                out[k * mxp..(k + 1) * mxp].copy_from_slice(&src[base..base + mxp]);
            }
        }
        Axis::X => {
            for k in 0..mzp {
                for j in 0..myp {
                    out[j + k * myp] = src[grid.idx3(fixed, j, k)];
                }
            }
        }
    }
}

/// Write a packed slab back into a padded scalar array at fixed coordinate
/// `fixed` on `axis`; inverse of [`pack_slab`].
pub fn unpack_slab(grid: &Grid, dst: &mut [f64], axis: Axis, fixed: usize, src: &[f64]) {
    let [mxp, myp, mzp] = grid.padded();
    debug_assert_eq!(dst.len(), grid.len3());
    debug_assert_eq!(src.len(), grid.slab_len(axis));
    match axis {
        Axis::Z => {
            let base = grid.idx3(0, 0, fixed);
            dst[base..base + mxp * myp].copy_from_slice(src);
        }
        Axis::Y => {
            for k in 0..mzp {
                let base = grid.idx3(0, fixed, k);
                dst[base..base + mxp].copy_from_slice(&src[k * mxp..(k + 1) * mxp]);
            }
        }
        Axis::X => {
            for k in 0..mzp {
                for j in 0..myp {
                    dst[grid.idx3(fixed, j, k)] = src[j + k * myp];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(grid: &Grid) -> Vec<f64> {
        (0..grid.len3()).map(|i| i as f64).collect()
    }

    #[test]
    fn pack_unpack_roundtrip_every_axis() {
        let grid = Grid::new(1, 3, 4, 5).unwrap();
        for axis in Axis::ALL {
            let src = numbered(&grid);
            let mut slab = vec![0.0; grid.slab_len(axis)];
            let fixed = 2;
            pack_slab(&grid, &src, axis, fixed, &mut slab);

            let mut dst = vec![-1.0; grid.len3()];
            unpack_slab(&grid, &mut dst, axis, fixed, &slab);

            // Every element of the slab landed where it came from; the rest
            // of dst is untouched.
            let [mxp, myp, mzp] = grid.padded();
            for k in 0..mzp {
                for j in 0..myp {
                    for i in 0..mxp {
                        let on_slab = match axis {
                            Axis::X => i == fixed,
                            Axis::Y => j == fixed,
                            Axis::Z => k == fixed,
                        };
                        let got = dst[grid.idx3(i, j, k)];
                        if on_slab {
                            assert_eq!(got, src[grid.idx3(i, j, k)]);
                        } else {
                            assert_eq!(got, -1.0);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn component_transpose_roundtrip() {
        let grid = Grid::new(1, 2, 2, 2).unwrap();
        let mut f = DistributionField::new(&grid);
        for (i, v) in f.data_mut().iter_mut().enumerate() {
            *v = i as f64;
        }
        let reference = f.data().to_vec();

        let mut scratch = vec![0.0; grid.len3()];
        for a in 0..Q {
            f.gather_component(a, &mut scratch);
            assert_eq!(scratch[0], f.data()[a]);
            f.scatter_component(a, &scratch);
        }
        assert_eq!(f.data(), &reference[..]);
    }
}
