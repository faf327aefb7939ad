// crates/lb3d-snapshot/src/layout.rs

//! Global snapshot geometry: how one rank's interior maps into the
//! `(Nz, Ny, Nx)` row-major datasets.

use anyhow::{ensure, Result};
use lb3d_core::config::RunConfig;
use lb3d_core::grid::{Axis, Grid};

/// Shape bookkeeping shared by the writer and the descriptors.
#[derive(Clone, Copy, Debug)]
pub struct GlobalLayout {
    /// Global interior voxel counts `(nx, ny, nz)`.
    pub global: [usize; 3],
    /// Per-rank interior voxel counts `(mx, my, mz)`.
    pub local: [usize; 3],
    /// Voxel spacing `(dx, dy, dz)` declared to the visualizer.
    pub spacing: [f64; 3],
}

impl GlobalLayout {
    /// Derive the layout from a validated configuration.
    #[must_use]
    pub const fn from_config(cfg: &RunConfig) -> Self {
        Self {
            global: [cfg.nx, cfg.ny, cfg.nz],
            local: cfg.local_extent(),
            spacing: cfg.spacing,
        }
    }

    /// Hyperslab origin `(ox, oy, oz)` of the rank at Cartesian `coords`.
    #[must_use]
    pub fn offset(&self, coords: [i32; 3]) -> [usize; 3] {
        [
            coords[0] as usize * self.local[0],
            coords[1] as usize * self.local[1],
            coords[2] as usize * self.local[2],
        ]
    }

    /// Elements in one rank's interior block.
    #[must_use]
    pub const fn block_len(&self) -> usize {
        self.local[0] * self.local[1] * self.local[2]
    }

    /// Elements in the global dataset.
    #[must_use]
    pub const fn global_len(&self) -> usize {
        self.global[0] * self.global[1] * self.global[2]
    }

    /// Copy the interior of a padded scalar array into a dense block in
    /// dataset order: row-major `(z, y, x)`.
    pub fn extract_interior(&self, grid: &Grid, field: &[f64]) -> Result<Vec<f64>> {
        ensure!(
            grid.interior() == self.local,
            "grid interior {:?} does not match layout {:?}",
            grid.interior(),
            self.local
        );
        ensure!(
            field.len() == grid.len3(),
            "padded field length {} does not match grid {}",
            field.len(),
            grid.len3()
        );
        let mut block = Vec::with_capacity(self.block_len());
        for k in grid.interior_range(Axis::Z) {
            for j in grid.interior_range(Axis::Y) {
                for i in grid.interior_range(Axis::X) {
                    block.push(field[grid.idx3(i, j, k)]);
                }
            }
        }
        Ok(block)
    }
}
