// crates/lb3d-snapshot/src/writer.rs

//! The snapshot writer behind the solver's sink seam.
//!
//! Every rank contributes its interior block through the collective gather;
//! rank 0 then writes each block as a hyperslab at the rank's global offset
//! into one HDF5 container per snapshot, and maintains the per-snapshot and
//! time-series XDMF descriptors. One container holds the four datasets
//! `/rho`, `/u`, `/v`, `/w`, each `(Nz, Ny, Nx)` f64 row-major.

use anyhow::{Context, Result};
use lb3d_core::field::MacroFields;
use lb3d_core::grid::Grid;
use lb3d_halo::topology::coords_of;
use lb3d_halo::{Comm, Topology};
use lb3d_solver::SnapshotSink;
use ndarray::{s, ArrayView3};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::layout::GlobalLayout;
use crate::xdmf::{self, FIELD_NAMES};

/// Gather-and-write snapshot sink; construct once per run on every rank.
#[derive(Debug)]
pub struct SnapshotWriter {
    dir: PathBuf,
    layout: GlobalLayout,
    /// `<Grid>` fragments of every snapshot written, for the collection.
    series: Vec<String>,
    /// Gather buffer, allocated once on rank 0.
    gathered: Vec<f64>,
}

impl SnapshotWriter {
    /// Prepare the output directory and the writer state.
    pub fn new<P: AsRef<Path>>(dir: P, layout: GlobalLayout, is_root: bool) -> Result<Self> {
        let dir = dir.as_ref().to_owned();
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        let gathered = if is_root {
            vec![0.0; layout.global_len()]
        } else {
            Vec::new()
        };
        Ok(Self {
            dir,
            layout,
            series: Vec::new(),
            gathered,
        })
    }

    /// Container file name for `step`.
    #[must_use]
    pub fn container_name(step: u64) -> String {
        format!("snap_{step:06}.h5")
    }

    /// Descriptor file name for `step`.
    #[must_use]
    pub fn descriptor_name(step: u64) -> String {
        format!("snap_{step:06}.xmf")
    }

    fn write_root(
        &mut self,
        topo: &Topology,
        blocks: &[(&str, Vec<f64>)],
        step: u64,
    ) -> Result<()> {
        let container = Self::container_name(step);
        let path = self.dir.join(&container);
        let file =
            hdf5::File::create(&path).with_context(|| format!("create {}", path.display()))?;

        let [nx, ny, nz] = self.layout.global;
        let [mx, my, mz] = self.layout.local;
        let block_len = self.layout.block_len();
        for (name, gathered) in blocks {
            let ds = file
                .new_dataset::<f64>()
                .shape([nz, ny, nx])
                .create(*name)
                .with_context(|| format!("create dataset /{name}"))?;
            for rank in 0..topo.size() {
                let coords = coords_of(topo.dims(), rank);
                let [ox, oy, oz] = self.layout.offset(coords);
                let block = &gathered[rank as usize * block_len..(rank as usize + 1) * block_len];
                let view = ArrayView3::from_shape((mz, my, mx), block)
                    .context("shape rank block for hyperslab write")?;
                ds.write_slice(&view, s![oz..oz + mz, oy..oy + my, ox..ox + mx])
                    .with_context(|| format!("write /{name} hyperslab of rank {rank}"))?;
            }
        }

        let grid_xml = xdmf::snapshot_grid(&container, self.layout.global, self.layout.spacing, step);
        let xmf = self.dir.join(Self::descriptor_name(step));
        fs::write(&xmf, xdmf::snapshot_document(&grid_xml))
            .with_context(|| format!("write {}", xmf.display()))?;

        self.series.push(grid_xml);
        let series = self.dir.join("series.xmf");
        fs::write(&series, xdmf::series_document(&self.series))
            .with_context(|| format!("write {}", series.display()))?;

        info!(step, container = %path.display(), "snapshot written");
        Ok(())
    }
}

impl SnapshotSink for SnapshotWriter {
    fn write<C: Comm>(
        &mut self,
        comm: &mut C,
        topo: &Topology,
        grid: &Grid,
        macros: &MacroFields,
        step: u64,
    ) -> Result<()> {
        let fields = [
            macros.rho.data(),
            macros.u.data(),
            macros.v.data(),
            macros.w.data(),
        ];
        let is_root = comm.rank() == 0;
        let mut blocks: Vec<(&str, Vec<f64>)> = Vec::with_capacity(FIELD_NAMES.len());
        for (name, field) in FIELD_NAMES.into_iter().zip(fields) {
            let block = self.layout.extract_interior(grid, field)?;
            let mut gathered = std::mem::take(&mut self.gathered);
            comm.gather_root(&block, is_root.then_some(&mut gathered[..]))
                .with_context(|| format!("gather field {name}"))?;
            if is_root {
                blocks.push((name, gathered.clone()));
            }
            self.gathered = gathered;
        }
        if is_root {
            self.write_root(topo, &blocks, step)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_zero_padded() {
        assert_eq!(SnapshotWriter::container_name(10), "snap_000010.h5");
        assert_eq!(SnapshotWriter::descriptor_name(12345), "snap_012345.xmf");
    }
}
