// crates/lb3d-snapshot/src/xdmf.rs

//! XDMF descriptors: one per snapshot, plus the temporal collection.
//!
//! Cell-centered convention: the `3DCoRectMesh` topology is declared one
//! node larger than the voxel counts in each direction, dimensions ordered
//! `(z, y, x)` to match the container datasets.

use std::fmt::Write as _;

/// The four dataset names, in the order they are written and declared.
pub const FIELD_NAMES: [&str; 4] = ["rho", "u", "v", "w"];

/// The `<Grid>` element describing one snapshot.
///
/// `container` is the HDF5 file name as referenced from the descriptor
/// (same directory), `global` is `(nx, ny, nz)`, `spacing` is
/// `(dx, dy, dz)`.
#[must_use]
pub fn snapshot_grid(container: &str, global: [usize; 3], spacing: [f64; 3], step: u64) -> String {
    let [nx, ny, nz] = global;
    let [dx, dy, dz] = spacing;
    let mut s = String::new();
    let _ = writeln!(s, r#"    <Grid Name="step_{step:06}" GridType="Uniform">"#);
    let _ = writeln!(s, r#"      <Time Value="{step}"/>"#);
    let _ = writeln!(
        s,
        r#"      <Topology TopologyType="3DCoRectMesh" Dimensions="{} {} {}"/>"#,
        nz + 1,
        ny + 1,
        nx + 1
    );
    let _ = writeln!(s, r#"      <Geometry GeometryType="ORIGIN_DXDYDZ">"#);
    let _ = writeln!(
        s,
        r#"        <DataItem Name="Origin" Dimensions="3" NumberType="Float" Format="XML">0 0 0</DataItem>"#
    );
    let _ = writeln!(
        s,
        r#"        <DataItem Name="Spacing" Dimensions="3" NumberType="Float" Format="XML">{dz} {dy} {dx}</DataItem>"#
    );
    let _ = writeln!(s, r#"      </Geometry>"#);
    for name in FIELD_NAMES {
        let _ = writeln!(
            s,
            r#"      <Attribute Name="{name}" AttributeType="Scalar" Center="Cell">"#
        );
        let _ = writeln!(
            s,
            r#"        <DataItem Dimensions="{nz} {ny} {nx}" NumberType="Float" Precision="8" Format="HDF">{container}:/{name}</DataItem>"#
        );
        let _ = writeln!(s, r#"      </Attribute>"#);
    }
    let _ = writeln!(s, r#"    </Grid>"#);
    s
}

/// A complete single-snapshot document.
#[must_use]
pub fn snapshot_document(grid: &str) -> String {
    format!(
        "<?xml version=\"1.0\" ?>\n<!DOCTYPE Xdmf SYSTEM \"Xdmf.dtd\" []>\n<Xdmf Version=\"3.0\">\n  <Domain>\n{grid}  </Domain>\n</Xdmf>\n"
    )
}

/// The time-series collection over every snapshot written so far.
#[must_use]
pub fn series_document(grids: &[String]) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        r#"    <Grid Name="series" GridType="Collection" CollectionType="Temporal">"#
    );
    for grid in grids {
        body.push_str(grid);
    }
    let _ = writeln!(body, r#"    </Grid>"#);
    format!(
        "<?xml version=\"1.0\" ?>\n<!DOCTYPE Xdmf SYSTEM \"Xdmf.dtd\" []>\n<Xdmf Version=\"3.0\">\n  <Domain>\n{body}  </Domain>\n</Xdmf>\n"
    )
}
