// crates/lb3d-halo/src/topology.rs

//! Cartesian process topology: grid shape, per-rank coordinates, and the
//! six face-neighbor ranks.
//!
//! A `Topology` is built once at startup and passed by reference to every
//! component that needs it. Rank numbering is row-major with the *last*
//! coordinate varying fastest, matching `MPI_Cart_create` with reordering
//! disabled, so the pure constructor and the MPI one agree.

use anyhow::{ensure, Result};
use lb3d_core::grid::Face;

/// Process grid shape, this rank's place in it, and its face neighbors.
///
/// `None` in a neighbor slot is the "no neighbor" sentinel: that face lies
/// on a non-periodic global boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    rank: i32,
    dims: [i32; 3],
    coords: [i32; 3],
    periodic: [bool; 3],
    neighbors: [Option<i32>; 6],
}

/// Rank of Cartesian coordinates `coords` in grid `dims` (row-major, last
/// coordinate fastest).
#[inline]
#[must_use]
pub fn rank_of(dims: [i32; 3], coords: [i32; 3]) -> i32 {
    (coords[0] * dims[1] + coords[1]) * dims[2] + coords[2]
}

/// Cartesian coordinates of `rank` in grid `dims`; inverse of [`rank_of`].
#[inline]
#[must_use]
pub fn coords_of(dims: [i32; 3], rank: i32) -> [i32; 3] {
    let z = rank % dims[2];
    let y = (rank / dims[2]) % dims[1];
    let x = rank / (dims[1] * dims[2]);
    [x, y, z]
}

impl Topology {
    /// Resolve neighbors for the rank at `coords` in a `dims` process grid.
    ///
    /// A ±1 shift that falls off a non-periodic edge yields `None`; on a
    /// periodic axis it wraps (a 1-wide periodic axis neighbors itself).
    pub fn from_parts(dims: [i32; 3], coords: [i32; 3], periodic: [bool; 3]) -> Result<Self> {
        ensure!(
            dims.iter().all(|&d| d >= 1),
            "process grid extents must be positive, got {dims:?}"
        );
        ensure!(
            coords.iter().zip(&dims).all(|(&c, &d)| c >= 0 && c < d),
            "coordinates {coords:?} outside process grid {dims:?}"
        );

        let mut neighbors = [None; 6];
        for face in Face::ALL {
            let axis = face.axis().index();
            let shift: i32 = if face.is_high() { 1 } else { -1 };
            let c = coords[axis] + shift;
            let c = if (0..dims[axis]).contains(&c) {
                Some(c)
            } else if periodic[axis] {
                Some(c.rem_euclid(dims[axis]))
            } else {
                None
            };
            neighbors[face.index()] = c.map(|c| {
                let mut n = coords;
                n[axis] = c;
                rank_of(dims, n)
            });
        }

        Ok(Self {
            rank: rank_of(dims, coords),
            dims,
            coords,
            periodic,
            neighbors,
        })
    }

    /// The 1×1×1 process grid (serial runs and tests). Periodic axes make
    /// the single rank its own neighbor.
    #[must_use]
    pub fn single(periodic: [bool; 3]) -> Self {
        Self::from_parts([1, 1, 1], [0, 0, 0], periodic)
            .unwrap_or_else(|_| unreachable!("1x1x1 grid is always valid"))
    }

    /// This rank's id.
    #[inline]
    #[must_use]
    pub const fn rank(&self) -> i32 {
        self.rank
    }

    /// Process grid extents `(Px, Py, Pz)`.
    #[inline]
    #[must_use]
    pub const fn dims(&self) -> [i32; 3] {
        self.dims
    }

    /// This rank's Cartesian coordinates `(px, py, pz)`.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> [i32; 3] {
        self.coords
    }

    /// Per-axis periodicity.
    #[inline]
    #[must_use]
    pub const fn periodic(&self) -> [bool; 3] {
        self.periodic
    }

    /// Neighbor rank across `face`, or `None` at a global boundary.
    #[inline]
    #[must_use]
    pub fn neighbor(&self, face: Face) -> Option<i32> {
        self.neighbors[face.index()]
    }

    /// Faces of this rank that lie on the global domain boundary; the
    /// boundary hook owns their ghost slabs.
    #[must_use]
    pub fn boundary_faces(&self) -> Vec<Face> {
        Face::ALL
            .into_iter()
            .filter(|f| self.neighbor(*f).is_none())
            .collect()
    }

    /// Total rank count.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> i32 {
        self.dims[0] * self.dims[1] * self.dims[2]
    }
}
