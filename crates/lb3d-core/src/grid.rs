// crates/lb3d-core/src/grid.rs

//! Padded subdomain geometry and the single home of index linearization.
//!
//! Every 3D/4D array in the workspace is addressed through [`Grid::idx3`] /
//! [`Grid::idx4`]; no other module spells out `i + j·MXP + k·MXP·MYP`.
//! The face/slab helpers hand out the bounding indices the halo exchange
//! reads and writes, parameterized by ghost layer `ℓ ∈ [0, ghost)`.

use anyhow::{ensure, Result};

use crate::lattice::Q;

/// Coordinate axis of the subdomain box.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Innermost (unit-stride) axis.
    X,
    /// Middle axis, stride `mxp`.
    Y,
    /// Outermost axis, stride `mxp·myp`.
    Z,
}

impl Axis {
    /// All axes, X first.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// 0, 1, 2 for X, Y, Z.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// One of the six faces of the subdomain box.
///
/// Low/high pairs per axis: West/East (X), South/North (Y), Bottom/Top (Z).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Face {
    /// -X
    West,
    /// +X
    East,
    /// -Y
    South,
    /// +Y
    North,
    /// -Z
    Bottom,
    /// +Z
    Top,
}

impl Face {
    /// All faces in neighbor-slot order: West, East, South, North, Bottom, Top.
    pub const ALL: [Self; 6] = [
        Self::West,
        Self::East,
        Self::South,
        Self::North,
        Self::Bottom,
        Self::Top,
    ];

    /// Slot of this face in six-element neighbor tables.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::West => 0,
            Self::East => 1,
            Self::South => 2,
            Self::North => 3,
            Self::Bottom => 4,
            Self::Top => 5,
        }
    }

    /// Axis this face is normal to.
    #[inline]
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::West | Self::East => Axis::X,
            Self::South | Self::North => Axis::Y,
            Self::Bottom | Self::Top => Axis::Z,
        }
    }

    /// Whether this is the high-index face of its axis.
    #[inline]
    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::East | Self::North | Self::Top)
    }

    /// The face on the other side of the box.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::West => Self::East,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::North => Self::South,
            Self::Bottom => Self::Top,
            Self::Top => Self::Bottom,
        }
    }
}

/// Padded subdomain: an interior of `mx·my·mz` voxels wrapped in `ghost`
/// layers on every side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    ghost: usize,
    mx: usize,
    my: usize,
    mz: usize,
}

impl Grid {
    /// Build a padded grid; `ghost ≥ 1`, and every interior extent at least
    /// `ghost` (a thinner subdomain would need data from beyond its nearest
    /// neighbor).
    pub fn new(ghost: usize, mx: usize, my: usize, mz: usize) -> Result<Self> {
        ensure!(ghost >= 1, "ghost layer thickness must be >= 1, got {ghost}");
        ensure!(
            mx >= ghost && my >= ghost && mz >= ghost,
            "interior extents ({mx}, {my}, {mz}) must be at least the ghost thickness {ghost}"
        );
        Ok(Self { ghost, mx, my, mz })
    }

    /// Ghost layer thickness `n`.
    #[inline]
    #[must_use]
    pub const fn ghost(&self) -> usize {
        self.ghost
    }

    /// Interior extents `(mx, my, mz)`.
    #[inline]
    #[must_use]
    pub const fn interior(&self) -> [usize; 3] {
        [self.mx, self.my, self.mz]
    }

    /// Padded extents `(mxp, myp, mzp)`.
    #[inline]
    #[must_use]
    pub const fn padded(&self) -> [usize; 3] {
        [
            self.mx + 2 * self.ghost,
            self.my + 2 * self.ghost,
            self.mz + 2 * self.ghost,
        ]
    }

    /// Number of padded voxels.
    #[inline]
    #[must_use]
    pub const fn len3(&self) -> usize {
        let [mxp, myp, mzp] = self.padded();
        mxp * myp * mzp
    }

    /// Number of distribution entries (`len3 · Q`).
    #[inline]
    #[must_use]
    pub const fn len4(&self) -> usize {
        self.len3() * Q
    }

    /// Linear index of padded voxel `(i, j, k)`.
    #[inline]
    #[must_use]
    pub const fn idx3(&self, i: usize, j: usize, k: usize) -> usize {
        let [mxp, myp, _] = self.padded();
        i + j * mxp + k * mxp * myp
    }

    /// Linear index of distribution entry `(i, j, k, a)`; `a` innermost.
    #[inline]
    #[must_use]
    pub const fn idx4(&self, i: usize, j: usize, k: usize, a: usize) -> usize {
        a + Q * self.idx3(i, j, k)
    }

    /// Half-open interior range along `axis`: `ghost .. ghost + m`.
    #[inline]
    #[must_use]
    pub const fn interior_range(&self, axis: Axis) -> core::ops::Range<usize> {
        let m = match axis {
            Axis::X => self.mx,
            Axis::Y => self.my,
            Axis::Z => self.mz,
        };
        self.ghost..self.ghost + m
    }

    /// Whether padded voxel `(i, j, k)` lies in the interior.
    #[inline]
    #[must_use]
    pub fn is_interior(&self, i: usize, j: usize, k: usize) -> bool {
        self.interior_range(Axis::X).contains(&i)
            && self.interior_range(Axis::Y).contains(&j)
            && self.interior_range(Axis::Z).contains(&k)
    }

    /// Fixed coordinate of the layer-`layer` *interior* slab on `face`.
    ///
    /// High faces count inward from `ghost + m - 1`; low faces count outward
    /// from `ghost`.
    #[inline]
    #[must_use]
    pub fn interior_slab_index(&self, face: Face, layer: usize) -> usize {
        debug_assert!(layer < self.ghost);
        let r = self.interior_range(face.axis());
        if face.is_high() {
            r.end - 1 - layer
        } else {
            r.start + layer
        }
    }

    /// Fixed coordinate of the layer-`layer` *ghost* slab on `face`.
    #[inline]
    #[must_use]
    pub fn ghost_slab_index(&self, face: Face, layer: usize) -> usize {
        debug_assert!(layer < self.ghost);
        let r = self.interior_range(face.axis());
        if face.is_high() {
            r.end + layer
        } else {
            r.start - 1 - layer
        }
    }

    /// Voxels in one slab normal to `axis` (full padded extent of the two
    /// free axes).
    #[inline]
    #[must_use]
    pub const fn slab_len(&self, axis: Axis) -> usize {
        let [mxp, myp, mzp] = self.padded();
        match axis {
            Axis::X => myp * mzp,
            Axis::Y => mxp * mzp,
            Axis::Z => mxp * myp,
        }
    }
}
