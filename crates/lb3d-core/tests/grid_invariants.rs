//! Property tests for the padded-grid index arithmetic.
//!
//! These pin down the two facts the halo protocol is built on: the
//! linearization is a bijection, and interior/ghost slab indices on opposing
//! faces address the *same global voxel* once subdomain offsets are applied.

use lb3d_core::{Axis, Face, Grid, Q};
use proptest::prelude::*;

prop_compose! {
    fn arb_grid()
        (ghost in 1usize..=3)
        (ghost in Just(ghost), mx in ghost..=6, my in ghost..=6, mz in ghost..=6)
        -> Grid
    {
        Grid::new(ghost, mx, my, mz).expect("valid grid")
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64, // good CI/runtime balance
        .. ProptestConfig::default()
    })]

    #[test]
    fn idx3_is_a_bijection(grid in arb_grid()) {
        let [mxp, myp, mzp] = grid.padded();
        let mut seen = vec![false; grid.len3()];
        for k in 0..mzp {
            for j in 0..myp {
                for i in 0..mxp {
                    let idx = grid.idx3(i, j, k);
                    prop_assert!(idx < grid.len3());
                    prop_assert!(!seen[idx], "idx3 collision at ({i},{j},{k})");
                    seen[idx] = true;
                }
            }
        }
        prop_assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn idx4_keeps_direction_innermost(grid in arb_grid()) {
        let [mxp, ..] = grid.padded();
        for a in 0..Q {
            prop_assert_eq!(grid.idx4(0, 0, 0, a), a);
        }
        prop_assert_eq!(grid.idx4(1, 0, 0, 0), Q);
        prop_assert_eq!(grid.idx4(0, 1, 0, 0), Q * mxp);
    }

    /// The slab a rank sends from its high face and the ghost slab its
    /// neighbor fills on the matching low face name the same global layer.
    #[test]
    fn slab_pairing_is_offset_consistent(grid in arb_grid()) {
        let ghost = grid.ghost();
        for layer in 0..ghost {
            for (face, extent) in [
                (Face::East, grid.interior()[0]),
                (Face::North, grid.interior()[1]),
                (Face::Top, grid.interior()[2]),
            ] {
                // Sender's interior slab, in global units from its origin.
                let send = grid.interior_slab_index(face, layer) - ghost;
                // Receiver sits one subdomain further; its low-face ghost slab
                // in the same global units.
                let recv =
                    extent as i64 + grid.ghost_slab_index(face.opposite(), layer) as i64
                        - ghost as i64;
                prop_assert_eq!(send as i64, recv, "face {:?} layer {}", face, layer);

                // And the mirrored pairing for the low-face send.
                let send_low = grid.interior_slab_index(face.opposite(), layer) as i64 - ghost as i64;
                let recv_high =
                    grid.ghost_slab_index(face, layer) as i64 - ghost as i64 - extent as i64;
                prop_assert_eq!(send_low, recv_high, "face {:?} layer {}", face.opposite(), layer);
            }
        }
    }

    #[test]
    fn interior_predicate_matches_ranges(grid in arb_grid()) {
        let [mxp, myp, mzp] = grid.padded();
        let mut count = 0usize;
        for k in 0..mzp {
            for j in 0..myp {
                for i in 0..mxp {
                    if grid.is_interior(i, j, k) {
                        count += 1;
                    }
                }
            }
        }
        let [mx, my, mz] = grid.interior();
        prop_assert_eq!(count, mx * my * mz);
    }
}

#[test]
fn slab_len_matches_axis_extents() {
    let grid = Grid::new(1, 3, 4, 5).unwrap();
    let [mxp, myp, mzp] = grid.padded();
    assert_eq!(grid.slab_len(Axis::Z), mxp * myp);
    assert_eq!(grid.slab_len(Axis::Y), mxp * mzp);
    assert_eq!(grid.slab_len(Axis::X), myp * mzp);
}
