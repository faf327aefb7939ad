// crates/lb3d-core/src/lattice.rs

//! D3Q19 velocity set: discrete velocities, quadrature weights, and the
//! antipode map.
//!
//! Ordering is rest velocity first, then the six axis velocities, then the
//! twelve edge velocities, with each `+c` immediately followed by `-c` so
//! the antipode of direction `a ≥ 1` is its odd/even partner.

/// Number of discrete velocities.
pub const Q: usize = 19;

/// Lattice speed of sound squared, `c_s² = 1/3`.
pub const CS2: f64 = 1.0 / 3.0;

/// Discrete velocities `c_a`, components in {-1, 0, +1}.
pub const C: [[i8; 3]; Q] = [
    [0, 0, 0],
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
    [1, 1, 0],
    [-1, -1, 0],
    [1, 0, 1],
    [-1, 0, -1],
    [0, 1, 1],
    [0, -1, -1],
    [1, -1, 0],
    [-1, 1, 0],
    [1, 0, -1],
    [-1, 0, 1],
    [0, 1, -1],
    [0, -1, 1],
];

/// Quadrature weights `w_a`; 1/3 rest, 1/18 axis, 1/36 edge.
pub const W: [f64; Q] = [
    1.0 / 3.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 18.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
    1.0 / 36.0,
];

const OPPOSITE: [usize; Q] = [
    0, 2, 1, 4, 3, 6, 5, 8, 7, 10, 9, 12, 11, 14, 13, 16, 15, 18, 17,
];

/// Antipode `opp(a)`: the direction with `c_opp = -c_a`.
#[inline]
#[must_use]
pub const fn opposite(a: usize) -> usize {
    OPPOSITE[a]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_involutive_and_antipodal() {
        for a in 0..Q {
            let o = opposite(a);
            assert_eq!(opposite(o), a, "opp must be an involution (a={a})");
            for d in 0..3 {
                assert_eq!(C[o][d], -C[a][d], "c_opp(a) must equal -c_a (a={a})");
            }
        }
    }

    #[test]
    fn weights_are_a_partition_of_unity() {
        let sum: f64 = W.iter().sum();
        assert!((sum - 1.0).abs() < 1e-15, "Σ w_a = 1, got {sum}");
    }

    /// First moment vanishes and the second moment is isotropic with
    /// variance c_s² (the identities the equilibrium expansion relies on).
    #[test]
    fn velocity_moments() {
        for d in 0..3 {
            let m1: f64 = (0..Q).map(|a| W[a] * f64::from(C[a][d])).sum();
            assert!(m1.abs() < 1e-15, "Σ w_a c_a = 0, axis {d} got {m1}");
        }
        for dx in 0..3 {
            for dy in 0..3 {
                let m2: f64 = (0..Q)
                    .map(|a| W[a] * f64::from(C[a][dx]) * f64::from(C[a][dy]))
                    .sum();
                let expect = if dx == dy { CS2 } else { 0.0 };
                assert!(
                    (m2 - expect).abs() < 1e-15,
                    "Σ w_a c_ax c_ay mismatch at ({dx},{dy}): {m2}"
                );
            }
        }
    }
}
