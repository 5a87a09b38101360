//! Cube-coordinate algebra for hex grids.
//!
//! Cube coordinates place every hex on the plane `q + r + s = 0`, which turns
//! distance, direction and line drawing into plain vector arithmetic. Values
//! are real-valued so that interpolated positions can be represented before
//! they are rounded back onto the grid.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::coords::Facing;

/// A position in cube space. Sums of valid coordinates stay on the
/// `q + r + s = 0` plane; raw inputs are not checked.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CubeCoords {
    pub q: f64,
    pub r: f64,
    pub s: f64,
}

/// Unit vectors per facing, in `Facing` index order.
const DIRECTIONS: [CubeCoords; 6] = [
    CubeCoords::new(0.0, -1.0, 1.0),
    CubeCoords::new(1.0, -1.0, 0.0),
    CubeCoords::new(1.0, 0.0, -1.0),
    CubeCoords::new(0.0, 1.0, -1.0),
    CubeCoords::new(-1.0, 1.0, 0.0),
    CubeCoords::new(-1.0, 0.0, 1.0),
];

impl CubeCoords {
    pub const ZERO: CubeCoords = CubeCoords::new(0.0, 0.0, 0.0);

    pub const fn new(q: f64, r: f64, s: f64) -> Self {
        CubeCoords { q, r, s }
    }

    /// The unit step toward a facing, paired with its compass bearing in degrees.
    pub const fn direction(dir: Facing) -> (CubeCoords, u16) {
        (DIRECTIONS[dir.index()], dir.compass_degrees())
    }

    pub fn neighbor(&self, dir: Facing) -> CubeCoords {
        *self + DIRECTIONS[dir.index()]
    }

    /// True when the axes sum to zero within floating-point tolerance.
    pub fn is_on_plane(&self) -> bool {
        (self.q + self.r + self.s).abs() < 1e-9
    }

    /// Rounds to the nearest hex.
    ///
    /// Each axis is rounded on its own; the axis with the largest rounding
    /// error is then recomputed from the other two so the result sums to zero.
    pub fn round(&self) -> CubeCoords {
        let mut q = self.q.round();
        let mut r = self.r.round();
        let mut s = self.s.round();

        let dq = (q - self.q).abs();
        let dr = (r - self.r).abs();
        let ds = (s - self.s).abs();

        if dq > dr && dq > ds {
            q = -r - s;
        } else if dr > ds {
            r = -q - s;
        } else {
            s = -q - r;
        }
        // normalise -0.0 so rounded cells print cleanly
        CubeCoords::new(q + 0.0, r + 0.0, s + 0.0)
    }

    /// Hex steps between the cells two coordinates round into.
    pub fn distance(&self, other: &CubeCoords) -> i32 {
        let a = self.round();
        let b = other.round();
        let d = a - b;
        d.q.abs().max(d.r.abs()).max(d.s.abs()) as i32
    }

    /// Linear interpolation toward `other`; `t = 0` yields `self`, `t = 1` yields `other`.
    pub fn lerp(&self, other: &CubeCoords, t: f64) -> CubeCoords {
        CubeCoords::new(
            self.q + (other.q - self.q) * t,
            self.r + (other.r - self.r) * t,
            self.s + (other.s - self.s) * t,
        )
    }

    /// Hexes on the straight line to `other`.
    ///
    /// Produces `distance + 1` points. The first and last points are the
    /// endpoints themselves; every point in between is interpolated and
    /// rounded, so consecutive points are adjacent.
    pub fn line_to(&self, other: &CubeCoords) -> Vec<CubeCoords> {
        let n = self.distance(other);
        if n == 0 {
            return vec![*self];
        }
        let mut points = Vec::with_capacity(n as usize + 1);
        points.push(*self);
        for i in 1..n {
            points.push(self.lerp(other, f64::from(i) / f64::from(n)).round());
        }
        points.push(*other);
        points
    }
}

impl Add for CubeCoords {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        CubeCoords::new(self.q + other.q, self.r + other.r, self.s + other.s)
    }
}

impl Sub for CubeCoords {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        CubeCoords::new(self.q - other.q, self.r - other.r, self.s - other.s)
    }
}

impl Neg for CubeCoords {
    type Output = Self;

    fn neg(self) -> Self {
        CubeCoords::new(-self.q, -self.r, -self.s)
    }
}

impl Mul<f64> for CubeCoords {
    type Output = Self;

    fn mul(self, factor: f64) -> Self {
        CubeCoords::new(self.q * factor, self.r * factor, self.s * factor)
    }
}

impl std::fmt::Display for CubeCoords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}, {}]", self.q, self.r, self.s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn cube(q: f64, r: f64) -> CubeCoords {
        CubeCoords::new(q, r, -q - r)
    }

    #[test]
    fn directions_are_unit_steps() {
        for dir in Facing::ALL {
            let (v, angle) = CubeCoords::direction(dir);
            assert!(v.is_on_plane());
            assert_eq!(CubeCoords::ZERO.distance(&v), 1);
            assert_eq!(angle, dir.index() as u16 * 60);
            let back = CubeCoords::direction(dir.opposite()).0;
            assert_eq!(v + back, CubeCoords::ZERO);
        }
    }

    #[test]
    fn arithmetic_preserves_plane() {
        let a = cube(2.0, -1.0);
        let b = cube(-3.0, 5.0);
        assert!((a + b).is_on_plane());
        assert!((a - b).is_on_plane());
        assert!((-a).is_on_plane());
        assert!(a.neighbor(Facing::SouthWest).is_on_plane());
    }

    #[test]
    fn rounding_fixes_largest_error_axis() {
        // Rounding each axis alone gives (0, 0, -1), which is off the plane;
        // q carries the largest error and is rebuilt from r and s.
        let p = CubeCoords::new(0.4, 0.3, -0.7);
        assert_eq!(p.round(), CubeCoords::new(1.0, 0.0, -1.0));
    }

    #[test]
    fn rounding_always_lands_on_plane() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        for _ in 0..2000 {
            let q: f64 = rng.gen_range(-50.0..50.0);
            let r: f64 = rng.gen_range(-50.0..50.0);
            let raw = CubeCoords::new(q, r, rng.gen_range(-50.0..50.0));
            let rounded = raw.round();
            assert_eq!(rounded.q + rounded.r + rounded.s, 0.0, "{raw} -> {rounded}");
            assert_eq!(rounded.q.fract(), 0.0);
            assert_eq!(rounded.r.fract(), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..500 {
            let a = cube(rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0));
            let b = cube(rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0));
            assert_eq!(a.distance(&b), b.distance(&a));
            assert_eq!(a.distance(&b) == 0, a.round() == b.round());
        }
    }

    #[test]
    fn line_endpoints_and_adjacency() {
        let a = cube(0.0, 0.0);
        let b = cube(5.0, -2.0);
        let line = a.line_to(&b);
        assert_eq!(line.len(), a.distance(&b) as usize + 1);
        assert_eq!(line[0], a);
        assert_eq!(*line.last().unwrap(), b);
        for pair in line.windows(2) {
            assert_eq!(pair[0].distance(&pair[1]), 1);
        }
    }

    #[test]
    fn line_to_self_is_single_point() {
        let a = cube(3.0, 1.0);
        assert_eq!(a.line_to(&a), vec![a]);
    }

    #[test]
    fn straight_lines_follow_facing() {
        let origin = cube(2.0, 3.0);
        for dir in Facing::ALL {
            let step = CubeCoords::direction(dir).0;
            let end = origin + step * 4.0;
            let line = origin.line_to(&end);
            assert_eq!(line.len(), 5);
            for (i, p) in line.iter().enumerate() {
                assert_eq!(*p, origin + step * i as f64);
            }
        }
    }
}
