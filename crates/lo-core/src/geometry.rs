//! Geometric value types.
//!
//! Plain copyable structs holding position/velocity/acceleration or
//! orientation and rates. `Point2d` supports the addition and scalar
//! multiplication needed for interpolation.

use core::fmt;
use core::ops::{Add, Mul};
use nalgebra::{UnitQuaternion, Vector2, Vector3};

/// Number of horizontal dimensions (X, Y).
pub const K_DIM2D: usize = 2;

/// Cartesian coordinate axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Coord {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Coord {
    /// Horizontal axes in storage order.
    pub const XY: [Coord; 2] = [Coord::X, Coord::Y];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Linear state in the horizontal plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point2d {
    pub p: Vector2<f64>,
    pub v: Vector2<f64>,
    pub a: Vector2<f64>,
}

impl Point2d {
    pub fn new(p: Vector2<f64>, v: Vector2<f64>, a: Vector2<f64>) -> Self {
        Self { p, v, a }
    }

    /// State at rest at position `p`.
    pub fn at_rest(p: Vector2<f64>) -> Self {
        Self {
            p,
            ..Self::default()
        }
    }
}

impl Add for Point2d {
    type Output = Point2d;

    fn add(self, rhs: Point2d) -> Point2d {
        Point2d {
            p: self.p + rhs.p,
            v: self.v + rhs.v,
            a: self.a + rhs.a,
        }
    }
}

impl Mul<Point2d> for f64 {
    type Output = Point2d;

    fn mul(self, rhs: Point2d) -> Point2d {
        Point2d {
            p: self * rhs.p,
            v: self * rhs.v,
            a: self * rhs.a,
        }
    }
}

/// Linear state in 3D.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point3d {
    pub p: Vector3<f64>,
    pub v: Vector3<f64>,
    pub a: Vector3<f64>,
}

impl Point3d {
    pub fn new(p: Vector3<f64>, v: Vector3<f64>, a: Vector3<f64>) -> Self {
        Self { p, v, a }
    }

    /// Horizontal part of the state.
    pub fn xy(&self) -> Point2d {
        Point2d {
            p: self.p.xy(),
            v: self.v.xy(),
            a: self.a.xy(),
        }
    }
}

/// Orientation with angular velocity and acceleration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ori {
    pub q: UnitQuaternion<f64>,
    pub v: Vector3<f64>,
    pub a: Vector3<f64>,
}

impl Default for Ori {
    fn default() -> Self {
        Self {
            q: UnitQuaternion::identity(),
            v: Vector3::zeros(),
            a: Vector3::zeros(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub pos: Point3d,
    pub ori: Ori,
}

/// Line `p*x + q*y + r = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineCoeff2d {
    pub p: f64,
    pub q: f64,
    pub r: f64,
}

impl LineCoeff2d {
    /// Normalized line through `from` and `to`; points left of the
    /// direction `from -> to` have positive distance.
    ///
    /// Returns `None` if both points coincide.
    pub fn through(from: Vector2<f64>, to: Vector2<f64>) -> Option<Self> {
        let d = to - from;
        let norm = d.norm();
        if norm == 0.0 {
            return None;
        }
        let p = -d.y / norm;
        let q = d.x / norm;
        let r = -(p * from.x + q * from.y);
        Some(Self { p, q, r })
    }

    pub fn signed_distance(&self, pt: Vector2<f64>) -> f64 {
        self.p * pt.x + self.q * pt.y + self.r
    }
}

/// Powers `[1, t, t^2, ..., t^(N-1)]`.
pub fn cache_exponents<const N: usize>(t: f64) -> [f64; N] {
    let mut exp = [1.0; N];
    for e in 1..N {
        exp[e] = exp[e - 1] * t;
    }
    exp
}

impl fmt::Display for LineCoeff2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p={}, q={}, r={}", self.p, self.q, self.r)
    }
}

impl fmt::Display for Point2d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "p=[{:.4}, {:.4}]  v=[{:.4}, {:.4}]  a=[{:.4}, {:.4}]",
            self.p.x, self.p.y, self.v.x, self.v.y, self.a.x, self.a.y
        )
    }
}

impl fmt::Display for Point3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "p=[{:.4}, {:.4}, {:.4}]  v=[{:.4}, {:.4}, {:.4}]  a=[{:.4}, {:.4}, {:.4}]",
            self.p.x, self.p.y, self.p.z, self.v.x, self.v.y, self.v.z, self.a.x, self.a.y, self.a.z
        )
    }
}

impl fmt::Display for Ori {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // adding zero turns -0.0 into 0.0
        let (roll, pitch, yaw) = self.q.euler_angles();
        let (roll, pitch, yaw) = (roll + 0.0, pitch + 0.0, yaw + 0.0);
        let v = self.v.map(|x| x + 0.0);
        let a = self.a.map(|x| x + 0.0);
        write!(
            f,
            "rpy=[{roll:.4}, {pitch:.4}, {yaw:.4}]  v=[{:.4}, {:.4}, {:.4}]  a=[{:.4}, {:.4}, {:.4}]",
            v.x, v.y, v.z, a.x, a.y, a.z
        )
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\tPos: {}\n\tOri: {}", self.pos, self.ori)
    }
}
