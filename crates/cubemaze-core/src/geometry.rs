#![forbid(unsafe_code)]

//! Integer points, float vectors, and 4x4 homogeneous transforms.
//!
//! Transforms use the row-vector convention: a point `p` is transformed as
//! `[x y z 1] * M`. Composition therefore reads left to right:
//! `a.then(&b)` applies `a` first and `b` second.

use std::ops::{Add, Mul, Sub};

/// A point on the integer lattice.
///
/// Used both for rasterized pixels (x, y with z carried along) and for
/// room-local landmark offsets. `+` and `-` saturate at the `i32` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point3 {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Largest per-axis distance to `other` (Chebyshev distance).
    ///
    /// Computed in `i64`, so it is exact for any pair of points.
    #[inline]
    pub fn chebyshev(self, other: Self) -> i64 {
        let d = |a: i32, b: i32| (i64::from(a) - i64::from(b)).abs();
        d(self.x, other.x)
            .max(d(self.y, other.y))
            .max(d(self.z, other.z))
    }

    /// Scale a grid position by `edge_len` into world units, saturating at
    /// the `i32` bounds.
    pub fn scaled(self, edge_len: i32) -> Self {
        let s = |v: i32| saturate(i64::from(v) * i64::from(edge_len));
        Self::new(s(self.x), s(self.y), s(self.z))
    }

    /// Convert to a float vector.
    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f64, self.y as f64, self.z as f64)
    }
}

impl Add for Point3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.x.saturating_add(rhs.x),
            self.y.saturating_add(rhs.y),
            self.z.saturating_add(rhs.z),
        )
    }
}

impl Sub for Point3 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.x.saturating_sub(rhs.x),
            self.y.saturating_sub(rhs.y),
            self.z.saturating_sub(rhs.z),
        )
    }
}

/// Clamp an `i64` into `i32` range.
#[inline]
pub fn saturate(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// A float 3-vector, the input and output of [`Matrix4::transform`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Round each component to the nearest integer, saturating at the `i32`
    /// bounds. NaN maps to 0.
    #[inline]
    pub fn round(self) -> Point3 {
        Point3::new(
            self.x.round() as i32,
            self.y.round() as i32,
            self.z.round() as i32,
        )
    }
}

/// A 4x4 homogeneous transform, stored row-major.
///
/// Equality is exact element-wise comparison, which is what the scene cache
/// uses to decide whether a transform changed between passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    pub m: [[f64; 4]; 4],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Create from row-major rows.
    #[inline]
    pub const fn from_rows(m: [[f64; 4]; 4]) -> Self {
        Self { m }
    }

    /// Non-uniform scale.
    pub const fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self::from_rows([
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, sz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Uniform scale.
    pub const fn uniform_scale(s: f64) -> Self {
        Self::scale(s, s, s)
    }

    /// Translation. The offset lives in the bottom row.
    pub const fn translation(tx: f64, ty: f64, tz: f64) -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [tx, ty, tz, 1.0],
        ])
    }

    /// Rotation about the X axis by `radians`.
    pub fn rotation_x(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, s, 0.0],
            [0.0, -s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation about the Y axis by `radians`.
    pub fn rotation_y(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self::from_rows([
            [c, 0.0, -s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation about the Z axis by `radians`.
    pub fn rotation_z(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self::from_rows([
            [c, s, 0.0, 0.0],
            [-s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Matrix product `self * rhs`.
    pub fn multiply(&self, rhs: &Self) -> Self {
        let mut out = [[0.0; 4]; 4];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }
        Self { m: out }
    }

    /// Apply `self`, then `next`.
    #[inline]
    #[must_use]
    pub fn then(&self, next: &Self) -> Self {
        self.multiply(next)
    }

    /// Transform a point as the row vector `[x y z 1]`.
    ///
    /// If the resulting `w` is neither 0 nor 1 the result is divided by it.
    pub fn transform(&self, p: Vec3) -> Vec3 {
        let row = [p.x, p.y, p.z, 1.0];
        let mut out = [0.0; 4];
        for (j, cell) in out.iter_mut().enumerate() {
            *cell = (0..4).map(|k| row[k] * self.m[k][j]).sum();
        }
        let w = out[3];
        if w != 0.0 && w != 1.0 {
            Vec3::new(out[0] / w, out[1] / w, out[2] / w)
        } else {
            Vec3::new(out[0], out[1], out[2])
        }
    }

    /// Transform an integer point and round back onto the lattice.
    #[inline]
    pub fn transform_point(&self, p: Point3) -> Point3 {
        self.transform(p.to_vec3()).round()
    }
}

impl Mul for Matrix4 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.multiply(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn identity_leaves_points_alone() {
        let p = Point3::new(3, -7, 11);
        assert_eq!(Matrix4::IDENTITY.transform_point(p), p);
    }

    #[test]
    fn translation_then_scale_order() {
        let m = Matrix4::translation(1.0, 2.0, 3.0).then(&Matrix4::uniform_scale(2.0));
        assert_eq!(
            m.transform_point(Point3::new(0, 0, 0)),
            Point3::new(2, 4, 6)
        );

        let m = Matrix4::uniform_scale(2.0).then(&Matrix4::translation(1.0, 2.0, 3.0));
        assert_eq!(
            m.transform_point(Point3::new(0, 0, 0)),
            Point3::new(1, 2, 3)
        );
    }

    #[test]
    fn rotation_z_quarter_turn() {
        let m = Matrix4::rotation_z(FRAC_PI_2);
        assert_eq!(
            m.transform_point(Point3::new(10, 0, 0)),
            Point3::new(0, 10, 0)
        );
    }

    #[test]
    fn rotation_x_quarter_turn() {
        let m = Matrix4::rotation_x(FRAC_PI_2);
        assert_eq!(
            m.transform_point(Point3::new(0, 10, 0)),
            Point3::new(0, 0, 10)
        );
    }

    #[test]
    fn rotation_y_quarter_turn() {
        let m = Matrix4::rotation_y(FRAC_PI_2);
        assert_eq!(
            m.transform_point(Point3::new(0, 0, 10)),
            Point3::new(10, 0, 0)
        );
    }

    #[test]
    fn mul_operator_matches_then() {
        let a = Matrix4::rotation_z(0.3);
        let b = Matrix4::translation(5.0, 0.0, 0.0);
        assert_eq!(a * b, a.then(&b));
    }

    #[test]
    fn homogeneous_divide() {
        let mut m = Matrix4::IDENTITY;
        m.m[3][3] = 2.0;
        let v = m.transform(Vec3::new(4.0, 6.0, 8.0));
        assert_eq!(v, Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn chebyshev_distance() {
        let a = Point3::new(0, 0, 0);
        assert_eq!(a.chebyshev(Point3::new(3, -5, 1)), 5);
        let far = Point3::new(i32::MIN, 0, 0).chebyshev(Point3::new(i32::MAX, 0, 0));
        assert_eq!(far, u32::MAX as i64);
    }

    #[test]
    fn lattice_arithmetic_saturates() {
        let edge = Point3::new(i32::MAX, i32::MIN, 0);
        assert_eq!(edge + Point3::new(1, -1, 1), Point3::new(i32::MAX, i32::MIN, 1));
        assert_eq!(edge - Point3::new(-1, 1, 0), edge);
    }

    #[test]
    fn scaled_grid_positions_clamp() {
        let p = Point3::new(30_000_000, -2, -30_000_000);
        assert_eq!(p.scaled(100), Point3::new(i32::MAX, -200, i32::MIN));
    }

    #[test]
    fn rounding_saturates() {
        let p = Vec3::new(1e300, -1e300, f64::NAN).round();
        assert_eq!(p, Point3::new(i32::MAX, i32::MIN, 0));
    }
}
