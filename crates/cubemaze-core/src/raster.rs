#![forbid(unsafe_code)]

//! Integer 3D line rasterization.
//!
//! [`rasterize`] enumerates the lattice points of a segment with the 3D
//! variant of Bresenham's algorithm: the axis with the largest delta drives
//! the loop and the two minor axes each keep a doubled-delta error term.
//!
//! # Invariants
//!
//! 1. The output has exactly `max(|dx|, |dy|, |dz|) + 1` points.
//! 2. It starts at `p1` and ends at `p2`.
//! 3. Consecutive points differ by at most 1 on every axis, and by exactly 1
//!    on the driving axis.
//!
//! [`rasterize_clipped_into`] trims a projected segment to a [`ClipRect`]
//! first, so its output never exceeds the rectangle's larger side plus one.

use crate::geometry::{Point3, Vec3, saturate};

/// Upper bound on the capacity reserved up front for one segment.
const RESERVE_LIMIT: usize = 1 << 16;

/// Rasterize the segment `p1..=p2` into a new vector.
pub fn rasterize(p1: Point3, p2: Point3) -> Vec<Point3> {
    let mut out = Vec::new();
    rasterize_into(p1, p2, &mut out);
    out
}

/// Rasterize the segment `p1..=p2`, appending to `out` without clearing it.
///
/// Deltas and error terms are `i64`, so any pair of `i32` points is valid
/// input. The output length is the Chebyshev distance plus one; callers that
/// cannot bound it should clip first (see [`rasterize_clipped_into`]).
pub fn rasterize_into(p1: Point3, p2: Point3, out: &mut Vec<Point3>) {
    let a = [p1.x, p1.y, p1.z].map(i64::from);
    let b = [p2.x, p2.y, p2.z].map(i64::from);
    let d = [0, 1, 2].map(|i| (b[i] - a[i]).abs());
    let s = [0, 1, 2].map(|i| (b[i] - a[i]).signum());

    let drive = if d[0] >= d[1] && d[0] >= d[2] {
        0
    } else if d[1] >= d[2] {
        1
    } else {
        2
    };
    let minor = match drive {
        0 => [1, 2],
        1 => [0, 2],
        _ => [1, 0],
    };

    let steps = usize::try_from(d[drive]).unwrap_or(usize::MAX);
    out.reserve(steps.saturating_add(1).min(RESERVE_LIMIT));
    out.push(p1);

    let mut p = a;
    let mut err = minor.map(|m| 2 * d[m] - d[drive]);
    while p[drive] != b[drive] {
        p[drive] += s[drive];
        for (e, &m) in err.iter_mut().zip(&minor) {
            if *e >= 0 {
                p[m] += s[m];
                *e -= 2 * d[drive];
            }
            *e += 2 * d[m];
        }
        out.push(Point3::new(saturate(p[0]), saturate(p[1]), saturate(p[2])));
    }
}

/// Pixel rectangle `0..width` x `0..height` that screen-space segments are
/// clipped against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipRect {
    pub width: u32,
    pub height: u32,
}

impl ClipRect {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Clip the x/y extent of `a..b` to `rect` (Liang-Barsky).
///
/// `z` is interpolated along with the clipped ends. Returns `None` when no
/// part of the segment lies inside, or when any coordinate is not finite.
/// Segments entirely inside come back unchanged.
pub fn clip_segment(a: Vec3, b: Vec3, rect: ClipRect) -> Option<(Vec3, Vec3)> {
    if rect.is_empty() {
        return None;
    }
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dz = b.z - a.z;
    if ![a.x, a.y, b.x, b.y, dx, dy].iter().all(|v| v.is_finite()) {
        return None;
    }
    let x_max = f64::from(rect.width) - 1.0;
    let y_max = f64::from(rect.height) - 1.0;

    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [(-dx, a.x), (dx, x_max - a.x), (-dy, a.y), (dy, y_max - a.y)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| Vec3::new(a.x + t * dx, a.y + t * dy, a.z + t * dz);
    let start = if t0 > 0.0 { at(t0) } else { a };
    let end = if t1 < 1.0 { at(t1) } else { b };
    Some((start, end))
}

/// Clip `a..b` to `rect`, then rasterize what is left in screen space.
///
/// Output points carry `z = 0`; depth is not needed once a segment is on
/// the canvas, and dropping it keeps the work bounded by the rectangle.
pub fn rasterize_clipped_into(a: Vec3, b: Vec3, rect: ClipRect, out: &mut Vec<Point3>) {
    let Some((start, end)) = clip_segment(a, b, rect) else {
        return;
    };
    let flat = |v: Vec3| Vec3::new(v.x, v.y, 0.0).round();
    rasterize_into(flat(start), flat(end), out);
}
