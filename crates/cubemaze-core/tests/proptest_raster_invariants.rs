//! Property-based invariant tests for the 3D line rasterizer.
//!
//! 1. Length is `max(|dx|, |dy|, |dz|) + 1`.
//! 2. The first point is `p1` and the last is `p2`.
//! 3. Consecutive points differ by at most 1 per axis.
//! 4. The driving axis advances by exactly one unit per step.
//! 5. Rasterization is a pure function of its inputs.

use cubemaze_core::geometry::Point3;
use cubemaze_core::raster::{rasterize, rasterize_into};
use proptest::prelude::*;

fn point() -> impl Strategy<Value = Point3> {
    (-200i32..200, -200i32..200, -200i32..200).prop_map(|(x, y, z)| Point3::new(x, y, z))
}

proptest! {
    #[test]
    fn length_matches_chebyshev_distance(p1 in point(), p2 in point()) {
        let pts = rasterize(p1, p2);
        prop_assert_eq!(pts.len(), p1.chebyshev(p2) as usize + 1);
    }

    #[test]
    fn endpoints_are_inclusive(p1 in point(), p2 in point()) {
        let pts = rasterize(p1, p2);
        prop_assert_eq!(pts.first().copied(), Some(p1));
        prop_assert_eq!(pts.last().copied(), Some(p2));
    }

    #[test]
    fn steps_are_26_connected(p1 in point(), p2 in point()) {
        let pts = rasterize(p1, p2);
        for w in pts.windows(2) {
            prop_assert_eq!(w[0].chebyshev(w[1]), 1);
        }
    }

    #[test]
    fn driving_axis_is_strictly_monotonic(p1 in point(), p2 in point()) {
        let d = p2 - p1;
        let (ax, ay, az) = (d.x.abs(), d.y.abs(), d.z.abs());
        let pts = rasterize(p1, p2);
        let axis: fn(&Point3) -> i32 = if ax >= ay && ax >= az {
            |p| p.x
        } else if ay >= az {
            |p| p.y
        } else {
            |p| p.z
        };
        for w in pts.windows(2) {
            prop_assert_eq!((axis(&w[1]) - axis(&w[0])).abs(), 1);
        }
    }

    #[test]
    fn rasterize_is_deterministic(p1 in point(), p2 in point()) {
        let a = rasterize(p1, p2);
        let mut b = Vec::new();
        rasterize_into(p1, p2, &mut b);
        prop_assert_eq!(a, b);
    }
}
