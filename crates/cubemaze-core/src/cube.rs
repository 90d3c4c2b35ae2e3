#![forbid(unsafe_code)]

//! Room geometry: the fixed 38-point landmark table and wireframe projector.
//!
//! Every room is drawn from the same table of landmark offsets, laid out on
//! the room's floor plane with edge length `L` and inset gap `g = L / 10`.
//! The ceiling copy is the floor copy raised by `L - 2g`, which leaves a
//! visible slab between stacked levels.
//!
//! ```text
//!  15 ---- 9 ------35------ 8 ---- 14        N (+y)
//!   |      |                |      |
//!  10 ---- 3 ------34------ 2 ---- 7
//!   |      |   19 ----- 18  |      |
//!  37 ----36   |  20..23 |  32 ----33     W       E
//!   |      |   16 ----- 17  |      |
//!  11 ---- 0 ------30------ 1 ---- 6
//!   |      |                |      |
//!  12 ---- 4 ------31------ 5 ---- 13        S (-y)
//! ```
//!
//! - `0..4`: inner corners (SW, SE, NE, NW), where walls and pillars stand.
//! - `4..12`: jamb points, each inner corner projected onto the room
//!   boundary along an open side.
//! - `12..16`: outer corners, used by corner braces.
//! - `16..20`: the floor/ceiling opening square for vertical exits.
//! - `20..24`: the innermost center square (current-room highlight).
//! - `24..30`: up and down arrows, drawn on both planes of a room with the
//!   matching vertical exit. The hole is drawn only on the plane it pierces.
//! - `30..38`: side midpoints (inner, outer) for doorway thresholds.
//!
//! The table is reproduced exactly; the index semantics are fixed.

use smallvec::SmallVec;

use crate::geometry::{Matrix4, Point3, saturate};
use crate::raster::{ClipRect, rasterize_clipped_into, rasterize_into};
use crate::world::{CornerFlags, Direction, GridPos, Room};

/// Number of landmarks per plane.
pub const LANDMARK_COUNT: usize = 38;

/// Default room edge length in world units.
pub const DEFAULT_EDGE_LEN: i32 = 100;

const INNER_SW: usize = 0;
const INNER_SE: usize = 1;
const INNER_NE: usize = 2;
const INNER_NW: usize = 3;
const OUTER_SW: usize = 12;
const OUTER_SE: usize = 13;
const OUTER_NE: usize = 14;
const OUTER_NW: usize = 15;
const HOLE: [usize; 4] = [16, 17, 18, 19];
const CENTER: [usize; 4] = [20, 21, 22, 23];
const UP_ARROW: [usize; 3] = [24, 25, 26];
const DOWN_ARROW: [usize; 3] = [27, 28, 29];

/// Landmark indices for one horizontal side.
struct Side {
    dir: Direction,
    /// Inner corners at each end of the side.
    corners: [usize; 2],
    /// Jamb points on the boundary, matching `corners`.
    jambs: [usize; 2],
    /// Threshold from the inner wall line to the boundary.
    threshold: [usize; 2],
}

const SIDES: [Side; 4] = [
    Side {
        dir: Direction::South,
        corners: [INNER_SW, INNER_SE],
        jambs: [4, 5],
        threshold: [30, 31],
    },
    Side {
        dir: Direction::East,
        corners: [INNER_SE, INNER_NE],
        jambs: [6, 7],
        threshold: [32, 33],
    },
    Side {
        dir: Direction::North,
        corners: [INNER_NE, INNER_NW],
        jambs: [8, 9],
        threshold: [34, 35],
    },
    Side {
        dir: Direction::West,
        corners: [INNER_NW, INNER_SW],
        jambs: [10, 11],
        threshold: [36, 37],
    },
];

/// Landmark indices for one corner of the room.
struct Corner {
    flag: CornerFlags,
    inner: usize,
    outer: usize,
    sides: [Direction; 2],
}

const CORNERS: [Corner; 4] = [
    Corner {
        flag: CornerFlags::SOUTH_WEST,
        inner: INNER_SW,
        outer: OUTER_SW,
        sides: [Direction::South, Direction::West],
    },
    Corner {
        flag: CornerFlags::SOUTH_EAST,
        inner: INNER_SE,
        outer: OUTER_SE,
        sides: [Direction::South, Direction::East],
    },
    Corner {
        flag: CornerFlags::NORTH_EAST,
        inner: INNER_NE,
        outer: OUTER_NE,
        sides: [Direction::North, Direction::East],
    },
    Corner {
        flag: CornerFlags::NORTH_WEST,
        inner: INNER_NW,
        outer: OUTER_NW,
        sides: [Direction::North, Direction::West],
    },
];

/// Room-local landmark offsets on the floor plane for edge length `len`.
pub fn landmark_offsets(len: i32) -> [Point3; LANDMARK_COUNT] {
    let l = len;
    let g = len / 10;
    let q = g / 2;
    let c = len / 2;
    let p = |x: i32, y: i32| Point3::new(x, y, 0);
    [
        // inner corners
        p(g, g),
        p(l - g, g),
        p(l - g, l - g),
        p(g, l - g),
        // jambs: S(w, e), E(s, n), N(e, w), W(n, s)
        p(g, 0),
        p(l - g, 0),
        p(l, g),
        p(l, l - g),
        p(l - g, l),
        p(g, l),
        p(0, l - g),
        p(0, g),
        // outer corners
        p(0, 0),
        p(l, 0),
        p(l, l),
        p(0, l),
        // vertical opening
        p(c - 3 * g, c - 3 * g),
        p(c + 3 * g, c - 3 * g),
        p(c + 3 * g, c + 3 * g),
        p(c - 3 * g, c + 3 * g),
        // center square
        p(c - g, c - g),
        p(c + g, c - g),
        p(c + g, c + g),
        p(c - g, c + g),
        // up arrow: tip, left, right
        p(c, c + 2 * g),
        p(c - g, c + g + q),
        p(c + g, c + g + q),
        // down arrow: tip, left, right
        p(c, c - 2 * g),
        p(c - g, c - g - q),
        p(c + g, c - g - q),
        // thresholds: S, E, N, W as (inner, outer)
        p(c, g),
        p(c, 0),
        p(l - g, c),
        p(l, c),
        p(c, l - g),
        p(c, l),
        p(g, c),
        p(0, c),
    ]
}

/// Which copy of the landmark table an edge spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Floor,
    Ceiling,
    /// Vertical edge from the floor copy of `a` to the ceiling copy of `b`.
    Pillar,
}

/// A wireframe edge between two landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub plane: Plane,
}

impl Edge {
    const fn floor(a: usize, b: usize) -> Self {
        Self {
            a,
            b,
            plane: Plane::Floor,
        }
    }

    const fn ceiling(a: usize, b: usize) -> Self {
        Self {
            a,
            b,
            plane: Plane::Ceiling,
        }
    }

    const fn pillar(at: usize) -> Self {
        Self {
            a: at,
            b: at,
            plane: Plane::Pillar,
        }
    }
}

pub type EdgeList = SmallVec<[Edge; 64]>;

/// Wireframe edges for a room, derived only from its exit and corner flags.
pub fn room_edges(room: &Room) -> EdgeList {
    let mut edges = EdgeList::new();
    let mut pillars = CornerFlags::empty();
    let mut pillar = |edges: &mut EdgeList, inner: usize| {
        let Some(corner) = CORNERS.iter().find(|c| c.inner == inner) else {
            return;
        };
        if !pillars.contains(corner.flag) {
            pillars |= corner.flag;
            edges.push(Edge::pillar(inner));
        }
    };

    for side in &SIDES {
        let [a, b] = side.corners;
        if !room.is_open(side.dir) {
            edges.push(Edge::floor(a, b));
            edges.push(Edge::ceiling(a, b));
            pillar(&mut edges, a);
            pillar(&mut edges, b);
            continue;
        }

        let [t0, t1] = side.threshold;
        edges.push(Edge::floor(t0, t1));

        for (inner, jamb) in side.corners.into_iter().zip(side.jambs) {
            let Some(corner) = CORNERS.iter().find(|c| c.inner == inner) else {
                continue;
            };
            let other = if corner.sides[0] == side.dir {
                corner.sides[1]
            } else {
                corner.sides[0]
            };
            // An open plaza corner: both sides open onto an existing diagonal room.
            if room.is_open(other) && room.has_corner(corner.flag) {
                continue;
            }
            edges.push(Edge::floor(inner, jamb));
            edges.push(Edge::ceiling(inner, jamb));
        }
    }

    for corner in &CORNERS {
        let [s1, s2] = corner.sides;
        if room.is_open(s1) && room.is_open(s2) && !room.has_corner(corner.flag) {
            edges.push(Edge::floor(corner.inner, corner.outer));
            edges.push(Edge::ceiling(corner.inner, corner.outer));
            pillar(&mut edges, corner.inner);
        }
    }

    if room.is_open(Direction::Up) {
        push_loop(&mut edges, &HOLE, Plane::Ceiling);
        push_loop(&mut edges, &UP_ARROW, Plane::Floor);
        push_loop(&mut edges, &UP_ARROW, Plane::Ceiling);
    }
    if room.is_open(Direction::Down) {
        push_loop(&mut edges, &HOLE, Plane::Floor);
        push_loop(&mut edges, &DOWN_ARROW, Plane::Floor);
        push_loop(&mut edges, &DOWN_ARROW, Plane::Ceiling);
    }

    edges
}

fn push_loop(edges: &mut EdgeList, indices: &[usize], plane: Plane) {
    for (i, &a) in indices.iter().enumerate() {
        let b = indices[(i + 1) % indices.len()];
        edges.push(Edge { a, b, plane });
    }
}

/// World-space wireframe of one room.
///
/// Landmarks are recomputed together by [`set`](Self::set); there is no way
/// to update only part of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomGeometry {
    room: Room,
    edge_len: i32,
    floor: [Point3; LANDMARK_COUNT],
    ceiling: [Point3; LANDMARK_COUNT],
}

impl RoomGeometry {
    pub fn new(room: Room, edge_len: i32) -> Self {
        let mut geometry = Self {
            room,
            edge_len,
            floor: [Point3::default(); LANDMARK_COUNT],
            ceiling: [Point3::default(); LANDMARK_COUNT],
        };
        geometry.set(room, edge_len);
        geometry
    }

    /// Recompute both landmark planes for `room` at `edge_len`.
    ///
    /// Coordinates past the `i32` range saturate.
    pub fn set(&mut self, room: Room, edge_len: i32) {
        let origin = room.pos.scaled(edge_len);
        let lift = Point3::new(0, 0, ceiling_height(edge_len));
        let offsets = landmark_offsets(edge_len);
        let mut floor = [Point3::default(); LANDMARK_COUNT];
        let mut ceiling = [Point3::default(); LANDMARK_COUNT];
        for (i, off) in offsets.iter().enumerate() {
            floor[i] = origin + *off;
            ceiling[i] = floor[i] + lift;
        }
        self.room = room;
        self.edge_len = edge_len;
        self.floor = floor;
        self.ceiling = ceiling;
    }

    #[inline]
    pub fn room(&self) -> &Room {
        &self.room
    }

    #[inline]
    pub fn edge_len(&self) -> i32 {
        self.edge_len
    }

    #[inline]
    pub fn floor(&self) -> &[Point3; LANDMARK_COUNT] {
        &self.floor
    }

    #[inline]
    pub fn ceiling(&self) -> &[Point3; LANDMARK_COUNT] {
        &self.ceiling
    }

    /// Center of the room's volume in world units.
    #[inline]
    pub fn center(&self) -> Point3 {
        room_center(self.room.pos, self.edge_len)
    }

    fn endpoints(&self, edge: Edge) -> (Point3, Point3) {
        match edge.plane {
            Plane::Floor => (self.floor[edge.a], self.floor[edge.b]),
            Plane::Ceiling => (self.ceiling[edge.a], self.ceiling[edge.b]),
            Plane::Pillar => (self.floor[edge.a], self.ceiling[edge.b]),
        }
    }

    fn project_edges(
        &self,
        edges: &[Edge],
        transform: &Matrix4,
        clip: Option<ClipRect>,
        out: &mut Vec<Point3>,
    ) {
        for &edge in edges {
            let (a, b) = self.endpoints(edge);
            match clip {
                Some(rect) => rasterize_clipped_into(
                    transform.transform(a.to_vec3()),
                    transform.transform(b.to_vec3()),
                    rect,
                    out,
                ),
                None => rasterize_into(
                    transform.transform_point(a),
                    transform.transform_point(b),
                    out,
                ),
            }
        }
    }

    /// Append the rasterized wireframe of this room under `transform`.
    ///
    /// Every segment is enumerated in full, so the output grows with the
    /// projected size. Use [`project_clipped`](Self::project_clipped) when
    /// the transform is not known to keep the room small.
    pub fn project(&self, transform: &Matrix4, out: &mut Vec<Point3>) {
        let edges = room_edges(&self.room);
        self.project_edges(&edges, transform, None, out);
    }

    /// Like [`project`](Self::project), but only the part of each segment
    /// inside `clip` is enumerated, flattened to `z = 0`.
    pub fn project_clipped(&self, transform: &Matrix4, clip: ClipRect, out: &mut Vec<Point3>) {
        let edges = room_edges(&self.room);
        self.project_edges(&edges, transform, Some(clip), out);
    }

    /// Append the rasterized innermost floor square under `transform`.
    pub fn project_center_outline(&self, transform: &Matrix4, out: &mut Vec<Point3>) {
        self.project_edges(&center_loop(), transform, None, out);
    }

    /// Clipped variant of [`project_center_outline`](Self::project_center_outline).
    pub fn project_center_outline_clipped(
        &self,
        transform: &Matrix4,
        clip: ClipRect,
        out: &mut Vec<Point3>,
    ) {
        self.project_edges(&center_loop(), transform, Some(clip), out);
    }
}

fn center_loop() -> EdgeList {
    let mut edges = EdgeList::new();
    push_loop(&mut edges, &CENTER, Plane::Floor);
    edges
}

/// Center of the volume of the room at grid position `pos`.
///
/// Saturates at the `i32` range.
pub fn room_center(pos: GridPos, edge_len: i32) -> Point3 {
    let l = i64::from(edge_len);
    let half = l / 2;
    let rise = i64::from(ceiling_height(edge_len)) / 2;
    Point3::new(
        saturate(i64::from(pos.x) * l + half),
        saturate(i64::from(pos.y) * l + half),
        saturate(i64::from(pos.z) * l + rise),
    )
}

/// Height of the ceiling plane above the floor plane.
#[inline]
pub const fn ceiling_height(edge_len: i32) -> i32 {
    edge_len - 2 * (edge_len / 10)
}
