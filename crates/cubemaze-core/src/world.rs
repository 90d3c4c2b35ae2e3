#![forbid(unsafe_code)]

//! Read-only maze world: rooms on an integer grid with directional exits.
//!
//! The scene engine only ever reads the world through [`RoomGraph`]. The
//! bundled [`GridWorld`] is a hash map from [`GridPos`] to [`Room`] that
//! hosts (and tests) can populate directly.

use ahash::AHashMap;
use bitflags::bitflags;

use crate::geometry::Point3;

/// Integer grid coordinate of a room.
pub type GridPos = Point3;

/// One of the six axis-aligned neighbor directions.
///
/// The four horizontal directions are ordered clockwise so that turning is
/// an index rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// +Y
    North,
    /// +X
    East,
    /// -Y
    South,
    /// -X
    West,
    /// +Z
    Up,
    /// -Z
    Down,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
        Direction::Up,
        Direction::Down,
    ];

    pub const HORIZONTAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Unit grid offset for this direction.
    pub const fn offset(self) -> Point3 {
        match self {
            Direction::North => Point3::new(0, 1, 0),
            Direction::East => Point3::new(1, 0, 0),
            Direction::South => Point3::new(0, -1, 0),
            Direction::West => Point3::new(-1, 0, 0),
            Direction::Up => Point3::new(0, 0, 1),
            Direction::Down => Point3::new(0, 0, -1),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Quarter turn clockwise seen from above. Vertical directions are fixed.
    pub const fn turn_right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
            other => other,
        }
    }

    /// Quarter turn counter-clockwise seen from above.
    pub const fn turn_left(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
            other => other,
        }
    }

    #[inline]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}

/// Per-direction exit weights. Zero means a wall; anything else is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Exits([u8; 6]);

impl Exits {
    pub const CLOSED: Self = Self([0; 6]);
    pub const OPEN: Self = Self([1; 6]);

    /// Build from weights in [`Direction::ALL`] order.
    #[inline]
    pub const fn from_weights(weights: [u8; 6]) -> Self {
        Self(weights)
    }

    #[inline]
    pub fn weight(&self, dir: Direction) -> u8 {
        self.0[dir.index()]
    }

    #[inline]
    pub fn is_open(&self, dir: Direction) -> bool {
        self.weight(dir) != 0
    }

    #[inline]
    pub fn set(&mut self, dir: Direction, weight: u8) {
        self.0[dir.index()] = weight;
    }

    /// Builder form of [`set`](Self::set) with weight 1.
    #[must_use]
    pub fn with_open(mut self, dir: Direction) -> Self {
        self.set(dir, 1);
        self
    }
}

bitflags! {
    /// Presence of the four diagonal neighbors on the same level.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CornerFlags: u8 {
        const NORTH_EAST = 0b0001;
        const NORTH_WEST = 0b0010;
        const SOUTH_EAST = 0b0100;
        const SOUTH_WEST = 0b1000;
    }
}

impl CornerFlags {
    /// The corner between two perpendicular horizontal directions.
    pub fn between(a: Direction, b: Direction) -> Option<Self> {
        use Direction::*;
        match (a, b) {
            (North, East) | (East, North) => Some(Self::NORTH_EAST),
            (North, West) | (West, North) => Some(Self::NORTH_WEST),
            (South, East) | (East, South) => Some(Self::SOUTH_EAST),
            (South, West) | (West, South) => Some(Self::SOUTH_WEST),
            _ => None,
        }
    }

    /// Grid offset of the diagonal neighbor for a single corner flag.
    pub fn offset(self) -> Option<Point3> {
        match self {
            Self::NORTH_EAST => Some(Point3::new(1, 1, 0)),
            Self::NORTH_WEST => Some(Point3::new(-1, 1, 0)),
            Self::SOUTH_EAST => Some(Point3::new(1, -1, 0)),
            Self::SOUTH_WEST => Some(Point3::new(-1, -1, 0)),
            _ => None,
        }
    }
}

/// A single cube-shaped room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    pub pos: GridPos,
    pub exits: Exits,
    /// Diagonal neighbors that exist on the same level.
    pub corners: CornerFlags,
}

impl Room {
    /// A fully walled room with no diagonal neighbors.
    pub const fn closed(pos: GridPos) -> Self {
        Self {
            pos,
            exits: Exits::CLOSED,
            corners: CornerFlags::empty(),
        }
    }

    #[must_use]
    pub fn with_exits(mut self, exits: Exits) -> Self {
        self.exits = exits;
        self
    }

    #[must_use]
    pub fn with_corners(mut self, corners: CornerFlags) -> Self {
        self.corners = corners;
        self
    }

    #[inline]
    pub fn is_open(&self, dir: Direction) -> bool {
        self.exits.is_open(dir)
    }

    #[inline]
    pub fn has_corner(&self, corner: CornerFlags) -> bool {
        self.corners.contains(corner)
    }
}

/// Read-only access to the rooms of a maze.
pub trait RoomGraph {
    /// The room at `pos`, if one exists.
    fn room(&self, pos: GridPos) -> Option<&Room>;

    /// The room adjacent to `pos` in direction `dir`, if one exists.
    fn neighbor(&self, pos: GridPos, dir: Direction) -> Option<&Room> {
        self.room(pos + dir.offset())
    }
}

/// Hash-map backed [`RoomGraph`].
#[derive(Debug, Clone, Default)]
pub struct GridWorld {
    rooms: AHashMap<GridPos, Room>,
}

impl GridWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a room, returning the previous one at that position.
    pub fn insert(&mut self, room: Room) -> Option<Room> {
        self.rooms.insert(room.pos, room)
    }

    pub fn remove(&mut self, pos: GridPos) -> Option<Room> {
        self.rooms.remove(&pos)
    }

    pub fn room_mut(&mut self, pos: GridPos) -> Option<&mut Room> {
        self.rooms.get_mut(&pos)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Open the exits between `pos` and its neighbor in `dir`, on both sides.
    ///
    /// Returns `false` (and changes nothing) unless both rooms exist.
    pub fn open_between(&mut self, pos: GridPos, dir: Direction) -> bool {
        let other = pos + dir.offset();
        if !self.rooms.contains_key(&pos) || !self.rooms.contains_key(&other) {
            return false;
        }
        if let Some(room) = self.rooms.get_mut(&pos) {
            room.exits.set(dir, 1);
        }
        if let Some(room) = self.rooms.get_mut(&other) {
            room.exits.set(dir.opposite(), 1);
        }
        true
    }

    /// Recompute every room's [`CornerFlags`] from diagonal room presence.
    pub fn link_corners(&mut self) {
        let flags = [
            CornerFlags::NORTH_EAST,
            CornerFlags::NORTH_WEST,
            CornerFlags::SOUTH_EAST,
            CornerFlags::SOUTH_WEST,
        ];
        let updates: Vec<(GridPos, CornerFlags)> = self
            .rooms
            .keys()
            .map(|&pos| {
                let mut corners = CornerFlags::empty();
                for flag in flags {
                    if let Some(off) = flag.offset()
                        && self.rooms.contains_key(&(pos + off))
                    {
                        corners |= flag;
                    }
                }
                (pos, corners)
            })
            .collect();
        for (pos, corners) in updates {
            if let Some(room) = self.rooms.get_mut(&pos) {
                room.corners = corners;
            }
        }
    }

    /// A straight corridor of `len` rooms along +X starting at `start`,
    /// with the joining exits opened.
    pub fn corridor(start: GridPos, len: usize) -> Self {
        let mut world = Self::new();
        for i in 0..len {
            world.insert(Room::closed(start + Point3::new(i as i32, 0, 0)));
        }
        for i in 1..len {
            world.open_between(start + Point3::new(i as i32 - 1, 0, 0), Direction::East);
        }
        world
    }
}

impl RoomGraph for GridWorld {
    fn room(&self, pos: GridPos) -> Option<&Room> {
        self.rooms.get(&pos)
    }
}

impl FromIterator<Room> for GridWorld {
    fn from_iter<I: IntoIterator<Item = Room>>(iter: I) -> Self {
        let mut world = Self::new();
        for room in iter {
            world.insert(room);
        }
        world
    }
}
