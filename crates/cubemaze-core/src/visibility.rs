#![forbid(unsafe_code)]

//! Bounded breadth-first visibility traversal.
//!
//! [`Visibility`] owns an arena of [`RoomGeometry`] values addressed by
//! [`RoomId`], plus a side map from grid position to id. A traversal
//! rebuilds the arena wholesale and partitions the visited rooms by level
//! relative to the origin:
//!
//! - `z == origin.z` goes to the same-level bucket;
//! - `z == origin.z + d` (d > 0) goes to upper bucket `d - 1`;
//! - `z == origin.z - d` (d > 0) goes to lower bucket `d - 1`.
//!
//! # Invariants
//!
//! 1. The origin is always visible, even if the world has no room there.
//! 2. At most `max_depth - 1` expansion rounds run, so no room is farther
//!    than `max_depth - 1` steps from the origin.
//! 3. A traversal is skipped when origin and depth match the previous one.

use ahash::{AHashMap, AHashSet};

use crate::cube::RoomGeometry;
use crate::world::{Direction, GridPos, Room, RoomGraph};

/// Dense index into the [`Visibility`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(u32);

impl RoomId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Rooms visible from an origin, bucketed by level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleSet {
    pub same_level: Vec<RoomId>,
    /// `upper[i]` holds the rooms `i + 1` levels above the origin.
    pub upper: Vec<Vec<RoomId>>,
    /// `lower[i]` holds the rooms `i + 1` levels below the origin.
    pub lower: Vec<Vec<RoomId>>,
}

impl VisibleSet {
    fn reset(&mut self, max_depth: usize) {
        self.same_level.clear();
        self.upper.clear();
        self.lower.clear();
        self.upper.resize_with(max_depth, Vec::new);
        self.lower.resize_with(max_depth, Vec::new);
    }

    /// Total number of rooms across all buckets.
    pub fn len(&self) -> usize {
        self.same_level.len()
            + self.upper.iter().map(Vec::len).sum::<usize>()
            + self.lower.iter().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every visible room id, same level first, then upper, then lower.
    pub fn iter(&self) -> impl Iterator<Item = RoomId> + '_ {
        self.same_level
            .iter()
            .chain(self.upper.iter().flatten())
            .chain(self.lower.iter().flatten())
            .copied()
    }
}

/// Grid positions reachable from `origin` within `max_depth - 1` rounds.
///
/// `origin` is always the first element. A `max_depth` of 0 is treated as 1.
pub fn traverse<G: RoomGraph + ?Sized>(world: &G, origin: GridPos, max_depth: usize) -> Vec<GridPos> {
    let rounds = max_depth.max(1) - 1;
    let mut visited = vec![origin];
    let mut seen: AHashSet<GridPos> = AHashSet::default();
    seen.insert(origin);

    let mut frontier = 0..1;
    for _ in 0..rounds {
        let start = visited.len();
        for i in frontier.clone() {
            let pos = visited[i];
            for dir in Direction::ALL {
                let next = pos + dir.offset();
                if world.room(next).is_some() && seen.insert(next) {
                    visited.push(next);
                }
            }
        }
        if visited.len() == start {
            break;
        }
        frontier = start..visited.len();
    }
    visited
}

/// Arena-backed, memoized visibility state.
#[derive(Debug, Clone)]
pub struct Visibility {
    edge_len: i32,
    arena: Vec<RoomGeometry>,
    index: AHashMap<GridPos, RoomId>,
    set: VisibleSet,
    last: Option<(GridPos, usize)>,
    runs: u64,
}

impl Visibility {
    pub fn new(edge_len: i32) -> Self {
        Self {
            edge_len,
            arena: Vec::new(),
            index: AHashMap::default(),
            set: VisibleSet::default(),
            last: None,
            runs: 0,
        }
    }

    /// Re-run the traversal unless `origin` and `max_depth` match the last run.
    ///
    /// Returns `true` when the arena and buckets were rebuilt.
    pub fn update<G: RoomGraph + ?Sized>(
        &mut self,
        world: &G,
        origin: GridPos,
        max_depth: usize,
    ) -> bool {
        if self.last == Some((origin, max_depth)) {
            return false;
        }
        let _span = tracing::debug_span!(
            "visibility.traverse",
            origin = ?origin,
            max_depth = max_depth,
        )
        .entered();

        let positions = traverse(world, origin, max_depth);
        let depth = max_depth.max(1);

        self.arena.clear();
        self.index.clear();
        self.set.reset(depth);

        for pos in positions {
            let room = match world.room(pos) {
                Some(room) => *room,
                None => {
                    tracing::warn!(
                        target: "cubemaze.visibility",
                        pos = ?pos,
                        "origin has no room; drawing it fully walled"
                    );
                    Room::closed(pos)
                }
            };

            let dz = i64::from(pos.z) - i64::from(origin.z);
            let level = usize::try_from(dz.unsigned_abs()).unwrap_or(usize::MAX);
            if level >= depth {
                tracing::warn!(
                    target: "cubemaze.visibility",
                    pos = ?pos,
                    level = level,
                    max_depth = depth,
                    "room beyond traversal bound dropped"
                );
                continue;
            }

            let id = RoomId(self.arena.len() as u32);
            self.arena.push(RoomGeometry::new(room, self.edge_len));
            self.index.insert(pos, id);
            match dz {
                0 => self.set.same_level.push(id),
                d if d > 0 => self.set.upper[level - 1].push(id),
                _ => self.set.lower[level - 1].push(id),
            }
        }

        self.last = Some((origin, max_depth));
        self.runs += 1;
        tracing::debug!(
            target: "cubemaze.visibility",
            rooms = self.arena.len(),
            same_level = self.set.same_level.len(),
            "traversal rebuilt"
        );
        true
    }

    /// Forget the memoized origin so the next [`update`](Self::update) runs.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    #[inline]
    pub fn visible(&self) -> &VisibleSet {
        &self.set
    }

    #[inline]
    pub fn geometry(&self, id: RoomId) -> &RoomGeometry {
        &self.arena[id.index()]
    }

    pub fn id_of(&self, pos: GridPos) -> Option<RoomId> {
        self.index.get(&pos).copied()
    }

    pub fn geometry_at(&self, pos: GridPos) -> Option<&RoomGeometry> {
        self.id_of(pos).map(|id| self.geometry(id))
    }

    /// Number of traversals actually executed.
    #[inline]
    pub fn runs(&self) -> u64 {
        self.runs
    }

    #[inline]
    pub fn last_origin(&self) -> Option<GridPos> {
        self.last.map(|(origin, _)| origin)
    }
}
