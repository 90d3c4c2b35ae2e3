#![forbid(unsafe_code)]

//! Viewpoint movement through open exits.
//!
//! Hosts translate key presses into [`Move`] requests. Relative moves are
//! resolved against the navigator's facing; vertical moves are absolute.

use crate::world::{Direction, GridPos, RoomGraph};

/// A keypress-equivalent movement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    TurnLeft,
    TurnRight,
}

/// The room reached by leaving `from` in `dir`, if the exit is open and the
/// neighbor exists.
pub fn step<G: RoomGraph + ?Sized>(world: &G, from: GridPos, dir: Direction) -> Option<GridPos> {
    let room = world.room(from)?;
    if !room.is_open(dir) {
        return None;
    }
    world.neighbor(from, dir).map(|next| next.pos)
}

/// Current viewpoint and facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigator {
    pos: GridPos,
    facing: Direction,
}

impl Navigator {
    /// `facing` must be horizontal; vertical values fall back to north.
    pub fn new(pos: GridPos, facing: Direction) -> Self {
        let facing = if facing.is_vertical() {
            Direction::North
        } else {
            facing
        };
        Self { pos, facing }
    }

    #[inline]
    pub fn pos(&self) -> GridPos {
        self.pos
    }

    #[inline]
    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// Resolve a movement request to an absolute direction.
    ///
    /// Returns `None` for turns.
    pub fn resolve(&self, mv: Move) -> Option<Direction> {
        match mv {
            Move::Forward => Some(self.facing),
            Move::Back => Some(self.facing.opposite()),
            Move::Left => Some(self.facing.turn_left()),
            Move::Right => Some(self.facing.turn_right()),
            Move::Up => Some(Direction::Up),
            Move::Down => Some(Direction::Down),
            Move::TurnLeft | Move::TurnRight => None,
        }
    }

    /// Apply a request. Returns `true` if position or facing changed.
    pub fn apply<G: RoomGraph + ?Sized>(&mut self, world: &G, mv: Move) -> bool {
        match mv {
            Move::TurnLeft => {
                self.facing = self.facing.turn_left();
                true
            }
            Move::TurnRight => {
                self.facing = self.facing.turn_right();
                true
            }
            _ => {
                let Some(dir) = self.resolve(mv) else {
                    return false;
                };
                match step(world, self.pos, dir) {
                    Some(next) => {
                        tracing::debug!(
                            target: "cubemaze.navigation",
                            from = ?self.pos,
                            to = ?next,
                            "viewpoint moved"
                        );
                        self.pos = next;
                        true
                    }
                    None => false,
                }
            }
        }
    }
}
