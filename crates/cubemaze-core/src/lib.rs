#![forbid(unsafe_code)]

//! Scene core: math, rasterizer, room geometry, and visibility.
//!
//! # Role in CubeMaze
//! `cubemaze-core` turns a read-only room graph into world-space wireframes.
//! It owns no pixels; `cubemaze-render` writes the points it produces into
//! a buffer.
//!
//! # Primary responsibilities
//! - **Geometry**: [`Point3`], [`Vec3`], and the row-vector [`Matrix4`].
//! - **Raster**: integer 3D Bresenham enumeration of segment points.
//! - **Cube**: the fixed 38-landmark room table and the wireframe projector.
//! - **Visibility**: bounded BFS over the room graph, bucketed by level.
//! - **Navigation/Camera**: viewpoint moves and per-pass view transforms.

pub mod camera;
pub mod cube;
pub mod error;
pub mod geometry;
pub mod navigation;
pub mod raster;
pub mod visibility;
pub mod world;

pub use camera::Camera;
pub use cube::RoomGeometry;
pub use error::{MazeError, Result};
pub use geometry::{Matrix4, Point3, Vec3};
pub use navigation::{Move, Navigator};
pub use raster::{ClipRect, rasterize};
pub use visibility::{RoomId, Visibility, VisibleSet};
pub use world::{CornerFlags, Direction, Exits, GridPos, GridWorld, Room, RoomGraph};
