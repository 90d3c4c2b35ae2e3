#![forbid(unsafe_code)]

//! Pixel output for CubeMaze: the memoized wireframe scene and the
//! scrolling text roller.
//!
//! # Role in CubeMaze
//! `cubemaze-render` owns every byte the host blits. [`SceneCache`] composes
//! the rooms `cubemaze-core` finds visible; [`TextRoller`] animates text
//! bitmaps produced by an injected [`TextRasterizer`].
//!
//! # Example
//! ```
//! use cubemaze_core::{Camera, GridWorld, Point3};
//! use cubemaze_render::{MazeConfig, SceneCache};
//!
//! let config = MazeConfig::default();
//! let world = GridWorld::corridor(Point3::default(), 4);
//! let mut scene = SceneCache::new(config.scene.clone());
//! let frame = scene.render_default(&world, Point3::default(), &Camera::default());
//! assert_eq!(frame.len(), 640 * 480 * 4);
//! ```

pub mod config;
pub mod pixel;
pub mod roller;
pub mod scene;
pub mod text;

pub use config::{MazeConfig, RollerConfig, SceneConfig};
pub use pixel::{Bgra, PixelBuffer, PIXEL_SIZE};
pub use roller::{Align, Paragraph, RollDirection, TextRoller};
pub use scene::{RenderMode, SceneCache};
pub use text::{
    compose_line, Glyph, GlyphRasterizer, GlyphSource, TextBitmap, TextCache, TextRasterizer,
};
