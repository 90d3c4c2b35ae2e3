#![forbid(unsafe_code)]

//! Cached wireframe scene compositor.
//!
//! [`SceneCache`] keeps one persistent [`PixelBuffer`] together with the
//! `(viewpoint, depth, transform, mode)` tuple it was drawn for. A render
//! call with an identical tuple returns the buffer untouched; any difference
//! clears it and redraws everything.
//!
//! # Invariants
//!
//! 1. Buffer contents always correspond to exactly the memoized tuple.
//! 2. Traversal re-runs only when viewpoint or depth changed.
//! 3. The current-room outline is drawn last, over everything else.
//! 4. Segments are clipped to the canvas before rasterization, so the work
//!    per pass is bounded by the canvas size whatever the transform.

use cubemaze_core::camera::Camera;
use cubemaze_core::cube::room_center;
use cubemaze_core::geometry::{Matrix4, Point3};
use cubemaze_core::raster::ClipRect;
use cubemaze_core::visibility::{RoomId, Visibility};
use cubemaze_core::world::{GridPos, RoomGraph};

use crate::config::SceneConfig;
use crate::pixel::PixelBuffer;

/// Which levels a render pass draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RenderMode {
    /// The viewpoint's level plus every visible level above and below.
    #[default]
    All,
    /// Only the viewpoint's level.
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SceneKey {
    viewpoint: GridPos,
    depth: usize,
    transform: Matrix4,
    mode: RenderMode,
}

/// Memoized renderer for the visible rooms around a viewpoint.
#[derive(Debug, Clone)]
pub struct SceneCache {
    config: SceneConfig,
    buffer: PixelBuffer,
    visibility: Visibility,
    last: Option<SceneKey>,
    scratch: Vec<Point3>,
    passes: u64,
}

impl SceneCache {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            buffer: PixelBuffer::new(config.width, config.height),
            visibility: Visibility::new(config.edge_len),
            last: None,
            scratch: Vec::new(),
            passes: 0,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The buffer as of the last render.
    #[inline]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    #[inline]
    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    /// Number of full redraws performed.
    #[inline]
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Number of traversals performed.
    #[inline]
    pub fn traversals(&self) -> u64 {
        self.visibility.runs()
    }

    /// Force the next render to re-traverse and redraw.
    pub fn invalidate(&mut self) {
        self.last = None;
        self.visibility.invalidate();
    }

    /// Render the scene around `viewpoint`, reusing the previous buffer when
    /// nothing changed.
    ///
    /// The returned bytes are only valid until the next call.
    pub fn render<G: RoomGraph + ?Sized>(
        &mut self,
        world: &G,
        viewpoint: GridPos,
        transform: &Matrix4,
        depth: usize,
        mode: RenderMode,
    ) -> &[u8] {
        let key = SceneKey {
            viewpoint,
            depth,
            transform: *transform,
            mode,
        };
        if self.last == Some(key) {
            tracing::trace!(target: "cubemaze.scene", "scene cache hit");
            return self.buffer.as_bytes();
        }

        let _span = tracing::debug_span!(
            "scene.render",
            viewpoint = ?viewpoint,
            depth = depth,
            mode = ?mode,
        )
        .entered();

        self.buffer.clear();
        self.visibility.update(world, viewpoint, depth);

        let set = self.visibility.visible();
        let mut ids: Vec<RoomId> = set.same_level.clone();
        if mode == RenderMode::All {
            ids.extend(set.upper.iter().flatten().copied());
            ids.extend(set.lower.iter().flatten().copied());
        }

        let clip = ClipRect::new(self.buffer.width(), self.buffer.height());
        self.scratch.clear();
        for id in ids {
            self.visibility
                .geometry(id)
                .project_clipped(transform, clip, &mut self.scratch);
        }
        let drawn = self.buffer.plot(&self.scratch, self.config.structure_color);
        let total = self.scratch.len();

        self.scratch.clear();
        if let Some(current) = self.visibility.geometry_at(viewpoint) {
            current.project_center_outline_clipped(transform, clip, &mut self.scratch);
        }
        self.buffer.plot(&self.scratch, self.config.highlight_color);

        self.last = Some(key);
        self.passes += 1;
        tracing::debug!(
            target: "cubemaze.scene",
            points = total,
            drawn = drawn,
            discarded = total - drawn,
            "scene redrawn"
        );
        self.buffer.as_bytes()
    }

    /// Render with a transform built from `camera`, centered on the viewpoint.
    pub fn render_with_camera<G: RoomGraph + ?Sized>(
        &mut self,
        world: &G,
        viewpoint: GridPos,
        camera: &Camera,
        depth: usize,
        mode: RenderMode,
    ) -> &[u8] {
        let transform = self.camera_transform(viewpoint, camera);
        self.render(world, viewpoint, &transform, depth, mode)
    }

    /// Render with the configured default depth and mode.
    pub fn render_default<G: RoomGraph + ?Sized>(
        &mut self,
        world: &G,
        viewpoint: GridPos,
        camera: &Camera,
    ) -> &[u8] {
        let (depth, mode) = (self.config.depth, self.config.mode);
        self.render_with_camera(world, viewpoint, camera, depth, mode)
    }

    /// The view transform `camera` produces for `viewpoint` on this canvas.
    pub fn camera_transform(&self, viewpoint: GridPos, camera: &Camera) -> Matrix4 {
        camera.transform(
            room_center(viewpoint, self.config.edge_len),
            self.config.width,
            self.config.height,
        )
    }
}
