#![forbid(unsafe_code)]

//! Orthographic view camera.
//!
//! Builds the per-pass [`Matrix4`] that maps world units onto the pixel
//! canvas: the viewpoint's center moves to the origin, the scene rotates
//! about Z (yaw) and then X (pitch), Y is flipped into screen space, the
//! result is scaled by `zoom` and finally centered on the canvas.

use std::f64::consts::FRAC_PI_2;

use crate::geometry::{Matrix4, Point3};

pub const MIN_ZOOM: f64 = 0.05;
pub const MAX_ZOOM: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Camera {
    /// Rotation about the vertical axis, in radians.
    pub yaw: f64,
    /// Tilt away from straight top-down, in radians, clamped to `[0, pi/2]`.
    pub pitch: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new(yaw: f64, pitch: f64, zoom: f64) -> Self {
        Self {
            yaw,
            pitch: pitch.clamp(0.0, FRAC_PI_2),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    pub fn rotate(&mut self, delta: f64) {
        self.yaw = (self.yaw + delta).rem_euclid(std::f64::consts::TAU);
    }

    pub fn tilt(&mut self, delta: f64) {
        self.pitch = (self.pitch + delta).clamp(0.0, FRAC_PI_2);
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Compose the view transform for a viewpoint centered at `center`.
    pub fn transform(&self, center: Point3, canvas_width: u32, canvas_height: u32) -> Matrix4 {
        let c = center.to_vec3();
        Matrix4::translation(-c.x, -c.y, -c.z)
            .then(&Matrix4::rotation_z(self.yaw))
            .then(&Matrix4::rotation_x(self.pitch))
            .then(&Matrix4::scale(self.zoom, -self.zoom, self.zoom))
            .then(&Matrix4::translation(
                f64::from(canvas_width) / 2.0,
                f64::from(canvas_height) / 2.0,
                0.0,
            ))
    }
}
