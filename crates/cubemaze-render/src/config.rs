#![forbid(unsafe_code)]

//! Configuration for the scene cache and the text roller.
//!
//! Configuration is passed explicitly to constructors; nothing is global.
//! Every field has a default matching the built-in constants, so
//! `MazeConfig::default()` is a working setup.
//!
//! With the `serde` feature the structs derive `Serialize`/`Deserialize`
//! (missing fields fall back to defaults), and [`MazeConfig::from_json_str`]
//! parses text the host has already loaded.
//!
//! ```json
//! {
//!   "scene": { "width": 640, "height": 480, "depth": 4 },
//!   "roller": { "ms_per_row": 15, "direction": "Down" }
//! }
//! ```

use cubemaze_core::cube::DEFAULT_EDGE_LEN;
use cubemaze_core::error::{MazeError, Result};

use crate::pixel::Bgra;
use crate::roller::{Align, RollDirection};
use crate::scene::RenderMode;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MazeConfig {
    pub scene: SceneConfig,
    pub roller: RollerConfig,
}

impl MazeConfig {
    /// Parse from JSON text.
    #[cfg(feature = "serde")]
    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| MazeError::invalid_config(e.to_string()))
    }

    /// Validate all parameters. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.scene.validate();
        errors.extend(self.roller.validate());
        errors
    }

    /// [`validate`](Self::validate), folded into a single error.
    pub fn check(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(MazeError::invalid_config(errors.join("; ")))
        }
    }
}

/// Wireframe scene parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SceneConfig {
    pub width: u32,
    pub height: u32,
    /// Room edge length in world units.
    pub edge_len: i32,
    /// Default traversal depth.
    pub depth: usize,
    pub mode: RenderMode,
    pub structure_color: Bgra,
    pub highlight_color: Bgra,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            edge_len: DEFAULT_EDGE_LEN,
            depth: 3,
            mode: RenderMode::All,
            structure_color: Bgra::WHITE,
            highlight_color: Bgra::RED,
        }
    }
}

impl SceneConfig {
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.width == 0 || self.height == 0 {
            errors.push(format!(
                "scene canvas must be non-empty, got {}x{}",
                self.width, self.height
            ));
        }
        if self.edge_len < 10 {
            errors.push(format!(
                "scene.edge_len must be >= 10, got {}",
                self.edge_len
            ));
        }
        if self.depth == 0 {
            errors.push("scene.depth must be > 0".into());
        }
        errors
    }
}

/// Scrolling text roller parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RollerConfig {
    pub width: u32,
    pub height: u32,
    /// Milliseconds per scrolled pixel row.
    pub ms_per_row: u32,
    /// Target height of lines rendered through a text rasterizer.
    pub line_height: u32,
    pub direction: RollDirection,
    pub align: Align,
    /// `None` uses the direction's default (on for bottom roller, off for top).
    pub fade_by_height: Option<bool>,
    pub border_color: Bgra,
}

impl Default for RollerConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 120,
            ms_per_row: 20,
            line_height: 16,
            direction: RollDirection::Up,
            align: Align::Center,
            fade_by_height: None,
            border_color: Bgra::YELLOW,
        }
    }
}

impl RollerConfig {
    /// Whether the fade post-effect applies.
    #[inline]
    pub fn fades(&self) -> bool {
        self.fade_by_height
            .unwrap_or(self.direction == RollDirection::Up)
    }

    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.width == 0 || self.height == 0 {
            errors.push(format!(
                "roller canvas must be non-empty, got {}x{}",
                self.width, self.height
            ));
        }
        if self.ms_per_row == 0 {
            errors.push("roller.ms_per_row must be > 0".into());
        }
        if self.line_height == 0 || self.line_height > self.height {
            errors.push(format!(
                "roller.line_height must be in 1..={}, got {}",
                self.height, self.line_height
            ));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(MazeConfig::default().validate().is_empty());
        assert!(MazeConfig::default().check().is_ok());
    }

    #[test]
    fn validate_lists_every_problem() {
        let mut config = MazeConfig::default();
        config.scene.width = 0;
        config.scene.depth = 0;
        config.roller.ms_per_row = 0;
        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(matches!(config.check(), Err(MazeError::InvalidConfig(_))));
    }

    #[test]
    fn fade_defaults_follow_direction() {
        let mut roller = RollerConfig::default();
        assert!(roller.fades());
        roller.direction = RollDirection::Down;
        assert!(!roller.fades());
        roller.fade_by_height = Some(true);
        assert!(roller.fades());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_fills_missing_fields() {
        let config =
            MazeConfig::from_json_str(r#"{"scene":{"depth":5},"roller":{"direction":"Down"}}"#)
                .unwrap();
        assert_eq!(config.scene.depth, 5);
        assert_eq!(config.scene.width, 640);
        assert_eq!(config.roller.direction, RollDirection::Down);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_errors_are_config_errors() {
        assert!(matches!(
            MazeConfig::from_json_str("{"),
            Err(MazeError::InvalidConfig(_))
        ));
    }
}
