#![forbid(unsafe_code)]

//! Error model for CubeMaze.
//!
//! Rendering entry points are total: they log and degrade instead of
//! failing. Only constructors and external-service seams return
//! [`Result`], so callers can decide whether to drop the input or retry.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MazeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    #[error("bitmap is {width}x{height} but carries {len} bytes")]
    BitmapSizeMismatch { width: u32, height: u32, len: usize },

    #[error("bitmap has zero area")]
    EmptyBitmap,

    #[error("bitmap of {width}x{height} exceeds the addressable size")]
    BitmapTooLarge { width: u32, height: u32 },

    #[error("text does not fit in {max_width} pixels")]
    TextDoesNotFit { max_width: u32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MazeError {
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
