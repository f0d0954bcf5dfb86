use std::path::PathBuf;

use thiserror::Error;

/// Failures that end a contour run. None of them are retried.
#[derive(Debug, Error)]
pub enum ContourError {
    #[error("unable to allocate {what} ({bytes} bytes)")]
    Allocation { what: &'static str, bytes: usize },

    #[error("worker thread management failed: {0}")]
    ThreadManagement(String),

    #[error("failed to load contour tile {}: {source}", path.display())]
    TileLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("expected 16 contour tiles, got {0}")]
    TileCount(usize),

    #[error("contour tile {index} is {found_w}x{found_h}, expected {expected_w}x{expected_h}")]
    TileSizeMismatch {
        index: usize,
        found_w: u32,
        found_h: u32,
        expected_w: u32,
        expected_h: u32,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
