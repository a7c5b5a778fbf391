//! Errors

use crate::math::Float;
use std::path::PathBuf;

/// Errors raised while computing, storing or loading scattering tables.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("table file {path:?} has {actual} bytes but the layout requires {expected}")]
    TableSize {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error(
        "viewer outside slab (length {length}, thickness {thickness}, height {height}) \
         at x = {x} looking along ({dx}, {dy}, {dz})"
    )]
    ViewerOutsideSlab {
        x: Float,
        length: Float,
        thickness: Float,
        height: Float,
        dx: Float,
        dy: Float,
        dz: Float,
    },

    #[error("scattering order {0} requires the table of the previous order")]
    MissingPreviousTable(usize),

    #[error("worker thread {0} panicked")]
    WorkerPanicked(usize),

    #[error("invalid table layout: {0}")]
    InvalidLayout(String),
}

impl Error {
    /// Returns true if the error is an I/O error caused by a missing file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type used throughout the crates.
pub type Result<T> = std::result::Result<T, Error>;
