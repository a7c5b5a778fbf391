//! Spherical Harmonics

mod basis;
mod rotation;
mod samples;
mod vector;

// Re-export
pub use basis::*;
pub use rotation::*;
pub use samples::*;
pub use vector::*;
