//! Geometry

mod frame;
mod matrix3x3;
mod vector3;

// Re-export
pub use frame::*;
pub use matrix3x3::*;
pub use vector3::*;
