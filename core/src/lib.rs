//! Core

#[macro_use]
extern crate hexf;
#[macro_use]
extern crate log;

// Re-export.
pub mod app;
pub mod error;
pub mod geometry;
pub mod math;
pub mod progress;
pub mod rng;
pub mod sh;
pub mod table;

pub use error::{Error, Result};
