//! Participating Media

#[macro_use]
extern crate log;

mod cloud;
mod phase;
mod slab;

// Re-export
pub use cloud::*;
pub use phase::*;
pub use slab::*;
