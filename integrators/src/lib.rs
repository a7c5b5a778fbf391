//! Integrators

#[macro_use]
extern crate log;

mod integrator;
mod multiple;
mod pipeline;
mod progress;
mod scheduler;
mod setup;
mod single;

// Re-export.
pub use integrator::*;
pub use multiple::*;
pub use pipeline::*;
pub use progress::*;
pub use scheduler::*;
pub use setup::*;
pub use single::*;
