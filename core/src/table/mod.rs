//! Scattering Tables

mod layout;
mod store;
#[allow(clippy::module_inception)]
mod table;

// Re-export
pub use layout::*;
pub use store::*;
pub use table::*;
