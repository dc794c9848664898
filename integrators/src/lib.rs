//! Integrators

#[macro_use]
extern crate log;

mod photon_map;

// Re-export.
pub use photon_map::*;
