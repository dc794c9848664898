//! Common types, constants and utility functions.

mod axis;
mod common;

// Re-export.
pub use axis::*;
pub use common::*;
