//! Shapes

mod disk;
mod quad;

// Re-export.
pub use disk::*;
pub use quad::*;
