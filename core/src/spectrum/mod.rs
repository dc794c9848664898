//! Spectral power distributions.

mod rgb_spectrum;

// Re-export.
pub use rgb_spectrum::*;
