//! Core

#[macro_use]
extern crate hexf;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

// This crate is named `core`, so in dependent crates it shadows libcore in
// the extern prelude. Re-export the libcore items that macro expansions
// (e.g. proptest's) reference via `::core::...` so those paths still resolve.
pub use core::{concat, file, line, module_path, option, panic, result, stringify};

// Re-export.
pub mod geometry;
pub mod integrator;
pub mod interaction;
pub mod kd_tree;
pub mod light;
pub mod light_distrib;
pub mod low_discrepency;
pub mod material;
pub mod pbrt;
pub mod primitive;
pub mod primitives;
pub mod reflection;
pub mod rng;
pub mod sampling;
pub mod scene;
pub mod spectrum;
