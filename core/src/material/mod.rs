//! Material

use crate::interaction::SurfaceInteraction;
use bumpalo::Bump;
use std::sync::Arc;

mod glass;
mod matte;
mod mirror;

// Re-export.
pub use glass::*;
pub use matte::*;
pub use mirror::*;

/// Light transport mode: whether the quantity carried along a path is
/// radiance (camera paths) or importance (light/photon paths). Refraction
/// scales the two differently.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportMode {
    Radiance,
    Importance,
}

/// Interface for materials, which compute the scattering functions at a
/// surface interaction.
pub trait Material: Send + Sync {
    /// Initializes `si.bsdf`, allocating the component reflection models
    /// from the arena.
    ///
    /// * `arena` - The chunk-scoped memory arena.
    /// * `si`    - The surface interaction.
    /// * `mode`  - The light transport mode.
    fn compute_scattering_functions<'arena>(
        &self,
        arena: &'arena Bump,
        si: &mut SurfaceInteraction<'arena>,
        mode: TransportMode,
    );
}

/// Atomic reference counted `Material`.
pub type ArcMaterial = Arc<dyn Material + Send + Sync>;
