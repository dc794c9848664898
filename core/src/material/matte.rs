//! Matte Material

use super::{Material, TransportMode};
use crate::interaction::SurfaceInteraction;
use crate::reflection::*;
use crate::spectrum::Spectrum;
use bumpalo::Bump;

/// A purely diffuse surface.
pub struct MatteMaterial {
    /// Diffuse reflectivity.
    kd: Spectrum,
}

impl MatteMaterial {
    /// Create a new `MatteMaterial`.
    ///
    /// * `kd` - Diffuse reflectivity.
    pub fn new(kd: Spectrum) -> Self {
        Self { kd }
    }
}

impl Material for MatteMaterial {
    /// Initializes `si.bsdf` with a Lambertian reflection model.
    ///
    /// * `arena` - The chunk-scoped memory arena.
    /// * `si`    - The surface interaction.
    /// * `mode`  - The light transport mode.
    fn compute_scattering_functions<'arena>(
        &self,
        arena: &'arena Bump,
        si: &mut SurfaceInteraction<'arena>,
        _mode: TransportMode,
    ) {
        let mut bsdf = BSDF::new(si.hit.n, si.shading.n, 1.0);
        let r = self.kd.clamp(0.0, 1.0);
        if !r.is_black() {
            bsdf.add(arena.alloc(BxDF::LambertianReflection(LambertianReflection::new(r))));
        }
        si.bsdf = Some(bsdf);
    }
}
