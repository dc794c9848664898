//! Mirror Material

use super::{Material, TransportMode};
use crate::interaction::SurfaceInteraction;
use crate::reflection::*;
use crate::spectrum::Spectrum;
use bumpalo::Bump;

/// A perfectly specular mirror.
pub struct MirrorMaterial {
    /// Specular reflectivity.
    kr: Spectrum,
}

impl MirrorMaterial {
    /// Create a new `MirrorMaterial`.
    ///
    /// * `kr` - Specular reflectivity.
    pub fn new(kr: Spectrum) -> Self {
        Self { kr }
    }
}

impl Material for MirrorMaterial {
    /// Initializes `si.bsdf` with a specular reflection model.
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
        let r = self.kr.clamp(0.0, 1.0);
        if !r.is_black() {
            bsdf.add(arena.alloc(BxDF::SpecularReflection(SpecularReflection::new(r, Fresnel::NoOp))));
        }
        si.bsdf = Some(bsdf);
    }
}
