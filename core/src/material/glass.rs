//! Glass Material

use super::{Material, TransportMode};
use crate::interaction::SurfaceInteraction;
use crate::pbrt::*;
use crate::reflection::*;
use crate::spectrum::Spectrum;
use bumpalo::Bump;

/// A smooth dielectric that both reflects and transmits.
pub struct GlassMaterial {
    /// Specular reflectivity.
    kr: Spectrum,

    /// Specular transmissivity.
    kt: Spectrum,

    /// Index of refraction of the interior medium.
    eta: Float,
}

impl GlassMaterial {
    /// Create a new `GlassMaterial`.
    ///
    /// * `kr`  - Specular reflectivity.
    /// * `kt`  - Specular transmissivity.
    /// * `eta` - Index of refraction of the interior medium.
    pub fn new(kr: Spectrum, kt: Spectrum, eta: Float) -> Self {
        Self { kr, kt, eta }
    }
}

impl Material for GlassMaterial {
    /// Initializes `si.bsdf` with specular reflection and transmission
    /// models across the dielectric boundary.
    ///
    /// * `arena` - The chunk-scoped memory arena.
    /// * `si`    - The surface interaction.
    /// * `mode`  - The light transport mode.
    fn compute_scattering_functions<'arena>(
        &self,
        arena: &'arena Bump,
        si: &mut SurfaceInteraction<'arena>,
        mode: TransportMode,
    ) {
        let mut bsdf = BSDF::new(si.hit.n, si.shading.n, self.eta);

        let r = self.kr.clamp(0.0, 1.0);
        if !r.is_black() {
            let fresnel = Fresnel::Dielectric { eta_i: 1.0, eta_t: self.eta };
            bsdf.add(arena.alloc(BxDF::SpecularReflection(SpecularReflection::new(r, fresnel))));
        }

        let t = self.kt.clamp(0.0, 1.0);
        if !t.is_black() {
            bsdf.add(arena.alloc(BxDF::SpecularTransmission(SpecularTransmission::new(
                t, 1.0, self.eta, mode,
            ))));
        }

        si.bsdf = Some(bsdf);
    }
}
