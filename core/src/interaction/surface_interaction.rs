//! Surface Interaction

use super::Hit;
use crate::geometry::*;
use crate::pbrt::*;
use crate::primitive::ArcPrimitive;
use crate::reflection::BSDF;
use crate::spectrum::Spectrum;

/// Shading geometry at a surface interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct Shading {
    /// Shading normal.
    pub n: Normal3f,
}

/// Geometry and scattering information at a ray-surface intersection point.
pub struct SurfaceInteraction<'arena> {
    /// The common interaction data.
    pub hit: Hit,

    /// Shading geometry.
    pub shading: Shading,

    /// Ray parameter at the intersection.
    pub t: Float,

    /// The scattering functions; filled in by the hit primitive's material.
    pub bsdf: Option<BSDF<'arena>>,

    /// The primitive that was hit.
    pub primitive: Option<ArcPrimitive>,
}

impl<'arena> SurfaceInteraction<'arena> {
    /// Create a new surface interaction without scattering functions.
    ///
    /// * `t`  - Ray parameter at the intersection.
    /// * `p`  - The intersection point.
    /// * `wo` - The negative ray direction.
    /// * `n`  - Geometric surface normal.
    pub fn new(t: Float, p: Point3f, wo: Vector3f, n: Normal3f) -> Self {
        Self {
            hit: Hit::new(p, wo, n),
            shading: Shading { n },
            t,
            bsdf: None,
            primitive: None,
        }
    }

    /// Returns the emitted radiance at the interaction point in the given
    /// direction; non-zero only when the hit primitive carries an area light.
    ///
    /// * `w` - The direction.
    pub fn le(&self, w: &Vector3f) -> Spectrum {
        self.primitive
            .as_ref()
            .and_then(|p| p.get_area_light())
            .map(|light| light.l(&self.hit, w))
            .unwrap_or(Spectrum::ZERO)
    }
}
