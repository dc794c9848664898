//! Specular Reflection

use super::*;
use crate::geometry::*;
use crate::pbrt::*;
use crate::spectrum::*;

/// BRDF for perfect specular reflection.
#[derive(Copy, Clone)]
pub struct SpecularReflection {
    /// BxDF type.
    bxdf_type: BxDFType,

    /// Reflectance spectrum which gives the fraction of incident light that
    /// is scattered.
    r: Spectrum,

    /// Fresnel interface for dielectrics and conductors.
    fresnel: Fresnel,
}

impl SpecularReflection {
    /// Create a new instance of `SpecularReflection`.
    ///
    /// * `r`       - Reflectance spectrum.
    /// * `fresnel` - Fresnel interface for dielectrics and conductors.
    pub fn new(r: Spectrum, fresnel: Fresnel) -> Self {
        Self {
            bxdf_type: BxDFType::from(BSDF_REFLECTION | BSDF_SPECULAR),
            r,
            fresnel,
        }
    }

    /// Returns the BxDF type.
    pub fn get_type(&self) -> BxDFType {
        self.bxdf_type
    }

    /// Returns the value of the distribution function for the given pair of
    /// directions. This is zero for all direction pairs; the delta
    /// distribution is only reachable through `sample_f`.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn f(&self, _wo: &Vector3f, _wi: &Vector3f) -> Spectrum {
        Spectrum::ZERO
    }

    /// Returns the mirror direction with probability 1.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - The 2D uniform random values.
    pub fn sample_f(&self, wo: &Vector3f, _u: &Point2f) -> BxDFSample {
        // Mirror `wo` about the shading normal (the z-axis).
        let wi = Vector3f::new(-wo.x, -wo.y, wo.z);
        let f = self.fresnel.evaluate(cos_theta(&wi)) * self.r / abs_cos_theta(&wi);
        BxDFSample::new(f, 1.0, wi, self.bxdf_type)
    }

    /// Evaluates the PDF for the sampling method. Zero for the delta
    /// distribution.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn pdf(&self, _wo: &Vector3f, _wi: &Vector3f) -> Float {
        0.0
    }

    /// Computes the hemispherical-directional reflectance function ρ.
    ///
    /// * `wo` - Outgoing direction.
    pub fn rho_hd(&self, wo: &Vector3f) -> Spectrum {
        self.fresnel.evaluate(cos_theta(wo)) * self.r
    }
}
