//! Specular Transmission

use super::*;
use crate::geometry::*;
use crate::pbrt::*;
use crate::spectrum::*;
use crate::material::TransportMode;

/// BTDF for perfect specular transmission through a dielectric interface.
#[derive(Copy, Clone)]
pub struct SpecularTransmission {
    /// BxDF type.
    bxdf_type: BxDFType,

    /// Transmittance spectrum.
    t: Spectrum,

    /// Index of refraction above the surface (the side the normal points
    /// towards).
    eta_a: Float,

    /// Index of refraction below the surface.
    eta_b: Float,

    /// Fresnel interface for the dielectric.
    fresnel: Fresnel,

    /// Light transport mode; radiance transport scales transmitted energy by
    /// the squared relative index of refraction.
    mode: TransportMode,
}

impl SpecularTransmission {
    /// Create a new instance of `SpecularTransmission`.
    ///
    /// * `t`     - Transmittance spectrum.
    /// * `eta_a` - Index of refraction above the surface.
    /// * `eta_b` - Index of refraction below the surface.
    /// * `mode`  - Light transport mode.
    pub fn new(t: Spectrum, eta_a: Float, eta_b: Float, mode: TransportMode) -> Self {
        Self {
            bxdf_type: BxDFType::from(BSDF_TRANSMISSION | BSDF_SPECULAR),
            t,
            eta_a,
            eta_b,
            fresnel: Fresnel::Dielectric { eta_i: eta_a, eta_t: eta_b },
            mode,
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

    /// Returns the refracted direction with probability 1, or a zero sample
    /// on total internal reflection.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - The 2D uniform random values.
    pub fn sample_f(&self, wo: &Vector3f, _u: &Point2f) -> BxDFSample {
        // Figure out which η is incident and which is transmitted.
        let entering = cos_theta(wo) > 0.0;
        let (eta_i, eta_t) = if entering { (self.eta_a, self.eta_b) } else { (self.eta_b, self.eta_a) };

        // Compute the ray direction for specular transmission.
        let n = Normal3f::new(0.0, 0.0, 1.0).face_forward(wo);
        let wi = match refract(wo, &n, eta_i / eta_t) {
            Some(wi) => wi,
            None => return BxDFSample::from(self.bxdf_type),
        };

        let mut ft = self.t * (Spectrum::new(1.0) - self.fresnel.evaluate(cos_theta(&wi)));

        // Account for non-symmetry with transmission to different medium.
        if self.mode == TransportMode::Radiance {
            ft *= (eta_i * eta_i) / (eta_t * eta_t);
        }

        BxDFSample::new(ft / abs_cos_theta(&wi), 1.0, wi, self.bxdf_type)
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
        self.t * (Spectrum::new(1.0) - self.fresnel.evaluate(cos_theta(wo)))
    }
}
