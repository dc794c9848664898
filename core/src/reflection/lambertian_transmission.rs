//! Lambertian Transmission

use super::*;
use crate::geometry::*;
use crate::pbrt::*;
use crate::spectrum::*;
use crate::sampling::cosine_sample_hemisphere;

/// BTDF for the Lambertian model for perfect diffuse transmission that
/// scatters incident illumination equally over the opposite hemisphere.
#[derive(Copy, Clone)]
pub struct LambertianTransmission {
    /// BxDF type.
    bxdf_type: BxDFType,

    /// Transmittance spectrum which gives the fraction of incident light
    /// that is transmitted.
    t: Spectrum,
}

impl LambertianTransmission {
    /// Create a new instance of `LambertianTransmission`.
    ///
    /// * `t` - Transmittance spectrum which gives the fraction of incident
    ///         light that is transmitted.
    pub fn new(t: Spectrum) -> Self {
        Self {
            bxdf_type: BxDFType::from(BSDF_TRANSMISSION | BSDF_DIFFUSE),
            t,
        }
    }

    /// Returns the BxDF type.
    pub fn get_type(&self) -> BxDFType {
        self.bxdf_type
    }

    /// Returns the value of the distribution function for the given pair of
    /// directions.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn f(&self, _wo: &Vector3f, _wi: &Vector3f) -> Spectrum {
        self.t * INV_PI
    }

    /// Samples an incident direction in the hemisphere opposite the outgoing
    /// direction.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - The 2D uniform random values.
    pub fn sample_f(&self, wo: &Vector3f, u: &Point2f) -> BxDFSample {
        let mut wi = cosine_sample_hemisphere(u);
        if wo.z > 0.0 {
            wi.z = -wi.z;
        }
        let pdf = self.pdf(wo, &wi);
        BxDFSample::new(self.f(wo, &wi), pdf, wi, self.bxdf_type)
    }

    /// Evaluates the PDF for the sampling method.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        if same_hemisphere(wo, wi) {
            0.0
        } else {
            abs_cos_theta(wi) * INV_PI
        }
    }

    /// Computes the hemispherical-directional reflectance function ρ.
    ///
    /// * `wo` - Outgoing direction.
    pub fn rho_hd(&self, _wo: &Vector3f) -> Spectrum {
        self.t
    }
}
