//! Fresnel reflectance

use crate::pbrt::*;
use crate::spectrum::Spectrum;

/// Returns the Fresnel reflectance at a dielectric interface for
/// unpolarized light.
///
/// * `cos_theta_i` - Cosine of the incident angle; negative when arriving
///                   from inside the medium.
/// * `eta_i`       - Index of refraction on the incident side.
/// * `eta_t`       - Index of refraction on the transmitted side.
pub fn fr_dielectric(cos_theta_i: Float, eta_i: Float, eta_t: Float) -> Float {
    let mut cos_theta_i = clamp(cos_theta_i, -1.0, 1.0);

    // A negative cosine means the ray arrives from the transmitted side;
    // swap the indices.
    let (eta_i, eta_t) = if cos_theta_i > 0.0 {
        (eta_i, eta_t)
    } else {
        cos_theta_i = abs(cos_theta_i);
        (eta_t, eta_i)
    };

    // Compute cos θt using Snell's law.
    let sin_theta_i = max(0.0, 1.0 - cos_theta_i * cos_theta_i).sqrt();
    let sin_theta_t = eta_i / eta_t * sin_theta_i;

    // Total internal reflection.
    if sin_theta_t >= 1.0 {
        return 1.0;
    }

    let cos_theta_t = max(0.0, 1.0 - sin_theta_t * sin_theta_t).sqrt();
    let r_parl = ((eta_t * cos_theta_i) - (eta_i * cos_theta_t)) / ((eta_t * cos_theta_i) + (eta_i * cos_theta_t));
    let r_perp = ((eta_i * cos_theta_i) - (eta_t * cos_theta_t)) / ((eta_i * cos_theta_i) + (eta_t * cos_theta_t));
    (r_parl * r_parl + r_perp * r_perp) / 2.0
}

/// Fresnel reflectance models.
#[derive(Copy, Clone)]
pub enum Fresnel {
    /// Dielectric interface between two media with the given indices of
    /// refraction.
    Dielectric { eta_i: Float, eta_t: Float },

    /// Returns 100% reflection for all incoming directions.
    NoOp,
}

impl Fresnel {
    /// Returns the amount of light reflected by the surface.
    ///
    /// * `cos_theta_i` - Cosine of the incident angle.
    pub fn evaluate(&self, cos_theta_i: Float) -> Spectrum {
        match self {
            Fresnel::Dielectric { eta_i, eta_t } => Spectrum::new(fr_dielectric(cos_theta_i, *eta_i, *eta_t)),
            Fresnel::NoOp => Spectrum::new(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_incidence_matches_closed_form() {
        // R0 = ((n1 - n2) / (n1 + n2))^2.
        let r = fr_dielectric(1.0, 1.0, 1.5);
        let r0 = (0.5f32 / 2.5).powi(2);
        assert!((r - r0).abs() < 1e-6);
    }

    #[test]
    fn total_internal_reflection_is_one() {
        // Grazing exit from dense to thin medium.
        let r = fr_dielectric(-0.2, 1.0, 1.5);
        assert_eq!(r, 1.0);
    }
}
