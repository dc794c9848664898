//! Common

use crate::geometry::*;
use crate::pbrt::*;

/// Cosine of the angle between a direction and the shading normal, which is
/// the z-axis in the reflection coordinate system.
///
/// * `w` - The direction.
#[inline]
pub fn cos_theta(w: &Vector3f) -> Float {
    w.z
}

/// Square of the cosine of the angle between a direction and the shading
/// normal.
///
/// * `w` - The direction.
#[inline]
pub fn cos2_theta(w: &Vector3f) -> Float {
    w.z * w.z
}

/// Absolute value of the cosine of the angle between a direction and the
/// shading normal.
///
/// * `w` - The direction.
#[inline]
pub fn abs_cos_theta(w: &Vector3f) -> Float {
    abs(w.z)
}

/// Returns true if two directions lie in the same hemisphere of the shading
/// coordinate system.
///
/// * `w`  - First direction.
/// * `wp` - Second direction.
#[inline]
pub fn same_hemisphere(w: &Vector3f, wp: &Vector3f) -> bool {
    w.z * wp.z > 0.0
}

/// Reflects a direction about a normal.
///
/// * `wo` - The outgoing direction.
/// * `n`  - The normal.
#[inline]
pub fn reflect(wo: &Vector3f, n: &Vector3f) -> Vector3f {
    -*wo + 2.0 * wo.dot(n) * *n
}

/// Refracts a direction about a normal using Snell's law; returns `None` on
/// total internal reflection.
///
/// * `wi`  - The incident direction.
/// * `n`   - The normal, on the same side as `wi`.
/// * `eta` - Ratio of incident to transmitted indices of refraction.
pub fn refract(wi: &Vector3f, n: &Normal3f, eta: Float) -> Option<Vector3f> {
    // Compute cos θt using Snell's law.
    let cos_theta_i = n.dot(wi);
    let sin2_theta_i = max(0.0, 1.0 - cos_theta_i * cos_theta_i);
    let sin2_theta_t = eta * eta * sin2_theta_i;

    // Total internal reflection for transmission.
    if sin2_theta_t >= 1.0 {
        return None;
    }

    let cos_theta_t = (1.0 - sin2_theta_t).sqrt();
    Some(eta * -*wi + (eta * cos_theta_i - cos_theta_t) * Vector3f::from(*n))
}
