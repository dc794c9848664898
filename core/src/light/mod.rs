//! Light

use crate::geometry::*;
use crate::interaction::Hit;
use crate::pbrt::*;
use crate::spectrum::Spectrum;
use std::sync::Arc;

mod light_type;
mod visibility_tester;

// Re-export.
pub use light_type::*;
pub use visibility_tester::*;

/// Returns incident radiance information from `Light::sample_li()`.
pub struct Li {
    /// Direction from the interaction point towards the light.
    pub wi: Vector3f,

    /// PDF (with respect to solid angle) for sampling `wi`.
    pub pdf: Float,

    /// Occlusion query between the interaction point and the sampled point
    /// on the light; `None` for lights that cannot be occluded.
    pub visibility: Option<VisibilityTester>,

    /// The incident radiance.
    pub value: Spectrum,
}

impl Li {
    /// Create a new `Li`.
    ///
    /// * `wi`         - Direction towards the light.
    /// * `pdf`        - PDF for sampling `wi`.
    /// * `visibility` - Occlusion query.
    /// * `value`      - The incident radiance.
    pub fn new(wi: Vector3f, pdf: Float, visibility: Option<VisibilityTester>, value: Spectrum) -> Self {
        Self { wi, pdf, visibility, value }
    }
}

/// Returns an emitted photon ray from `Light::sample_le()`.
pub struct Le {
    /// The emitted ray.
    pub ray: Ray,

    /// Surface normal at the emission point.
    pub n_light: Normal3f,

    /// PDF (with respect to area) for sampling the emission position.
    pub pdf_pos: Float,

    /// PDF (with respect to solid angle) for sampling the emission
    /// direction.
    pub pdf_dir: Float,

    /// The emitted radiance.
    pub value: Spectrum,
}

impl Le {
    /// Create a new `Le`.
    ///
    /// * `ray`     - The emitted ray.
    /// * `n_light` - Surface normal at the emission point.
    /// * `pdf_pos` - PDF for sampling the emission position.
    /// * `pdf_dir` - PDF for sampling the emission direction.
    /// * `value`   - The emitted radiance.
    pub fn new(ray: Ray, n_light: Normal3f, pdf_pos: Float, pdf_dir: Float, value: Spectrum) -> Self {
        Self { ray, n_light, pdf_pos, pdf_dir, value }
    }
}

/// Interface for light sources.
pub trait Light: Send + Sync {
    /// Returns the type of the light.
    fn get_type(&self) -> LightType;

    /// Returns true if the light is described by a delta distribution.
    fn is_delta_light(&self) -> bool {
        self.get_type().is_delta()
    }

    /// Returns the total emitted power.
    fn power(&self) -> Spectrum;

    /// Samples an incident direction at the interaction point along which
    /// illumination from the light may arrive.
    ///
    /// * `hit` - The interaction point.
    /// * `u`   - Uniform random sample in `[0, 1)^2`.
    fn sample_li(&self, hit: &Hit, u: &Point2f) -> Li;

    /// Returns the PDF (with respect to solid angle) for sampling the
    /// direction `wi` at the interaction point.
    ///
    /// * `hit` - The interaction point.
    /// * `wi`  - Direction towards the light.
    fn pdf_li(&self, hit: &Hit, wi: &Vector3f) -> Float;

    /// Samples an outgoing photon ray carrying the light's emission.
    ///
    /// * `u1` - Uniform random sample for the emission position.
    /// * `u2` - Uniform random sample for the emission direction.
    fn sample_le(&self, u1: &Point2f, u2: &Point2f) -> Le;

    /// Returns radiance arriving along a ray that escaped the scene; only
    /// non-zero for infinite lights.
    ///
    /// * `ray` - The escaped ray.
    fn le(&self, _ray: &Ray) -> Spectrum {
        Spectrum::ZERO
    }

    /// Returns emitted radiance leaving a point on the light's surface in
    /// the given direction; only non-zero for area lights.
    ///
    /// * `hit` - Point on the light's surface.
    /// * `w`   - The outgoing direction.
    fn l(&self, _hit: &Hit, _w: &Vector3f) -> Spectrum {
        Spectrum::ZERO
    }
}

/// Atomic reference counted `Light`.
pub type ArcLight = Arc<dyn Light + Send + Sync>;
