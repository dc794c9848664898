//! Point Light Source

use core::geometry::*;
use core::interaction::Hit;
use core::light::*;
use core::pbrt::*;
use core::sampling::*;
use core::spectrum::Spectrum;

/// Implements an isotropic point light source that emits the same amount of
/// light in all directions.
#[derive(Clone)]
pub struct PointLight {
    /// Position.
    p_light: Point3f,

    /// Intensity.
    intensity: Spectrum,
}

impl PointLight {
    /// Returns a new `PointLight`.
    ///
    /// * `p_light`   - Position.
    /// * `intensity` - Intensity.
    pub fn new(p_light: Point3f, intensity: Spectrum) -> Self {
        Self { p_light, intensity }
    }
}

impl Light for PointLight {
    /// Returns the type of light.
    fn get_type(&self) -> LightType {
        LightType::DELTA_POSITION
    }

    /// Return the total emitted power.
    fn power(&self) -> Spectrum {
        FOUR_PI * self.intensity
    }

    /// Return the radiance arriving at an interaction point.
    ///
    /// * `hit` - The interaction hit point.
    /// * `u`   - Sample value for Monte Carlo integration.
    fn sample_li(&self, hit: &Hit, _u: &Point2f) -> Li {
        let wi = (self.p_light - hit.p).normalize();
        let vis = VisibilityTester::new(*hit, Hit::from_point(self.p_light));
        let value = self.intensity / self.p_light.distance_squared(&hit.p);
        Li::new(wi, 1.0, Some(vis), value)
    }

    /// Returns the probability density with respect to solid angle for the
    /// light's `sample_li()`.
    ///
    /// * `hit` - The interaction hit point.
    /// * `wi`  - The incident direction.
    fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
        0.0
    }

    /// Returns a sampled light-carrying ray leaving the light source.
    ///
    /// * `u1` - Sample value for the emission position.
    /// * `u2` - Sample value for the emission direction.
    fn sample_le(&self, _u1: &Point2f, u2: &Point2f) -> Le {
        let dir = uniform_sample_sphere(u2);
        let ray = Ray::new(self.p_light, dir, INFINITY);
        Le::new(ray, Normal3f::from(dir), 1.0, uniform_sphere_pdf(), self.intensity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn incident_radiance_falls_off_with_squared_distance() {
        let light = PointLight::new(Point3f::new(0.0, 0.0, 4.0), Spectrum::new(8.0));
        let hit = Hit::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), Normal3f::new(0.0, 0.0, 1.0));

        let li = light.sample_li(&hit, &Point2f::ZERO);
        assert_eq!(li.pdf, 1.0);
        assert_eq!(li.wi, Vector3f::new(0.0, 0.0, 1.0));
        assert_approx_eq!(Float, li.value.to_rgb()[0], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn power_is_intensity_over_full_sphere() {
        let light = PointLight::new(Point3f::ZERO, Spectrum::new(1.0));
        assert_approx_eq!(Float, light.power().y(), FOUR_PI, epsilon = 1e-4);
    }

    #[test]
    fn emitted_rays_leave_the_light_position() {
        let p = Point3f::new(1.0, 2.0, 3.0);
        let light = PointLight::new(p, Spectrum::new(1.0));
        let le = light.sample_le(&Point2f::ZERO, &Point2f::new(0.3, 0.7));
        assert_eq!(le.ray.o, p);
        assert_approx_eq!(Float, le.ray.d.length(), 1.0, epsilon = 1e-5);
        assert_eq!(le.pdf_pos, 1.0);
        assert_approx_eq!(Float, le.pdf_dir, INV_FOUR_PI, epsilon = 1e-7);
    }
}
