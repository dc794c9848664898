//! Infinite Area Light Source

use core::geometry::*;
use core::interaction::Hit;
use core::light::*;
use core::pbrt::*;
use core::sampling::*;
use core::spectrum::Spectrum;

/// Implements an infinitely far away light source surrounding the scene,
/// emitting constant radiance from all directions.
#[derive(Clone)]
pub struct InfiniteAreaLight {
    /// Emitted radiance.
    l_emit: Spectrum,

    /// Center of the scene's bounding sphere.
    world_center: Point3f,

    /// Radius of the scene's bounding sphere.
    world_radius: Float,
}

impl InfiniteAreaLight {
    /// Returns a new `InfiniteAreaLight`.
    ///
    /// * `l_emit`      - Emitted radiance.
    /// * `world_bound` - Bounding box of the scene's geometry.
    pub fn new(l_emit: Spectrum, world_bound: Bounds3f) -> Self {
        let (world_center, world_radius) = world_bound.bounding_sphere();
        Self { l_emit, world_center, world_radius }
    }
}

impl Light for InfiniteAreaLight {
    /// Returns the type of light.
    fn get_type(&self) -> LightType {
        LightType::INFINITE
    }

    /// Return the total emitted power.
    fn power(&self) -> Spectrum {
        PI * self.world_radius * self.world_radius * self.l_emit
    }

    /// Return the radiance arriving at an interaction point.
    ///
    /// * `hit` - The interaction hit point.
    /// * `u`   - Sample value for Monte Carlo integration.
    fn sample_li(&self, hit: &Hit, u: &Point2f) -> Li {
        let wi = uniform_sample_sphere(u);

        // Occlusion endpoint far enough along `wi` to be outside the scene.
        let p_outside = hit.p + wi * (2.0 * self.world_radius);
        let vis = VisibilityTester::new(*hit, Hit::from_point(p_outside));

        Li::new(wi, uniform_sphere_pdf(), Some(vis), self.l_emit)
    }

    /// Returns the probability density with respect to solid angle for the
    /// light's `sample_li()`.
    ///
    /// * `hit` - The interaction hit point.
    /// * `wi`  - The incident direction.
    fn pdf_li(&self, _hit: &Hit, _wi: &Vector3f) -> Float {
        uniform_sphere_pdf()
    }

    /// Returns a sampled light-carrying ray leaving the light source.
    ///
    /// * `u1` - Sample value for the emission position.
    /// * `u2` - Sample value for the emission direction.
    fn sample_le(&self, u1: &Point2f, u2: &Point2f) -> Le {
        let d = uniform_sample_sphere(u1);

        // Pick a point on a disk tangent to the scene's bounding sphere and
        // shoot the ray through the scene from there.
        let (v1, v2) = coordinate_system(&(-d));
        let cd = concentric_sample_disk(u2);
        let p_disk = self.world_center + (cd.x * v1 + cd.y * v2) * self.world_radius;
        let ray = Ray::new(p_disk + (-d) * self.world_radius, d, INFINITY);

        let pdf_pos = 1.0 / (PI * self.world_radius * self.world_radius);
        Le::new(ray, Normal3f::from(d), pdf_pos, uniform_sphere_pdf(), self.l_emit)
    }

    /// Returns radiance arriving along a ray that escaped the scene.
    ///
    /// * `ray` - The escaped ray.
    fn le(&self, _ray: &Ray) -> Spectrum {
        self.l_emit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn test_light() -> InfiniteAreaLight {
        let bound = Bounds3f::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0));
        InfiniteAreaLight::new(Spectrum::new(0.5), bound)
    }

    #[test]
    fn escaped_rays_see_constant_radiance() {
        let light = test_light();
        let ray = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 1.0, 0.0), INFINITY);
        assert_eq!(light.le(&ray), Spectrum::new(0.5));
    }

    #[test]
    fn incident_sampling_is_uniform_over_the_sphere() {
        let light = test_light();
        let hit = Hit::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), Normal3f::new(0.0, 0.0, 1.0));
        let li = light.sample_li(&hit, &Point2f::new(0.3, 0.8));
        assert_approx_eq!(Float, li.pdf, INV_FOUR_PI, epsilon = 1e-7);
        assert_approx_eq!(Float, li.wi.length(), 1.0, epsilon = 1e-5);
        assert_eq!(li.value, Spectrum::new(0.5));
    }

    #[test]
    fn emitted_rays_start_outside_and_point_into_the_scene() {
        let light = test_light();
        let le = light.sample_le(&Point2f::new(0.25, 0.5), &Point2f::new(0.5, 0.5));

        // The origin must be at least one world radius away from the center
        // and the direction must point back towards the scene.
        let to_center = Point3f::new(0.0, 0.0, 0.0) - le.ray.o;
        assert!(to_center.length() >= 3.0_f32.sqrt() - 1e-3);
        assert!(le.ray.d.dot(&to_center) > 0.0);
        assert!(le.pdf_pos > 0.0);
        assert_approx_eq!(Float, le.pdf_dir, INV_FOUR_PI, epsilon = 1e-7);
    }
}
