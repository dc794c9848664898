//! Diffuse Area Light Source

use core::geometry::*;
use core::interaction::Hit;
use core::light::*;
use core::pbrt::*;
use core::sampling::*;
use core::spectrum::Spectrum;
use std::sync::Arc;

/// Implements a basic area light source with uniform spatial and directional
/// radiance distribution. The light emits from the side its shape's normals
/// point towards.
#[derive(Clone)]
pub struct DiffuseAreaLight {
    /// Emitted radiance.
    l_emit: Spectrum,

    /// Shape describing surface of the light source.
    shape: ArcShape,

    /// Surface area of the shape.
    area: Float,
}

impl DiffuseAreaLight {
    /// Returns a new `DiffuseAreaLight`.
    ///
    /// * `l_emit` - Emitted radiance.
    /// * `shape`  - Shape describing surface of the light source.
    pub fn new(l_emit: Spectrum, shape: ArcShape) -> Self {
        let area = shape.area();
        Self { l_emit, shape: Arc::clone(&shape), area }
    }

    /// Returns the shape describing the surface of the light source.
    pub fn shape(&self) -> ArcShape {
        Arc::clone(&self.shape)
    }
}

impl Light for DiffuseAreaLight {
    /// Returns the type of light.
    fn get_type(&self) -> LightType {
        LightType::AREA
    }

    /// Return the total emitted power.
    fn power(&self) -> Spectrum {
        self.l_emit * self.area * PI
    }

    /// Return the radiance arriving at an interaction point.
    ///
    /// * `hit` - The interaction hit point.
    /// * `u`   - Sample value for Monte Carlo integration.
    fn sample_li(&self, hit: &Hit, u: &Point2f) -> Li {
        let (p, n) = self.shape.sample_area(u);

        let d = p - hit.p;
        let dist_sq = d.length_squared();
        if dist_sq == 0.0 {
            return Li::new(Vector3f::ZERO, 0.0, None, Spectrum::ZERO);
        }
        let wi = d / dist_sq.sqrt();

        // Convert the area density to a solid angle density at the shading
        // point.
        let cos_theta = n.abs_dot(&(-wi));
        if cos_theta == 0.0 {
            return Li::new(wi, 0.0, None, Spectrum::ZERO);
        }
        let pdf = dist_sq / (cos_theta * self.area);

        let p_light = Hit::new(p, Vector3f::ZERO, n);
        let vis = VisibilityTester::new(*hit, p_light);
        Li::new(wi, pdf, Some(vis), self.l(&p_light, &(-wi)))
    }

    /// Returns the probability density with respect to solid angle for the
    /// light's `sample_li()`.
    ///
    /// * `hit` - The interaction hit point.
    /// * `wi`  - The incident direction.
    fn pdf_li(&self, hit: &Hit, wi: &Vector3f) -> Float {
        let ray = hit.spawn_ray(wi);
        let sh = match self.shape.intersect(&ray) {
            Some(sh) => sh,
            None => return 0.0,
        };

        let dist_sq = hit.p.distance_squared(&sh.p);
        let cos_theta = sh.n.abs_dot(&(-*wi));
        if cos_theta == 0.0 {
            return 0.0;
        }
        let pdf = dist_sq / (cos_theta * self.area);
        if pdf.is_infinite() {
            0.0
        } else {
            pdf
        }
    }

    /// Returns a sampled light-carrying ray leaving the light source.
    ///
    /// * `u1` - Sample value for the emission position.
    /// * `u2` - Sample value for the emission direction.
    fn sample_le(&self, u1: &Point2f, u2: &Point2f) -> Le {
        let (p, n) = self.shape.sample_area(u1);

        // Cosine-weighted direction in the hemisphere around the surface
        // normal.
        let w = cosine_sample_hemisphere(u2);
        let nv = Vector3f::from(n);
        let (v1, v2) = coordinate_system(&nv);
        let d = w.x * v1 + w.y * v2 + w.z * nv;

        let ray = Hit::new(p, Vector3f::ZERO, n).spawn_ray(&d);
        Le::new(ray, n, 1.0 / self.area, cosine_hemisphere_pdf(w.z), self.l_emit)
    }

    /// Returns the area light's emitted radiance in a given outgoing
    /// direction.
    ///
    /// * `hit` - Point on the light's surface.
    /// * `w`   - Outgoing direction.
    fn l(&self, hit: &Hit, w: &Vector3f) -> Spectrum {
        if hit.n.dot(w) > 0.0 {
            self.l_emit
        } else {
            Spectrum::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use shapes::Quad;

    fn unit_quad_light(l: Float) -> DiffuseAreaLight {
        let quad = Quad::new(
            Point3f::new(-0.5, -0.5, 1.0),
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
        );
        DiffuseAreaLight::new(Spectrum::new(l), Arc::new(quad))
    }

    #[test]
    fn power_scales_with_area_and_radiance() {
        let light = unit_quad_light(2.0);
        assert_approx_eq!(Float, light.power().y(), 2.0 * PI, epsilon = 1e-4);
    }

    #[test]
    fn emission_is_single_sided() {
        let light = unit_quad_light(1.0);
        let hit = Hit::new(Point3f::new(0.0, 0.0, 1.0), Vector3f::ZERO, Normal3f::new(0.0, 0.0, 1.0));
        assert!(!light.l(&hit, &Vector3f::new(0.0, 0.0, 1.0)).is_black());
        assert!(light.l(&hit, &Vector3f::new(0.0, 0.0, -1.0)).is_black());
    }

    #[test]
    fn sample_li_pdf_matches_solid_angle_conversion() {
        let light = unit_quad_light(1.0);
        let hit = Hit::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), Normal3f::new(0.0, 0.0, 1.0));

        // Quad normal is +z; flip the shading point above it so the sampled
        // point at u = (0.5, 0.5) sits straight up at distance 1.
        let li = light.sample_li(&hit, &Point2f::new(0.5, 0.5));
        assert_eq!(li.wi, Vector3f::new(0.0, 0.0, 1.0));
        assert_approx_eq!(Float, li.pdf, 1.0, epsilon = 1e-5);
        // The shading point is below the emitting side.
        assert!(li.value.is_black());

        let pdf = light.pdf_li(&hit, &Vector3f::new(0.0, 0.0, 1.0));
        assert_approx_eq!(Float, pdf, li.pdf, epsilon = 1e-3);
    }

    #[test]
    fn emitted_rays_leave_the_emitting_side() {
        let light = unit_quad_light(1.0);
        for i in 0..8 {
            let u1 = Point2f::new((i as Float + 0.5) / 8.0, 0.5);
            let u2 = Point2f::new(0.5, (i as Float + 0.5) / 8.0);
            let le = light.sample_le(&u1, &u2);
            assert!(le.ray.d.dot(&le.n_light) >= 0.0);
            assert_approx_eq!(Float, le.pdf_pos, 1.0, epsilon = 1e-5);
            assert!(le.pdf_dir > 0.0);
        }
    }
}
