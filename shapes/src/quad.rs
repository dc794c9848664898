//! Quads

use core::geometry::*;
use core::pbrt::*;

/// A planar parallelogram, defined in world space by an origin corner and two
/// edge vectors.
#[derive(Clone)]
pub struct Quad {
    /// Corner of the quad.
    origin: Point3f,

    /// First edge vector.
    e1: Vector3f,

    /// Second edge vector.
    e2: Vector3f,

    /// Unit normal of the quad's plane, oriented by `e1 x e2`.
    normal: Normal3f,

    /// Area of the quad.
    area: Float,
}

impl Quad {
    /// Create a new `Quad`.
    ///
    /// * `origin` - Corner of the quad.
    /// * `e1`     - First edge vector.
    /// * `e2`     - Second edge vector.
    pub fn new(origin: Point3f, e1: Vector3f, e2: Vector3f) -> Self {
        let cross = e1.cross(&e2);
        let area = cross.length();
        assert!(area > 0.0, "degenerate quad");
        let normal = Normal3f::from(cross / area);
        Self { origin, e1, e2, normal, area }
    }
}

impl Shape for Quad {
    /// Returns a bounding box in world space.
    fn world_bound(&self) -> Bounds3f {
        Bounds3f::new(self.origin, self.origin + self.e1)
            .union_point(&(self.origin + self.e2))
            .union_point(&(self.origin + self.e1 + self.e2))
    }

    /// Returns geometric details if the ray intersects the quad.
    ///
    /// * `ray` - The ray.
    fn intersect(&self, ray: &Ray) -> Option<ShapeHit> {
        let denom = ray.d.dot(&self.normal);
        if denom == 0.0 {
            return None;
        }

        let t = (self.origin - ray.o).dot(&self.normal) / denom;
        if t <= 0.0 || t >= ray.t_max {
            return None;
        }

        // Project the hit point onto the edge vectors and check the
        // parametric coordinates.
        let p = ray.at(t);
        let d = p - self.origin;
        let u = d.dot(&self.e1) / self.e1.length_squared();
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let v = d.dot(&self.e2) / self.e2.length_squared();
        if !(0.0..=1.0).contains(&v) {
            return None;
        }

        Some(ShapeHit { t, p, n: self.normal })
    }

    /// Returns the surface area of the quad.
    fn area(&self) -> Float {
        self.area
    }

    /// Samples a point on the quad, uniform over area.
    ///
    /// * `u` - Uniform random sample in `[0, 1)^2`.
    fn sample_area(&self, u: &Point2f) -> (Point3f, Normal3f) {
        (self.origin + self.e1 * u.x + self.e2 * u.y, self.normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    fn unit_quad() -> Quad {
        Quad::new(Point3f::ZERO, Vector3f::new(1.0, 0.0, 0.0), Vector3f::new(0.0, 1.0, 0.0))
    }

    #[test]
    fn ray_hits_quad_inside_edges() {
        let quad = unit_quad();
        let ray = Ray::new(Point3f::new(0.25, 0.75, 3.0), Vector3f::new(0.0, 0.0, -1.0), INFINITY);
        let sh = quad.intersect(&ray).unwrap();
        assert_eq!(sh.t, 3.0);
        assert_eq!(sh.p, Point3f::new(0.25, 0.75, 0.0));
        assert_eq!(sh.n, Normal3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn ray_misses_quad_outside_edges() {
        let quad = unit_quad();
        let ray = Ray::new(Point3f::new(1.25, 0.5, 3.0), Vector3f::new(0.0, 0.0, -1.0), INFINITY);
        assert!(quad.intersect(&ray).is_none());
    }

    #[test]
    fn hit_beyond_t_max_is_ignored() {
        let quad = unit_quad();
        let ray = Ray::new(Point3f::new(0.5, 0.5, 3.0), Vector3f::new(0.0, 0.0, -1.0), 2.0);
        assert!(quad.intersect(&ray).is_none());
    }

    #[test]
    fn area_of_skewed_quad() {
        let quad = Quad::new(
            Point3f::ZERO,
            Vector3f::new(2.0, 0.0, 0.0),
            Vector3f::new(1.0, 3.0, 0.0),
        );
        assert_approx_eq!(Float, quad.area(), 6.0, epsilon = 1e-5);
    }

    #[test]
    fn sampled_points_span_the_quad() {
        let quad = Quad::new(
            Point3f::new(1.0, 1.0, 0.0),
            Vector3f::new(2.0, 0.0, 0.0),
            Vector3f::new(0.0, 2.0, 0.0),
        );
        let (p, n) = quad.sample_area(&Point2f::new(0.5, 0.5));
        assert_eq!(p, Point3f::new(2.0, 2.0, 0.0));
        assert_eq!(n, Normal3f::new(0.0, 0.0, 1.0));

        let (p, _) = quad.sample_area(&Point2f::new(0.0, 1.0));
        assert_eq!(p, Point3f::new(1.0, 3.0, 0.0));
    }
}
