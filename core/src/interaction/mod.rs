//! Interactions

use crate::geometry::*;
use crate::pbrt::*;

mod surface_interaction;

// Re-export.
pub use surface_interaction::*;

/// A point on a surface together with the direction the incoming ray arrived
/// from and the geometric normal.
#[derive(Copy, Clone, Debug, Default)]
pub struct Hit {
    /// The point of interaction.
    pub p: Point3f,

    /// The negative ray direction (outgoing direction used when computing
    /// lighting at the point).
    pub wo: Vector3f,

    /// Geometric surface normal; zero for interactions without a surface
    /// (such as points sampled on delta lights).
    pub n: Normal3f,
}

impl Hit {
    /// Create a new hit.
    ///
    /// * `p`  - The point of interaction.
    /// * `wo` - The negative ray direction.
    /// * `n`  - Geometric surface normal.
    pub fn new(p: Point3f, wo: Vector3f, n: Normal3f) -> Self {
        Self { p, wo, n }
    }

    /// Create a hit for a point without surface information.
    ///
    /// * `p` - The point of interaction.
    pub fn from_point(p: Point3f) -> Self {
        Self {
            p,
            wo: Vector3f::ZERO,
            n: Normal3f::ZERO,
        }
    }

    /// Returns the ray origin for a ray leaving the surface in the given
    /// direction, pushed off the surface to avoid self-intersection.
    ///
    /// * `d` - The ray direction.
    pub fn offset_origin(&self, d: &Vector3f) -> Point3f {
        if self.n == Normal3f::ZERO {
            return self.p;
        }
        let offset = Vector3f::from(self.n.face_forward(d)) * SHADOW_EPSILON;
        self.p + offset
    }

    /// Spawns a new ray in the given direction.
    ///
    /// * `d` - The direction.
    pub fn spawn_ray(&self, d: &Vector3f) -> Ray {
        Ray::new(self.offset_origin(d), *d, INFINITY)
    }

    /// Spawns a new ray towards another point, with extent stopping just
    /// short of it.
    ///
    /// * `p2` - The target point.
    pub fn spawn_ray_to(&self, p2: &Point3f) -> Ray {
        let origin = self.offset_origin(&(*p2 - self.p));
        Ray::new(origin, *p2 - origin, 1.0 - SHADOW_EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_ray_origin_is_off_the_surface() {
        let hit = Hit::new(
            Point3f::ZERO,
            Vector3f::new(0.0, 0.0, 1.0),
            Normal3f::new(0.0, 0.0, 1.0),
        );

        let above = hit.spawn_ray(&Vector3f::new(0.0, 0.0, 1.0));
        assert!(above.o.z > 0.0);

        let below = hit.spawn_ray(&Vector3f::new(0.0, 0.0, -1.0));
        assert!(below.o.z < 0.0);
    }

    #[test]
    fn spawn_ray_to_stops_short_of_target() {
        let hit = Hit::new(
            Point3f::ZERO,
            Vector3f::new(0.0, 0.0, 1.0),
            Normal3f::new(0.0, 0.0, 1.0),
        );
        let target = Point3f::new(0.0, 0.0, 2.0);
        let ray = hit.spawn_ray_to(&target);
        assert!(ray.at(ray.t_max).z < 2.0);
    }
}
