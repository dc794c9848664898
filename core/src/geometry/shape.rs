//! Shape

use super::{Bounds3f, Normal3f, Point2f, Point3f, Ray};
use crate::pbrt::*;
use std::sync::Arc;

/// Result of a ray-shape intersection test.
#[derive(Copy, Clone, Debug)]
pub struct ShapeHit {
    /// Ray parameter at the hit point.
    pub t: Float,

    /// The hit point.
    pub p: Point3f,

    /// Geometric surface normal at the hit point.
    pub n: Normal3f,
}

/// Interface for geometric shapes. Shapes are defined directly in world
/// space; there is no object-to-world transform stack.
pub trait Shape: Send + Sync {
    /// Returns a bounding box in world space.
    fn world_bound(&self) -> Bounds3f;

    /// Returns geometric details if the ray intersects the shape.
    ///
    /// * `ray` - The ray; `ray.t_max` bounds the parametric extent.
    fn intersect(&self, ray: &Ray) -> Option<ShapeHit>;

    /// Returns `true` if the ray intersects the shape.
    ///
    /// * `ray` - The ray.
    fn intersect_p(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }

    /// Returns the surface area of the shape.
    fn area(&self) -> Float;

    /// Samples a point on the surface, uniform over area. Returns the point
    /// and the surface normal there.
    ///
    /// * `u` - Uniform random sample in `[0, 1)^2`.
    fn sample_area(&self, u: &Point2f) -> (Point3f, Normal3f);
}

/// Atomic reference counted `Shape`.
pub type ArcShape = Arc<dyn Shape + Send + Sync>;
