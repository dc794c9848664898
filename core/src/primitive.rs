//! Primitive

use crate::geometry::*;
use crate::interaction::SurfaceInteraction;
use crate::light::ArcLight;
use crate::material::ArcMaterial;
use crate::pbrt::*;
use std::sync::Arc;

/// Interface for geometry in the scene: the bridge between shapes and the
/// materials and lights attached to them.
pub trait Primitive: Send + Sync {
    /// Returns a bounding box in world space.
    fn world_bound(&self) -> Bounds3f;

    /// Intersects the ray with the primitive, updating `ray.t_max` to the
    /// nearest hit.
    ///
    /// * `ray` - The ray.
    fn intersect<'arena>(&self, ray: &mut Ray) -> Option<SurfaceInteraction<'arena>>;

    /// Returns `true` if the ray intersects the primitive.
    ///
    /// * `ray` - The ray.
    fn intersect_p(&self, ray: &Ray) -> bool;

    /// Returns the total surface area of the primitive's geometry.
    fn area(&self) -> Float;

    /// Returns the material attached to the primitive.
    fn get_material(&self) -> Option<ArcMaterial>;

    /// Returns the area light whose emission this primitive carries.
    fn get_area_light(&self) -> Option<ArcLight>;
}

/// Atomic reference counted `Primitive`.
pub type ArcPrimitive = Arc<dyn Primitive + Send + Sync>;
