//! Primitive List

use crate::geometry::*;
use crate::interaction::SurfaceInteraction;
use crate::light::ArcLight;
use crate::material::ArcMaterial;
use crate::pbrt::*;
use crate::primitive::{ArcPrimitive, Primitive};
use std::sync::Arc;

/// An aggregate that tests every contained primitive in turn. Sufficient for
/// the small analytic scenes this renderer assembles; a hierarchy can slot
/// in behind the same interface.
pub struct PrimitiveList {
    /// The primitives.
    primitives: Vec<ArcPrimitive>,

    /// World-space bounds of all primitives.
    world_bound: Bounds3f,
}

impl PrimitiveList {
    /// Create a new `PrimitiveList`.
    ///
    /// * `primitives` - The primitives.
    pub fn new(primitives: Vec<ArcPrimitive>) -> Self {
        let world_bound = primitives
            .iter()
            .fold(Bounds3f::default(), |b, p| b.union(&p.world_bound()));
        Self { primitives, world_bound }
    }
}

impl Primitive for PrimitiveList {
    /// Returns a bounding box in world space.
    fn world_bound(&self) -> Bounds3f {
        self.world_bound
    }

    /// Intersects the ray against all primitives, returning the nearest hit
    /// with its primitive attached.
    ///
    /// * `ray` - The ray.
    fn intersect<'arena>(&self, ray: &mut Ray) -> Option<SurfaceInteraction<'arena>> {
        let mut nearest: Option<SurfaceInteraction<'arena>> = None;
        for prim in self.primitives.iter() {
            // Each hit shrinks `ray.t_max`, so later hits are closer.
            if let Some(mut si) = prim.intersect(ray) {
                si.primitive = Some(Arc::clone(prim));
                nearest = Some(si);
            }
        }
        nearest
    }

    /// Returns `true` if the ray intersects any primitive.
    ///
    /// * `ray` - The ray.
    fn intersect_p(&self, ray: &Ray) -> bool {
        self.primitives.iter().any(|prim| prim.intersect_p(ray))
    }

    /// Returns the total surface area of all primitives.
    fn area(&self) -> Float {
        self.primitives.iter().map(|prim| prim.area()).sum()
    }

    /// Aggregates have no material of their own.
    fn get_material(&self) -> Option<ArcMaterial> {
        None
    }

    /// Aggregates have no area light of their own.
    fn get_area_light(&self) -> Option<ArcLight> {
        None
    }
}
