//! Scene

use crate::geometry::*;
use crate::interaction::SurfaceInteraction;
use crate::light::{ArcLight, LightType};
use crate::pbrt::*;
use crate::primitive::ArcPrimitive;
use std::sync::Arc;

/// A scene: the aggregate of all geometric primitives plus the light
/// sources.
pub struct Scene {
    /// The aggregate primitive holding all scene geometry.
    pub aggregate: ArcPrimitive,

    /// All light sources.
    pub lights: Vec<ArcLight>,

    /// The subset of lights at infinity, consulted when a ray escapes the
    /// scene.
    pub infinite_lights: Vec<ArcLight>,

    /// World-space bounds of the scene geometry.
    world_bound: Bounds3f,
}

impl Scene {
    /// Create a new `Scene`.
    ///
    /// * `aggregate` - The aggregate primitive holding all scene geometry.
    /// * `lights`    - All light sources.
    pub fn new(aggregate: ArcPrimitive, lights: Vec<ArcLight>) -> Self {
        let world_bound = aggregate.world_bound();
        let infinite_lights = lights
            .iter()
            .filter(|l| l.get_type().intersects(LightType::INFINITE))
            .map(Arc::clone)
            .collect();
        Self {
            aggregate,
            lights,
            infinite_lights,
            world_bound,
        }
    }

    /// Returns the world-space bounds of the scene geometry.
    pub fn world_bound(&self) -> Bounds3f {
        self.world_bound
    }

    /// Intersects the ray against the scene geometry, returning the nearest
    /// hit. `ray.t_max` is updated to the hit distance.
    ///
    /// * `ray` - The ray.
    pub fn intersect<'arena>(&self, ray: &mut Ray) -> Option<SurfaceInteraction<'arena>> {
        debug_assert!(ray.d != Vector3f::ZERO);
        self.aggregate.intersect(ray)
    }

    /// Returns `true` if the ray intersects any scene geometry. Faster than
    /// `intersect()`; used for shadow rays.
    ///
    /// * `ray` - The ray.
    pub fn intersect_p(&self, ray: &Ray) -> bool {
        debug_assert!(ray.d != Vector3f::ZERO);
        self.aggregate.intersect_p(ray)
    }

    /// Returns the total surface area of the scene geometry; used to derive
    /// analytic photon-lookup radii from photon densities.
    pub fn total_area(&self) -> Float {
        self.aggregate.area()
    }
}
