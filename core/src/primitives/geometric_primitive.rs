//! Geometric Primitive

use crate::geometry::*;
use crate::interaction::SurfaceInteraction;
use crate::light::ArcLight;
use crate::material::ArcMaterial;
use crate::pbrt::*;
use crate::primitive::Primitive;

/// A single shape with its material and, optionally, the area light that
/// emits from it.
pub struct GeometricPrimitive {
    /// The shape.
    pub shape: ArcShape,

    /// The material.
    pub material: Option<ArcMaterial>,

    /// The area light emitting from the shape's surface.
    pub area_light: Option<ArcLight>,
}

impl GeometricPrimitive {
    /// Create a new `GeometricPrimitive`.
    ///
    /// * `shape`      - The shape.
    /// * `material`   - The material.
    /// * `area_light` - The area light emitting from the shape's surface.
    pub fn new(shape: ArcShape, material: Option<ArcMaterial>, area_light: Option<ArcLight>) -> Self {
        Self { shape, material, area_light }
    }
}

impl Primitive for GeometricPrimitive {
    /// Returns a bounding box in world space.
    fn world_bound(&self) -> Bounds3f {
        self.shape.world_bound()
    }

    /// Intersects the ray with the shape, updating `ray.t_max` to the
    /// nearest hit.
    ///
    /// * `ray` - The ray.
    fn intersect<'arena>(&self, ray: &mut Ray) -> Option<SurfaceInteraction<'arena>> {
        let sh = self.shape.intersect(ray)?;
        ray.t_max = sh.t;
        Some(SurfaceInteraction::new(sh.t, sh.p, -ray.d, sh.n))
    }

    /// Returns `true` if the ray intersects the shape.
    ///
    /// * `ray` - The ray.
    fn intersect_p(&self, ray: &Ray) -> bool {
        self.shape.intersect_p(ray)
    }

    /// Returns the surface area of the shape.
    fn area(&self) -> Float {
        self.shape.area()
    }

    /// Returns the material attached to the primitive.
    fn get_material(&self) -> Option<ArcMaterial> {
        self.material.clone()
    }

    /// Returns the area light whose emission this primitive carries.
    fn get_area_light(&self) -> Option<ArcLight> {
        self.area_light.clone()
    }
}
