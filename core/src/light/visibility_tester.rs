//! Visibility Tester

use crate::interaction::Hit;
use crate::scene::Scene;

/// An occlusion query between two points, evaluated lazily.
#[derive(Copy, Clone)]
pub struct VisibilityTester {
    /// One endpoint, usually the shading point.
    pub p0: Hit,

    /// The other endpoint, usually a point on a light.
    pub p1: Hit,
}

impl VisibilityTester {
    /// Create a new `VisibilityTester`.
    ///
    /// * `p0` - One endpoint.
    /// * `p1` - The other endpoint.
    pub fn new(p0: Hit, p1: Hit) -> Self {
        Self { p0, p1 }
    }

    /// Returns true if no scene geometry blocks the segment between the two
    /// endpoints.
    ///
    /// * `scene` - The scene.
    pub fn unoccluded(&self, scene: &Scene) -> bool {
        !scene.intersect_p(&self.p0.spawn_ray_to(&self.p1.p))
    }
}
