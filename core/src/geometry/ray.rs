//! Rays

use super::{Point3f, Vector3f};
use crate::pbrt::*;
use std::fmt;

/// A semi-infinite line given by its origin and direction. The parametric
/// extent `t_max` is updated in place by intersection routines.
#[derive(Copy, Clone, Debug)]
pub struct Ray {
    /// Origin.
    pub o: Point3f,

    /// Direction.
    pub d: Vector3f,

    /// Maximum extent of the ray parameter.
    pub t_max: Float,
}

impl Ray {
    /// Creates a new ray.
    ///
    /// * `o`     - Origin.
    /// * `d`     - Direction.
    /// * `t_max` - Maximum extent of the ray parameter.
    pub fn new(o: Point3f, d: Vector3f, t_max: Float) -> Self {
        Self { o, d, t_max }
    }

    /// Returns the position along the ray at the given parameter.
    ///
    /// * `t` - The ray parameter.
    pub fn at(&self, t: Float) -> Point3f {
        self.o + self.d * t
    }
}

impl Default for Ray {
    /// Returns a degenerate ray at the origin with unbounded extent.
    fn default() -> Self {
        Self::new(Point3f::ZERO, Vector3f::ZERO, INFINITY)
    }
}

impl fmt::Display for Ray {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ray {{ o: {}, d: {}, t_max: {} }}", self.o, self.d, self.t_max)
    }
}
