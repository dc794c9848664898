//! 3-D axis-aligned bounding boxes

use super::{Point3f, Vector3f};
use crate::pbrt::*;
use std::fmt;

/// A 3-D axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds3f {
    /// Minimum corner.
    pub p_min: Point3f,

    /// Maximum corner.
    pub p_max: Point3f,
}

impl Bounds3f {
    /// Creates a new bounding box from two corner points.
    ///
    /// * `p1` - First corner.
    /// * `p2` - Second corner.
    pub fn new(p1: Point3f, p2: Point3f) -> Self {
        Self {
            p_min: Point3f::new(min(p1.x, p2.x), min(p1.y, p2.y), min(p1.z, p2.z)),
            p_max: Point3f::new(max(p1.x, p2.x), max(p1.y, p2.y), max(p1.z, p2.z)),
        }
    }

    /// Creates a bounding box containing a single point.
    ///
    /// * `p` - The point.
    pub fn from_point(p: Point3f) -> Self {
        Self { p_min: p, p_max: p }
    }

    /// Returns true if the box contains no points.
    pub fn is_empty(&self) -> bool {
        self.p_min.x > self.p_max.x || self.p_min.y > self.p_max.y || self.p_min.z > self.p_max.z
    }

    /// Returns the union of this box and a point.
    ///
    /// * `p` - The point.
    pub fn union_point(&self, p: &Point3f) -> Self {
        Self {
            p_min: Point3f::new(min(self.p_min.x, p.x), min(self.p_min.y, p.y), min(self.p_min.z, p.z)),
            p_max: Point3f::new(max(self.p_max.x, p.x), max(self.p_max.y, p.y), max(self.p_max.z, p.z)),
        }
    }

    /// Returns the union of this box and another.
    ///
    /// * `other` - The other box.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            p_min: Point3f::new(
                min(self.p_min.x, other.p_min.x),
                min(self.p_min.y, other.p_min.y),
                min(self.p_min.z, other.p_min.z),
            ),
            p_max: Point3f::new(
                max(self.p_max.x, other.p_max.x),
                max(self.p_max.y, other.p_max.y),
                max(self.p_max.z, other.p_max.z),
            ),
        }
    }

    /// Returns the vector along the box diagonal.
    pub fn diagonal(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    /// Returns the axis with the largest extent.
    pub fn maximum_extent(&self) -> Axis {
        self.diagonal().max_dimension()
    }

    /// Returns the center and radius of a sphere bounding the box.
    pub fn bounding_sphere(&self) -> (Point3f, Float) {
        let center = Point3f::new(
            0.5 * (self.p_min.x + self.p_max.x),
            0.5 * (self.p_min.y + self.p_max.y),
            0.5 * (self.p_min.z + self.p_max.z),
        );
        let radius = if self.is_empty() { 0.0 } else { center.distance(&self.p_max) };
        (center, radius)
    }
}

impl Default for Bounds3f {
    /// Returns an empty box that unions correctly with points and boxes.
    fn default() -> Self {
        Self {
            p_min: Point3f::new(INFINITY, INFINITY, INFINITY),
            p_max: Point3f::new(-INFINITY, -INFINITY, -INFINITY),
        }
    }
}

impl fmt::Display for Bounds3f {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bounds3f {{ p_min: {}, p_max: {} }}", self.p_min, self.p_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_grows_bounds() {
        let b = Bounds3f::default()
            .union_point(&Point3f::new(1.0, 2.0, 3.0))
            .union_point(&Point3f::new(-2.0, 0.0, 5.0));
        assert_eq!(b.p_min, Point3f::new(-2.0, 0.0, 3.0));
        assert_eq!(b.p_max, Point3f::new(1.0, 2.0, 5.0));
        assert_eq!(b.maximum_extent(), Axis::X);
    }

    #[test]
    fn bounding_sphere_encloses_box() {
        let b = Bounds3f::new(Point3f::new(-1.0, -1.0, -1.0), Point3f::new(1.0, 1.0, 1.0));
        let (c, r) = b.bounding_sphere();
        assert_eq!(c, Point3f::ZERO);
        assert!(r >= 3.0f32.sqrt() - 1e-6);
    }
}
