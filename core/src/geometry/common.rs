//! Common

use super::Vector3f;
use crate::pbrt::*;

/// Dot product trait.
pub trait Dot<V> {
    /// Returns the dot product.
    ///
    /// * `other` - The other vector/normal.
    fn dot(&self, other: &V) -> Float;

    /// Returns the absolute value of the dot product.
    ///
    /// * `other` - The other vector/normal.
    fn abs_dot(&self, other: &V) -> Float {
        abs(self.dot(other))
    }
}

/// Cross product trait.
pub trait Cross<V> {
    type Output;

    /// Returns the cross product.
    ///
    /// * `other` - The other vector/normal.
    fn cross(&self, other: &V) -> Self::Output;
}

/// FaceForward trait allows pointing vectors in the same hemisphere as
/// another normal/vector.
pub trait FaceForward<V>
where
    Self: Dot<V> + std::ops::Neg<Output = Self> + Sized + Copy,
{
    /// If the vector/normal is not in the same hemisphere as another,
    /// return the flipped vector/normal. Otherwise, return itself.
    ///
    /// * `other` - The other vector/normal.
    fn face_forward(&self, other: &V) -> Self {
        if self.dot(other) < 0.0 {
            -*self
        } else {
            *self
        }
    }
}

/// Returns an orthonormal coordinate system based on a single unit vector.
///
/// * `v1` - The first unit vector.
pub fn coordinate_system(v1: &Vector3f) -> (Vector3f, Vector3f) {
    let v2 = if abs(v1.x) > abs(v1.y) {
        Vector3f::new(-v1.z, 0.0, v1.x) / (v1.x * v1.x + v1.z * v1.z).sqrt()
    } else {
        Vector3f::new(0.0, v1.z, -v1.y) / (v1.y * v1.y + v1.z * v1.z).sqrt()
    };
    let v3 = v1.cross(&v2);
    (v2, v3)
}
