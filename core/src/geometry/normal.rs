//! 3-D normals

use super::{Cross, Dot, FaceForward, Vector3f};
use crate::pbrt::*;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg};

/// A 3-D surface normal of `Float` components. A normal is not necessarily
/// unit length; callers normalize where it matters.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Normal3f {
    /// X-component.
    pub x: Float,

    /// Y-component.
    pub y: Float,

    /// Z-component.
    pub z: Float,
}

impl Normal3f {
    /// Zero normal.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    /// Creates a new 3-D normal.
    ///
    /// * `x` - X-component.
    /// * `y` - Y-component.
    /// * `z` - Z-component.
    pub fn new(x: Float, y: Float, z: Float) -> Self {
        Self { x, y, z }
    }

    /// Returns the square of the normal's length.
    pub fn length_squared(&self) -> Float {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Returns the normal's length.
    pub fn length(&self) -> Float {
        self.length_squared().sqrt()
    }

    /// Returns the unit normal.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        debug_assert!(len > 0.0);
        let inv = 1.0 / len;
        Self::new(self.x * inv, self.y * inv, self.z * inv)
    }
}

impl Dot<Normal3f> for Normal3f {
    /// Returns the dot product with another normal.
    ///
    /// * `other` - The other normal.
    fn dot(&self, other: &Normal3f) -> Float {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl Dot<Vector3f> for Normal3f {
    /// Returns the dot product with a vector.
    ///
    /// * `other` - The vector.
    fn dot(&self, other: &Vector3f) -> Float {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl Cross<Vector3f> for Normal3f {
    type Output = Vector3f;

    /// Returns the cross product with a vector.
    ///
    /// * `other` - The vector.
    fn cross(&self, other: &Vector3f) -> Self::Output {
        Vector3f::new(
            (self.y * other.z) - (self.z * other.y),
            (self.z * other.x) - (self.x * other.z),
            (self.x * other.y) - (self.y * other.x),
        )
    }
}

impl FaceForward<Vector3f> for Normal3f {}
impl FaceForward<Normal3f> for Normal3f {}

impl Add for Normal3f {
    type Output = Self;

    /// Adds the given normal.
    ///
    /// * `other` - The normal to add.
    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl AddAssign for Normal3f {
    /// Performs the `+=` operation.
    ///
    /// * `other` - The normal to add.
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Mul<Float> for Normal3f {
    type Output = Self;

    /// Scales the normal.
    ///
    /// * `f` - The scaling factor.
    fn mul(self, f: Float) -> Self::Output {
        Self::new(self.x * f, self.y * f, self.z * f)
    }
}

impl Neg for Normal3f {
    type Output = Self;

    /// Returns the normal pointing in the opposite direction.
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl From<Vector3f> for Normal3f {
    /// Converts a vector to a normal.
    ///
    /// * `v` - The vector.
    fn from(v: Vector3f) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl fmt::Display for Normal3f {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_forward_flips_against_vector() {
        let n = Normal3f::new(0.0, 0.0, 1.0);
        let v = Vector3f::new(0.0, 0.0, -1.0);
        assert_eq!(n.face_forward(&v), Normal3f::new(0.0, 0.0, -1.0));

        let w = Vector3f::new(0.1, 0.1, 1.0);
        assert_eq!(n.face_forward(&w), n);
    }
}
