//! 2-D points

use crate::pbrt::*;
use std::fmt;
use std::ops::Index;

/// A 2-D point of `Float` coordinates, used mostly as a uniform random
/// sample in `[0, 1)^2`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point2f {
    /// X-coordinate.
    pub x: Float,

    /// Y-coordinate.
    pub y: Float,
}

impl Point2f {
    /// Origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Creates a new 2-D point.
    ///
    /// * `x` - X-coordinate.
    /// * `y` - Y-coordinate.
    pub fn new(x: Float, y: Float) -> Self {
        Self { x, y }
    }
}

impl Index<usize> for Point2f {
    type Output = Float;

    /// Indexes the point by coordinate index.
    ///
    /// * `i` - The index in `[0, 1]`.
    fn index(&self, i: usize) -> &Self::Output {
        match i {
            0 => &self.x,
            1 => &self.y,
            _ => panic!("invalid coordinate index {}", i),
        }
    }
}

impl fmt::Display for Point2f {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}
