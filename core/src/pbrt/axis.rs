//! Axis

/// Coordinate axes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl From<usize> for Axis {
    /// Maps an index in `[0, 2]` to the corresponding axis.
    ///
    /// * `i` - The index.
    fn from(i: usize) -> Self {
        match i {
            0 => Axis::X,
            1 => Axis::Y,
            2 => Axis::Z,
            _ => panic!("invalid axis index {}", i),
        }
    }
}

impl From<Axis> for usize {
    /// Maps an axis to its index.
    ///
    /// * `axis` - The axis.
    fn from(axis: Axis) -> Self {
        axis as usize
    }
}
