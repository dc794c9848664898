//! Compressed unit directions

use super::Vector3f;
use crate::pbrt::*;

/// Number of distinct direction codes.
const TABLE_SIZE: usize = 1 << 16;

/// Sign bits for the x, y and z components.
const SIGN_X: u16 = 1 << 13;
const SIGN_Y: u16 = 1 << 14;
const SIGN_Z: u16 = 1 << 15;

lazy_static! {
    /// Decode table mapping every 16-bit code to the center direction of its
    /// quantization cell. Built once on first use.
    static ref DECODE_TABLE: Vec<Vector3f> = {
        (0..TABLE_SIZE).map(|c| decode_cell(c as u16)).collect()
    };
}

/// Reconstructs the cell-center direction for a code.
///
/// * `code` - The 16-bit code.
fn decode_cell(code: u16) -> Vector3f {
    let qx = ((code >> 6) & 0x7f) as Float;
    let qy = (code & 0x3f) as Float;

    // Folded cells are recognizable by their quantized sum exceeding the
    // quantization diagonal.
    let (x, y) = if qx + qy > 127.0 { (127.0 - qx, 127.0 - qy) } else { (qx, qy) };

    let mut v = Vector3f::new(x + 0.5, y + 0.5, 126.0 - x - y).normalize();
    if code & SIGN_X != 0 {
        v.x = -v.x;
    }
    if code & SIGN_Y != 0 {
        v.y = -v.y;
    }
    if code & SIGN_Z != 0 {
        v.z = -v.z;
    }
    v
}

/// A unit direction quantized to 16 bits: 3 sign bits, a 7-bit x magnitude
/// and a 6-bit y magnitude on the `x + y + z = const` octant plane. The
/// z magnitude is implied. Decompression goes through a 65536-entry table
/// and returns the center of the quantization cell, so compressing a
/// decompressed direction reproduces the original code.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CompressedDirection {
    /// Packed sign and magnitude bits.
    data: u16,
}

impl CompressedDirection {
    /// Compresses a unit direction.
    ///
    /// * `v` - The direction; must be unit length.
    pub fn new(v: Vector3f) -> Self {
        debug_assert!(!v.has_nans());

        let mut data = 0u16;
        if v.x < 0.0 {
            data |= SIGN_X;
        }
        if v.y < 0.0 {
            data |= SIGN_Y;
        }
        if v.z < 0.0 {
            data |= SIGN_Z;
        }

        let (ax, ay, az) = (abs(v.x), abs(v.y), abs(v.z));
        let scale = 126.999 / (ax + ay + az);
        let mut qx = (ax * scale) as u16;
        let mut qy = (ay * scale) as u16;

        // The y magnitude only has 6 bits; cells with `qy >= 64` are folded
        // across the octant diagonal.
        if qy >= 64 {
            qx = 127 - qx;
            qy = 127 - qy;
        }

        Self { data: data | (qx << 6) | qy }
    }

    /// Returns the center direction of the quantization cell.
    pub fn vector(&self) -> Vector3f {
        DECODE_TABLE[self.data as usize]
    }

    /// Returns the raw 16-bit code.
    pub fn code(&self) -> u16 {
        self.data
    }
}

impl From<Vector3f> for CompressedDirection {
    /// Compresses a unit direction.
    ///
    /// * `v` - The direction; must be unit length.
    fn from(v: Vector3f) -> Self {
        Self::new(v)
    }
}

impl From<CompressedDirection> for Vector3f {
    /// Returns the center direction of the quantization cell.
    ///
    /// * `c` - The compressed direction.
    fn from(c: CompressedDirection) -> Self {
        c.vector()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Dot;
    use crate::rng::RNG;
    use crate::sampling::uniform_sample_sphere;
    use crate::geometry::Point2f;

    #[test]
    fn round_trip_error_is_bounded() {
        let mut rng = RNG::new(1);
        for _ in 0..1000 {
            let u = Point2f::new(rng.uniform_float(), rng.uniform_float());
            let v = uniform_sample_sphere(&u);
            let c = CompressedDirection::new(v);
            let d = c.vector();
            // The cell-center reconstruction is within the quantization step.
            assert!(v.dot(&d) > 0.999, "{} vs {}", v, d);
        }
    }

    #[test]
    fn compress_is_idempotent_over_decompression() {
        let mut rng = RNG::new(2);
        for _ in 0..1000 {
            let u = Point2f::new(rng.uniform_float(), rng.uniform_float());
            let v = uniform_sample_sphere(&u);
            let c = CompressedDirection::new(v);
            assert_eq!(CompressedDirection::new(c.vector()), c);
        }
    }

    #[test]
    fn axis_directions_survive_compression() {
        for v in [
            Vector3f::new(1.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            Vector3f::new(0.0, 0.0, 1.0),
            Vector3f::new(0.0, 0.0, -1.0),
        ] {
            let d = CompressedDirection::new(v).vector();
            assert!(v.dot(&d) > 0.999, "{} vs {}", v, d);
        }
    }
}
