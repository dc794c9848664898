//! Common

use num_traits::Num;
use std::ops::Neg;

/// Default floating point precision.
pub type Float = f32;

/// Default signed integer.
pub type Int = i32;

/// Infinity.
pub const INFINITY: Float = Float::INFINITY;

/// PI
pub const PI: Float = std::f32::consts::PI;

/// 2 * PI
pub const TWO_PI: Float = 2.0 * PI;

/// 4 * PI
pub const FOUR_PI: Float = 4.0 * PI;

/// PI / 2
pub const PI_OVER_TWO: Float = PI / 2.0;

/// PI / 4
pub const PI_OVER_FOUR: Float = PI / 4.0;

/// 1 / PI
pub const INV_PI: Float = 1.0 / PI;

/// 1 / (2 * PI)
pub const INV_TWO_PI: Float = 1.0 / TWO_PI;

/// 1 / (4 * PI)
pub const INV_FOUR_PI: Float = 1.0 / FOUR_PI;

/// Offset used to push shadow ray endpoints off surfaces.
pub const SHADOW_EPSILON: Float = 0.0001;

/// Machine epsilon for 32-bit floats as used for rounding error bounds; this
/// is half the value of `f32::EPSILON`.
pub const MACHINE_EPSILON: Float = f32::EPSILON * 0.5;

/// Returns the smaller of two values.
///
/// * `a` - First value.
/// * `b` - Second value.
pub fn min<T: PartialOrd>(a: T, b: T) -> T {
    if a < b {
        a
    } else {
        b
    }
}

/// Returns the larger of two values.
///
/// * `a` - First value.
/// * `b` - Second value.
pub fn max<T: PartialOrd>(a: T, b: T) -> T {
    if a > b {
        a
    } else {
        b
    }
}

/// Returns the absolute value of a number.
///
/// * `n` - The number.
pub fn abs<T: Num + Neg<Output = T> + PartialOrd + Copy>(n: T) -> T {
    if n < T::zero() {
        -n
    } else {
        n
    }
}

/// Clamps a value between a lower and upper bound.
///
/// * `val`  - The value.
/// * `low`  - Lower bound.
/// * `high` - Upper bound.
pub fn clamp<T: PartialOrd>(val: T, low: T, high: T) -> T {
    if val < low {
        low
    } else if val > high {
        high
    } else {
        val
    }
}

/// Linearly interpolates between two values.
///
/// * `t` - Interpolation parameter.
/// * `a` - Value at `t == 0`.
/// * `b` - Value at `t == 1`.
pub fn lerp(t: Float, a: Float, b: Float) -> Float {
    (1.0 - t) * a + t * b
}

/// Conservative relative error bound for `n` floating point operations.
///
/// * `n` - Number of operations.
pub fn gamma(n: Int) -> Float {
    (n as Float * MACHINE_EPSILON) / (1.0 - n as Float * MACHINE_EPSILON)
}

/// Returns the cosine of a number in radians.
///
/// * `theta` - The angle in radians.
#[inline(always)]
pub fn cos(theta: Float) -> Float {
    theta.cos()
}

/// Returns the sine of a number in radians.
///
/// * `theta` - The angle in radians.
#[inline(always)]
pub fn sin(theta: Float) -> Float {
    theta.sin()
}

/// Returns the arccosine of a number in radians.
///
/// * `x` - The value.
#[inline(always)]
pub fn acos(x: Float) -> Float {
    x.acos()
}

/// Find the largest index `i` in `[0, size)` such that `pred(i)` is true;
/// clamped to `[0, size - 2]` so callers can safely interpolate between
/// `i` and `i + 1`.
///
/// * `size` - Size of the array.
/// * `pred` - The predicate; must be monotonic over the index range.
pub fn find_interval<P>(size: usize, pred: P) -> usize
where
    P: Fn(usize) -> bool,
{
    if size < 2 {
        return 0;
    }
    let (mut first, mut len) = (0, size);
    while len > 0 {
        let half = len >> 1;
        let middle = first + half;
        // Bisect range based on value of `pred` at `middle`.
        if pred(middle) {
            first = middle + 1;
            len -= half + 1;
        } else {
            len = half;
        }
    }
    clamp(first as isize - 1, 0, size as isize - 2) as usize
}

/// Returns the bit representation of a 32-bit float.
///
/// * `f` - The value.
pub fn float_to_bits(f: f32) -> u32 {
    f.to_bits()
}

/// Returns the 32-bit float for a given bit representation.
///
/// * `b` - The bits.
pub fn bits_to_float(b: u32) -> f32 {
    f32::from_bits(b)
}

/// Bumps a floating point value up to the next greater representable value.
///
/// * `v` - The value.
pub fn next_float_up(v: Float) -> Float {
    if v.is_infinite() && v > 0.0 {
        v
    } else {
        let nv = if v == -0.0 { 0.0 } else { v };
        let mut ui = float_to_bits(nv);
        if nv >= 0.0 {
            ui += 1;
        } else {
            ui -= 1;
        }
        bits_to_float(ui)
    }
}

/// Bumps a floating point value down to the next smaller representable value.
///
/// * `v` - The value.
pub fn next_float_down(v: Float) -> Float {
    if v.is_infinite() && v < 0.0 {
        v
    } else {
        let nv = if v == 0.0 { -0.0 } else { v };
        let mut ui = float_to_bits(nv);
        if nv > 0.0 {
            ui -= 1;
        } else {
            ui += 1;
        }
        bits_to_float(ui)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_returns_value_within_bounds() {
        assert_eq!(clamp(0.5, 0.0, 1.0), 0.5);
        assert_eq!(clamp(-2.0, 0.0, 1.0), 0.0);
        assert_eq!(clamp(2.0, 0.0, 1.0), 1.0);
    }

    #[test]
    fn lerp_interpolates_endpoints() {
        assert_eq!(lerp(0.0, 2.0, 8.0), 2.0);
        assert_eq!(lerp(1.0, 2.0, 8.0), 8.0);
        assert_eq!(lerp(0.5, 2.0, 8.0), 5.0);
    }

    #[test]
    fn find_interval_brackets_value() {
        let cdf = [0.0, 0.25, 0.5, 0.75, 1.0];
        assert_eq!(find_interval(cdf.len(), |i| cdf[i] <= 0.3), 1);
        assert_eq!(find_interval(cdf.len(), |i| cdf[i] <= 0.0), 0);
        assert_eq!(find_interval(cdf.len(), |i| cdf[i] <= 1.0), 3);
    }

    #[test]
    fn next_float_up_and_down_are_adjacent() {
        let v: Float = 1.0;
        let up = next_float_up(v);
        assert!(up > v);
        assert_eq!(next_float_down(up), v);

        assert_eq!(next_float_up(INFINITY), INFINITY);
        assert!(next_float_up(0.0) > 0.0);
        assert!(next_float_down(0.0) < 0.0);
    }
}
