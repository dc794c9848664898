//! RGB spectrum

use crate::pbrt::*;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub};

/// A spectral power distribution represented by red, green and blue samples.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RGBSpectrum {
    /// The RGB samples.
    c: [Float; 3],
}

/// The spectrum representation used throughout.
pub type Spectrum = RGBSpectrum;

impl RGBSpectrum {
    /// Black.
    pub const ZERO: Self = Self { c: [0.0; 3] };

    /// Creates a constant spectrum.
    ///
    /// * `v` - The value of all samples.
    pub fn new(v: Float) -> Self {
        Self { c: [v, v, v] }
    }

    /// Creates a spectrum from RGB samples.
    ///
    /// * `r` - The red sample.
    /// * `g` - The green sample.
    /// * `b` - The blue sample.
    pub fn from_rgb(r: Float, g: Float, b: Float) -> Self {
        Self { c: [r, g, b] }
    }

    /// Returns the RGB samples.
    pub fn to_rgb(&self) -> [Float; 3] {
        self.c
    }

    /// Returns true if all samples are zero.
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|&v| v == 0.0)
    }

    /// Returns true if any sample is NaN.
    pub fn has_nans(&self) -> bool {
        self.c.iter().any(|v| v.is_nan())
    }

    /// Returns the luminance.
    pub fn y(&self) -> Float {
        const W: [Float; 3] = [0.212671, 0.715160, 0.072169];
        W[0] * self.c[0] + W[1] * self.c[1] + W[2] * self.c[2]
    }

    /// Returns the largest sample value.
    pub fn max_component_value(&self) -> Float {
        max(self.c[0], max(self.c[1], self.c[2]))
    }

    /// Returns the spectrum with each sample clamped to the given bounds.
    ///
    /// * `low`  - Lower bound.
    /// * `high` - Upper bound.
    pub fn clamp(&self, low: Float, high: Float) -> Self {
        Self {
            c: [
                clamp(self.c[0], low, high),
                clamp(self.c[1], low, high),
                clamp(self.c[2], low, high),
            ],
        }
    }
}

impl Add for RGBSpectrum {
    type Output = Self;

    /// Adds the sample values of the other spectrum.
    ///
    /// * `other` - The other spectrum.
    fn add(self, other: Self) -> Self::Output {
        Self {
            c: [self.c[0] + other.c[0], self.c[1] + other.c[1], self.c[2] + other.c[2]],
        }
    }
}

impl AddAssign for RGBSpectrum {
    /// Performs the `+=` operation.
    ///
    /// * `other` - The other spectrum.
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for RGBSpectrum {
    type Output = Self;

    /// Subtracts the sample values of the other spectrum.
    ///
    /// * `other` - The other spectrum.
    fn sub(self, other: Self) -> Self::Output {
        Self {
            c: [self.c[0] - other.c[0], self.c[1] - other.c[1], self.c[2] - other.c[2]],
        }
    }
}

impl Mul for RGBSpectrum {
    type Output = Self;

    /// Multiplies the sample values with the other spectrum.
    ///
    /// * `other` - The other spectrum.
    fn mul(self, other: Self) -> Self::Output {
        Self {
            c: [self.c[0] * other.c[0], self.c[1] * other.c[1], self.c[2] * other.c[2]],
        }
    }
}

impl MulAssign for RGBSpectrum {
    /// Performs the `*=` operation.
    ///
    /// * `other` - The other spectrum.
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}

impl Mul<Float> for RGBSpectrum {
    type Output = Self;

    /// Scales the sample values.
    ///
    /// * `f` - The scaling factor.
    fn mul(self, f: Float) -> Self::Output {
        Self { c: [self.c[0] * f, self.c[1] * f, self.c[2] * f] }
    }
}

impl Mul<RGBSpectrum> for Float {
    type Output = RGBSpectrum;

    /// Scales the sample values.
    ///
    /// * `s` - The spectrum.
    fn mul(self, s: RGBSpectrum) -> Self::Output {
        s * self
    }
}

impl MulAssign<Float> for RGBSpectrum {
    /// Performs the `*=` operation with a scale factor.
    ///
    /// * `f` - The scaling factor.
    fn mul_assign(&mut self, f: Float) {
        *self = *self * f;
    }
}

impl Div<Float> for RGBSpectrum {
    type Output = Self;

    /// Scales the sample values by `1 / f`.
    ///
    /// * `f` - The divisor.
    fn div(self, f: Float) -> Self::Output {
        debug_assert!(f != 0.0);
        let inv = 1.0 / f;
        Self { c: [self.c[0] * inv, self.c[1] * inv, self.c[2] * inv] }
    }
}

impl DivAssign<Float> for RGBSpectrum {
    /// Performs the `/=` operation with a divisor.
    ///
    /// * `f` - The divisor.
    fn div_assign(&mut self, f: Float) {
        *self = *self / f;
    }
}

impl Sum for RGBSpectrum {
    /// Sums a sequence of spectrums.
    ///
    /// * `iter` - The iterator.
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |a, b| a + b)
    }
}

impl fmt::Display for RGBSpectrum {
    /// Formats the value using the given formatter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.c[0], self.c[1], self.c[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn luminance_of_white_is_one() {
        let s = RGBSpectrum::new(1.0);
        assert!(approx_eq!(Float, s.y(), 1.0, epsilon = 1e-5));
    }

    #[test]
    fn black_detection() {
        assert!(RGBSpectrum::ZERO.is_black());
        assert!(!RGBSpectrum::from_rgb(0.0, 0.1, 0.0).is_black());
    }

    #[test]
    fn arithmetic_is_componentwise() {
        let a = RGBSpectrum::from_rgb(1.0, 2.0, 3.0);
        let b = RGBSpectrum::from_rgb(2.0, 0.5, 1.0);
        assert_eq!(a * b, RGBSpectrum::from_rgb(2.0, 1.0, 3.0));
        assert_eq!(a + b, RGBSpectrum::from_rgb(3.0, 2.5, 4.0));
        assert_eq!((a * 2.0) / 2.0, a);
    }
}
