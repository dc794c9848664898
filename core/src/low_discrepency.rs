//! Low discrepancy sequences.

use crate::pbrt::*;
use crate::rng::ONE_MINUS_EPSILON;

/// Prime bases for the radical inverse, one per sample dimension.
pub const PRIMES: [u64; 16] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53];

/// Returns the radical inverse of `a` in the prime base selected by
/// `base_index`. Successive dimensions of a Halton-style sample vector use
/// successive prime bases.
///
/// * `base_index` - Index into `PRIMES` selecting the base.
/// * `a`          - The sample index.
pub fn radical_inverse(base_index: usize, a: u64) -> Float {
    let base = PRIMES[base_index];

    // Accumulate in f64; the reversed digits of a large index lose too much
    // precision in f32.
    let inv_base = 1.0 / base as f64;
    let mut reversed: u64 = 0;
    let mut inv_base_n = 1.0_f64;
    let mut a = a;
    while a != 0 {
        let next = a / base;
        let digit = a - next * base;
        reversed = reversed * base + digit;
        inv_base_n *= inv_base;
        a = next;
    }
    min(reversed as f64 * inv_base_n, ONE_MINUS_EPSILON as f64) as Float
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn base_two_reverses_bits() {
        assert_eq!(radical_inverse(0, 0), 0.0);
        assert_eq!(radical_inverse(0, 1), 0.5);
        assert_eq!(radical_inverse(0, 2), 0.25);
        assert_eq!(radical_inverse(0, 3), 0.75);
        assert_eq!(radical_inverse(0, 4), 0.125);
    }

    #[test]
    fn base_three_reverses_digits() {
        assert!(approx_eq!(Float, radical_inverse(1, 1), 1.0 / 3.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, radical_inverse(1, 2), 2.0 / 3.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, radical_inverse(1, 3), 1.0 / 9.0, epsilon = 1e-6));
    }

    #[test]
    fn values_stay_in_unit_interval() {
        for dim in 0..PRIMES.len() {
            for a in 0..1000u64 {
                let v = radical_inverse(dim, a * 7919);
                assert!((0.0..1.0).contains(&v));
            }
        }
    }
}
