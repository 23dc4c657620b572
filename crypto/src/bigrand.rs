//! Random big-integer generation from the OS entropy source

use num_bigint::BigUint;
use num_traits::Zero;
use rand::rngs::OsRng;
use rand::RngCore;

/// Returns a non-negative integer assembled from `byte_length`
/// cryptographically random bytes, little-endian.
///
/// Zero bytes yield zero.
pub fn random_integer(byte_length: usize) -> BigUint {
    if byte_length == 0 {
        return BigUint::zero();
    }
    let mut bytes = vec![0u8; byte_length];
    OsRng.fill_bytes(&mut bytes);
    BigUint::from_bytes_le(&bytes)
}

/// Returns a value uniformly distributed over `[lo, hi)`.
///
/// Swaps the bounds if `hi < lo` and returns `lo` when the bounds are
/// equal. The draw uses ten times the byte width of the range before
/// reducing, which keeps the modulo bias negligible.
pub fn random_in_range(lo: &BigUint, hi: &BigUint) -> BigUint {
    if lo == hi {
        return lo.clone();
    }
    let (lo, hi) = if hi < lo { (hi, lo) } else { (lo, hi) };

    let width = hi - lo;
    let width_bytes = (width.bits() as usize).div_ceil(8);
    let delta = random_integer(10 * width_bytes) % &width;
    lo + delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    #[test]
    fn zero_length_yields_zero() {
        assert_eq!(random_integer(0), BigUint::zero());
    }

    #[test]
    fn respects_byte_length() {
        for _ in 0..16 {
            let n = random_integer(5);
            assert!(n.bits() <= 40);
        }
    }

    #[test]
    fn range_bounds_hold() {
        let lo = BigUint::from(100u32);
        let hi = BigUint::from(200u32);
        for _ in 0..64 {
            let n = random_in_range(&lo, &hi);
            assert!(n >= lo && n < hi);
        }
    }

    #[test]
    fn equal_bounds_return_lo() {
        let b = BigUint::from(42u32);
        assert_eq!(random_in_range(&b, &b), b);
    }

    #[test]
    fn swapped_bounds_are_tolerated() {
        let lo = BigUint::from(10u32);
        let hi = BigUint::from(20u32);
        for _ in 0..32 {
            let n = random_in_range(&hi, &lo);
            assert!(n >= lo && n < hi);
        }
    }

    #[test]
    fn unit_range_is_constant() {
        let lo = BigUint::from(7u32);
        let hi = &lo + BigUint::one();
        assert_eq!(random_in_range(&lo, &hi), lo);
    }
}
