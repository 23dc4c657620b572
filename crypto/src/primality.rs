//! Miller-Rabin probabilistic primality testing and pseudoprime generation

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::bigrand::{random_in_range, random_integer};
use crate::error::{CryptoError, Result};

/// Performs the Miller-Rabin test on `n` with `rounds` random witnesses.
///
/// Returns `Ok(true)` when no witness proves compositeness; a composite
/// passes with probability at most 4^-rounds. `n <= 1` is a caller error
/// and fails with `IndeterminatePrimalityInput`.
pub fn miller_rabin(n: &BigUint, rounds: u32) -> Result<bool> {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);

    if *n == two || *n == three {
        return Ok(true);
    }
    if n <= &one {
        return Err(CryptoError::IndeterminatePrimalityInput);
    }
    if (n % &two).is_zero() {
        return Ok(false);
    }

    // n - 1 = d * 2^s with d odd
    let n_minus_one = n - &one;
    let (s, d) = decompose(&n_minus_one);

    'witness: for _ in 0..rounds {
        let a = random_in_range(&two, &(n - &two));
        let mut x = a.modpow(&d, n);

        if x == one || x == n_minus_one {
            continue;
        }

        for _ in 0..s.saturating_sub(1) {
            x = x.modpow(&two, n);
            if x == one {
                return Ok(false);
            }
            if x == n_minus_one {
                continue 'witness;
            }
        }

        return Ok(false);
    }
    Ok(true)
}

/// Writes an even `m` as `(s, d)` with `m = d * 2^s` and `d` odd.
fn decompose(m: &BigUint) -> (u64, BigUint) {
    let mut d = m >> 1u32;
    let mut s = 1u64;
    while (&d % 2u32).is_zero() {
        d >>= 1;
        s += 1;
    }
    (s, d)
}

/// Samples `byte_length`-byte random integers until one passes Miller-Rabin
/// with `rounds` witnesses.
///
/// The loop is unbounded; prime density at the sizes in use makes
/// termination almost sure. Samples of 0 or 1 are simply redrawn.
pub fn generate_pseudoprime(byte_length: usize, rounds: u32) -> BigUint {
    loop {
        let candidate = random_integer(byte_length);
        if let Ok(true) = miller_rabin(&candidate, rounds) {
            tracing::debug!(prime = %candidate, "pseudoprime selected");
            return candidate;
        }
    }
}
