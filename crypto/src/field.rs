//! Arithmetic over the prime field Z/pZ backing the curve group

use num_bigint::BigUint;
use num_traits::{One, Zero};

pub fn add_mod(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    (a + b) % p
}

pub fn sub_mod(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    let a = a % p;
    let b = b % p;
    if a >= b {
        a - b
    } else {
        p - b + a
    }
}

pub fn mul_mod(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    (a * b) % p
}

/// Multiplicative inverse mod an odd prime `p`, via Fermat's little theorem.
///
/// `a` must not reduce to zero.
pub fn inv_mod(a: &BigUint, p: &BigUint) -> BigUint {
    debug_assert!(!(a % p).is_zero(), "inverse of zero");
    let exp = p - BigUint::from(2u32);
    a.modpow(&exp, p)
}

/// Euler's criterion: 1 if `a` is a nonzero quadratic residue mod `p`,
/// p-1 if a nonresidue, 0 if `a` reduces to zero.
pub fn legendre(a: &BigUint, p: &BigUint) -> BigUint {
    let exp = (p - BigUint::one()) >> 1;
    a.modpow(&exp, p)
}

/// A square root of `a` mod an odd prime `p`, or `None` for nonresidues.
///
/// Uses the exponent shortcut when `p = 3 (mod 4)` and Tonelli-Shanks
/// otherwise.
pub fn sqrt_mod(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    let a = a % p;
    if a.is_zero() {
        return Some(BigUint::zero());
    }
    let one = BigUint::one();
    if legendre(&a, p) != one {
        return None;
    }

    if (p % 4u32) == BigUint::from(3u32) {
        let exp = (p + &one) >> 2;
        return Some(a.modpow(&exp, p));
    }

    // Tonelli-Shanks: p - 1 = q * 2^s with q odd
    let mut q = p - &one;
    let mut s = 0u64;
    while (&q % 2u32).is_zero() {
        q >>= 1;
        s += 1;
    }

    // any quadratic nonresidue will do as the seed of the 2^s subgroup
    let mut z = BigUint::from(2u32);
    while legendre(&z, p) == one {
        z += 1u32;
    }

    let mut m = s;
    let mut c = z.modpow(&q, p);
    let mut t = a.modpow(&q, p);
    let mut r = a.modpow(&((&q + &one) >> 1), p);

    while t != one {
        // smallest i with t^(2^i) = 1
        let mut i = 0u64;
        let mut probe = t.clone();
        while probe != one {
            probe = mul_mod(&probe, &probe, p);
            i += 1;
        }

        let mut b = c.clone();
        for _ in 0..(m - i - 1) {
            b = mul_mod(&b, &b, p);
        }
        m = i;
        c = mul_mod(&b, &b, p);
        t = mul_mod(&t, &c, p);
        r = mul_mod(&r, &b, p);
    }
    Some(r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_is_inverse() {
        let p = BigUint::from(65537u32);
        for a in [2u32, 3, 17, 40000] {
            let a = BigUint::from(a);
            let inv = inv_mod(&a, &p);
            assert_eq!(mul_mod(&a, &inv, &p), BigUint::one());
        }
    }

    #[test]
    fn sub_mod_wraps() {
        let p = BigUint::from(31u32);
        let got = sub_mod(&BigUint::from(3u32), &BigUint::from(10u32), &p);
        assert_eq!(got, BigUint::from(24u32));
    }

    #[test]
    fn sqrt_on_three_mod_four_prime() {
        let p = BigUint::from(31u32); // 31 = 3 (mod 4)
        for a in 1u32..31 {
            let sq = mul_mod(&BigUint::from(a), &BigUint::from(a), &p);
            let root = sqrt_mod(&sq, &p).expect("square must have a root");
            assert_eq!(mul_mod(&root, &root, &p), sq);
        }
    }

    #[test]
    fn sqrt_via_tonelli_shanks() {
        let p = BigUint::from(65537u32); // 65537 = 1 (mod 4)
        for a in [2u32, 123, 4096, 30000] {
            let sq = mul_mod(&BigUint::from(a), &BigUint::from(a), &p);
            let root = sqrt_mod(&sq, &p).expect("square must have a root");
            assert_eq!(mul_mod(&root, &root, &p), sq);
        }
    }

    #[test]
    fn nonresidues_have_no_root() {
        let p = BigUint::from(31u32);
        let mut roots = 0;
        for a in 1u32..31 {
            if sqrt_mod(&BigUint::from(a), &p).is_some() {
                roots += 1;
            }
        }
        // exactly half the nonzero elements are residues
        assert_eq!(roots, 15);
    }
}
