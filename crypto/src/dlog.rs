//! Baby-step giant-step discrete-log solver.
//!
//! Offline diagnostic for validating the hardness of generated groups;
//! the live protocol never calls this.

use std::collections::HashMap;

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::curve::{Curve, Point};

/// Finds the smallest `k` with `k * base = target` and `k < bound`, or
/// `None` when no such `k` exists within the bound.
///
/// Classic baby-step giant-step: a table of `j * base` for
/// `j < ceil(sqrt(bound))` keyed by point, then giant steps
/// `target - i * (m * base)` looked up against it. Memory is
/// `O(sqrt(bound))`; bounds whose square root does not fit a `u64` are
/// rejected outright.
pub fn autoshanks(
    curve: &Curve,
    base: &Point,
    target: &Point,
    bound: &BigUint,
) -> Option<BigUint> {
    let mut m = bound.sqrt();
    if &m * &m < *bound {
        m += 1u32;
    }
    let m = m.to_u64()?;

    // baby steps: j -> j * base, keeping the smallest j per point
    let mut table: HashMap<Point, u64> = HashMap::with_capacity(m as usize);
    let mut baby = Point::Infinity;
    for j in 0..m {
        table.entry(baby.clone()).or_insert(j);
        baby = curve.add(&baby, base);
    }

    // giant steps: target - i * (m * base)
    let stride = curve.negate(&curve.scalar_mul(&BigUint::from(m), base));
    let mut gamma = target.clone();
    for i in 0..m {
        if let Some(&j) = table.get(&gamma) {
            let k = BigUint::from(i) * BigUint::from(m) + BigUint::from(j);
            if &k < bound {
                return Some(k);
            }
        }
        gamma = curve.add(&gamma, &stride);
    }
    None
}
