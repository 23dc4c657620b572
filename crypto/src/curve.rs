//! Elliptic-curve group arithmetic over a prime field.
//!
//! Curves here are affine cubics `y^2 = x^3 + a*x^2 + b*x + c (mod p)`
//! generated fresh for every session, so construction validates the
//! discriminant and generator discovery works from the Hasse order
//! estimate rather than precomputed parameters.

use std::fmt;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::bigrand::random_in_range;
use crate::error::{CryptoError, Result};
use crate::field::{add_mod, inv_mod, mul_mod, sqrt_mod, sub_mod};

/// Random points tried by `pick_generator` before giving up
const GENERATOR_ATTEMPTS: u32 = 24;

/// A point of the rational-point group: the identity, or an affine pair.
///
/// Points carry no reference to their curve; every group operation takes
/// an explicit `&Curve`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Point {
    Infinity,
    Affine { x: BigUint, y: BigUint },
}

impl Point {
    pub fn affine(x: BigUint, y: BigUint) -> Self {
        Point::Affine { x, y }
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, Point::Infinity)
    }

    /// Affine coordinates, `None` for the identity.
    pub fn coordinates(&self) -> Option<(&BigUint, &BigUint)> {
        match self {
            Point::Infinity => None,
            Point::Affine { x, y } => Some((x, y)),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Point::Infinity => write!(f, "O"),
            Point::Affine { x, y } => write!(f, "({}, {})", x, y),
        }
    }
}

/// A nonsingular cubic over Z/pZ, immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Curve {
    a: BigUint,
    b: BigUint,
    c: BigUint,
    p: BigUint,
}

impl Curve {
    /// Builds the curve `y^2 = x^3 + a*x^2 + b*x + c (mod p)`, reducing
    /// the coefficients mod p.
    ///
    /// Fails with `InvalidCurve` when the discriminant vanishes; a
    /// singular curve carries no group structure.
    pub fn new(a: BigUint, b: BigUint, c: BigUint, p: BigUint) -> Result<Self> {
        // the field arithmetic requires an odd modulus of at least 5;
        // anything smaller (or even) cannot host a usable group and may
        // come from a hostile peer
        if p < BigUint::from(5u32) || (&p % 2u32).is_zero() {
            return Err(CryptoError::InvalidCurve);
        }
        let a = a % &p;
        let b = b % &p;
        let c = c % &p;
        if Self::discriminant(&a, &b, &c, &p).is_zero() {
            return Err(CryptoError::InvalidCurve);
        }
        Ok(Self { a, b, c, p })
    }

    /// Discriminant of the cubic `x^3 + a*x^2 + b*x + c`, mod p:
    /// `18abc - 4a^3c + a^2b^2 - 4b^3 - 27c^2`.
    pub fn discriminant(a: &BigUint, b: &BigUint, c: &BigUint, p: &BigUint) -> BigUint {
        let a2 = mul_mod(a, a, p);
        let b2 = mul_mod(b, b, p);
        let c2 = mul_mod(c, c, p);

        let abc = mul_mod(&mul_mod(a, b, p), c, p);
        let positive = add_mod(
            &mul_mod(&BigUint::from(18u32), &abc, p),
            &mul_mod(&a2, &b2, p),
            p,
        );

        let a3c = mul_mod(&mul_mod(&a2, a, p), c, p);
        let b3 = mul_mod(&b2, b, p);
        let negative = add_mod(
            &add_mod(
                &mul_mod(&BigUint::from(4u32), &a3c, p),
                &mul_mod(&BigUint::from(4u32), &b3, p),
                p,
            ),
            &mul_mod(&BigUint::from(27u32), &c2, p),
            p,
        );

        sub_mod(&positive, &negative, p)
    }

    pub fn a(&self) -> &BigUint {
        &self.a
    }

    pub fn b(&self) -> &BigUint {
        &self.b
    }

    pub fn c(&self) -> &BigUint {
        &self.c
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// An affine point with coordinates reduced mod p.
    ///
    /// Membership is not checked; use [`Curve::contains`] when the
    /// coordinates come from an untrusted peer.
    pub fn point(&self, x: BigUint, y: BigUint) -> Point {
        Point::Affine {
            x: x % &self.p,
            y: y % &self.p,
        }
    }

    /// Right-hand side `x^3 + a*x^2 + b*x + c` mod p.
    fn rhs(&self, x: &BigUint) -> BigUint {
        let x2 = mul_mod(x, x, &self.p);
        let x3 = mul_mod(&x2, x, &self.p);
        let mut acc = add_mod(&x3, &mul_mod(&self.a, &x2, &self.p), &self.p);
        acc = add_mod(&acc, &mul_mod(&self.b, x, &self.p), &self.p);
        add_mod(&acc, &self.c, &self.p)
    }

    /// Whether `pt` satisfies the curve equation. The identity belongs to
    /// every curve.
    pub fn contains(&self, pt: &Point) -> bool {
        match pt.coordinates() {
            None => true,
            Some((x, y)) => mul_mod(y, y, &self.p) == self.rhs(x),
        }
    }

    /// The inverse `-P = (x, -y mod p)`.
    pub fn negate(&self, pt: &Point) -> Point {
        match pt.coordinates() {
            None => Point::Infinity,
            Some((x, y)) => Point::Affine {
                x: x.clone(),
                y: sub_mod(&BigUint::zero(), y, &self.p),
            },
        }
    }

    /// Chord-and-tangent addition.
    pub fn add(&self, lhs: &Point, rhs: &Point) -> Point {
        let p = &self.p;
        let (x1, y1) = match lhs.coordinates() {
            None => return rhs.clone(),
            Some(c) => c,
        };
        let (x2, y2) = match rhs.coordinates() {
            None => return lhs.clone(),
            Some(c) => c,
        };

        let slope = if x1 == x2 {
            if y1 != y2 || y1.is_zero() {
                // vertical chord or tangent: P + (-P) = O
                return Point::Infinity;
            }
            // tangent slope (3x^2 + 2ax + b) / 2y
            let x_sq = mul_mod(x1, x1, p);
            let mut numerator = mul_mod(&BigUint::from(3u32), &x_sq, p);
            numerator = add_mod(
                &numerator,
                &mul_mod(&BigUint::from(2u32), &mul_mod(&self.a, x1, p), p),
                p,
            );
            numerator = add_mod(&numerator, &self.b, p);
            let denominator = mul_mod(&BigUint::from(2u32), y1, p);
            mul_mod(&numerator, &inv_mod(&denominator, p), p)
        } else {
            let numerator = sub_mod(y2, y1, p);
            let denominator = sub_mod(x2, x1, p);
            mul_mod(&numerator, &inv_mod(&denominator, p), p)
        };

        // x3 = m^2 - a - x1 - x2, y3 = m(x1 - x3) - y1
        let mut x3 = sub_mod(&mul_mod(&slope, &slope, p), &self.a, p);
        x3 = sub_mod(&x3, x1, p);
        x3 = sub_mod(&x3, x2, p);
        let y3 = sub_mod(&mul_mod(&slope, &sub_mod(x1, &x3, p), p), y1, p);

        Point::Affine { x: x3, y: y3 }
    }

    /// Binary double-and-add scalar multiplication `k * pt`.
    pub fn scalar_mul(&self, k: &BigUint, pt: &Point) -> Point {
        let mut result = Point::Infinity;
        let mut addend = pt.clone();
        let mut k = k.clone();
        while !k.is_zero() {
            if (&k % 2u32).is_one() {
                result = self.add(&result, &addend);
            }
            addend = self.add(&addend, &addend);
            k >>= 1;
        }
        result
    }

    /// A uniformly random point on the curve.
    ///
    /// Samples x until the cubic evaluates to a quadratic residue (about
    /// half of all x), then takes one of the two roots.
    pub fn pick_point(&self) -> Point {
        loop {
            let x = random_in_range(&BigUint::zero(), &self.p);
            if let Some(y) = sqrt_mod(&self.rhs(&x), &self.p) {
                return Point::Affine { x, y };
            }
        }
    }

    /// The Hasse interval `[p + 1 - 2*ceil(sqrt(p)), p + 1 + 2*ceil(sqrt(p))]`
    /// bounding the rational-point group order, clamped below at 1.
    pub fn hasse_interval(&self) -> (BigUint, BigUint) {
        let mut root = self.p.sqrt();
        if &root * &root < self.p {
            root += 1u32;
        }
        let spread = BigUint::from(2u32) * root;
        let center = &self.p + BigUint::one();
        let lo = if center > spread {
            &center - &spread
        } else {
            BigUint::one()
        };
        (lo, center + spread)
    }

    /// The exact order of `pt`, found by an incremental multiple scan
    /// bounded by `bound`. `None` when no multiple vanishes within the
    /// bound, which for an on-curve point and a Hasse upper bound cannot
    /// happen.
    ///
    /// The scan is linear in the order; intended for the small session
    /// primes and for diagnostics, not for standardized curve sizes.
    pub fn order_of(&self, pt: &Point, bound: &BigUint) -> Option<BigUint> {
        let mut acc = pt.clone();
        let mut k = BigUint::one();
        while &k <= bound {
            if acc.is_infinity() {
                return Some(k);
            }
            acc = self.add(&acc, pt);
            k += 1u32;
        }
        None
    }

    /// Searches for a generator of the full rational-point group.
    ///
    /// A candidate is accepted when its order reaches the lower Hasse
    /// bound: the order divides the group order, which is at most the
    /// upper bound and below twice the lower bound, so such an order can
    /// only be the group order itself. Returns `None` after a bounded
    /// number of attempts (e.g. when the group is far from cyclic),
    /// signaling the caller to regenerate curve parameters.
    pub fn pick_generator(&self) -> Option<Point> {
        let (lo, hi) = self.hasse_interval();
        for attempt in 0..GENERATOR_ATTEMPTS {
            let candidate = self.pick_point();
            match self.order_of(&candidate, &hi) {
                Some(order) if order >= lo => {
                    tracing::debug!(%candidate, %order, attempt, "generator found");
                    return Some(candidate);
                }
                _ => continue,
            }
        }
        None
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "y^2 = x^3 + {}*x^2 + {}*x + {} (mod {})",
            self.a, self.b, self.c, self.p
        )
    }
}
