//! Comparison (spec §4.5): a total order on magnitudes and on signed
//! values, including the singular classes.

use crate::flags::{self, Flags};
use crate::repr::{Class, MpFloat};
use dashu_base::Sign;
use std::cmp::Ordering;

/// `cmp_abs(x, y)`: compare `|x|` and `|y|`. NaN operands return `0` and
/// set ERANGE (spec §4.5 applies the same NaN contract as `cmp`).
pub fn cmp_abs(x: &MpFloat, y: &MpFloat) -> i32 {
    if x.is_nan() || y.is_nan() {
        flags::raise(Flags::ERANGE);
        return 0;
    }
    match (&x.class, &y.class) {
        (Class::Infinite, Class::Infinite) => 0,
        (Class::Infinite, _) => 1,
        (_, Class::Infinite) => -1,
        (Class::Zero, Class::Zero) => 0,
        (Class::Zero, Class::Finite(_)) => -1,
        (Class::Finite(_), Class::Zero) => 1,
        (Class::Finite(sx), Class::Finite(sy)) => {
            let ex = x.exponent - x.precision as i64;
            let ey = y.exponent - y.precision as i64;
            match x.exponent.cmp(&y.exponent) {
                Ordering::Equal => compare_aligned(sx, ex, sy, ey),
                other => other as i32,
            }
        }
    }
}

/// Compare two significands, each known by its own binary-point offset
/// (`sig * 2^scale` is the represented magnitude), when the two values'
/// top-level exponents are already known equal. Handles differing
/// precisions by aligning to a common scale before a plain integer
/// comparison.
fn compare_aligned(sx: &dashu_int::UBig, ex: i64, sy: &dashu_int::UBig, ey: i64) -> i32 {
    match ex.cmp(&ey) {
        Ordering::Equal => sx.cmp(sy) as i32,
        Ordering::Greater => {
            let shifted = sx << (ex - ey) as usize;
            shifted.cmp(sy) as i32
        }
        Ordering::Less => {
            let shifted = sy << (ey - ex) as usize;
            sx.cmp(&shifted) as i32
        }
    }
}

/// `cmp(x, y)`: signed total order. NaN operands return `0` and set
/// ERANGE. `±0` compare equal regardless of sign.
pub fn cmp(x: &MpFloat, y: &MpFloat) -> i32 {
    if x.is_nan() || y.is_nan() {
        flags::raise(Flags::ERANGE);
        return 0;
    }
    let sx = class_sign_value(x);
    let sy = class_sign_value(y);
    if sx != sy {
        return if sx > sy { 1 } else { -1 };
    }
    // Same sign bucket: ±0 already folds to 0 above, so both are either
    // both non-negative or both non-positive; compare magnitudes and
    // flip for the negative side.
    let is_negative = matches!(x.sign, Sign::Negative) && !x.is_zero();
    let mag = cmp_abs(x, y);
    if is_negative {
        -mag
    } else {
        mag
    }
}

/// Maps a value to a coarse bucket used to separate strictly-negative,
/// zero, and strictly-positive values before a magnitude compare: `-1`,
/// `0`, or `1`. `-∞`/negative finite sit at `-1`, `±0` at `0`.
fn class_sign_value(v: &MpFloat) -> i32 {
    if v.is_zero() {
        0
    } else if matches!(v.sign, Sign::Negative) {
        -1
    } else {
        1
    }
}

/// `equal(x, y)`: `true` iff `cmp(x, y) == 0` and neither is NaN (NaN is
/// never equal to anything, including itself, per IEEE semantics; `cmp`
/// alone can't distinguish "equal" from "NaN", so this wraps it).
pub fn equal(x: &MpFloat, y: &MpFloat) -> bool {
    if x.is_nan() || y.is_nan() {
        return false;
    }
    cmp(x, y) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A finite value with its top significand bit set (the smallest
    /// magnitude of its binade), for order-comparison tests where only
    /// the relative exponent matters.
    fn finite(sign: Sign, exponent: i64, precision: usize) -> MpFloat {
        let sig = dashu_int::UBig::ONE << (precision - 1);
        MpFloat::from_normalized(sign, exponent, sig, precision)
    }

    #[test]
    fn zero_compares_equal_regardless_of_sign() {
        let pz = MpFloat::zero(Sign::Positive, 10);
        let nz = MpFloat::zero(Sign::Negative, 10);
        assert_eq!(cmp(&pz, &nz), 0);
        assert!(equal(&pz, &nz));
    }

    #[test]
    fn nan_sets_erange_and_returns_zero() {
        flags::clear_flags();
        let n = MpFloat::nan(10);
        let z = MpFloat::zero(Sign::Positive, 10);
        assert_eq!(cmp(&n, &z), 0);
        assert!(flags::is_set(Flags::ERANGE));
        assert!(!equal(&n, &n));
    }

    #[test]
    fn infinity_orders_above_every_finite() {
        let inf = MpFloat::infinity(Sign::Positive, 10);
        let f = finite(Sign::Positive, 5, 10);
        assert_eq!(cmp(&inf, &f), 1);
        assert_eq!(cmp(&f, &inf), -1);
    }

    #[test]
    fn negative_values_invert_magnitude_order() {
        let a = finite(Sign::Negative, 5, 10);
        let b = finite(Sign::Negative, 6, 10);
        // |a| < |b|, both negative -> a > b
        assert_eq!(cmp(&a, &b), 1);
    }
}
