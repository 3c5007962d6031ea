//! Multiplication core, grounded on the same rounding kernel as every
//! other operation (spec §6.3; the body of §4 doesn't spell out `mul`'s
//! algorithm the way it does add/sub/div, since a full-width significand
//! product is already exact and there is nothing but the final rounding
//! step left to design).

use crate::flags::{self, Flags};
use crate::repr::MpFloat;
use crate::round::{Rounding, Ternary};
use dashu_base::{BitTest, Sign};

fn xor_sign(a: Sign, b: Sign) -> Sign {
    if a == b {
        Sign::Positive
    } else {
        Sign::Negative
    }
}

/// `mul(z, x, y, rnd)`.
pub fn mul(z: &mut MpFloat, x: &MpFloat, y: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() || y.is_nan() {
        *z = MpFloat::nan(z.precision);
        flags::raise(Flags::NAN);
        return 0;
    }

    let sign = xor_sign(x.sign(), y.sign());

    if x.is_zero() || y.is_zero() {
        if x.is_infinite() || y.is_infinite() {
            *z = MpFloat::nan(z.precision);
            flags::raise(Flags::NAN);
            return 0;
        }
        *z = MpFloat::zero(sign, z.precision);
        return 0;
    }

    if x.is_infinite() || y.is_infinite() {
        *z = MpFloat::infinity(sign, z.precision);
        return 0;
    }

    let (_, ex, sx) = x.raw_parts().unwrap();
    let (_, ey, sy) = y.raw_parts().unwrap();
    // The product of two normalized `p`-bit significands is exact and
    // has exactly `p_x + p_y` or `p_x + p_y - 1` significant bits; no
    // sticky bit is needed ahead of the final rounding step.
    let product = sx * sy;
    let sp = product.bit_len();
    let exponent = (ex - x.precision() as i64) + (ey - y.precision() as i64) + sp as i64;
    let (result, t) = crate::range::finish(sign, exponent, product, sp, false, z.precision, rnd);
    *z = result;
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashu_int::UBig;

    fn finite(sign: Sign, exponent: i64, precision: usize) -> MpFloat {
        let sig = UBig::ONE << (precision - 1);
        MpFloat::from_normalized(sign, exponent, sig, precision)
    }

    #[test]
    fn powers_of_two_multiply_exactly() {
        let two = finite(Sign::Positive, 2, 10); // 2.0
        let four = finite(Sign::Positive, 3, 10); // 4.0
        let mut z = MpFloat::new(10);
        let t = mul(&mut z, &two, &four, Rounding::Nearest);
        assert_eq!(t, 0);
        let eight = finite(Sign::Positive, 4, 10);
        assert_eq!(z, eight);
    }

    #[test]
    fn sign_is_xor_of_operands() {
        let a = finite(Sign::Negative, 1, 10);
        let b = finite(Sign::Positive, 1, 10);
        let mut z = MpFloat::new(10);
        mul(&mut z, &a, &b, Rounding::Nearest);
        assert_eq!(z.sign(), Sign::Negative);
    }

    #[test]
    fn zero_times_infinity_is_nan() {
        let z0 = MpFloat::zero(Sign::Positive, 10);
        let inf = MpFloat::infinity(Sign::Positive, 10);
        let mut z = MpFloat::new(10);
        mul(&mut z, &z0, &inf, Rounding::Nearest);
        assert!(z.is_nan());
        assert!(flags::is_set(Flags::NAN));
    }
}
