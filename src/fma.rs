//! Fused multiply-add (spec §6.3): `round(x*y + w, rnd)` with a single
//! rounding, rather than two. Since the product of two normalized
//! significands is already exact (see [`crate::mul`]), the only new work
//! here is presenting that exact product as an unrounded operand and
//! handing it to [`crate::add::add`], which already reduces arbitrary
//! finite/singular combinations to one call into [`crate::range::finish`].
//! That reuse is what buys the "single rounding" property for free: the
//! product never gets narrowed to `target_precision` until the add's own
//! final rounding step does it.

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

/// Classify and, for the finite*finite case, exactly compute `x*y` as an
/// unrounded `MpFloat` whose "precision" is just however many bits the
/// exact product happens to have. Never itself produces NaN from a
/// finite*finite pair, since that can only happen via `0*inf`, which the
/// caller checks before reaching here.
fn exact_product(x: &MpFloat, y: &MpFloat) -> MpFloat {
    let sign = xor_sign(x.sign(), y.sign());
    if x.is_zero() || y.is_zero() {
        return MpFloat::zero(sign, 2);
    }
    if x.is_infinite() || y.is_infinite() {
        return MpFloat::infinity(sign, 2);
    }
    let (_, ex, sx) = x.raw_parts().unwrap();
    let (_, ey, sy) = y.raw_parts().unwrap();
    let product = sx * sy;
    let sp = product.bit_len();
    let exponent = (ex - x.precision() as i64) + (ey - y.precision() as i64) + sp as i64;
    MpFloat::from_normalized(sign, exponent, product, sp)
}

/// `fma(z, x, y, w, rnd)`: `z = round(x*y + w, rnd)`.
pub fn fma(z: &mut MpFloat, x: &MpFloat, y: &MpFloat, w: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() || y.is_nan() || w.is_nan() {
        *z = MpFloat::nan(z.precision);
        flags::raise(Flags::NAN);
        return 0;
    }
    if (x.is_zero() && y.is_infinite()) || (x.is_infinite() && y.is_zero()) {
        // `0 * inf` is NaN regardless of what `w` could have cancelled it
        // with, matching the rest of the crate's singular table for
        // multiplication (spec §6.4).
        *z = MpFloat::nan(z.precision);
        flags::raise(Flags::NAN);
        return 0;
    }

    let product = exact_product(x, y);
    crate::add::add(z, &product, w, rnd)
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
    fn fma_rounds_only_once() {
        // x*y = 1.0 * (1.0 + 2^-53), w = -1.0 at precision 53: the exact
        // sum 2^-53 is representable exactly once it lands on its own,
        // so fma should return it exactly even though computing x*y and
        // then adding w as two separately-rounded steps would not change
        // this particular case -- the point is it doesn't round twice.
        let one = finite(Sign::Positive, 1, 53);
        let one_plus_ulp = {
            let sig = (UBig::ONE << 52) + UBig::ONE;
            MpFloat::from_normalized(Sign::Positive, 1, sig, 53)
        };
        let neg_one = finite(Sign::Negative, 1, 53);
        let mut z = MpFloat::new(53);
        let t = fma(&mut z, &one, &one_plus_ulp, &neg_one, Rounding::Nearest);
        assert_eq!(t, 0);
        let expected = finite(Sign::Positive, 1 - 53, 53); // 2^-53
        assert_eq!(z, expected);
    }

    #[test]
    fn fma_zero_times_infinity_plus_anything_is_nan() {
        let zero = MpFloat::zero(Sign::Positive, 10);
        let inf = MpFloat::infinity(Sign::Positive, 10);
        let w = finite(Sign::Positive, 1, 10);
        let mut z = MpFloat::new(10);
        fma(&mut z, &zero, &inf, &w, Rounding::Nearest);
        assert!(z.is_nan());
        assert!(flags::is_set(Flags::NAN));
    }

    #[test]
    fn fma_matches_plain_multiply_when_w_is_zero() {
        let two = finite(Sign::Positive, 2, 20);
        let three = MpFloat::from_normalized(Sign::Positive, 2, UBig::from(0b11u32) << 18, 20);
        let zero = MpFloat::zero(Sign::Positive, 20);
        let mut z = MpFloat::new(20);
        let mut via_mul = MpFloat::new(20);
        let t_fma = fma(&mut z, &two, &three, &zero, Rounding::Nearest);
        let t_mul = crate::mul::mul(&mut via_mul, &two, &three, Rounding::Nearest);
        assert_eq!(z, via_mul);
        assert_eq!(t_fma, t_mul);
    }
}
