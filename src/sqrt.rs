//! Square root (spec §6.3). Built directly on `UBig`'s exact integer
//! square root (`RootRem::sqrt_rem`) rather than a Ziv loop: scaling the
//! significand by an even power of two and taking its integer square
//! root with remainder already yields a correctly-placed result plus an
//! exact sticky bit, so there's no approximation step to iterate on.

use crate::flags::{self, Flags};
use crate::repr::MpFloat;
use crate::round::{Rounding, Ternary};
use dashu_base::{BitTest, RootRem, Sign};

/// `sqrt(z, x, rnd)`.
pub fn sqrt(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() {
        *z = MpFloat::nan(z.precision);
        flags::raise(Flags::NAN);
        return 0;
    }
    if x.sign() == Sign::Negative && !x.is_zero() {
        *z = MpFloat::nan(z.precision);
        flags::raise(Flags::NAN);
        return 0;
    }
    if x.is_zero() {
        *z = MpFloat::zero(x.sign(), z.precision);
        return 0;
    }
    if x.is_infinite() {
        *z = MpFloat::infinity(Sign::Positive, z.precision);
        return 0;
    }

    let (_, ex, sx) = x.raw_parts().unwrap();
    let px = x.precision() as i64;
    let target_precision = z.precision;

    let e_prime = ex - px; // value = sx * 2^e_prime
    let odd = e_prime.rem_euclid(2) != 0;
    let m = if odd { sx << 1 } else { sx.clone() };
    let e_double_prime = if odd { e_prime - 1 } else { e_prime };
    let eh = e_double_prime / 2;

    let k = target_precision as i64 + 2;
    let scaled = m << (2 * k) as usize;
    let (root, rem) = scaled.sqrt_rem();

    let sp = root.bit_len();
    let sticky_in = !rem.is_zero();
    let exponent = (eh - k) + sp as i64;
    let (result, t) = crate::range::finish(Sign::Positive, exponent, root, sp, sticky_in, target_precision, rnd);
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
    fn sqrt_of_perfect_square_power_of_two_is_exact() {
        let four = finite(Sign::Positive, 3, 20); // 4.0
        let mut z = MpFloat::new(20);
        let t = sqrt(&mut z, &four, Rounding::Nearest);
        assert_eq!(t, 0);
        let two = finite(Sign::Positive, 2, 20);
        assert_eq!(z, two);
    }

    #[test]
    fn sqrt_of_negative_is_nan() {
        let neg = finite(Sign::Negative, 1, 10);
        let mut z = MpFloat::new(10);
        sqrt(&mut z, &neg, Rounding::Nearest);
        assert!(z.is_nan());
        assert!(flags::is_set(Flags::NAN));
    }

    #[test]
    fn sqrt_of_negative_zero_is_negative_zero() {
        let nz = MpFloat::zero(Sign::Negative, 10);
        let mut z = MpFloat::new(10);
        sqrt(&mut z, &nz, Rounding::Nearest);
        assert!(z.is_zero());
        assert_eq!(z.sign(), Sign::Negative);
    }

    #[test]
    fn sqrt_of_two_is_inexact() {
        let two = finite(Sign::Positive, 2, 53);
        let mut z = MpFloat::new(53);
        let t = sqrt(&mut z, &two, Rounding::Nearest);
        assert_ne!(t, 0);
        assert!(flags::is_set(Flags::INEXACT));
    }
}
