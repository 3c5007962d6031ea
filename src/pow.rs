//! `pow`, `pow_ui`, `pow_si`, `pow_z` (spec §4.10, §6.4).
//!
//! The general path is `pow(x, y) = exp(y * log|x|)` with sign recovered
//! separately for negative `x` raised to an integer power; the special-case
//! table ahead of it mirrors the IEEE 754 `pow` semantics spec §6.4 calls
//! out explicitly (`pow(x, +-0) = 1`, `pow(1, y) = 1`, `pow(-1, +-inf) = 1`,
//! `pow(0, y<0) = +-inf`, `pow(0, y>0) = +-0`) plus the rest of the standard
//! `pow` table for infinities and negative bases. Integer-exponent
//! specializations use binary exponentiation (spec L-pow-int:
//! `pow(x, n) == pow_si(x, n)`) and never go through `exp`/`log` at all, so
//! they stay exact whenever the repeated squaring is.

use crate::cmp;
use crate::convert;
use crate::exp;
use crate::flags::{self, Flags};
use crate::log;
use crate::mul;
use crate::repr::MpFloat;
use crate::round::{Rounding, Ternary};
use dashu_base::{BitTest, Sign};

/// Whether `y` represents an exact integer, and if so, whether that
/// integer is odd. `y`'s raw significand always occupies exactly
/// `y.precision()` bits (invariant I-Norm); the binary point sits
/// `precision - exponent` bits from the top, so the value is an integer
/// iff every bit below that point is zero.
fn integer_parity(y: &MpFloat) -> (bool, bool) {
    if y.is_zero() {
        return (true, false);
    }
    let Some((_, exponent, sig)) = y.raw_parts() else {
        return (false, false);
    };
    let precision = y.precision() as i64;
    if exponent <= 0 {
        return (false, false);
    }
    if exponent >= precision {
        let is_odd = exponent == precision && sig.bit(0);
        return (true, is_odd);
    }
    let frac_bits = (precision - exponent) as usize;
    for i in 0..frac_bits {
        if sig.bit(i) {
            return (false, false);
        }
    }
    (true, sig.bit(frac_bits))
}

fn signed_zero_or_inf(make: impl Fn(Sign, usize) -> MpFloat, negative: bool, precision: usize) -> MpFloat {
    make(if negative { Sign::Negative } else { Sign::Positive }, precision)
}

/// `pow(z, x, y, rnd)`.
pub fn pow(z: &mut MpFloat, x: &MpFloat, y: &MpFloat, rnd: Rounding) -> Ternary {
    let precision = z.precision();

    if y.is_zero() {
        if x.is_nan() {
            *z = MpFloat::nan(precision);
            flags::raise(Flags::NAN);
            return 0;
        }
        let mut one = MpFloat::new(precision);
        convert::set_si(&mut one, 1, Rounding::Nearest);
        *z = one;
        return 0;
    }

    if x.is_nan() || y.is_nan() {
        *z = MpFloat::nan(precision);
        flags::raise(Flags::NAN);
        return 0;
    }

    {
        // `pow(1, y) == 1` only when `y != NaN` (spec.md:514); the NaN
        // check above has already run, so `y` here is never NaN.
        let mut one_like_x = MpFloat::new(x.precision().max(2));
        convert::set_si(&mut one_like_x, 1, Rounding::Nearest);
        if cmp::equal(x, &one_like_x) {
            let mut one = MpFloat::new(precision);
            convert::set_si(&mut one, 1, Rounding::Nearest);
            *z = one;
            return 0;
        }
    }

    {
        let mut neg_one = MpFloat::new(x.precision().max(2));
        convert::set_si(&mut neg_one, -1, Rounding::Nearest);
        if y.is_infinite() && cmp::equal(x, &neg_one) {
            let mut one = MpFloat::new(precision);
            convert::set_si(&mut one, 1, Rounding::Nearest);
            *z = one;
            return 0;
        }
    }

    let (y_is_int, y_is_odd) = integer_parity(y);

    if x.is_zero() {
        let x_negative = x.sign() == Sign::Negative;
        let result_negative = x_negative && y_is_odd;
        if y.sign() == Sign::Negative {
            flags::raise(Flags::ERANGE);
            *z = signed_zero_or_inf(MpFloat::infinity, result_negative, precision);
        } else {
            *z = signed_zero_or_inf(MpFloat::zero, result_negative, precision);
        }
        return 0;
    }

    if x.is_infinite() {
        let x_negative = x.sign() == Sign::Negative;
        let result_negative = x_negative && y_is_odd;
        if y.sign() == Sign::Negative {
            *z = signed_zero_or_inf(MpFloat::zero, result_negative, precision);
        } else {
            *z = signed_zero_or_inf(MpFloat::infinity, result_negative, precision);
        }
        return 0;
    }

    if x.sign() == Sign::Negative && !y_is_int {
        *z = MpFloat::nan(precision);
        flags::raise(Flags::NAN);
        return 0;
    }

    if x.sign() == Sign::Negative && y_is_int {
        let exponent = match i64::try_from(y) {
            Ok(v) => v,
            Err(_) => {
                let mut abs_x = MpFloat::new(x.precision());
                abs_x.set(x, Rounding::Nearest);
                abs_x.set_neg();
                let t = pow_via_exp_log(z, &abs_x, y, rnd);
                if y_is_odd {
                    z.set_neg();
                    return -t;
                }
                return t;
            }
        };
        let mut abs_x = MpFloat::new(x.precision());
        abs_x.set(x, Rounding::Nearest);
        abs_x.set_neg();
        let t = pow_si(z, &abs_x, exponent, rnd);
        if y_is_odd {
            z.set_neg();
            return -t;
        }
        return t;
    }

    pow_via_exp_log(z, x, y, rnd)
}

fn pow_via_exp_log(z: &mut MpFloat, x: &MpFloat, y: &MpFloat, rnd: Rounding) -> Ternary {
    let working_precision = z.precision() + crate::ziv::log2_ceil(z.precision().max(2)) + 16;
    let mut log_x = MpFloat::new(working_precision);
    log::log(&mut log_x, x, Rounding::Nearest);
    let mut product = MpFloat::new(working_precision);
    mul::mul(&mut product, y, &log_x, Rounding::Nearest);
    exp::exp(z, &product, rnd)
}

/// `pow_ui(z, x, n, rnd)`: `x^n` for `n: u64`, via binary exponentiation.
pub fn pow_ui(z: &mut MpFloat, x: &MpFloat, n: u64, rnd: Rounding) -> Ternary {
    if n == 0 {
        let mut one = MpFloat::new(z.precision());
        convert::set_si(&mut one, 1, Rounding::Nearest);
        return z.set(&one, rnd);
    }
    if x.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    let working_precision = z.precision() + 64;
    let mut base = MpFloat::new(working_precision);
    base.set(x, Rounding::Nearest);
    let mut acc = MpFloat::new(working_precision);
    convert::set_si(&mut acc, 1, Rounding::Nearest);
    let mut exp_bits = n;
    while exp_bits > 0 {
        if exp_bits & 1 == 1 {
            let mut next = MpFloat::new(working_precision);
            mul::mul(&mut next, &acc, &base, Rounding::Nearest);
            acc = next;
        }
        exp_bits >>= 1;
        if exp_bits > 0 {
            let mut next_base = MpFloat::new(working_precision);
            mul::mul(&mut next_base, &base, &base, Rounding::Nearest);
            base = next_base;
        }
    }
    z.set(&acc, rnd)
}

/// `pow_si(z, x, n, rnd)`: `x^n` for `n: i64`, delegating magnitude to
/// [`pow_ui`] and handling negative `n` via a final reciprocal.
pub fn pow_si(z: &mut MpFloat, x: &MpFloat, n: i64, rnd: Rounding) -> Ternary {
    if n >= 0 {
        return pow_ui(z, x, n as u64, rnd);
    }
    if x.is_zero() {
        let x_negative = x.sign() == Sign::Negative;
        let odd = n % 2 != 0;
        flags::raise(Flags::ERANGE);
        *z = signed_zero_or_inf(MpFloat::infinity, x_negative && odd, z.precision());
        return 0;
    }
    let working_precision = z.precision() + 64;
    let mut pos = MpFloat::new(working_precision);
    pow_ui(&mut pos, x, n.unsigned_abs(), Rounding::Nearest);
    let mut one = MpFloat::new(working_precision);
    convert::set_si(&mut one, 1, Rounding::Nearest);
    crate::div::div(z, &one, &pos, rnd)
}

/// `pow_z(z, x, n, rnd)`: `x^n` for an arbitrary-precision integer `n`
/// given as `(sign, magnitude)`, for callers whose exponent doesn't fit
/// an `i64`.
pub fn pow_z(z: &mut MpFloat, x: &MpFloat, n_sign: Sign, n_magnitude: &dashu_int::UBig, rnd: Rounding) -> Ternary {
    if n_magnitude.bit_len() == 0 {
        let mut one = MpFloat::new(z.precision());
        convert::set_si(&mut one, 1, Rounding::Nearest);
        return z.set(&one, rnd);
    }
    if x.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    let working_precision = z.precision() + 64;
    let mut base = MpFloat::new(working_precision);
    base.set(x, Rounding::Nearest);
    let mut acc = MpFloat::new(working_precision);
    convert::set_si(&mut acc, 1, Rounding::Nearest);
    let bits = n_magnitude.bit_len();
    for i in 0..bits {
        if n_magnitude.bit(i) {
            let mut next = MpFloat::new(working_precision);
            mul::mul(&mut next, &acc, &base, Rounding::Nearest);
            acc = next;
        }
        if i + 1 < bits {
            let mut next_base = MpFloat::new(working_precision);
            mul::mul(&mut next_base, &base, &base, Rounding::Nearest);
            base = next_base;
        }
    }
    if n_sign == Sign::Negative {
        let mut one = MpFloat::new(working_precision);
        convert::set_si(&mut one, 1, Rounding::Nearest);
        crate::div::div(z, &one, &acc, rnd)
    } else {
        z.set(&acc, rnd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pow_of_anything_to_zero_is_one() {
        let mut z = MpFloat::new(64);
        let mut x = MpFloat::new(64);
        convert::set_si(&mut x, 7, Rounding::Nearest);
        let y = MpFloat::zero(Sign::Positive, 64);
        pow(&mut z, &x, &y, Rounding::Nearest);
        let mut one = MpFloat::new(64);
        convert::set_si(&mut one, 1, Rounding::Nearest);
        assert_eq!(z, one);
    }

    #[test]
    fn pow_of_one_to_anything_is_one() {
        let mut z = MpFloat::new(64);
        let mut one = MpFloat::new(64);
        convert::set_si(&mut one, 1, Rounding::Nearest);
        let mut y = MpFloat::new(64);
        convert::set_si(&mut y, 42, Rounding::Nearest);
        pow(&mut z, &one, &y, Rounding::Nearest);
        assert_eq!(z, one);
    }

    #[test]
    fn pow_of_one_to_nan_is_nan() {
        let mut z = MpFloat::new(64);
        let mut one = MpFloat::new(64);
        convert::set_si(&mut one, 1, Rounding::Nearest);
        let y = MpFloat::nan(64);
        pow(&mut z, &one, &y, Rounding::Nearest);
        assert!(z.is_nan());
    }

    #[test]
    fn pow_negative_one_to_infinity_is_one() {
        let mut z = MpFloat::new(64);
        let mut neg_one = MpFloat::new(64);
        convert::set_si(&mut neg_one, -1, Rounding::Nearest);
        let inf = MpFloat::infinity(Sign::Positive, 64);
        pow(&mut z, &neg_one, &inf, Rounding::Nearest);
        let mut one = MpFloat::new(64);
        convert::set_si(&mut one, 1, Rounding::Nearest);
        assert_eq!(z, one);
    }

    #[test]
    fn pow_zero_to_negative_is_infinity() {
        let mut z = MpFloat::new(64);
        let x = MpFloat::zero(Sign::Positive, 64);
        let mut y = MpFloat::new(64);
        convert::set_si(&mut y, -3, Rounding::Nearest);
        pow(&mut z, &x, &y, Rounding::Nearest);
        assert!(z.is_infinite() && z.sign() == Sign::Positive);
    }

    #[test]
    fn pow_matches_pow_si_for_integers() {
        let mut x = MpFloat::new(64);
        convert::set_si(&mut x, 3, Rounding::Nearest);
        let mut y = MpFloat::new(64);
        convert::set_si(&mut y, 5, Rounding::Nearest);
        let mut via_pow = MpFloat::new(64);
        pow(&mut via_pow, &x, &y, Rounding::Nearest);
        let mut via_pow_si = MpFloat::new(64);
        pow_si(&mut via_pow_si, &x, 5, Rounding::Nearest);
        assert_eq!(via_pow, via_pow_si);
    }

    #[test]
    fn pow_ui_of_two_cubed_is_eight() {
        let mut z = MpFloat::new(64);
        let mut x = MpFloat::new(64);
        convert::set_si(&mut x, 2, Rounding::Nearest);
        pow_ui(&mut z, &x, 3, Rounding::Nearest);
        let mut eight = MpFloat::new(64);
        convert::set_si(&mut eight, 8, Rounding::Nearest);
        assert_eq!(z, eight);
    }

    #[test]
    fn pow_si_of_negative_exponent_is_reciprocal() {
        let mut z = MpFloat::new(64);
        let mut x = MpFloat::new(64);
        convert::set_si(&mut x, 2, Rounding::Nearest);
        pow_si(&mut z, &x, -3, Rounding::Nearest);
        let mut eight = MpFloat::new(64);
        convert::set_si(&mut eight, 8, Rounding::Nearest);
        let mut expected = MpFloat::new(64);
        let mut one = MpFloat::new(64);
        convert::set_si(&mut one, 1, Rounding::Nearest);
        crate::div::div(&mut expected, &one, &eight, Rounding::Nearest);
        assert_eq!(z, expected);
    }
}
