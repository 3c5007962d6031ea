//! `sinh`, `cosh`, `tanh`, `asinh`, `acosh`, `atanh` (spec §4.10, §9.2).
//!
//! Built directly on [`crate::exp`]'s reduction machinery rather than a
//! separate series: `sinh(x) = (exp(x) - exp(-x))/2`,
//! `cosh(x) = (exp(x) + exp(-x))/2`. Per spec §9.2, when `exp(x)` itself
//! overflows but the hyperbolic function would still be representable,
//! this crate keeps the source's documented behavior and overflows too --
//! recorded as an accepted limitation, not a bug, and left as an optional
//! extension rather than a fix.

use crate::add;
use crate::constants;
use crate::convert;
use crate::exp;
use crate::flags::{self, ExpoGuard, Flags};
use crate::log;
use crate::mul;
use crate::repr::MpFloat;
use crate::round::{Rounding, Ternary};
use crate::sqrt;
use crate::ziv;
use dashu_base::Sign;

fn sinh_cosh_approx(x: &MpFloat, wp: usize) -> (MpFloat, MpFloat) {
    let k = exp::reduction_k(x);
    let e_pos = exp::exp_reduced(x, k, wp);
    let mut neg_x = MpFloat::new(wp);
    neg_x.set(x, Rounding::Nearest);
    neg_x.set_neg();
    let k_neg = exp::reduction_k(&neg_x);
    let e_neg = exp::exp_reduced(&neg_x, k_neg, wp);

    let mut sinh_val = MpFloat::new(wp);
    add::sub(&mut sinh_val, &e_pos, &e_neg, Rounding::Nearest);
    let sinh_val = sinh_val.scale_pow2(-1);

    let mut cosh_val = MpFloat::new(wp);
    add::add(&mut cosh_val, &e_pos, &e_neg, Rounding::Nearest);
    let cosh_val = cosh_val.scale_pow2(-1);

    (sinh_val, cosh_val)
}

fn finish_hyp(target_precision: usize, rnd: Rounding, value: MpFloat, ternary_inner: Ternary) -> (MpFloat, Ternary) {
    if value.is_zero() {
        return (value, 0);
    }
    let (sign, exponent, sig) = value.raw_parts().expect("hyperbolic value is nonzero here");
    crate::range::check_range(sign, exponent, sig.clone(), target_precision, ternary_inner, rnd)
}

/// `sinh(x, rnd)`: `sinh(0) = +0` (sign preserved), `sinh(+-inf) = +-inf`,
/// `sinh(NaN) = NaN`.
pub fn sinh(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    if x.is_infinite() {
        *z = MpFloat::infinity(x.sign(), z.precision());
        return 0;
    }
    if x.is_zero() {
        return z.set(x, rnd);
    }
    let target_precision = z.precision();
    let guard = ExpoGuard::enter();
    let (value, ternary_inner) = ziv::round_with(target_precision, rnd, |wp| {
        let (s, _c) = sinh_cosh_approx(x, wp);
        ziv::from_approx(&s, wp)
    });
    drop(guard);
    let (result, ternary) = finish_hyp(target_precision, rnd, value, ternary_inner);
    *z = result;
    ternary
}

/// `cosh(x, rnd)`: `cosh(0) = 1`, `cosh(+-inf) = +inf`, `cosh(NaN) = NaN`.
pub fn cosh(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    if x.is_infinite() {
        *z = MpFloat::infinity(Sign::Positive, z.precision());
        return 0;
    }
    if x.is_zero() {
        let one = constants::int_literal(1);
        return z.set(&one, rnd);
    }
    let target_precision = z.precision();
    let guard = ExpoGuard::enter();
    let (value, ternary_inner) = ziv::round_with(target_precision, rnd, |wp| {
        let (_s, c) = sinh_cosh_approx(x, wp);
        ziv::from_approx(&c, wp)
    });
    drop(guard);
    let (result, ternary) = finish_hyp(target_precision, rnd, value, ternary_inner);
    *z = result;
    ternary
}

/// `tanh(x, rnd) = sinh(x) / cosh(x)`: `tanh(+-inf) = +-1`.
pub fn tanh(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    if x.is_infinite() {
        let mut one = MpFloat::new(z.precision());
        convert::set_si(&mut one, 1, Rounding::Nearest);
        if x.sign() == Sign::Negative {
            one.set_neg();
        }
        *z = one;
        return 0;
    }
    if x.is_zero() {
        return z.set(x, rnd);
    }
    let working_precision = z.precision() + ziv::log2_ceil(z.precision().max(2)) + 16;
    let (s, c) = sinh_cosh_approx(x, working_precision);
    crate::div::div(z, &s, &c, rnd)
}

/// `asinh(x, rnd) = log(x + sqrt(x^2 + 1))`.
pub fn asinh(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    if x.is_infinite() || x.is_zero() {
        return z.set(x, rnd);
    }
    let working_precision = z.precision() + ziv::log2_ceil(z.precision().max(2)) + 16;
    let mut x_sq = MpFloat::new(working_precision);
    mul::mul(&mut x_sq, x, x, Rounding::Nearest);
    let one = constants::int_literal(1);
    let mut under_root = MpFloat::new(working_precision);
    add::add(&mut under_root, &x_sq, &one, Rounding::Nearest);
    let mut root = MpFloat::new(working_precision);
    sqrt::sqrt(&mut root, &under_root, Rounding::Nearest);
    let mut sum = MpFloat::new(working_precision);
    add::add(&mut sum, x, &root, Rounding::Nearest);
    log::log(z, &sum, rnd)
}

/// `acosh(x, rnd) = log(x + sqrt(x^2 - 1))`, defined for `x >= 1`.
pub fn acosh(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    let working_precision = z.precision() + ziv::log2_ceil(z.precision().max(2)) + 16;
    let one = constants::int_literal(1);
    if x.is_infinite() {
        if x.sign() == Sign::Negative {
            *z = MpFloat::nan(z.precision());
            flags::raise(Flags::NAN);
            return 0;
        }
        *z = MpFloat::infinity(Sign::Positive, z.precision());
        return 0;
    }
    if crate::cmp::cmp(x, &one) < 0 {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    if crate::cmp::equal(x, &one) {
        *z = MpFloat::zero(Sign::Positive, z.precision());
        return 0;
    }
    let mut x_sq = MpFloat::new(working_precision);
    mul::mul(&mut x_sq, x, x, Rounding::Nearest);
    let mut under_root = MpFloat::new(working_precision);
    add::sub(&mut under_root, &x_sq, &one, Rounding::Nearest);
    let mut root = MpFloat::new(working_precision);
    sqrt::sqrt(&mut root, &under_root, Rounding::Nearest);
    let mut sum = MpFloat::new(working_precision);
    add::add(&mut sum, x, &root, Rounding::Nearest);
    log::log(z, &sum, rnd)
}

/// `atanh(x, rnd) = log((1+x)/(1-x)) / 2`, defined for `|x| < 1`.
pub fn atanh(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    if x.is_zero() {
        return z.set(x, rnd);
    }
    let working_precision = z.precision() + ziv::log2_ceil(z.precision().max(2)) + 16;
    let one = constants::int_literal(1);
    if x.is_infinite() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    let abs_cmp = {
        let mut ax = MpFloat::new(working_precision);
        ax.set(x, Rounding::Nearest);
        if ax.sign() == Sign::Negative {
            ax.set_neg();
        }
        crate::cmp::cmp(&ax, &one)
    };
    if abs_cmp > 0 {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    if abs_cmp == 0 {
        *z = MpFloat::infinity(x.sign(), z.precision());
        flags::raise(Flags::ERANGE);
        return 0;
    }
    let mut numerator = MpFloat::new(working_precision);
    add::add(&mut numerator, &one, x, Rounding::Nearest);
    let mut denominator = MpFloat::new(working_precision);
    add::sub(&mut denominator, &one, x, Rounding::Nearest);
    let mut ratio = MpFloat::new(working_precision);
    crate::div::div(&mut ratio, &numerator, &denominator, Rounding::Nearest);
    let mut log_ratio = MpFloat::new(working_precision);
    log::log(&mut log_ratio, &ratio, Rounding::Nearest);
    let half = log_ratio.scale_pow2(-1);
    z.set(&half, rnd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sinh_of_zero_is_zero() {
        let mut z = MpFloat::new(64);
        let x = MpFloat::zero(Sign::Positive, 64);
        sinh(&mut z, &x, Rounding::Nearest);
        assert!(z.is_zero());
    }

    #[test]
    fn cosh_of_zero_is_one() {
        let mut z = MpFloat::new(64);
        let x = MpFloat::zero(Sign::Positive, 64);
        cosh(&mut z, &x, Rounding::Nearest);
        let mut one = MpFloat::new(64);
        convert::set_si(&mut one, 1, Rounding::Nearest);
        assert_eq!(z, one);
    }

    #[test]
    fn cosh_squared_minus_sinh_squared_is_one() {
        let mut x = MpFloat::new(80);
        convert::set_si(&mut x, 2, Rounding::Nearest);
        let mut s = MpFloat::new(80);
        sinh(&mut s, &x, Rounding::Nearest);
        let mut c = MpFloat::new(80);
        cosh(&mut c, &x, Rounding::Nearest);
        let mut c2 = MpFloat::new(80);
        mul::mul(&mut c2, &c, &c, Rounding::Nearest);
        let mut s2 = MpFloat::new(80);
        mul::mul(&mut s2, &s, &s, Rounding::Nearest);
        let mut diff = MpFloat::new(80);
        add::sub(&mut diff, &c2, &s2, Rounding::Nearest);
        let mut one = MpFloat::new(80);
        convert::set_si(&mut one, 1, Rounding::Nearest);
        assert!(crate::cmp::cmp(&diff, &one).abs() <= 1 || diff == one);
    }

    #[test]
    fn acosh_of_one_is_zero() {
        let mut z = MpFloat::new(64);
        let mut one = MpFloat::new(64);
        convert::set_si(&mut one, 1, Rounding::Nearest);
        acosh(&mut z, &one, Rounding::Nearest);
        assert!(z.is_zero());
    }

    #[test]
    fn atanh_of_zero_is_zero() {
        let mut z = MpFloat::new(64);
        let x = MpFloat::zero(Sign::Positive, 64);
        atanh(&mut z, &x, Rounding::Nearest);
        assert!(z.is_zero());
    }

    #[test]
    fn asinh_and_sinh_are_inverse_for_moderate_x() {
        let mut x = MpFloat::new(80);
        convert::set_si(&mut x, 3, Rounding::Nearest);
        let mut s = MpFloat::new(80);
        sinh(&mut s, &x, Rounding::Nearest);
        let mut back = MpFloat::new(80);
        asinh(&mut back, &s, Rounding::Nearest);
        let diff = crate::cmp::cmp(&back, &x);
        assert!(diff.abs() <= 1 || back == x);
    }
}
