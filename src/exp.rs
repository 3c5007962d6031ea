//! `exp` and `expm1` (spec §4.10).
//!
//! Argument reduction writes `x = k*log(2) + r` with `|r| <= log(2)/2` and
//! computes `exp(r)` by direct Taylor summation on the reduced argument,
//! then rescales by the exact power of two `2^k` -- the source's
//! `mpfr_exp`/`mpfr_exp_3` do the same reduction, trading its high-precision
//! crossover algorithm for a single series path (documented simplification,
//! consistent with spec §9.2's "unspecified algorithm choices are
//! implementation-defined").

use crate::add;
use crate::constants;
use crate::convert;
use crate::div;
use crate::flags::{self, ExpoGuard, Flags};
use crate::mul;
use crate::repr::MpFloat;
use crate::round::{Rounding, Ternary};
use crate::ziv;
use dashu_base::Sign;

/// `k = round(x / log 2)`, the number of `log(2)` multiples to strip out
/// of `x` before summing the series. Only `k`'s *value* matters for
/// correctness (the reduction identity `exp(x) = 2^k * exp(x - k*log2)`
/// holds for any integer `k`); picking the nearest one is purely so the
/// remaining remainder is small and the series converges quickly. Computed
/// at a modest fixed precision, independent of the caller's target
/// precision or the Ziv loop's working precision.
///
/// `k` saturates at `i64::MIN`/`i64::MAX` for `x` whose magnitude is so
/// extreme the exact reduction count doesn't fit a native integer -- the
/// same ceiling the source's `mpfr_exp` accepts by using a native `long`
/// for its own `k`.
pub(crate) fn reduction_k(x: &MpFloat) -> i64 {
    let probe_precision = x.precision().max(64) + 64;
    let mut log2_val = MpFloat::new(probe_precision);
    constants::const_log2(&mut log2_val, Rounding::Nearest);
    let mut ratio = MpFloat::new(probe_precision);
    div::div(&mut ratio, x, &log2_val, Rounding::Nearest);
    convert::get_si(&ratio, Rounding::Nearest)
}

/// `exp(x)` approximated at working precision `wp`, given a precomputed
/// reduction count `k`. Returns a finite, strictly positive `wp`-bit
/// value.
pub(crate) fn exp_reduced(x: &MpFloat, k: i64, wp: usize) -> MpFloat {
    let mut log2_val = MpFloat::new(wp);
    constants::const_log2(&mut log2_val, Rounding::Nearest);

    let k_log2 = if k == 0 {
        MpFloat::zero(Sign::Positive, wp)
    } else {
        let k_lit = constants::int_literal(k.unsigned_abs());
        let mut prod = MpFloat::new(wp);
        mul::mul(&mut prod, &k_lit, &log2_val, Rounding::Nearest);
        if k < 0 {
            prod.set_neg();
        }
        prod
    };

    let mut r = MpFloat::new(wp);
    add::sub(&mut r, x, &k_log2, Rounding::Nearest);

    let sum = exp_series(&r, wp);
    sum.scale_pow2(k)
}

/// `sum_{n>=0} r^n/n!` at working precision `wp`, summed until a term
/// rounds to zero or stops changing the running total -- the same
/// convergence style [`constants::log_via_reduction`] uses.
fn exp_series(r: &MpFloat, wp: usize) -> MpFloat {
    let one = constants::int_literal(1);
    let mut sum = MpFloat::new(wp);
    sum.set(&one, Rounding::Nearest);
    let mut term = sum.clone();
    let mut n: u64 = 0;
    loop {
        n += 1;
        let mut next_term = MpFloat::new(wp);
        mul::mul(&mut next_term, &term, r, Rounding::Nearest);
        let denom = constants::int_literal(n);
        let mut divided = MpFloat::new(wp);
        div::div(&mut divided, &next_term, &denom, Rounding::Nearest);
        term = divided;
        if term.is_zero() {
            break;
        }
        let mut new_sum = MpFloat::new(wp);
        add::add(&mut new_sum, &sum, &term, Rounding::Nearest);
        let unchanged = new_sum == sum;
        sum = new_sum;
        if unchanged {
            break;
        }
    }
    sum
}

/// `exp(x, rnd)` (spec §4.10): singular cases `exp(NaN) = NaN`,
/// `exp(+inf) = +inf`, `exp(-inf) = +0`, `exp(0) = 1` exactly; otherwise
/// the reduce-then-series path above, driven by a Ziv loop and finished
/// with an explicit range check against the caller's real exponent bounds
/// (the reduction itself runs with the exponent range widened, so it
/// can't spuriously clip an intermediate result).
pub fn exp(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    if x.is_infinite() {
        *z = if x.sign() == Sign::Positive {
            MpFloat::infinity(Sign::Positive, z.precision())
        } else {
            MpFloat::zero(Sign::Positive, z.precision())
        };
        return 0;
    }
    if x.is_zero() {
        let one = constants::int_literal(1);
        return z.set(&one, rnd);
    }

    let target_precision = z.precision();
    let guard = ExpoGuard::enter();
    let k = reduction_k(x);
    let (value, ternary_inner) = ziv::round_with(target_precision, rnd, |wp| {
        let approx = exp_reduced(x, k, wp);
        ziv::from_approx(&approx, wp)
    });
    drop(guard);

    let (sign, exponent, sig) = value.raw_parts().expect("exp(x) is always finite and nonzero");
    let (result, ternary) = crate::range::check_range(sign, exponent, sig.clone(), target_precision, ternary_inner, rnd);
    *z = result;
    ternary
}

/// `exp(x) - 1` approximated at working precision `wp`. For `|x| < 1` the
/// direct series `r + r^2/2! + r^3/3! + ...` (no leading `1` term to
/// cancel) avoids the catastrophic cancellation `exp(x)` followed by `- 1`
/// would suffer for small `x`; otherwise `exp(x)` is already well away
/// from `1` and a plain subtraction loses no useful precision.
fn expm1_approx(x: &MpFloat, wp: usize) -> MpFloat {
    let (_, exponent, _) = x.raw_parts().expect("expm1_approx expects finite nonzero x");
    if exponent <= 0 {
        direct_expm1_series(x, wp)
    } else {
        let k = reduction_k(x);
        let e = exp_reduced(x, k, wp);
        let one = constants::int_literal(1);
        let mut out = MpFloat::new(wp);
        add::sub(&mut out, &e, &one, Rounding::Nearest);
        out
    }
}

fn direct_expm1_series(x: &MpFloat, wp: usize) -> MpFloat {
    let mut sum = MpFloat::new(wp);
    sum.set(x, Rounding::Nearest);
    let mut term = sum.clone();
    let mut n: u64 = 1;
    loop {
        n += 1;
        let mut next_term = MpFloat::new(wp);
        mul::mul(&mut next_term, &term, x, Rounding::Nearest);
        let denom = constants::int_literal(n);
        let mut divided = MpFloat::new(wp);
        div::div(&mut divided, &next_term, &denom, Rounding::Nearest);
        term = divided;
        if term.is_zero() {
            break;
        }
        let mut new_sum = MpFloat::new(wp);
        add::add(&mut new_sum, &sum, &term, Rounding::Nearest);
        let unchanged = new_sum == sum;
        sum = new_sum;
        if unchanged {
            break;
        }
    }
    sum
}

/// `expm1(x, rnd)`: `exp(x) - 1`, accurate for `x` near zero. Singular
/// cases mirror [`exp`] shifted down by one: `expm1(+inf) = +inf`,
/// `expm1(-inf) = -1`, `expm1(0) = 0` (sign of zero preserved, matching
/// `exp(0) - 1`'s exact cancellation).
pub fn expm1(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    if x.is_infinite() {
        *z = if x.sign() == Sign::Positive {
            MpFloat::infinity(Sign::Positive, z.precision())
        } else {
            let mut neg_one = MpFloat::new(z.precision());
            convert::set_si(&mut neg_one, -1, Rounding::Nearest);
            neg_one
        };
        return 0;
    }
    if x.is_zero() {
        return z.set(x, rnd);
    }

    let target_precision = z.precision();
    let guard = ExpoGuard::enter();
    let (value, ternary_inner) = ziv::round_with(target_precision, rnd, |wp| {
        let approx = expm1_approx(x, wp);
        ziv::from_approx(&approx, wp)
    });
    drop(guard);

    let (sign, exponent, sig) = value.raw_parts().expect("expm1(x) is always finite and nonzero for nonzero x");
    let (result, ternary) = crate::range::check_range(sign, exponent, sig.clone(), target_precision, ternary_inner, rnd);
    *z = result;
    ternary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exp_zero_is_exactly_one() {
        let mut z = MpFloat::new(64);
        let x = MpFloat::zero(Sign::Positive, 64);
        let t = exp(&mut z, &x, Rounding::Nearest);
        assert_eq!(t, 0);
        let mut one = MpFloat::new(64);
        convert::set_si(&mut one, 1, Rounding::Nearest);
        assert_eq!(z, one);
    }

    #[test]
    fn exp_of_negative_infinity_is_zero() {
        let mut z = MpFloat::new(64);
        let x = MpFloat::infinity(Sign::Negative, 64);
        exp(&mut z, &x, Rounding::Nearest);
        assert!(z.is_zero());
    }

    #[test]
    fn exp_one_is_between_two_and_three() {
        let mut z = MpFloat::new(64);
        let mut x = MpFloat::new(64);
        convert::set_si(&mut x, 1, Rounding::Nearest);
        exp(&mut z, &x, Rounding::Nearest);
        let mut two = MpFloat::new(64);
        convert::set_si(&mut two, 2, Rounding::Nearest);
        let mut three = MpFloat::new(64);
        convert::set_si(&mut three, 3, Rounding::Nearest);
        assert!(crate::cmp::cmp(&z, &two) > 0);
        assert!(crate::cmp::cmp(&z, &three) < 0);
    }

    #[test]
    fn expm1_of_zero_is_zero() {
        let mut z = MpFloat::new(64);
        let x = MpFloat::zero(Sign::Positive, 64);
        expm1(&mut z, &x, Rounding::Nearest);
        assert!(z.is_zero());
    }

    #[test]
    fn expm1_matches_exp_minus_one_for_moderate_x() {
        let mut x = MpFloat::new(80);
        convert::set_si(&mut x, 2, Rounding::Nearest);
        let mut via_expm1 = MpFloat::new(80);
        expm1(&mut via_expm1, &x, Rounding::Nearest);
        let mut e_x = MpFloat::new(80);
        exp(&mut e_x, &x, Rounding::Nearest);
        let mut one = MpFloat::new(80);
        convert::set_si(&mut one, 1, Rounding::Nearest);
        let mut via_exp = MpFloat::new(80);
        add::sub(&mut via_exp, &e_x, &one, Rounding::Nearest);
        assert_eq!(via_expm1, via_exp);
    }
}
