//! `log` and `log1p` (spec §4.10).
//!
//! Reduces to `log(m * 2^e) = log(m) + e*log(2)` with `m` normalized into
//! `[1, 2)` via the exact [`MpFloat::scale_pow2`] rescale, then hands `m`
//! (whose own logarithm is always `O(1)`, regardless of how extreme `x`'s
//! exponent is) to [`constants::log_via_reduction`]'s repeated-square-root
//! series. Normalizing first is what keeps that series' fixed iteration
//! schedule valid for every magnitude of `x`, not just values already near
//! `1` -- [`crate::constants::euler_gamma`]'s `ln(N)` term goes through
//! this same path for exactly that reason.

use crate::add;
use crate::constants;
use crate::flags::{self, ExpoGuard, Flags};
use crate::mul;
use crate::repr::MpFloat;
use crate::round::{Rounding, Ternary};
use crate::ziv;
use dashu_base::Sign;

/// `log(x)` approximated at working precision `wp`, for any finite
/// strictly positive `x`.
pub(crate) fn log_approx(x: &MpFloat, wp: usize) -> MpFloat {
    let (_, exponent, _) = x.raw_parts().expect("log_approx expects a finite nonzero x");
    let e = exponent - 1;
    let m = x.scale_pow2(-e);
    let (log_m, _) = constants::log_via_reduction(&m, wp);
    if e == 0 {
        return log_m;
    }
    let mut log2_val = MpFloat::new(wp);
    constants::const_log2(&mut log2_val, Rounding::Nearest);
    let e_lit = constants::int_literal(e.unsigned_abs());
    let mut e_log2 = MpFloat::new(wp);
    mul::mul(&mut e_log2, &e_lit, &log2_val, Rounding::Nearest);
    if e < 0 {
        e_log2.set_neg();
    }
    let mut out = MpFloat::new(wp);
    add::add(&mut out, &log_m, &e_log2, Rounding::Nearest);
    out
}

/// `log(x, rnd)` (spec §4.10): singular cases `log(1) = +0`,
/// `log(x<0 or NaN) = NaN`, `log(0) = -inf`, `log(+inf) = +inf`;
/// otherwise the normalize-then-reduce path above, driven by a Ziv loop
/// and finished with an explicit range check (matching [`crate::exp::exp`]'s
/// widened-then-restored exponent range discipline).
pub fn log(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() || x.sign() == Sign::Negative && x.is_finite() && !x.is_zero() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    if x.is_infinite() {
        if x.sign() == Sign::Negative {
            *z = MpFloat::nan(z.precision());
            flags::raise(Flags::NAN);
            return 0;
        }
        *z = MpFloat::infinity(Sign::Positive, z.precision());
        return 0;
    }
    if x.is_zero() {
        *z = MpFloat::infinity(Sign::Negative, z.precision());
        return 0;
    }

    let target_precision = z.precision();
    let guard = ExpoGuard::enter();
    let (value, ternary_inner) = ziv::round_with(target_precision, rnd, |wp| {
        let approx = log_approx(x, wp);
        if approx.is_zero() {
            // log(1) == 0 exactly; a Ziv iteration can land here directly
            // when x is exactly a power of two equal to 1.
            (Sign::Positive, 0, dashu_int::UBig::ONE << (target_precision - 1), target_precision)
        } else {
            ziv::from_approx(&approx, wp)
        }
    });
    drop(guard);

    if value.is_zero() {
        *z = value;
        return 0;
    }
    let (sign, exponent, sig) = value.raw_parts().expect("log(x) is nonzero here");
    let (result, ternary) = crate::range::check_range(sign, exponent, sig.clone(), target_precision, ternary_inner, rnd);
    *z = result;
    ternary
}

/// `log1p(x) = log(1 + x)` approximated at working precision `wp`. When
/// `x` is tiny enough that `x^2` is already below `wp`'s resolution,
/// `log(1+x) ~= x` to within the needed precision and computing `1+x`
/// explicitly would just round `x` away; otherwise `1+x` is formed at
/// enough extra precision to capture `x` exactly before reducing.
fn log1p_approx(x: &MpFloat, wp: usize) -> MpFloat {
    let (_, x_exp, _) = x.raw_parts().expect("log1p_approx expects a finite nonzero x");
    if x_exp < -(wp as i64) - 4 {
        let mut out = MpFloat::new(wp);
        out.set(x, Rounding::Nearest);
        return out;
    }
    let gap = (1 - x_exp).max(0) as usize;
    let wp_sum = wp + gap + 16;
    let one = constants::int_literal(1);
    let mut onepx = MpFloat::new(wp_sum);
    add::add(&mut onepx, &one, x, Rounding::Nearest);
    log_approx(&onepx, wp)
}

/// `log1p(x, rnd)`: singular cases `log1p(-1) = -inf`, `log1p(x < -1) = NaN`,
/// `log1p(+inf) = +inf`, `log1p(0) = +0`.
pub fn log1p(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    if x.is_infinite() {
        if x.sign() == Sign::Negative {
            *z = MpFloat::nan(z.precision());
            flags::raise(Flags::NAN);
            return 0;
        }
        *z = MpFloat::infinity(Sign::Positive, z.precision());
        return 0;
    }
    if x.is_zero() {
        return z.set(x, rnd);
    }

    // `1 + x == 0` iff `x` is exactly `-1`; compare via raw parts since
    // `x` may not be an integer literal.
    {
        let mut neg_one = MpFloat::new(x.precision().max(2));
        crate::convert::set_si(&mut neg_one, -1, Rounding::Nearest);
        if crate::cmp::equal(x, &neg_one) {
            *z = MpFloat::infinity(Sign::Negative, z.precision());
            return 0;
        }
        if crate::cmp::cmp(x, &neg_one) < 0 {
            *z = MpFloat::nan(z.precision());
            flags::raise(Flags::NAN);
            return 0;
        }
    }

    let target_precision = z.precision();
    let guard = ExpoGuard::enter();
    let (value, ternary_inner) = ziv::round_with(target_precision, rnd, |wp| {
        let approx = log1p_approx(x, wp);
        if approx.is_zero() {
            (Sign::Positive, 0, dashu_int::UBig::ONE << (target_precision - 1), target_precision)
        } else {
            ziv::from_approx(&approx, wp)
        }
    });
    drop(guard);

    if value.is_zero() {
        *z = value;
        return 0;
    }
    let (sign, exponent, sig) = value.raw_parts().expect("log1p(x) is nonzero here");
    let (result, ternary) = crate::range::check_range(sign, exponent, sig.clone(), target_precision, ternary_inner, rnd);
    *z = result;
    ternary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_of_one_is_exactly_zero() {
        let mut z = MpFloat::new(64);
        let mut one = MpFloat::new(64);
        crate::convert::set_si(&mut one, 1, Rounding::Nearest);
        let t = log(&mut z, &one, Rounding::Nearest);
        assert_eq!(t, 0);
        assert!(z.is_zero());
    }

    #[test]
    fn log_of_negative_is_nan() {
        let mut z = MpFloat::new(64);
        let mut neg = MpFloat::new(64);
        crate::convert::set_si(&mut neg, -5, Rounding::Nearest);
        log(&mut z, &neg, Rounding::Nearest);
        assert!(z.is_nan());
    }

    #[test]
    fn log_of_zero_is_negative_infinity() {
        let mut z = MpFloat::new(64);
        let x = MpFloat::zero(Sign::Positive, 64);
        log(&mut z, &x, Rounding::Nearest);
        assert!(z.is_infinite() && z.sign() == Sign::Negative);
    }

    #[test]
    fn log_of_large_power_of_two_tracks_exponent() {
        // log(2^1000) == 1000 * log(2); check it lands strictly between
        // 693 and 694 (1000 * ln 2 ~= 693.15).
        let mut x = MpFloat::new(64);
        let mut one = MpFloat::new(64);
        crate::convert::set_si(&mut one, 1, Rounding::Nearest);
        x.set(&one, Rounding::Nearest);
        x = x.scale_pow2(1000);
        let mut z = MpFloat::new(64);
        log(&mut z, &x, Rounding::Nearest);
        let mut lo = MpFloat::new(64);
        crate::convert::set_si(&mut lo, 693, Rounding::Nearest);
        let mut hi = MpFloat::new(64);
        crate::convert::set_si(&mut hi, 694, Rounding::Nearest);
        assert!(crate::cmp::cmp(&z, &lo) > 0);
        assert!(crate::cmp::cmp(&z, &hi) < 0);
    }

    #[test]
    fn log1p_of_zero_is_zero() {
        let mut z = MpFloat::new(64);
        let x = MpFloat::zero(Sign::Positive, 64);
        log1p(&mut z, &x, Rounding::Nearest);
        assert!(z.is_zero());
    }

    #[test]
    fn log1p_matches_log_of_one_plus_x_for_moderate_x() {
        let mut x = MpFloat::new(80);
        crate::convert::set_si(&mut x, 4, Rounding::Nearest);
        let mut via_log1p = MpFloat::new(80);
        log1p(&mut via_log1p, &x, Rounding::Nearest);
        let mut one = MpFloat::new(80);
        crate::convert::set_si(&mut one, 1, Rounding::Nearest);
        let mut onepx = MpFloat::new(80);
        add::add(&mut onepx, &one, &x, Rounding::Nearest);
        let mut via_log = MpFloat::new(80);
        log(&mut via_log, &onepx, Rounding::Nearest);
        assert_eq!(via_log1p, via_log);
    }
}
