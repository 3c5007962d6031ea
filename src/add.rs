//! Addition/subtraction core (spec §4.6).
//!
//! Unlike the source's fixed-limb-buffer implementation, operand
//! alignment here is done with exact arbitrary-precision arithmetic: both
//! significands are shifted into a common `w`-bit window (`w` = the
//! largest of the two operand precisions and the target precision, plus
//! a couple of guard bits) and added or subtracted as plain integers.
//! Anything that would fall below that window is folded into a single
//! sticky bit instead of being shifted in full, so an operand with a
//! wildly different exponent costs a small, bounded shift rather than an
//! allocation proportional to the exponent gap. The final narrowing to
//! the caller's target precision goes through the same
//! [`crate::round::round_significand`] kernel (via [`crate::range::finish`])
//! every other operation uses, so the guard/round/sticky bits spec §4.6
//! describes are recovered from the exact sum rather than tracked by hand.

use crate::flags::{self, Flags};
use crate::repr::{Class, MpFloat};
use crate::round::{Rounding, Ternary};
use dashu_base::{BitTest, Sign};
use dashu_int::UBig;

fn opposite(sign: Sign) -> Sign {
    match sign {
        Sign::Positive => Sign::Negative,
        Sign::Negative => Sign::Positive,
    }
}

/// `add(z, x, y, rnd)`.
pub fn add(z: &mut MpFloat, x: &MpFloat, y: &MpFloat, rnd: Rounding) -> Ternary {
    add_impl(z, x, y, rnd, false)
}

/// `sub(z, x, y, rnd)`, i.e. `add(z, x, -y, rnd)`.
pub fn sub(z: &mut MpFloat, x: &MpFloat, y: &MpFloat, rnd: Rounding) -> Ternary {
    add_impl(z, x, y, rnd, true)
}

fn add_impl(z: &mut MpFloat, x: &MpFloat, y: &MpFloat, rnd: Rounding, negate_y: bool) -> Ternary {
    if x.is_nan() || y.is_nan() {
        *z = MpFloat::nan(z.precision);
        flags::raise(Flags::NAN);
        return 0;
    }

    let y_sign = if negate_y { opposite(y.sign()) } else { y.sign() };

    if x.is_infinite() || y.is_infinite() {
        return match (x.is_infinite(), y.is_infinite()) {
            (true, true) => {
                if x.sign() == y_sign {
                    *z = MpFloat::infinity(x.sign(), z.precision);
                    0
                } else {
                    *z = MpFloat::nan(z.precision);
                    flags::raise(Flags::NAN);
                    0
                }
            }
            (true, false) => {
                *z = MpFloat::infinity(x.sign(), z.precision);
                0
            }
            (false, true) => {
                *z = MpFloat::infinity(y_sign, z.precision);
                0
            }
            (false, false) => unreachable!(),
        };
    }

    if x.is_zero() && y.is_zero() {
        let sign = if x.sign() == y_sign {
            x.sign()
        } else if rnd == Rounding::Down {
            Sign::Negative
        } else {
            Sign::Positive
        };
        *z = MpFloat::zero(sign, z.precision);
        return 0;
    }

    if x.is_zero() {
        let (sign, exponent, sig) = y.raw_parts().expect("non-singular");
        let sign = if negate_y { opposite(sign) } else { sign };
        let precision = y.precision();
        let (result, t) = crate::range::finish(sign, exponent, sig.clone(), precision, false, z.precision, rnd);
        *z = result;
        return t;
    }
    if y.is_zero() {
        let (sign, exponent, sig) = x.raw_parts().expect("non-singular");
        let precision = x.precision();
        let (result, t) = crate::range::finish(sign, exponent, sig.clone(), precision, false, z.precision, rnd);
        *z = result;
        return t;
    }

    let target_precision = z.precision;
    if x.sign() == y_sign {
        same_sign_add(x.sign(), x, y, target_precision, rnd, z)
    } else {
        // Opposite signs: the larger-magnitude operand decides the
        // result's sign; `cmp_abs` ignores sign entirely so it's safe to
        // call before we've applied `negate_y`.
        match crate::cmp::cmp_abs(x, y) {
            0 => {
                let sign = if rnd == Rounding::Down { Sign::Negative } else { Sign::Positive };
                *z = MpFloat::zero(sign, target_precision);
                0
            }
            c if c > 0 => different_sign_sub(x.sign(), x, y, target_precision, rnd, z),
            _ => different_sign_sub(y_sign, y, x, target_precision, rnd, z),
        }
    }
}

/// Shift both operands' significands into a common `w`-bit window
/// anchored at the larger exponent, returning `(window_width, frame_scale,
/// int_larger, int_smaller, sticky_from_smaller)`.
fn align(
    e_hi: i64,
    p_hi: usize,
    sig_hi: &UBig,
    e_lo: i64,
    p_lo: usize,
    sig_lo: &UBig,
    target_precision: usize,
) -> (i64, UBig, UBig, bool) {
    let w = target_precision.max(p_hi).max(p_lo) + 2;
    let frame_scale = e_hi - w as i64;
    let int_hi = sig_hi << (w - p_hi);

    let shift_lo = (e_lo - p_lo as i64) - frame_scale;
    let (int_lo, sticky) = if shift_lo >= 0 {
        (sig_lo << shift_lo as usize, false)
    } else {
        let drop = (-shift_lo) as usize;
        if drop >= sig_lo.bit_len() {
            (UBig::ZERO, true)
        } else {
            let truncated = sig_lo >> drop;
            let low_mask = (UBig::ONE << drop) - UBig::ONE;
            let sticky = !(sig_lo & &low_mask).is_zero();
            (truncated, sticky)
        }
    };
    (frame_scale, int_hi, int_lo, sticky)
}

fn same_sign_add(
    sign: Sign,
    x: &MpFloat,
    y: &MpFloat,
    target_precision: usize,
    rnd: Rounding,
    z: &mut MpFloat,
) -> Ternary {
    let (_, ex, sx) = x.raw_parts().unwrap();
    let (_, ey, sy) = y.raw_parts().unwrap();
    let (frame_scale, int_a, int_b, sticky) = if ex >= ey {
        align(ex, x.precision(), sx, ey, y.precision(), sy, target_precision)
    } else {
        align(ey, y.precision(), sy, ex, x.precision(), sx, target_precision)
    };
    let sum = int_a + int_b;
    let sp = sum.bit_len();
    let exponent = frame_scale + sp as i64;
    let (result, t) = crate::range::finish(sign, exponent, sum, sp, sticky, target_precision, rnd);
    *z = result;
    t
}

/// `x` is already known to have the strictly larger (or at least
/// tied-and-resolved) magnitude; `sign` is the result's sign.
fn different_sign_sub(
    sign: Sign,
    larger: &MpFloat,
    smaller: &MpFloat,
    target_precision: usize,
    rnd: Rounding,
    z: &mut MpFloat,
) -> Ternary {
    let (_, e_hi, s_hi) = larger.raw_parts().unwrap();
    let (_, e_lo, s_lo) = smaller.raw_parts().unwrap();
    let (frame_scale, int_hi, int_lo_floor, sticky) =
        align(e_hi, larger.precision(), s_hi, e_lo, smaller.precision(), s_lo, target_precision);
    // `round_significand`'s `sticky_in` convention assumes the source it's
    // given *underestimates* the exact value (more positive bits to come).
    // Subtracting a floor-truncated subtrahend overestimates the true
    // difference instead, so when bits were actually dropped we subtract
    // its ceiling (floor + 1) to flip the error the same direction: the
    // true difference only ever sits strictly below `floor + 1`'s
    // contribution, so `int_hi - (floor + 1)` underestimates it, matching
    // what every other caller of `finish` means by `sticky_in`.
    let int_lo = if sticky { int_lo_floor + UBig::ONE } else { int_lo_floor };
    // `align`'s window only truncates the minuend's low bits when the
    // exponent gap is wide enough that `int_lo`'s ceiling is still tiny
    // next to `int_hi` (>= 2^(w-1)), so this never borrows past zero.
    debug_assert!(int_lo <= int_hi);
    let diff = int_hi - int_lo;
    if diff.is_zero() && !sticky {
        let zsign = if rnd == Rounding::Down { Sign::Negative } else { Sign::Positive };
        *z = MpFloat::zero(zsign, target_precision);
        return 0;
    }
    let sp = diff.bit_len();
    let exponent = frame_scale + sp as i64;
    let (result, t) = crate::range::finish(sign, exponent, diff, sp, sticky, target_precision, rnd);
    *z = result;
    t
}
