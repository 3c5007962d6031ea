//! The rounding kernel shared by every operation (spec §4.3).
//!
//! Every arithmetic and transcendental operation eventually narrows a wide
//! intermediate significand down to the caller's target precision through
//! [`round_significand`]. The Ziv loop (`ziv.rs`) additionally relies on
//! [`can_round`] to decide whether a working-precision approximation
//! already determines the final, correctly rounded result.

use dashu_base::{Approximation, Sign};
use dashu_int::UBig;

/// Sign of `computed - exact`: `0` if equal, `>0` if the computed value is
/// strictly greater than the exact value, `<0` if strictly less. The sign
/// is absolute, not relative to the operand's own sign (spec §3.4).
pub type Ternary = i32;

/// A value together with the ternary indicator of how it was rounded.
pub type Rounded<T> = Approximation<T, Ternary>;

/// The four IEEE-style rounding modes spec.md exposes as an explicit
/// parameter of every operation, rather than baking the mode into the
/// value's type the way the teacher crate does (`dashu_float::FBig<R, _>`).
/// Runtime-parameterized rounding matches spec.md §6.1/§6.3 exactly: the
/// rounding mode varies per call, not per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round to the nearest representable value; ties go to the value
    /// whose last significand bit is zero (banker's rounding).
    Nearest,
    /// Round toward zero (truncate the significand).
    Zero,
    /// Round toward positive infinity.
    Up,
    /// Round toward negative infinity.
    Down,
}

impl Rounding {
    /// `true` if this mode ever needs to inspect the sign of the value
    /// being rounded to decide the direction (`Up`/`Down`); `Nearest` and
    /// `Zero` are sign-agnostic at the bit-manipulation level.
    #[inline]
    pub const fn is_directed(self) -> bool {
        matches!(self, Rounding::Up | Rounding::Down)
    }
}

#[inline]
fn sign_val(sign: Sign) -> Ternary {
    match sign {
        Sign::Positive => 1,
        Sign::Negative => -1,
    }
}

/// Result of narrowing a significand to a target precision.
pub struct RoundResult {
    /// The rounded significand, exactly `target_precision` bits wide
    /// (top bit set, unless the value is exactly zero).
    pub significand: UBig,
    /// Set iff rounding carried the significand from `111...1` to
    /// `1000...0`, i.e. the result's binary exponent must be incremented
    /// by the caller (and the significand below is already shifted back
    /// down to `target_precision` bits).
    pub carry_out: bool,
    /// The ternary indicator for this rounding step alone.
    pub ternary: Ternary,
}

/// Round `src`, understood as an `sp`-bit-wide (magnitude) significand of
/// a value with the given `sign`, down to `target_precision` bits under
/// `mode`.
///
/// `sticky_in` lets callers (add/sub, division, the transcendental Ziv
/// loop) fold in sticky information about bits that were already shifted
/// out of `src` before this call (e.g. bits lost during alignment shifts),
/// so the kernel never has to see the full unshifted operand.
///
/// This is the single place in the crate that implements the round/sticky
/// bit logic of spec §4.3; every other module is built on top of it.
pub fn round_significand(
    src: &UBig,
    sp: usize,
    target_precision: usize,
    sign: Sign,
    mode: Rounding,
    sticky_in: bool,
) -> RoundResult {
    assert!(target_precision >= 1);

    if sp <= target_precision {
        let significand = src << (target_precision - sp);
        let ternary = if sticky_in { -sign_val(sign) } else { 0 };
        // A carry can't happen here: we only ever grew the significand.
        return RoundResult {
            significand,
            carry_out: false,
            ternary,
        };
    }

    let drop = sp - target_precision;
    let round_bit = src.bit(drop - 1);
    let sticky = sticky_in
        || (drop >= 2 && {
            let low_mask = (UBig::ONE << (drop - 1)) - UBig::ONE;
            !(src & &low_mask).is_zero()
        });
    let truncated = src >> drop;

    let round_up = if !round_bit && !sticky {
        false
    } else {
        match mode {
            Rounding::Zero => false,
            Rounding::Up => sign == Sign::Positive,
            Rounding::Down => sign == Sign::Negative,
            Rounding::Nearest => round_bit && (sticky || truncated.bit(0)),
        }
    };

    if !round_bit && !sticky {
        return RoundResult {
            significand: truncated,
            carry_out: false,
            ternary: 0,
        };
    }

    if round_up {
        let incremented = &truncated + UBig::ONE;
        if incremented.bit_len() > target_precision {
            RoundResult {
                significand: incremented >> 1,
                carry_out: true,
                ternary: sign_val(sign),
            }
        } else {
            RoundResult {
                significand: incremented,
                carry_out: false,
                ternary: sign_val(sign),
            }
        }
    } else {
        RoundResult {
            significand: truncated,
            carry_out: false,
            ternary: -sign_val(sign),
        }
    }
}

/// The can-round predicate (spec §4.3 "Auxiliary"): given an approximation
/// `significand` of `sp` bits whose error is bounded by `2^(E - err)` in
/// the same units as `significand`'s own bit positions, decide whether
/// rounding it to `target_precision` bits under `mode` is guaranteed to
/// agree with rounding the (unknown) exact value.
///
/// This is deliberately conservative: it may answer `false` (forcing one
/// more Ziv iteration) in a few cases exactly on a binade boundary that a
/// sharper analysis could still round, but it never answers `true`
/// incorrectly.
pub fn can_round(significand: &UBig, sp: usize, err: usize, target_precision: usize, mode: Rounding) -> bool {
    if sp < target_precision || err <= target_precision {
        return false;
    }
    let window = sp - target_precision;
    if window == 0 {
        return true;
    }
    let slack = err - target_precision; // number of bits of agreement beyond the rounding boundary
    let start = window - 1; // position of the round bit
    let lo = start.saturating_sub(slack.saturating_sub(1));
    let mask_len = start - lo + 1;
    let mask = (UBig::ONE << mask_len) - UBig::ONE;
    let bits = (significand >> lo) & &mask;
    let all_zero = bits.is_zero();
    let all_one = bits == mask;

    match mode {
        Rounding::Zero | Rounding::Up | Rounding::Down => all_zero || all_one,
        Rounding::Nearest => (all_zero || all_one) && slack >= 2,
    }
}
