//! The floating-point value type, its invariants and lifecycle (spec §4.1,
//! §3.1–3.3).

use crate::flags::{self, Flags};
use crate::round::{Rounding, Ternary};
use crate::PREC_MIN;
use dashu_base::{BitTest, Sign};
use dashu_int::UBig;

/// The non-singular / singular split of spec §3.1. Significand content is
/// only meaningful for `Finite`; for every other variant it's ignored, but
/// `sign` is always meaningful (spec §3.1: "sign: ... always defined, even
/// on zero, NaN, infinity").
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Class {
    Nan,
    Infinite,
    Zero,
    /// Invariant (I-Norm): `significand.bit_len() == precision` (top bit
    /// set), enforced by every constructor in this module and by the
    /// rounding kernel that produces it.
    Finite(UBig),
}

/// An arbitrary-precision binary floating-point value:
/// `sign * significand * 2^(exponent - precision)`, with
/// `2^(precision-1) <= significand < 2^precision` for finite non-zero
/// values (spec §3.1).
///
/// A value owns its significand outright (no aliasing of storage between
/// handles); operations that allow aliased operand/result handles copy out
/// whatever operand state they still need before writing the result
/// (spec §3.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MpFloat {
    pub(crate) sign: Sign,
    pub(crate) precision: usize,
    /// Only meaningful when `class` is `Finite`.
    pub(crate) exponent: i64,
    pub(crate) class: Class,
}

impl MpFloat {
    /// `init(x, p)` (spec §4.1): allocate at precision `p`, value is NaN.
    ///
    /// # Panics
    /// Panics if `p < PREC_MIN` or `p > crate::PREC_MAX`.
    pub fn new(precision: usize) -> Self {
        assert!(precision >= PREC_MIN, "precision below PREC_MIN");
        assert!(precision <= crate::PREC_MAX, "precision above PREC_MAX");
        MpFloat {
            sign: Sign::Positive,
            precision,
            exponent: 0,
            class: Class::Nan,
        }
    }

    /// `clear(x)` (spec §4.1): release the significand and reset the
    /// value to NaN at the same precision. In Rust there's no manual
    /// buffer to free, but the operation is kept for interface parity and
    /// because it documents the destructive contract at call sites.
    pub fn clear(&mut self) {
        self.sign = Sign::Positive;
        self.exponent = 0;
        self.class = Class::Nan;
    }

    /// `set_prec(x, p')` (spec §4.1): change precision. This is
    /// destructive by explicit contract — the value becomes NaN, it is
    /// never re-rounded to the new precision. Use [`Self::with_precision`]
    /// (built on [`Self::set`]) if you want the value preserved.
    pub fn set_prec(&mut self, precision: usize) {
        assert!(precision >= PREC_MIN, "precision below PREC_MIN");
        assert!(precision <= crate::PREC_MAX, "precision above PREC_MAX");
        self.precision = precision;
        self.sign = Sign::Positive;
        self.exponent = 0;
        self.class = Class::Nan;
    }

    /// `get_prec(x)`.
    #[inline]
    pub fn get_prec(&self) -> usize {
        self.precision
    }

    /// Alias of [`Self::get_prec`].
    #[inline]
    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Round `y` into a freshly allocated value at `y`'s own precision
    /// first; use [`Self::with_precision`] to change precision.
    pub fn from_other(y: &MpFloat) -> Self {
        y.clone()
    }

    /// Return a copy of `self` rounded to `precision`, i.e. `set(dst, self,
    /// rnd)` with `dst` freshly allocated at `precision`.
    pub fn with_precision(&self, precision: usize, rnd: Rounding) -> (Self, Ternary) {
        let mut dst = MpFloat::new(precision);
        let t = dst.set(self, rnd);
        (dst, t)
    }

    /// `set(x, y, rnd)` (spec §4.1): round `y` into `self` at `self`'s own
    /// precision. Handles use-self-as-source aliasing (`x.set(&x_clone,
    /// ..)`) because the read of `y` happens before any write to `self`.
    pub fn set(&mut self, y: &MpFloat, rnd: Rounding) -> Ternary {
        match &y.class {
            Class::Nan => {
                self.class = Class::Nan;
                self.sign = Sign::Positive;
                flags::raise(Flags::NAN);
                0
            }
            Class::Infinite => {
                self.class = Class::Infinite;
                self.sign = y.sign;
                0
            }
            Class::Zero => {
                self.class = Class::Zero;
                self.sign = y.sign;
                0
            }
            Class::Finite(sig) => {
                let (result, ternary) = crate::range::finish(
                    y.sign,
                    y.exponent,
                    sig.clone(),
                    y.precision,
                    false,
                    self.precision,
                    rnd,
                );
                *self = result;
                ternary
            }
        }
    }

    /// `swap(x, y)`.
    pub fn swap(&mut self, other: &mut MpFloat) {
        core::mem::swap(self, other);
    }

    #[inline]
    pub fn sign(&self) -> Sign {
        self.sign
    }

    #[inline]
    pub fn is_nan(&self) -> bool {
        matches!(self.class, Class::Nan)
    }

    #[inline]
    pub fn is_infinite(&self) -> bool {
        matches!(self.class, Class::Infinite)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        matches!(self.class, Class::Zero)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        !self.is_nan() && !self.is_infinite()
    }

    /// `true` iff the value is finite, nonzero and an exact power of two
    /// (significand is `1000...0`): operations that would otherwise incur
    /// rounding error are exact on such inputs (spec §8.3).
    pub fn is_power_of_two(&self) -> bool {
        match &self.class {
            Class::Finite(sig) => sig.bit_len() == self.precision && {
                let low_mask = (UBig::ONE << (self.precision - 1)) - UBig::ONE;
                (sig & &low_mask).is_zero()
            },
            _ => false,
        }
    }

    pub(crate) fn significand(&self) -> Option<&UBig> {
        match &self.class {
            Class::Finite(sig) => Some(sig),
            _ => None,
        }
    }

    pub(crate) fn exponent(&self) -> i64 {
        self.exponent
    }

    pub(crate) fn raw_parts(&self) -> Option<(Sign, i64, &UBig)> {
        match &self.class {
            Class::Finite(sig) => Some((self.sign, self.exponent, sig)),
            _ => None,
        }
    }

    /// Build a finite value directly from already-normalized parts,
    /// skipping rounding/range-check. Internal use only: callers must
    /// already have validated invariants (I-Norm, I-Exp).
    pub(crate) fn from_normalized(sign: Sign, exponent: i64, significand: UBig, precision: usize) -> Self {
        debug_assert_eq!(significand.bit_len(), precision);
        MpFloat {
            sign,
            precision,
            exponent,
            class: Class::Finite(significand),
        }
    }

    pub fn nan(precision: usize) -> Self {
        let mut v = MpFloat::new(precision);
        v.class = Class::Nan;
        v
    }

    pub fn zero(sign: Sign, precision: usize) -> Self {
        MpFloat {
            sign,
            precision,
            exponent: 0,
            class: Class::Zero,
        }
    }

    pub fn infinity(sign: Sign, precision: usize) -> Self {
        MpFloat {
            sign,
            precision,
            exponent: 0,
            class: Class::Infinite,
        }
    }

    pub fn set_neg(&mut self) {
        self.sign = match self.sign {
            Sign::Positive => Sign::Negative,
            Sign::Negative => Sign::Positive,
        };
    }

    /// Multiply (or, for negative `shift`, divide) by an exact power of
    /// two. Never rounds and never changes the significand — scaling by
    /// `2^shift` only moves the binary point, like the source's
    /// `mul_2si`/`div_2si` (`original_source/div_2exp.c`). Singular values
    /// pass through unchanged. Used internally wherever a computation
    /// needs an exact rescale without going through the rounding kernel,
    /// e.g. halving an AGM iterate or undoing a binary argument reduction.
    pub(crate) fn scale_pow2(&self, shift: i64) -> Self {
        match &self.class {
            Class::Finite(_) => {
                let mut out = self.clone();
                out.exponent = self.exponent.checked_add(shift).expect("exponent overflow in scale_pow2");
                out
            }
            _ => self.clone(),
        }
    }
}

impl Default for MpFloat {
    /// Default value: NaN at the thread's default precision, matching the
    /// "leave `x` NaN" contract of `init` (spec §4.1), not `0.0` like a
    /// native float — an uninitialized handle has no meaningful value.
    fn default() -> Self {
        MpFloat::new(flags::get_default_precision())
    }
}

fn opposite(sign: Sign) -> Sign {
    match sign {
        Sign::Positive => Sign::Negative,
        Sign::Negative => Sign::Positive,
    }
}

/// `setsign(z, x, s, rnd)` (spec §6.3): copy `x` into `z` with its sign
/// forced to `s`, rounding to `z`'s own precision when it differs from
/// `x`'s. The magnitude never changes, so the only source of inexactness
/// is that narrowing, exactly like [`MpFloat::set`].
pub fn setsign(z: &mut MpFloat, x: &MpFloat, sign: Sign, rnd: Rounding) -> Ternary {
    match &x.class {
        Class::Nan => {
            z.class = Class::Nan;
            z.sign = Sign::Positive;
            flags::raise(Flags::NAN);
            0
        }
        Class::Infinite => {
            z.class = Class::Infinite;
            z.sign = sign;
            0
        }
        Class::Zero => {
            z.class = Class::Zero;
            z.sign = sign;
            0
        }
        Class::Finite(sig) => {
            let (result, ternary) =
                crate::range::finish(sign, x.exponent, sig.clone(), x.precision, false, z.precision, rnd);
            *z = result;
            ternary
        }
    }
}

/// `neg(z, x, rnd)`: `setsign(z, x, -sign(x), rnd)`.
pub fn neg(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    setsign(z, x, opposite(x.sign), rnd)
}

/// `abs(z, x, rnd)`: `setsign(z, x, Positive, rnd)`.
pub fn abs(z: &mut MpFloat, x: &MpFloat, rnd: Rounding) -> Ternary {
    setsign(z, x, Sign::Positive, rnd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_nan() {
        let x = MpFloat::new(53);
        assert!(x.is_nan());
        assert_eq!(x.get_prec(), 53);
    }

    #[test]
    fn set_prec_is_destructive() {
        let mut x = MpFloat::new(53);
        x.set(&MpFloat::zero(Sign::Positive, 53), Rounding::Nearest);
        assert!(x.is_zero());
        x.set_prec(64);
        assert!(x.is_nan());
        assert_eq!(x.get_prec(), 64);
    }

    #[test]
    fn neg_involution() {
        let x = MpFloat::zero(Sign::Positive, 10);
        let mut once = MpFloat::new(10);
        neg(&mut once, &x, Rounding::Nearest);
        let mut twice = MpFloat::new(10);
        neg(&mut twice, &once, Rounding::Nearest);
        assert_eq!(twice, x);

        let inf = MpFloat::infinity(Sign::Negative, 10);
        let mut once = MpFloat::new(10);
        neg(&mut once, &inf, Rounding::Nearest);
        let mut twice = MpFloat::new(10);
        neg(&mut twice, &once, Rounding::Nearest);
        assert_eq!(twice, inf);
    }

    #[test]
    fn abs_forces_positive_sign() {
        let x = MpFloat::zero(Sign::Negative, 10);
        let mut z = MpFloat::new(10);
        abs(&mut z, &x, Rounding::Nearest);
        assert_eq!(z.sign(), Sign::Positive);
    }

    #[test]
    fn setsign_narrows_precision_when_target_is_smaller() {
        let sig = UBig::ONE << 9; // precision 10, power of two (exact at any width)
        let x = MpFloat::from_normalized(Sign::Positive, 3, sig, 10);
        let mut z = MpFloat::new(4);
        let t = setsign(&mut z, &x, Sign::Negative, Rounding::Nearest);
        assert_eq!(z.sign(), Sign::Negative);
        assert_eq!(z.get_prec(), 4);
        assert_eq!(t, 0);
    }
}
