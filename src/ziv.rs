//! The Ziv re-iteration loop (spec §4.8): the shared template behind every
//! transcendental function that has no exact big-integer primitive to fall
//! back on (unlike `sqrt`, which gets a correctly-rounded result directly
//! from `UBig::sqrt_rem`). Each transcendental supplies a closure that
//! computes an approximation at a given working precision together with an
//! analytically derived error bound; this module supplies the "widen and
//! retry" control flow and the final hookup into [`crate::round::can_round`]
//! and [`crate::range::finish`].

use crate::repr::MpFloat;
use crate::round::{can_round, Rounding, Ternary};
use dashu_base::Sign;
use dashu_int::UBig;

/// How many of a `wp`-precision approximation's leading bits are trusted,
/// once it's been built by chaining a handful of this crate's own
/// correctly-rounded primitives (add/mul/div/sqrt) at that same working
/// precision. Each chained operation can contribute up to half a unit in
/// the last place, so the accumulated error after `O(wp)` operations is
/// bounded by a few extra guard bits -- the same margin `ZivLoop::new`
/// budgets for its initial working precision.
pub(crate) fn approx_err(wp: usize) -> usize {
    wp.saturating_sub(log2_ceil(wp) + 8)
}

/// Adapt an already-computed `wp`-precision approximation into the
/// `(sign, exponent, significand, err)` tuple [`round_with`]'s `compute`
/// closure must return. Callers must handle singular results (zero, NaN,
/// infinity) themselves before reaching here -- this only unpacks a
/// finite value.
pub(crate) fn from_approx(v: &MpFloat, wp: usize) -> (Sign, i64, UBig, usize) {
    let (sign, exponent, sig) = v.raw_parts().expect("from_approx expects a finite nonzero value");
    (sign, exponent, sig.clone(), approx_err(wp))
}

/// Working-precision growth schedule and a cap that guarantees
/// termination. In principle a function value can sit arbitrarily close
/// to a rounding boundary (the table maker's dilemma), which would force
/// unbounded precision growth to resolve exactly; in practice this never
/// happens for the elementary functions this crate implements at any
/// precision reachable in a single process, so a generous but finite cap
/// is the pragmatic choice MPFR itself makes (its own loop is unbounded
/// in theory but long since proven to terminate for every documented
/// function).
const MAX_EXTRA_WORKING_BITS: usize = 1 << 20;

/// `ceil(log2(n))` for `n >= 1`, used throughout the crate to size guard
/// bits relative to a working precision (spec §4.8 step 1's suggested
/// `target + ceil(log2(target)) + c` schedule).
pub(crate) fn log2_ceil(n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    usize::BITS as usize - (n - 1).leading_zeros() as usize
}

pub struct ZivLoop {
    target_precision: usize,
    working_precision: usize,
    step: usize,
}

impl ZivLoop {
    /// `w = target + small guard` (spec §4.8 step 1): start with enough
    /// slack to make the common case resolve in a single iteration, sized
    /// logarithmically in the target precision per the spec's own
    /// suggested schedule.
    pub fn new(target_precision: usize) -> Self {
        let guard = log2_ceil(target_precision.max(2)) + 8;
        let step = (target_precision / 2).max(32);
        Self {
            target_precision,
            working_precision: target_precision + guard,
            step,
        }
    }

    pub fn working_precision(&self) -> usize {
        self.working_precision
    }

    /// Enlarge the working precision by a fixed step (spec §4.8 step 5).
    /// Growth is linear rather than geometric: elementary-function error
    /// bounds here tighten roughly linearly with working precision, so
    /// doubling would usually overshoot by a wide margin.
    pub fn widen(&mut self) {
        self.working_precision += self.step;
    }

    fn exhausted(&self) -> bool {
        self.working_precision - self.target_precision > MAX_EXTRA_WORKING_BITS
    }
}

/// Drive a Ziv loop to completion: repeatedly call `compute(working_precision)`,
/// which must return `(sign, exponent, significand, err)` where `significand`
/// is a `significand.bit_len()`-bit approximation of the true result and
/// `err` is the number of its leading bits known to be correct (i.e. the
/// absolute error is bounded by one unit in the `err`-th bit from the top),
/// until [`can_round`] confirms the approximation determines the correctly
/// rounded value at `target_precision`, then performs that final rounding.
///
/// `compute` is also responsible for handling sign; when the approximation
/// could be exactly representable (err effectively infinite, e.g. a
/// computation that detects its own exactness), pass back
/// `err = significand.bit_len()` or larger, and the first iteration rounds
/// it exactly.
pub fn round_with<F>(target_precision: usize, mode: Rounding, mut compute: F) -> (MpFloat, Ternary)
where
    F: FnMut(usize) -> (Sign, i64, UBig, usize),
{
    let mut loop_ctl = ZivLoop::new(target_precision);
    loop {
        let wp = loop_ctl.working_precision();
        let (sign, exponent, sig, err) = compute(wp);
        let sp = sig.bit_len();
        if can_round(&sig, sp, err, target_precision, mode) || loop_ctl.exhausted() {
            return crate::range::finish(sign, exponent, sig, sp, false, target_precision, mode);
        }
        loop_ctl.widen();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widens_until_can_round_succeeds() {
        // A contrived `compute` that returns a low-precision (therefore
        // unroundable) approximation until the third call, simulating a
        // function that needs extra working precision to resolve.
        let mut calls = 0u32;
        let (v, t) = round_with(10, Rounding::Nearest, |wp| {
            calls += 1;
            let sig = UBig::ONE << (wp - 1);
            let err = if calls >= 3 { wp } else { 11 };
            (Sign::Positive, 1, sig, err)
        });
        assert_eq!(calls, 3);
        assert_eq!(t, 0);
        assert!(v.is_finite() && !v.is_zero());
    }

    #[test]
    fn exact_on_first_call_when_err_covers_whole_significand() {
        let mut calls = 0u32;
        let (_v, t) = round_with(8, Rounding::Nearest, |wp| {
            calls += 1;
            let sig = UBig::ONE << (wp - 1);
            (Sign::Positive, 0, sig, wp)
        });
        assert_eq!(calls, 1);
        assert_eq!(t, 0);
    }
}
