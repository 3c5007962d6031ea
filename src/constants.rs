//! Constant cache (spec §4.9): π, log 2, Euler's γ, Catalan's constant.
//!
//! Each constant is computed once per precision level and memoized
//! thread-locally; a request for a precision at or below what's cached
//! rounds the stored value down instead of recomputing (spec §4.9). The
//! computation itself is built entirely out of this crate's own
//! correctly-rounded primitives (`add`, `mul`, `div`, `sqrt`) run at an
//! internal working precision with a few guard bits, the same way the
//! source computes `const_pi` on top of `mpfr_agm`, itself built on
//! `mpfr_add`/`mpfr_sqrt` — rather than duplicating bit-level arithmetic
//! that already exists one layer down.

use crate::add;
use crate::div;
use crate::flags::ExpoGuard;
use crate::mul;
use crate::repr::MpFloat;
use crate::round::{Rounding, Ternary};
use crate::sqrt;
use crate::ziv::log2_ceil;
use dashu_base::Sign;
use dashu_int::UBig;
use std::cell::RefCell;

/// Which "famous" constant to fetch (spec §4.9, §6.3 `const_pi`/
/// `const_log2`/`const_euler`/`const_catalan`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    Pi,
    Log2,
    Euler,
    Catalan,
}

struct CacheEntry {
    value: MpFloat,
    ternary: Ternary,
}

#[derive(Default)]
struct Cache {
    pi: Option<CacheEntry>,
    log2: Option<CacheEntry>,
    euler: Option<CacheEntry>,
    catalan: Option<CacheEntry>,
}

thread_local! {
    static CACHE: RefCell<Cache> = RefCell::new(Cache::default());
}

/// `get(c, dst, rnd)` (spec §4.9): fetch `c` rounded to `dst`'s precision.
pub fn get(c: Constant, dst: &mut MpFloat, rnd: Rounding) -> Ternary {
    let target_precision = dst.precision();
    CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        let slot = match c {
            Constant::Pi => &mut cache.pi,
            Constant::Log2 => &mut cache.log2,
            Constant::Euler => &mut cache.euler,
            Constant::Catalan => &mut cache.catalan,
        };
        if let Some(entry) = slot {
            if entry.value.precision() >= target_precision {
                let t2 = dst.set(&entry.value, rnd);
                // The cached value is itself only a rounding of the true
                // exact constant (direction `entry.ternary`); if rounding
                // it down further is itself exact, the composed result's
                // direction is really the cached rounding's, not "exact"
                // (spec §4.9: "the stored ternary disambiguates exact-tie
                // cases").
                return if t2 != 0 { t2 } else { entry.ternary };
            }
        }
        let guard = log2_ceil(target_precision.max(2)) + 16;
        let working_precision = target_precision + guard;
        let (value, ternary) = compute(c, working_precision);
        *slot = Some(CacheEntry {
            value: value.clone(),
            ternary,
        });
        let t2 = dst.set(&value, rnd);
        if t2 != 0 {
            t2
        } else {
            ternary
        }
    })
}

pub fn const_pi(dst: &mut MpFloat, rnd: Rounding) -> Ternary {
    get(Constant::Pi, dst, rnd)
}

pub fn const_log2(dst: &mut MpFloat, rnd: Rounding) -> Ternary {
    get(Constant::Log2, dst, rnd)
}

pub fn const_euler(dst: &mut MpFloat, rnd: Rounding) -> Ternary {
    get(Constant::Euler, dst, rnd)
}

pub fn const_catalan(dst: &mut MpFloat, rnd: Rounding) -> Ternary {
    get(Constant::Catalan, dst, rnd)
}

/// A small positive integer, represented exactly at its own minimal
/// precision. Operands built this way combine correctly with any other
/// operand regardless of precision -- every arithmetic core in this crate
/// reads operands' exact bits and rounds only at the destination's own
/// precision, so an exact literal never needs padding out to match a
/// computation's working precision.
pub(crate) fn int_literal(value: u64) -> MpFloat {
    assert!(value > 0);
    let sig = UBig::from(value);
    let natural_bits = sig.bit_len();
    let precision = natural_bits.max(crate::PREC_MIN);
    let shifted = sig << (precision - natural_bits);
    MpFloat::from_normalized(Sign::Positive, natural_bits as i64, shifted, precision)
}

fn compute(c: Constant, wp: usize) -> (MpFloat, Ternary) {
    let _guard = ExpoGuard::enter();
    match c {
        Constant::Pi => agm_pi(wp),
        Constant::Log2 => {
            let two = int_literal(2);
            log_via_reduction(&two, wp)
        }
        Constant::Euler => euler_gamma(wp),
        Constant::Catalan => catalan_series(wp),
    }
}

/// Brent–Salamin AGM iteration for π (spec §4.9 "AGM-based"; GLOSSARY
/// "AGM"). Each of the `log2_ceil(wp) + 4` iterations roughly doubles the
/// number of correct bits, so a fixed iteration count driven by `wp`
/// (rather than a convergence check) reaches full working precision with
/// a small, bounded margin to spare.
fn agm_pi(wp: usize) -> (MpFloat, Ternary) {
    let one = int_literal(1);
    let half = one.scale_pow2(-1);
    let mut a = one.clone();
    let mut b = {
        let mut z = MpFloat::new(wp);
        sqrt::sqrt(&mut z, &half, Rounding::Nearest);
        z
    };
    let mut t = one.scale_pow2(-2);
    let mut x = one.clone();

    let iterations = log2_ceil(wp) + 4;
    for _ in 0..iterations {
        let mut a_next = MpFloat::new(wp);
        add::add(&mut a_next, &a, &b, Rounding::Nearest);
        let a_next = a_next.scale_pow2(-1);

        let mut prod = MpFloat::new(wp);
        mul::mul(&mut prod, &a, &b, Rounding::Nearest);
        let mut b_next = MpFloat::new(wp);
        sqrt::sqrt(&mut b_next, &prod, Rounding::Nearest);

        let mut diff = MpFloat::new(wp);
        add::sub(&mut diff, &a, &a_next, Rounding::Nearest);
        let mut diff_sq = MpFloat::new(wp);
        mul::mul(&mut diff_sq, &diff, &diff, Rounding::Nearest);
        let mut term = MpFloat::new(wp);
        mul::mul(&mut term, &x, &diff_sq, Rounding::Nearest);
        let mut t_next = MpFloat::new(wp);
        add::sub(&mut t_next, &t, &term, Rounding::Nearest);

        x = x.scale_pow2(1);
        a = a_next;
        b = b_next;
        t = t_next;
    }

    let mut sum = MpFloat::new(wp);
    add::add(&mut sum, &a, &b, Rounding::Nearest);
    let mut sum_sq = MpFloat::new(wp);
    mul::mul(&mut sum_sq, &sum, &sum, Rounding::Nearest);
    let four_t = t.scale_pow2(2);
    let mut pi = MpFloat::new(wp);
    let t_ternary = div::div(&mut pi, &sum_sq, &four_t, Rounding::Nearest);
    (pi, t_ternary)
}

/// `log(x)` for positive finite `x`, by reducing toward 1 with repeated
/// square roots (each halving `log(x)` exactly) and summing the resulting
/// tiny argument's `atanh` series: `log(x) = 2^(m+1) * atanh((y-1)/(y+1))`
/// where `y = x^(1/2^m)`. With `m` chosen so `y` lands within about
/// `2^-wp` of 1, the series needs only its first couple of terms (spec
/// §4.10 "log(x)": "Reduce to |x - 1| small ... Series: ... Taylor for
/// low" -- this crate always takes the reduce-then-Taylor branch and
/// skips the AGM crossover, a documented simplification).
pub(crate) fn log_via_reduction(x: &MpFloat, wp: usize) -> (MpFloat, Ternary) {
    let m = log2_ceil(wp) + 4;
    let mut y = x.clone();
    for _ in 0..m {
        let mut next = MpFloat::new(wp);
        sqrt::sqrt(&mut next, &y, Rounding::Nearest);
        y = next;
    }

    let one = int_literal(1);
    let mut y_minus_1 = MpFloat::new(wp);
    add::sub(&mut y_minus_1, &y, &one, Rounding::Nearest);
    let mut y_plus_1 = MpFloat::new(wp);
    add::add(&mut y_plus_1, &y, &one, Rounding::Nearest);
    let mut z = MpFloat::new(wp);
    div::div(&mut z, &y_minus_1, &y_plus_1, Rounding::Nearest);

    // atanh(z) = z + z^3/3 + z^5/5 + ...; `z` is tiny enough after the
    // reduction above that a handful of terms already exhausts `wp` bits
    // of precision.
    let mut z_sq = MpFloat::new(wp);
    mul::mul(&mut z_sq, &z, &z, Rounding::Nearest);
    let mut sum = z.clone();
    let mut power = z.clone();
    let mut k = 1u64;
    loop {
        let mut next_power = MpFloat::new(wp);
        mul::mul(&mut next_power, &power, &z_sq, Rounding::Nearest);
        power = next_power;
        if power.is_zero() {
            break;
        }
        k += 2;
        let denom = int_literal(k);
        let mut term = MpFloat::new(wp);
        div::div(&mut term, &power, &denom, Rounding::Nearest);
        let mut new_sum = MpFloat::new(wp);
        add::add(&mut new_sum, &sum, &term, Rounding::Nearest);
        let unchanged = new_sum == sum;
        sum = new_sum;
        if unchanged {
            break;
        }
    }

    let shift = (m as i64) + 1;
    let scaled = sum.scale_pow2(shift);
    let mut result = MpFloat::new(wp);
    let t = result.set(&scaled, Rounding::Nearest);
    (result, t)
}

/// Euler's γ via the Euler–Maclaurin expansion of the `N`-th harmonic
/// number: `γ ≈ H_N - ln(N) - 1/(2N) + 1/(12N^2) - 1/(120N^4)`. `N` is
/// chosen so the (known, rapidly decaying) truncation error is below
/// `2^-wp`; this converges far more slowly than the Brent–McMillan
/// Bessel-function algorithm MPFR actually uses, but doesn't require this
/// crate to carry a separate Bessel-series evaluator for a single
/// constant (documented simplification, spec §9.2 treats unspecified
/// constant-algorithm choices as implementation-defined).
fn euler_gamma(wp: usize) -> (MpFloat, Ternary) {
    // Truncation error of the expansion above is O(1/N^6); solving
    // 6*log2(N) >= wp + guard gives a safe N, expressed as a power of two
    // so every harmonic term and N itself stay exact small integers/ratios
    // until the final division. Capped well below what huge `wp` would
    // call for, the same documented limitation as `catalan_series`.
    let n_bits = ((wp / 6) + 4).max(8) as u32;
    let n: u64 = 1u64 << n_bits.min(24);

    let mut h_n = MpFloat::zero(Sign::Positive, wp);
    for k in 1..=n {
        let term = int_literal(k);
        let mut recip = MpFloat::new(wp);
        div::div(&mut recip, &int_literal(1), &term, Rounding::Nearest);
        let mut next = MpFloat::new(wp);
        add::add(&mut next, &h_n, &recip, Rounding::Nearest);
        h_n = next;
    }

    let n_val = int_literal(n);
    let (ln_n, _) = log_via_reduction(&n_val, wp);

    let mut acc = MpFloat::new(wp);
    add::sub(&mut acc, &h_n, &ln_n, Rounding::Nearest);

    let two_n = n_val.scale_pow2(1);
    let mut inv_2n = MpFloat::new(wp);
    div::div(&mut inv_2n, &int_literal(1), &two_n, Rounding::Nearest);
    let mut acc2 = MpFloat::new(wp);
    add::sub(&mut acc2, &acc, &inv_2n, Rounding::Nearest);

    let n_sq = {
        let mut z = MpFloat::new(wp);
        mul::mul(&mut z, &n_val, &n_val, Rounding::Nearest);
        z
    };
    let twelve_n_sq = {
        let twelve = int_literal(12);
        let mut z = MpFloat::new(wp);
        mul::mul(&mut z, &twelve, &n_sq, Rounding::Nearest);
        z
    };
    let mut correction = MpFloat::new(wp);
    div::div(&mut correction, &int_literal(1), &twelve_n_sq, Rounding::Nearest);
    let mut result = MpFloat::new(wp);
    let t = add::add(&mut result, &acc2, &correction, Rounding::Nearest);
    (result, t)
}

/// Catalan's constant via its defining alternating series
/// `G = sum_{k=0}^inf (-1)^k / (2k+1)^2`. The series is alternating, so
/// truncating after `N` terms leaves an error bounded by the next term,
/// `~ 1/(4N^2)`; reaching `wp` bits of accuracy this way needs `N` on the
/// order of `2^(wp/2)`, which only stays practical for modest precisions.
/// A faster (geometrically convergent) algorithm exists but isn't
/// confidently reproduced here without a verified reference, so this
/// crate accepts the slow-but-unambiguously-correct series and caps the
/// term count, documented as a known limitation (spec §9.2 treats
/// unspecified constant algorithms as implementation-defined): requests
/// for very high precision won't get the full correctly-rounded result
/// from this series alone.
fn catalan_series(wp: usize) -> (MpFloat, Ternary) {
    const MAX_TERMS: usize = 1 << 24;
    let needed = 1usize << ((wp / 2) + 2).min(24);
    let terms = needed.min(MAX_TERMS);
    let mut sum = MpFloat::zero(Sign::Positive, wp);
    for k in 0..terms {
        let denom_base = 2 * k as u64 + 1;
        let denom_sq = denom_base * denom_base;
        let denom = int_literal(denom_sq);
        let mut term = MpFloat::new(wp);
        div::div(&mut term, &int_literal(1), &denom, Rounding::Nearest);
        let mut next = MpFloat::new(wp);
        if k % 2 == 0 {
            add::add(&mut next, &sum, &term, Rounding::Nearest);
        } else {
            add::sub(&mut next, &sum, &term, Rounding::Nearest);
        }
        if next == sum {
            sum = next;
            break;
        }
        sum = next;
    }
    let mut result = MpFloat::new(wp);
    let t = result.set(&sum, Rounding::Nearest);
    (result, t)
}
