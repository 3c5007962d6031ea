//! Conversion to/from native integers and `f64` (spec §4.11).
//!
//! `set_d`/`get_d` replace the source's union-punning float decoding with
//! explicit `to_bits`/`from_bits` integer accessors (spec §9.1), and
//! `get_d` re-derives IEEE binary64's own exponent range and 53-bit
//! precision rather than reusing the crate's thread-local `emin`/`emax` —
//! a native `f64` has a fixed range regardless of what the caller has
//! configured for `MpFloat`.

use crate::error::ConvertError;
use crate::flags::{self, Flags};
use crate::repr::MpFloat;
use crate::round::{round_significand, Rounding, Ternary};
use dashu_base::{BitTest, Sign};
use dashu_int::UBig;

/// `set_si(z, value, rnd)`: round a signed integer into `z`.
pub fn set_si(z: &mut MpFloat, value: i64, rnd: Rounding) -> Ternary {
    if value == 0 {
        *z = MpFloat::zero(Sign::Positive, z.precision());
        return 0;
    }
    let sign = if value < 0 { Sign::Negative } else { Sign::Positive };
    set_magnitude(z, value.unsigned_abs(), sign, rnd)
}

/// `set_ui(z, value, rnd)`: round an unsigned integer into `z`.
pub fn set_ui(z: &mut MpFloat, value: u64, rnd: Rounding) -> Ternary {
    if value == 0 {
        *z = MpFloat::zero(Sign::Positive, z.precision());
        return 0;
    }
    set_magnitude(z, value, Sign::Positive, rnd)
}

fn set_magnitude(z: &mut MpFloat, value: u64, sign: Sign, rnd: Rounding) -> Ternary {
    let sig = UBig::from(value);
    let sp = sig.bit_len();
    let exponent = sp as i64;
    let (result, t) = crate::range::finish(sign, exponent, sig, sp, false, z.precision(), rnd);
    *z = result;
    t
}

/// `set_d(z, value, rnd)`: round a native `f64` into `z`, decoding its bit
/// pattern directly instead of reasoning about it as a native float.
pub fn set_d(z: &mut MpFloat, value: f64, rnd: Rounding) -> Ternary {
    if value.is_nan() {
        *z = MpFloat::nan(z.precision());
        flags::raise(Flags::NAN);
        return 0;
    }
    let sign = if value.is_sign_negative() { Sign::Negative } else { Sign::Positive };
    if value.is_infinite() {
        *z = MpFloat::infinity(sign, z.precision());
        return 0;
    }
    if value == 0.0 {
        *z = MpFloat::zero(sign, z.precision());
        return 0;
    }

    let bits = value.to_bits();
    let biased_exp = ((bits >> 52) & 0x7ff) as i64;
    let mantissa = bits & 0xf_ffff_ffff_ffff;
    let (sig64, unbiased_exp) = if biased_exp == 0 {
        (mantissa, -1074i64)
    } else {
        ((1u64 << 52) | mantissa, biased_exp - 1075)
    };
    let sig = UBig::from(sig64);
    let sp = sig.bit_len();
    let exponent = unbiased_exp + sp as i64;
    let (result, t) = crate::range::finish(sign, exponent, sig, sp, false, z.precision(), rnd);
    *z = result;
    t
}

/// Binary64's normalized exponent bounds in this crate's convention
/// (value in `[2^(exponent-1), 2^exponent)`): the smallest normal is
/// `2^-1022`, so the smallest normal `exponent` is `-1021`; the largest
/// finite value sits just under `2^1024`.
const F64_EMIN_NORMAL: i64 = -1021;
const F64_EMAX: i64 = 1024;
const F64_PRECISION: usize = 53;

/// `get_d(x, rnd)`: round `x` to the nearest representable `f64` under
/// `rnd`, saturating to `+-INFINITY` on overflow and flushing to a
/// (possibly subnormal) `f64` or signed zero on underflow, composing the
/// result via `f64::from_bits` rather than a native float cast.
pub fn get_d(x: &MpFloat, rnd: Rounding) -> f64 {
    if x.is_nan() {
        flags::raise(Flags::NAN);
        return f64::NAN;
    }
    if x.is_infinite() {
        return if x.sign() == Sign::Negative { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    if x.is_zero() {
        return if x.sign() == Sign::Negative { -0.0 } else { 0.0 };
    }

    let (sign, exponent, sig) = x.raw_parts().unwrap();
    let sp = x.precision();

    if exponent < F64_EMIN_NORMAL {
        let shift = F64_EMIN_NORMAL - exponent;
        let reduced = F64_PRECISION as i64 - shift;
        if reduced < 1 {
            flags::raise(Flags::UNDERFLOW | Flags::INEXACT);
            let round_to_min = match rnd {
                Rounding::Nearest | Rounding::Zero => false,
                Rounding::Up => sign == Sign::Positive,
                Rounding::Down => sign == Sign::Negative,
            };
            let mag = if round_to_min { f64::from_bits(1) } else { 0.0 };
            return if sign == Sign::Negative { -mag } else { mag };
        }
        flags::raise(Flags::UNDERFLOW);
        let r = round_significand(sig, sp, reduced as usize, sign, rnd, false);
        if r.ternary != 0 {
            flags::raise(Flags::INEXACT);
        }
        let eff_exponent = exponent + if r.carry_out { 1 } else { 0 };
        let sign_bit = ((sign == Sign::Negative) as u64) << 63;
        if eff_exponent >= F64_EMIN_NORMAL {
            // Rounding carried the subnormal result exactly up to the
            // smallest normal: biased exponent 1, all-zero mantissa.
            let biased = ((eff_exponent - 1) + 1023) as u64;
            return f64::from_bits(sign_bit | (biased << 52));
        }
        // True subnormal: the `reduced`-bit rounded magnitude, read as a
        // plain integer, is already the raw mantissa field scaled by
        // `2^-1074` -- no implicit leading bit to drop.
        let mantissa_shift = if r.carry_out { 1u32 } else { 0u32 };
        let sig64 = u64::try_from(&r.significand).expect("subnormal mantissa fits in u64");
        return f64::from_bits(sign_bit | (sig64 << mantissa_shift));
    }

    let r = round_significand(sig, sp, F64_PRECISION, sign, rnd, false);
    let exponent = if r.carry_out { exponent + 1 } else { exponent };
    if r.ternary != 0 {
        flags::raise(Flags::INEXACT);
    }
    if exponent > F64_EMAX {
        flags::raise(Flags::OVERFLOW);
        return match rnd {
            Rounding::Nearest => {
                if sign == Sign::Negative {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }
            }
            Rounding::Up => {
                if sign == Sign::Positive {
                    f64::INFINITY
                } else {
                    -f64::MAX
                }
            }
            Rounding::Down => {
                if sign == Sign::Negative {
                    f64::NEG_INFINITY
                } else {
                    f64::MAX
                }
            }
            Rounding::Zero => {
                if sign == Sign::Negative {
                    -f64::MAX
                } else {
                    f64::MAX
                }
            }
        };
    }
    compose_f64(sign, exponent, &r.significand, F64_PRECISION)
}

/// Assemble a normal `f64` from its 53-bit significand (top bit set,
/// i.e. including the implicit leading one) and our exponent convention.
fn compose_f64(sign: Sign, exponent: i64, significand: &UBig, width: usize) -> f64 {
    debug_assert_eq!(width, F64_PRECISION);
    debug_assert_eq!(significand.bit_len(), F64_PRECISION);
    let biased = ((exponent - 1) + 1023) as u64;
    let sig64 = u64::try_from(significand).expect("53-bit significand fits in u64");
    let mantissa = sig64 & 0xf_ffff_ffff_ffff; // drop the implicit leading bit
    let bits = ((sign == Sign::Negative) as u64) << 63 | (biased << 52) | mantissa;
    f64::from_bits(bits)
}

/// `get_si(x, rnd)`: round `x` to the nearest `i64` under `rnd`,
/// saturating to `i64::MIN`/`i64::MAX` and setting `ERANGE` if `x` is
/// NaN, infinite, or doesn't fit (MPFR's own `get_si` contract).
pub fn get_si(x: &MpFloat, rnd: Rounding) -> i64 {
    match try_get_i64(x, rnd) {
        Ok(v) => v,
        Err(ConvertError::NotFinite) => {
            flags::raise(Flags::ERANGE);
            0
        }
        Err(ConvertError::Overflow) => {
            flags::raise(Flags::ERANGE);
            if x.sign() == Sign::Negative {
                i64::MIN
            } else {
                i64::MAX
            }
        }
    }
}

/// `get_ui(x, rnd)`: as [`get_si`], but for `u64`; negative values
/// saturate to `0`.
pub fn get_ui(x: &MpFloat, rnd: Rounding) -> u64 {
    match try_get_i64(x, rnd) {
        Ok(v) if v >= 0 => v as u64,
        Ok(_) => {
            flags::raise(Flags::ERANGE);
            0
        }
        Err(ConvertError::NotFinite) => {
            flags::raise(Flags::ERANGE);
            0
        }
        Err(ConvertError::Overflow) => {
            flags::raise(Flags::ERANGE);
            if x.sign() == Sign::Negative {
                0
            } else {
                u64::MAX
            }
        }
    }
}

/// Round `x` to the nearest integer under `rnd` and return its magnitude
/// as an `i64`, or `ConvertError::Overflow` if that integer doesn't fit.
/// Rounding to an integer is just rounding the significand to
/// `exponent` bits -- at that target precision the identity
/// `value = significand * 2^(exponent - target_precision)` collapses to
/// `value = significand`, an exact integer (plus the usual `carry_out`
/// bump when rounding overflows into the next power of two).
fn try_get_i64(x: &MpFloat, rnd: Rounding) -> Result<i64, ConvertError> {
    if !x.is_finite() {
        return Err(ConvertError::NotFinite);
    }
    if x.is_zero() {
        return Ok(0);
    }
    let (sign, exponent, sig) = x.raw_parts().unwrap();
    let sp = x.precision();

    if exponent <= 0 {
        // |x| < 1: the rounded integer is 0 unless a directed mode or a
        // tie (for Nearest, only possible at exponent == 0) pushes it to
        // +-1.
        let round_away = match rnd {
            Rounding::Zero => false,
            Rounding::Up => sign == Sign::Positive,
            Rounding::Down => sign == Sign::Negative,
            Rounding::Nearest => {
                exponent == 0 && {
                    let half = UBig::ONE << (sp - 1);
                    sig > &half
                }
            }
        };
        return Ok(if round_away {
            if sign == Sign::Negative {
                -1
            } else {
                1
            }
        } else {
            0
        });
    }

    // 64 is the only exponent an in-range i64 magnitude can reach
    // (`i64::MIN`'s magnitude, 2^63, has exponent 64); anything larger is
    // an unambiguous overflow before rounding even narrows it further.
    if exponent > 64 {
        return Err(ConvertError::Overflow);
    }
    let tp = exponent as usize;
    let r = round_significand(sig, sp, tp, sign, rnd, false);
    let eff_exponent = exponent + if r.carry_out { 1 } else { 0 };
    if eff_exponent > 64 {
        return Err(ConvertError::Overflow);
    }
    let shift = (eff_exponent - tp as i64) as usize; // 0, or 1 on carry
    let magnitude = if shift == 0 { r.significand } else { r.significand << shift };
    let magnitude_u64 = u64::try_from(&magnitude).map_err(|_| ConvertError::Overflow)?;
    match sign {
        Sign::Positive => i64::try_from(magnitude_u64).map_err(|_| ConvertError::Overflow),
        Sign::Negative => {
            if magnitude_u64 > (i64::MAX as u64) + 1 {
                Err(ConvertError::Overflow)
            } else {
                Ok((magnitude_u64 as i64).wrapping_neg())
            }
        }
    }
}

/// `get_z_exp(x)`: decompose a finite `x` into its raw integer magnitude
/// and binary exponent such that `x == sign(x) * significand * 2^exponent`
/// exactly, matching the source's `mpfr_get_z_exp`
/// (`original_source/get_z_exp.c`) used to hand a value off to an
/// arbitrary-precision integer type. The sign isn't folded into
/// `significand` since this crate has no signed big-integer type in its
/// dependency stack; callers needing a signed magnitude combine this with
/// `x.sign()`. Returns `None` for NaN/infinite/zero `x`.
pub fn get_z_exp(x: &MpFloat) -> Option<(UBig, i64)> {
    let (_sign, exponent, sig) = x.raw_parts()?;
    let precision = x.precision() as i64;
    Some((sig.clone(), exponent - precision))
}

impl TryFrom<&MpFloat> for i64 {
    type Error = ConvertError;
    fn try_from(value: &MpFloat) -> Result<Self, Self::Error> {
        try_get_i64(value, Rounding::Zero)
    }
}

impl TryFrom<&MpFloat> for f64 {
    type Error = ConvertError;
    fn try_from(value: &MpFloat) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(ConvertError::NotFinite);
        }
        Ok(get_d(value, Rounding::Nearest))
    }
}
