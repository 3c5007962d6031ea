//! Arbitrary-precision binary floating-point arithmetic with correct rounding.
//!
//! Every exposed operation produces the unique representable value obtained
//! by rounding the mathematically exact result under the caller's rounding
//! mode, together with a ternary indicator of the rounding direction. The
//! precision (significand width in bits) is chosen per value; the exponent
//! range and the sticky status flags are thread-local, following
//! [`flags`].
//!
//! - Rounding mode is a runtime parameter of every operation (see
//!   [`round::Rounding`]), not a type parameter.
//! - Precision is stored inside each [`MpFloat`](repr::MpFloat) and can
//!   differ between operands; the result takes whichever precision its
//!   handle was initialized with.
//! - Big-integer limb arithmetic is delegated to `dashu-int`/`dashu-base`;
//!   this crate only ever calls their public primitives (compare, shift,
//!   add/sub/mul/div, bit tests) and never reaches into limb storage
//!   itself.
//!
//! # Example
//!
//! ```
//! use mpfloat::{convert, div, MpFloat, round::Rounding};
//!
//! let mut x = MpFloat::new(53);
//! convert::set_d(&mut x, 1.0, Rounding::Nearest);
//! let mut y = MpFloat::new(53);
//! convert::set_d(&mut y, 3.0, Rounding::Nearest);
//! let mut z = MpFloat::new(53);
//! let ternary = div::div(&mut z, &x, &y, Rounding::Nearest);
//! assert!(ternary > 0); // 1/3 rounds up at bit 53
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(not(feature = "std"))]
compile_error!(
    "mpfloat requires the `std` feature: thread-local exponent range/flags/constant cache \
     are a `std` facility (see SPEC_FULL.md, ambient stack notes)"
);

pub mod add;
pub mod cmp;
pub mod constants;
pub mod convert;
pub mod div;
pub mod error;
pub mod exp;
pub mod flags;
pub mod fma;
pub mod hyperbolic;
pub mod log;
pub mod mul;
pub mod pow;
pub mod range;
pub mod repr;
pub mod round;
pub mod sqrt;
pub mod trig;
mod ziv;

pub use error::ConvertError;
pub use repr::MpFloat;
pub use round::Rounding;

/// Minimum allowed significand precision, in bits.
///
/// One-bit significands are forbidden: the nearest-even tie rule needs at
/// least two bits to express a last-bit parity.
pub const PREC_MIN: usize = 2;

/// Maximum allowed significand precision, in bits.
///
/// Bounded well below `isize::MAX` so that `exponent + precision` and
/// exponent differences never overflow `i64` arithmetic internally.
pub const PREC_MAX: usize = (i64::MAX / 4) as usize;

/// Smallest allowed value of [`flags::set_emin`].
pub const EMIN_MIN: i64 = i64::MIN / 4;
/// Largest allowed value of [`flags::set_emin`].
pub const EMIN_MAX: i64 = i64::MAX / 4;
/// Smallest allowed value of [`flags::set_emax`].
pub const EMAX_MIN: i64 = i64::MIN / 4;
/// Largest allowed value of [`flags::set_emax`].
pub const EMAX_MAX: i64 = i64::MAX / 4;

static_assertions::const_assert!(PREC_MIN >= 2);
static_assertions::const_assert!(PREC_MIN < PREC_MAX);
static_assertions::const_assert!(EMIN_MIN < EMIN_MAX);
static_assertions::const_assert!(EMAX_MIN < EMAX_MAX);
// `exponent + precision` (repr.rs's invariant checks) must stay in range
// for the largest precision/exponent this crate allows.
static_assertions::const_assert!(PREC_MAX as i64 <= i64::MAX / 4);
