//! Conversion error type for the strict (`TryFrom`) conversions in
//! [`crate::convert`]. The spec-named accessors (`get_si`, `get_ui`)
//! follow MPFR's own contract instead: they saturate and set the
//! `ERANGE` flag rather than fail, so this type is only surfaced through
//! the idiomatic `TryFrom` impls added alongside them.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertError {
    /// The source value is NaN or infinite; there is no finite integer
    /// or native float it could become.
    NotFinite,
    /// The source value is finite but its rounded magnitude doesn't fit
    /// in the destination type.
    Overflow,
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::NotFinite => write!(f, "value is NaN or infinite"),
            ConvertError::Overflow => write!(f, "value does not fit in the destination type"),
        }
    }
}

impl std::error::Error for ConvertError {}
