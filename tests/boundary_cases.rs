//! Integration tests for the boundary cases named in spec.md §8.3:
//! minimum precision, aliased operands, exact powers of two,
//! near-cancellation, and large-magnitude trig reduction.

use mpfloat::{add, convert, flags, mul, trig, MpFloat, Rounding};

fn from_f64(value: f64, precision: usize) -> MpFloat {
    let mut z = MpFloat::new(precision);
    convert::set_d(&mut z, value, Rounding::Nearest);
    z
}

#[test]
fn minimum_precision_still_applies_the_banker_tie_rule() {
    // At precision 2, representable values near 1 are 1.0 and 1.5 (step
    // 0.5); 1.0 + 0.25 sits exactly halfway between them and must round to
    // the even one, 1.0.
    let x = from_f64(1.0, 2);
    let y = from_f64(0.25, 2);
    let mut z = MpFloat::new(2);
    let t = add::add(&mut z, &x, &y, Rounding::Nearest);
    assert!(t < 0);
    assert_eq!(convert::get_d(&z, Rounding::Nearest), 1.0);
}

#[test]
fn aliased_operands_add_doubles_the_value() {
    let x = from_f64(3.0, 53);
    let mut z = MpFloat::new(53);
    let t = add::add(&mut z, &x, &x, Rounding::Nearest);
    assert_eq!(t, 0);
    assert_eq!(convert::get_d(&z, Rounding::Nearest), 6.0);
}

#[test]
fn aliased_operands_mul_squares_the_value() {
    let x = from_f64(3.0, 53);
    let mut z = MpFloat::new(53);
    let t = mul::mul(&mut z, &x, &x, Rounding::Nearest);
    assert_eq!(t, 0);
    assert_eq!(convert::get_d(&z, Rounding::Nearest), 9.0);
}

#[test]
fn exact_powers_of_two_multiply_without_rounding() {
    let x = from_f64(2f64.powi(3), 53);
    let y = from_f64(2f64.powi(5), 53);
    let mut z = MpFloat::new(53);
    let t = mul::mul(&mut z, &x, &y, Rounding::Nearest);
    assert_eq!(t, 0);
    assert!(z.is_power_of_two());
    assert_eq!(convert::get_d(&z, Rounding::Nearest), 2f64.powi(8));
}

#[test]
fn near_cancellation_subtraction_is_exact() {
    // Sterbenz's lemma: x/2 <= y <= 2x implies x - y is representable
    // exactly at x and y's own precision.
    let x = from_f64(1.0 + 2f64.powi(-52), 53);
    let y = from_f64(1.0, 53);
    let mut z = MpFloat::new(53);
    let t = add::sub(&mut z, &x, &y, Rounding::Nearest);
    assert_eq!(t, 0);
    assert_eq!(convert::get_d(&z, Rounding::Nearest), 2f64.powi(-52));
}

#[test]
fn sin_reduces_arguments_many_multiples_of_two_pi() {
    let x = from_f64(1.0e20, 64);
    let mut z = MpFloat::new(64);
    let t = trig::sin(&mut z, &x, Rounding::Nearest);
    assert!(z.is_finite());
    let bound = from_f64(1.0, 64);
    assert!(mpfloat::cmp::cmp_abs(&z, &bound) <= 0);
    let _ = t;
}

#[test]
fn exponent_at_emin_boundary_does_not_underflow() {
    flags::set_emin(-100);
    flags::set_emax(100);
    flags::clear_flags();
    // 2^-50 squared lands at exponent exactly emin; it must round trip
    // without raising UNDERFLOW.
    let x = from_f64(2f64.powi(-50), 53);
    let mut z = MpFloat::new(53);
    mul::mul(&mut z, &x, &x, Rounding::Nearest);
    assert!(!z.is_zero());
    assert!(!flags::is_set(flags::Flags::UNDERFLOW));
    flags::set_emin(mpfloat::EMIN_MIN / 2);
    flags::set_emax(mpfloat::EMAX_MAX / 2);
}

#[test]
fn exponent_just_below_emin_underflows() {
    flags::set_emin(-100);
    flags::set_emax(100);
    flags::clear_flags();
    // 2^-60 squared lands well below emin; UNDERFLOW must be raised.
    let x = from_f64(2f64.powi(-60), 53);
    let mut z = MpFloat::new(53);
    mul::mul(&mut z, &x, &x, Rounding::Nearest);
    assert!(flags::is_set(flags::Flags::UNDERFLOW));
    flags::set_emin(mpfloat::EMIN_MIN / 2);
    flags::set_emax(mpfloat::EMAX_MAX / 2);
}
