//! Overflow-checked integer arithmetic.
//!
//! [`Integer`] wraps `i64` and exposes checked arithmetic that reports
//! [`IntegerError::Overflow`] rather than wrapping, plus the floor/ceiling
//! division and conversion helpers that integer-domain variables need.
//! The overflow boundary tests below are the same sign-aware comparisons
//! used by the reference solver this crate's semantics are ported from:
//! for addition/subtraction, compare against `MAX - b` / `MIN - b` rather
//! than computing the sum and checking after the fact (which would itself
//! be undefined once it had already overflowed in a wrapping language);
//! for multiplication, compare magnitudes against `MAX / |b|` so the test
//! itself never overflows.

use thiserror::Error;

/// Errors from checked [`Integer`] arithmetic.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum IntegerError {
    #[error("integer overflow")]
    Overflow,
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo requires a positive divisor")]
    ModuloNonPositive,
    #[error("value is not representable as an Integer")]
    NotRepresentable,
}

pub type IntegerResult<T> = Result<T, IntegerError>;

/// A fixed-width signed integer with overflow-checked arithmetic.
///
/// Unlike the `std::ops` traits on plain `i64`, the `std::ops` impls on
/// `Integer` panic on overflow rather than wrapping — mirroring the
/// reference implementation's hard, unrecoverable fault on overflow. Use
/// the `checked_*` methods directly when the caller can recover (e.g. by
/// discarding the enclosing search node).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Integer(i64);

impl Integer {
    pub const MAX: Integer = Integer(i64::MAX);
    pub const MIN: Integer = Integer(i64::MIN);
    pub const ZERO: Integer = Integer(0);
    pub const ONE: Integer = Integer(1);

    #[inline]
    pub fn new(v: i64) -> Self {
        Integer(v)
    }

    #[inline]
    pub fn value(self) -> i64 {
        self.0
    }

    /// Rounds a finite `f64` towards `-inf`, saturating at [`Integer::MIN`]/[`Integer::MAX`].
    pub fn floor(x: f64) -> IntegerResult<Integer> {
        if x.is_nan() {
            return Err(IntegerError::NotRepresentable);
        }
        if x <= i64::MIN as f64 {
            return Ok(Integer::MIN);
        }
        if x >= i64::MAX as f64 {
            return Ok(Integer::MAX);
        }
        Ok(Integer(x.floor() as i64))
    }

    /// Rounds a finite `f64` towards `+inf`, saturating at [`Integer::MIN`]/[`Integer::MAX`].
    pub fn ceil(x: f64) -> IntegerResult<Integer> {
        if x.is_nan() {
            return Err(IntegerError::NotRepresentable);
        }
        if x <= i64::MIN as f64 {
            return Ok(Integer::MIN);
        }
        if x >= i64::MAX as f64 {
            return Ok(Integer::MAX);
        }
        Ok(Integer(x.ceil() as i64))
    }

    pub fn checked_add(self, rhs: Integer) -> IntegerResult<Integer> {
        let (a, b) = (self.0, rhs.0);
        if b > 0 && a > i64::MAX - b {
            return Err(IntegerError::Overflow);
        }
        if b < 0 && a < i64::MIN - b {
            return Err(IntegerError::Overflow);
        }
        Ok(Integer(a + b))
    }

    pub fn checked_sub(self, rhs: Integer) -> IntegerResult<Integer> {
        let (a, b) = (self.0, rhs.0);
        if b < 0 && a > i64::MAX + b {
            return Err(IntegerError::Overflow);
        }
        if b > 0 && a < i64::MIN + b {
            return Err(IntegerError::Overflow);
        }
        Ok(Integer(a - b))
    }

    pub fn checked_neg(self) -> IntegerResult<Integer> {
        if self.0 == i64::MIN {
            return Err(IntegerError::Overflow);
        }
        Ok(Integer(-self.0))
    }

    pub fn checked_mul(self, rhs: Integer) -> IntegerResult<Integer> {
        let (a, b) = (self.0, rhs.0);
        if a == 0 || b == 0 {
            return Ok(Integer(0));
        }
        if a > 0 && b > 0 && a > i64::MAX / b {
            return Err(IntegerError::Overflow);
        }
        if a < 0 && b < 0 && a < i64::MAX / b {
            return Err(IntegerError::Overflow);
        }
        if a > 0 && b < 0 && b < i64::MIN / a {
            return Err(IntegerError::Overflow);
        }
        if a < 0 && b > 0 && a < i64::MIN / b {
            return Err(IntegerError::Overflow);
        }
        Ok(Integer(a * b))
    }

    pub fn checked_sqr(self) -> IntegerResult<Integer> {
        self.checked_mul(self)
    }

    /// Truncating division (toward zero), matching `std`'s `/`. Overflows
    /// only for `MIN / -1`.
    pub fn checked_div(self, rhs: Integer) -> IntegerResult<Integer> {
        let (a, b) = (self.0, rhs.0);
        if b == 0 {
            return Err(IntegerError::DivisionByZero);
        }
        if a == i64::MIN && b == -1 {
            return Err(IntegerError::Overflow);
        }
        Ok(Integer(a / b))
    }

    /// Division rounded towards `-inf`. Differs from truncating division
    /// whenever the exact quotient's sign disagrees with truncation, i.e.
    /// when there is a nonzero remainder and the operands' signs differ.
    pub fn div_floor(self, rhs: Integer) -> IntegerResult<Integer> {
        let q = self.checked_div(rhs)?;
        let r = self.0 % rhs.0;
        if r != 0 && (r < 0) != (rhs.0 < 0) {
            q.checked_sub(Integer::ONE)
        } else {
            Ok(q)
        }
    }

    /// Division rounded towards `+inf`. Differs from truncating division
    /// whenever there is a nonzero remainder and the operands share sign.
    pub fn div_ceil(self, rhs: Integer) -> IntegerResult<Integer> {
        let q = self.checked_div(rhs)?;
        let r = self.0 % rhs.0;
        if r != 0 && (r < 0) == (rhs.0 < 0) {
            q.checked_add(Integer::ONE)
        } else {
            Ok(q)
        }
    }

    pub fn checked_modulo(self, rhs: Integer) -> IntegerResult<Integer> {
        if rhs.0 <= 0 {
            return Err(IntegerError::ModuloNonPositive);
        }
        Ok(Integer(self.0.rem_euclid(rhs.0)))
    }

    /// Largest integer whose square does not exceed `self`. Caller must
    /// ensure `self >= 0`.
    pub fn sqrt_floor(self) -> IntegerResult<Integer> {
        if self.0 < 0 {
            return Err(IntegerError::NotRepresentable);
        }
        Ok(Integer((self.0 as f64).sqrt().floor() as i64).isqrt_floor_fixup(self))
    }

    /// Smallest integer whose square is not exceeded by `self`. Caller
    /// must ensure `self >= 0`.
    pub fn sqrt_ceil(self) -> IntegerResult<Integer> {
        let f = self.sqrt_floor()?;
        if f.checked_sqr()? == self {
            Ok(f)
        } else {
            f.checked_add(Integer::ONE)
        }
    }

    /// Corrects the `f64`-derived estimate for rounding error near perfect
    /// squares: nudges down while the square overshoots, up while the next
    /// candidate's square still fits.
    fn isqrt_floor_fixup(self, target: Integer) -> Integer {
        let mut r = self;
        while r.0 > 0 && r.0 * r.0 > target.0 {
            r = Integer(r.0 - 1);
        }
        while (r.0 + 1) * (r.0 + 1) <= target.0 {
            r = Integer(r.0 + 1);
        }
        r
    }

    pub fn abs(self) -> IntegerResult<Integer> {
        if self.0 == i64::MIN {
            return Err(IntegerError::Overflow);
        }
        Ok(Integer(self.0.abs()))
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }
}

impl std::ops::Add for Integer {
    type Output = Integer;
    fn add(self, rhs: Integer) -> Integer {
        self.checked_add(rhs).expect("Integer addition overflow")
    }
}

impl std::ops::Sub for Integer {
    type Output = Integer;
    fn sub(self, rhs: Integer) -> Integer {
        self.checked_sub(rhs).expect("Integer subtraction overflow")
    }
}

impl std::ops::Mul for Integer {
    type Output = Integer;
    fn mul(self, rhs: Integer) -> Integer {
        self.checked_mul(rhs).expect("Integer multiplication overflow")
    }
}

impl std::ops::Div for Integer {
    type Output = Integer;
    fn div(self, rhs: Integer) -> Integer {
        self.checked_div(rhs).expect("Integer division overflow or by zero")
    }
}

impl std::ops::Neg for Integer {
    type Output = Integer;
    fn neg(self) -> Integer {
        self.checked_neg().expect("Integer negation overflow")
    }
}

impl From<i64> for Integer {
    fn from(v: i64) -> Self {
        Integer(v)
    }
}

impl std::fmt::Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_overflow_detected() {
        assert_eq!(Integer::MAX.checked_add(Integer::ONE), Err(IntegerError::Overflow));
        assert_eq!(Integer::MIN.checked_sub(Integer::ONE), Err(IntegerError::Overflow));
    }

    #[test]
    fn sqr_of_max_overflows() {
        assert_eq!(Integer::MAX.checked_sqr(), Err(IntegerError::Overflow));
    }

    #[test]
    fn div_floor_rounds_toward_negative_infinity() {
        assert_eq!(Integer::new(13).div_floor(Integer::new(4)).unwrap(), Integer::new(3));
        assert_eq!(Integer::new(-13).div_floor(Integer::new(4)).unwrap(), Integer::new(-4));
    }

    #[test]
    fn div_ceil_rounds_toward_positive_infinity() {
        assert_eq!(Integer::new(13).div_ceil(Integer::new(-4)).unwrap(), Integer::new(-3));
        assert_eq!(Integer::new(13).div_ceil(Integer::new(4)).unwrap(), Integer::new(4));
    }

    #[test]
    fn exact_division_agrees_across_variants() {
        assert_eq!(Integer::new(12).div_floor(Integer::new(4)).unwrap(), Integer::new(3));
        assert_eq!(Integer::new(12).div_ceil(Integer::new(4)).unwrap(), Integer::new(3));
    }

    #[test]
    fn sqrt_floor_and_ceil_bracket_non_perfect_squares() {
        assert_eq!(Integer::new(10).sqrt_floor().unwrap(), Integer::new(3));
        assert_eq!(Integer::new(10).sqrt_ceil().unwrap(), Integer::new(4));
        assert_eq!(Integer::new(9).sqrt_floor().unwrap(), Integer::new(3));
        assert_eq!(Integer::new(9).sqrt_ceil().unwrap(), Integer::new(3));
    }

    #[test]
    fn floor_ceil_from_f64_saturate() {
        assert_eq!(Integer::floor(1e30).unwrap(), Integer::MAX);
        assert_eq!(Integer::ceil(-1e30).unwrap(), Integer::MIN);
        assert_eq!(Integer::floor(3.7).unwrap(), Integer::new(3));
        assert_eq!(Integer::ceil(3.2).unwrap(), Integer::new(4));
    }

    #[test]
    #[should_panic]
    fn unchecked_add_panics_on_overflow() {
        let _ = Integer::MAX + Integer::ONE;
    }
}
