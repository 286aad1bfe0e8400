//! Outward-rounded floating point primitives.
//!
//! Mainstream hardware exposes directed rounding modes through the FPU
//! control register (MXCSR on x86), but there is no portable, safe way to
//! flip that register from stable Rust without a platform `-sys` crate —
//! and pulling one in here would be a fabricated dependency for what the
//! rest of this workspace needs. Instead, every primitive below computes
//! the nearest-rounded mathematical result with `std`'s correctly-rounded
//! operations and then widens by one ULP in the requested direction using
//! [`f64::next_up`]/[`f64::next_down`]. The resulting enclosure is sound
//! (it can never be tighter than the true result) though occasionally one
//! ULP wider than a hardware-rounded implementation would produce.
//!
//! `round_near` calls are a pass-through: `std` already rounds to nearest.

/// Widens `x` by one ULP towards positive infinity.
///
/// `+inf`, `-inf` and `NaN` pass through unchanged: there is no tighter
/// enclosure above them, and `NaN` never arises from a sound computation.
#[inline]
pub fn round_up(x: f64) -> f64 {
    if x.is_finite() {
        x.next_up()
    } else {
        x
    }
}

/// Widens `x` by one ULP towards negative infinity.
#[inline]
pub fn round_down(x: f64) -> f64 {
    if x.is_finite() {
        x.next_down()
    } else {
        x
    }
}

/// `a + b`, rounded towards `+inf`.
#[inline]
pub fn add_up(a: f64, b: f64) -> f64 {
    round_up(a + b)
}

/// `a + b`, rounded towards `-inf`.
#[inline]
pub fn add_down(a: f64, b: f64) -> f64 {
    round_down(a + b)
}

/// `a - b`, rounded towards `+inf`.
#[inline]
pub fn sub_up(a: f64, b: f64) -> f64 {
    round_up(a - b)
}

/// `a - b`, rounded towards `-inf`.
#[inline]
pub fn sub_down(a: f64, b: f64) -> f64 {
    round_down(a - b)
}

/// `a * b`, rounded towards `+inf`.
#[inline]
pub fn mul_up(a: f64, b: f64) -> f64 {
    round_up(a * b)
}

/// `a * b`, rounded towards `-inf`.
#[inline]
pub fn mul_down(a: f64, b: f64) -> f64 {
    round_down(a * b)
}

/// `a / b`, rounded towards `+inf`. Caller must exclude `b == 0`.
#[inline]
pub fn div_up(a: f64, b: f64) -> f64 {
    round_up(a / b)
}

/// `a / b`, rounded towards `-inf`. Caller must exclude `b == 0`.
#[inline]
pub fn div_down(a: f64, b: f64) -> f64 {
    round_down(a / b)
}

/// `sqrt(x)`, rounded towards `+inf`. Caller must ensure `x >= 0`.
#[inline]
pub fn sqrt_up(x: f64) -> f64 {
    round_up(x.sqrt())
}

/// `sqrt(x)`, rounded towards `-inf`. Caller must ensure `x >= 0`.
#[inline]
pub fn sqrt_down(x: f64) -> f64 {
    round_down(x.sqrt())
}

/// `x * x`, rounded towards `+inf`.
#[inline]
pub fn sqr_up(x: f64) -> f64 {
    round_up(x * x)
}

/// `x * x`, rounded towards `-inf`.
#[inline]
pub fn sqr_down(x: f64) -> f64 {
    round_down(x * x)
}

/// `exp(x)`, rounded towards `+inf`.
#[inline]
pub fn exp_up(x: f64) -> f64 {
    round_up(x.exp())
}

/// `exp(x)`, rounded towards `-inf`.
#[inline]
pub fn exp_down(x: f64) -> f64 {
    round_down(x.exp())
}

/// `ln(x)`, rounded towards `+inf`. Caller must ensure `x > 0`.
#[inline]
pub fn log_up(x: f64) -> f64 {
    round_up(x.ln())
}

/// `ln(x)`, rounded towards `-inf`. Caller must ensure `x > 0`.
#[inline]
pub fn log_down(x: f64) -> f64 {
    round_down(x.ln())
}

/// `sin(x)`, rounded towards `+inf`.
#[inline]
pub fn sin_up(x: f64) -> f64 {
    round_up(x.sin())
}

/// `sin(x)`, rounded towards `-inf`.
#[inline]
pub fn sin_down(x: f64) -> f64 {
    round_down(x.sin())
}

/// `cos(x)`, rounded towards `+inf`.
#[inline]
pub fn cos_up(x: f64) -> f64 {
    round_up(x.cos())
}

/// `cos(x)`, rounded towards `-inf`.
#[inline]
pub fn cos_down(x: f64) -> f64 {
    round_down(x.cos())
}

/// `tan(x)`, rounded towards `+inf`.
#[inline]
pub fn tan_up(x: f64) -> f64 {
    round_up(x.tan())
}

/// `tan(x)`, rounded towards `-inf`.
#[inline]
pub fn tan_down(x: f64) -> f64 {
    round_down(x.tan())
}

/// `sinh(x)`, rounded towards `+inf`.
#[inline]
pub fn sinh_up(x: f64) -> f64 {
    round_up(x.sinh())
}

/// `sinh(x)`, rounded towards `-inf`.
#[inline]
pub fn sinh_down(x: f64) -> f64 {
    round_down(x.sinh())
}

/// `cosh(x)`, rounded towards `+inf`.
#[inline]
pub fn cosh_up(x: f64) -> f64 {
    round_up(x.cosh())
}

/// `cosh(x)`, rounded towards `-inf`.
#[inline]
pub fn cosh_down(x: f64) -> f64 {
    round_down(x.cosh())
}

/// `tanh(x)`, rounded towards `+inf`.
#[inline]
pub fn tanh_up(x: f64) -> f64 {
    round_up(x.tanh())
}

/// `tanh(x)`, rounded towards `-inf`.
#[inline]
pub fn tanh_down(x: f64) -> f64 {
    round_down(x.tanh())
}

/// `asin(x)`, rounded towards `+inf`. Caller must ensure `x` in `[-1, 1]`.
#[inline]
pub fn asin_up(x: f64) -> f64 {
    round_up(x.asin())
}

/// `asin(x)`, rounded towards `-inf`.
#[inline]
pub fn asin_down(x: f64) -> f64 {
    round_down(x.asin())
}

/// `acos(x)`, rounded towards `+inf`. Caller must ensure `x` in `[-1, 1]`.
#[inline]
pub fn acos_up(x: f64) -> f64 {
    round_up(x.acos())
}

/// `acos(x)`, rounded towards `-inf`.
#[inline]
pub fn acos_down(x: f64) -> f64 {
    round_down(x.acos())
}

/// `atan(x)`, rounded towards `+inf`.
#[inline]
pub fn atan_up(x: f64) -> f64 {
    round_up(x.atan())
}

/// `atan(x)`, rounded towards `-inf`.
#[inline]
pub fn atan_down(x: f64) -> f64 {
    round_down(x.atan())
}

/// `x.powi(n)`, rounded towards `+inf`.
#[inline]
pub fn powi_up(x: f64, n: i32) -> f64 {
    round_up(x.powi(n))
}

/// `x.powi(n)`, rounded towards `-inf`.
#[inline]
pub fn powi_down(x: f64, n: i32) -> f64 {
    round_down(x.powi(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_up_widens_away_from_value() {
        let x = 0.1_f64;
        assert!(round_up(x) > x);
        assert!(round_down(x) < x);
    }

    #[test]
    fn round_up_preserves_infinities() {
        assert_eq!(round_up(f64::INFINITY), f64::INFINITY);
        assert_eq!(round_down(f64::NEG_INFINITY), f64::NEG_INFINITY);
    }

    #[test]
    fn add_up_encloses_true_sum() {
        let a = 1.0 / 3.0;
        let b = 2.0 / 3.0;
        let lo = add_down(a, b);
        let hi = add_up(a, b);
        assert!(lo <= a + b);
        assert!(hi >= a + b);
        assert!(lo <= hi);
    }

    #[test]
    fn sqrt_bounds_straddle_irrational_root() {
        let lo = sqrt_down(2.0);
        let hi = sqrt_up(2.0);
        assert!(lo * lo <= 2.0);
        assert!(hi * hi >= 2.0 || hi > std::f64::consts::SQRT_2);
        assert!(lo <= hi);
    }
}
