//! AF1 affine arithmetic: a reliable linearization of nonlinear
//! expressions that, unlike plain interval arithmetic, keeps track of
//! first-order correlation between sub-expressions through shared noise
//! symbols.
//!
//! An [`AffineForm`] is `a0 + Σ Aᵢ·eᵢ + e·[-1, 1]` where `a0` and every
//! `Aᵢ` are interval coefficients (the "1" in AF1: unlike the simpler
//! textbook affine arithmetic with point coefficients, every coefficient
//! here is itself an interval, absorbing the rounding of its own
//! construction), the `eᵢ` are shared noise symbols ranging over `[-1,
//! 1]`, and `e >= 0` is an aggregated error magnitude for everything that
//! could not be represented linearly. Elementary nonlinear functions are
//! linearized by a tangent (Minrange) or secant (Chebyshev) line plus a
//! bounded residual `e`; which variant is used is a process-wide setting.

use crate::interval::Interval;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

static NEXT_NOISE_INDEX: AtomicU32 = AtomicU32::new(0);
static LINEARIZATION_MODE: AtomicU8 = AtomicU8::new(0); // 0 = Minrange, 1 = Chebyshev

/// Which line a nonlinear elementary function is linearized against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linearization {
    /// Tangent line at whichever endpoint minimizes the resulting range.
    Minrange,
    /// Secant line through both endpoints.
    Chebyshev,
}

pub fn set_linearization_mode(mode: Linearization) {
    let v = match mode {
        Linearization::Minrange => 0,
        Linearization::Chebyshev => 1,
    };
    LINEARIZATION_MODE.store(v, Ordering::Relaxed);
}

pub fn linearization_mode() -> Linearization {
    match LINEARIZATION_MODE.load(Ordering::Relaxed) {
        1 => Linearization::Chebyshev,
        _ => Linearization::Minrange,
    }
}

/// Allocates a fresh, process-wide-unique noise index for a new source of
/// uncertainty (typically a new variable entering the affine computation).
pub fn fresh_noise_index() -> u32 {
    NEXT_NOISE_INDEX.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AffineForm {
    a0: Interval,
    terms: SmallVec<[(Interval, u32); 4]>,
    err: Interval,
}

impl AffineForm {
    pub fn constant(c: Interval) -> Self {
        AffineForm { a0: c, terms: SmallVec::new(), err: Interval::zero() }
    }

    /// The affine form for a fresh variable ranging over `domain`, bound
    /// to noise symbol `noise_index`.
    pub fn from_variable(noise_index: u32, domain: Interval) -> Self {
        if domain.is_empty() {
            return AffineForm::empty();
        }
        let c = domain.midpoint();
        let r = Interval::new(0.0, domain.hi() - c).hull(&Interval::new(0.0, c - domain.lo()));
        let mut terms = SmallVec::new();
        if r.hi() > 0.0 {
            terms.push((r, noise_index));
        }
        AffineForm { a0: Interval::singleton(c), terms, err: Interval::zero() }
    }

    pub fn empty() -> Self {
        AffineForm { a0: Interval::empty(), terms: SmallVec::new(), err: Interval::zero() }
    }

    pub fn inf() -> Self {
        AffineForm { a0: Interval::zero(), terms: SmallVec::new(), err: Interval::universe() }
    }

    pub fn is_empty(&self) -> bool {
        self.a0.is_empty()
    }

    pub fn is_inf(&self) -> bool {
        !self.err.is_finite()
    }

    /// The constant term `a0`.
    pub fn constant_term(&self) -> Interval {
        self.a0
    }

    /// The aggregated error magnitude `e` (multiplies an implicit
    /// `[-1, 1]` unknown disjoint from every named noise symbol).
    pub fn error_term(&self) -> Interval {
        self.err
    }

    /// The linear part `(coefficient, noise-index)` pairs, in
    /// strictly-increasing noise-index order.
    pub fn linear_terms(&self) -> Vec<(Interval, u32)> {
        self.terms.iter().copied().collect()
    }

    /// A degenerate form: a constant-plus-uncertainty shape carrying no
    /// correlation with any input noise symbol. Used whenever an
    /// operation's image cannot be related linearly to its operands
    /// (`min`/`max`/`sgn`, the zero-straddling branch of `abs`, and wide
    /// periodic-function arguments).
    pub fn degenerate(lo: Interval, width: Interval) -> Self {
        AffineForm { a0: lo, terms: SmallVec::new(), err: width }
    }

    /// The interval this form currently encloses: `a0 + e*[-1,1] + Σ Aᵢ*[-1,1]`.
    pub fn eval(&self) -> Interval {
        if self.is_empty() {
            return Interval::empty();
        }
        if self.is_inf() {
            return Interval::universe();
        }
        let mut acc = self.a0;
        for (coef, _) in &self.terms {
            acc = acc.add(&coef.mul(&Interval::new(-1.0, 1.0)));
        }
        acc.add(&self.err.mul(&Interval::new(-1.0, 1.0)))
    }

    fn merge_linear<F>(a: &Self, b: &Self, combine: F) -> SmallVec<[(Interval, u32); 4]>
    where
        F: Fn(Interval, Interval) -> Interval,
    {
        let mut out = SmallVec::new();
        let (mut i, mut j) = (0, 0);
        while i < a.terms.len() || j < b.terms.len() {
            let take_a = j >= b.terms.len() || (i < a.terms.len() && a.terms[i].1 < b.terms[j].1);
            let take_b = i >= a.terms.len() || (j < b.terms.len() && b.terms[j].1 < a.terms[i].1);
            if take_a && !take_b {
                let (c, idx) = a.terms[i];
                let coef = combine(c, Interval::zero());
                if !(coef.lo() == 0.0 && coef.hi() == 0.0) {
                    out.push((coef, idx));
                }
                i += 1;
            } else if take_b && !take_a {
                let (c, idx) = b.terms[j];
                let coef = combine(Interval::zero(), c);
                if !(coef.lo() == 0.0 && coef.hi() == 0.0) {
                    out.push((coef, idx));
                }
                j += 1;
            } else {
                let (ca, idx) = a.terms[i];
                let (cb, _) = b.terms[j];
                let coef = combine(ca, cb);
                if !(coef.lo() == 0.0 && coef.hi() == 0.0) {
                    out.push((coef, idx));
                }
                i += 1;
                j += 1;
            }
        }
        out
    }

    pub fn add(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return AffineForm::empty();
        }
        if self.is_inf() || other.is_inf() {
            return AffineForm::inf();
        }
        let terms = Self::merge_linear(self, other, |a, b| a.add(&b));
        AffineForm { a0: self.a0.add(&other.a0), terms, err: self.err.add(&other.err) }
    }

    pub fn neg(&self) -> Self {
        if self.is_empty() {
            return AffineForm::empty();
        }
        let terms = self.terms.iter().map(|(c, i)| (c.neg(), *i)).collect();
        AffineForm { a0: self.a0.neg(), terms, err: self.err }
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Scales every coefficient by a constant interval (used internally by
    /// `linearize` and by scalar multiplication).
    pub fn scale(&self, k: Interval) -> Self {
        if self.is_empty() {
            return AffineForm::empty();
        }
        if self.is_inf() {
            return AffineForm::inf();
        }
        let terms = self.terms.iter().map(|(c, i)| (c.mul(&k), *i)).collect();
        AffineForm { a0: self.a0.mul(&k), terms, err: self.err.mul(&k.abs()) }
    }

    fn sum_abs_coefs(&self) -> Interval {
        self.terms.iter().fold(Interval::zero(), |acc, (c, _)| acc.add(&c.abs()))
    }

    /// Full AF1 multiplication: linear cross terms contribute exactly;
    /// the bilinear residual (the product of the two forms' higher-order
    /// uncertainty) is absorbed into the error term.
    pub fn mul(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return AffineForm::empty();
        }
        if self.is_inf() || other.is_inf() {
            return AffineForm::inf();
        }
        let a0 = self.a0;
        let b0 = other.a0;
        let terms = Self::merge_linear(self, other, |a, b| a.mul(&b0).add(&b.mul(&a0)));
        let sa = self.sum_abs_coefs();
        let sb = other.sum_abs_coefs();
        let residual = a0.abs().mul(&other.err).add(&b0.abs().mul(&self.err)).add(&self.err.mul(&other.err)).add(&sa.mul(&sb));
        AffineForm { a0: a0.mul(&b0), terms, err: residual }
    }

    /// AF2-style sharper quadratic: `S = Σ|Aᵢ| + e`; the constant gains
    /// `0.5·S²`, linear terms scale by `2·a0`, and the error term becomes
    /// `|2·a0|·e + 0.5·S²`.
    pub fn sqr(&self) -> Self {
        if self.is_empty() {
            return AffineForm::empty();
        }
        if self.is_inf() {
            return AffineForm::inf();
        }
        let s = self.sum_abs_coefs().add(&self.err);
        let half_s2 = Interval::new(0.0, 0.5).mul(&s.sqr());
        let two_a0 = Interval::new(2.0, 2.0).mul(&self.a0);
        let terms = self.terms.iter().map(|(c, i)| (c.mul(&two_a0), *i)).collect();
        let err = two_a0.abs().mul(&self.err).add(&half_s2);
        AffineForm { a0: self.a0.sqr().add(&half_s2), terms, err }
    }

    /// `u = 0.5*(fa - alpha*a)`, `v = 0.5*(fb - alpha*b)`, returns
    /// `(zeta, delta) = (u+v, |u-v|)`.
    fn approx_dzeta_delta(alpha: f64, a: f64, fa: f64, b: f64, fb: f64) -> (Interval, Interval) {
        let u = 0.5 * (fa - alpha * a);
        let v = 0.5 * (fb - alpha * b);
        let zeta = Interval::singleton(u + v);
        let delta = Interval::singleton((u - v).abs());
        (zeta, delta)
    }

    /// Substitutes this form into `alpha*x + zeta +/- delta`: scales
    /// linear terms by `alpha`, relocates the constant term, and folds
    /// the linearization residual into the error term.
    fn linearize(&self, alpha: f64, zeta: Interval, delta: Interval) -> Self {
        if self.is_empty() {
            return AffineForm::empty();
        }
        let a = Interval::singleton(alpha);
        let terms = self.terms.iter().map(|(c, i)| (c.mul(&a), *i)).collect();
        let err = a.abs().mul(&self.err).add(&delta);
        AffineForm { a0: self.a0.mul(&a).add(&zeta), terms, err }
    }

    /// Minrange linearization of a convex (`convex=true`) or concave
    /// function over `image = self.eval()`, given `f` and its derivative
    /// `fp`. The tangent is taken at whichever endpoint keeps the
    /// linearization exact there; the residual bounds the other endpoint.
    fn minrange(&self, image: Interval, f: fn(f64) -> f64, fp: fn(f64) -> f64, convex: bool) -> Self {
        let (a, b) = (image.lo(), image.hi());
        if a == b {
            return AffineForm::constant(Interval::singleton(f(a)));
        }
        let (fa, fb) = (f(a), f(b));
        let alpha = if convex { fp(a).min(fp(b)) } else { fp(a).max(fp(b)) };
        let (zeta, delta) = Self::approx_dzeta_delta(alpha, a, fa, b, fb);
        self.linearize(alpha, zeta, delta)
    }

    /// Chebyshev (secant-based) linearization: slope is the secant
    /// through both endpoints; offset and residual are computed the same
    /// way as Minrange but against the secant slope.
    fn chebyshev(&self, image: Interval, f: fn(f64) -> f64) -> Self {
        let (a, b) = (image.lo(), image.hi());
        if a == b {
            return AffineForm::constant(Interval::singleton(f(a)));
        }
        let (fa, fb) = (f(a), f(b));
        let alpha = (fb - fa) / (b - a);
        let (zeta, delta) = Self::approx_dzeta_delta(alpha, a, fa, b, fb);
        self.linearize(alpha, zeta, delta)
    }

    fn apply_convex(&self, f: fn(f64) -> f64, fp: fn(f64) -> f64) -> Self {
        if self.is_empty() {
            return AffineForm::empty();
        }
        let image = self.eval();
        if !image.is_finite() {
            return AffineForm::inf();
        }
        match linearization_mode() {
            Linearization::Minrange => self.minrange(image, f, fp, true),
            Linearization::Chebyshev => self.chebyshev(image, f),
        }
    }

    pub fn exp(&self) -> Self {
        self.apply_convex(f64::exp, f64::exp)
    }

    pub fn sqrt(&self) -> Self {
        if self.is_empty() {
            return AffineForm::empty();
        }
        let image = self.eval();
        if image.hi() < 0.0 {
            return AffineForm::empty();
        }
        let image = Interval::new(image.lo().max(0.0), image.hi());
        match linearization_mode() {
            Linearization::Minrange => self.minrange(image, f64::sqrt, |x| 0.5 / x.sqrt(), false),
            Linearization::Chebyshev => self.chebyshev(image, f64::sqrt),
        }
    }

    pub fn log(&self) -> Self {
        if self.is_empty() {
            return AffineForm::empty();
        }
        let image = self.eval();
        if image.hi() <= 0.0 {
            return AffineForm::empty();
        }
        let image = Interval::new(image.lo().max(f64::MIN_POSITIVE), image.hi());
        match linearization_mode() {
            Linearization::Minrange => self.minrange(image, f64::ln, |x| 1.0 / x, false),
            Linearization::Chebyshev => self.chebyshev(image, f64::ln),
        }
    }

    pub fn sinh(&self) -> Self {
        self.apply_convex(f64::sinh, f64::cosh)
    }

    pub fn cosh(&self) -> Self {
        self.apply_convex(f64::cosh, f64::sinh)
    }

    pub fn tanh(&self) -> Self {
        if self.is_empty() {
            return AffineForm::empty();
        }
        let image = self.eval();
        if !image.is_finite() {
            return AffineForm::inf();
        }
        match linearization_mode() {
            Linearization::Minrange => self.minrange(image, f64::tanh, |x| 1.0 - x.tanh().powi(2), false),
            Linearization::Chebyshev => self.chebyshev(image, f64::tanh),
        }
    }

    /// Reciprocal. Straddling zero makes `1/x` unbounded (`inf` form);
    /// an exact-zero image is infeasible (`empty`); a wide but
    /// zero-free image still linearizes like any other convex/concave
    /// branch, split by sign.
    pub fn udiv(&self) -> Self {
        if self.is_empty() {
            return AffineForm::empty();
        }
        let image = self.eval();
        if image.lo() == 0.0 && image.hi() == 0.0 {
            return AffineForm::empty();
        }
        if image.strictly_contains_zero() || image.lo() == 0.0 || image.hi() == 0.0 {
            return AffineForm::inf();
        }
        if !image.is_finite() {
            let recip = Interval::new(1.0, 1.0).div(&image);
            return AffineForm::constant(recip);
        }
        let convex = image.lo() > 0.0;
        match linearization_mode() {
            Linearization::Minrange => self.minrange(image, |x| 1.0 / x, |x| -1.0 / (x * x), convex),
            Linearization::Chebyshev => self.chebyshev(image, |x| 1.0 / x),
        }
    }

    pub fn div(&self, other: &Self) -> Self {
        self.mul(&other.udiv())
    }

    pub fn abs(&self) -> Self {
        if self.is_empty() {
            return AffineForm::empty();
        }
        let image = self.eval();
        if image.lo() >= 0.0 {
            return self.clone();
        }
        if image.hi() <= 0.0 {
            return self.neg();
        }
        AffineForm::degenerate(Interval::new(0.0, 0.0), Interval::new(0.0, image.mag()))
    }

    pub fn sgn(&self) -> Self {
        if self.is_empty() {
            return AffineForm::empty();
        }
        let image = self.eval();
        AffineForm::constant(image.sgn())
    }

    pub fn min(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return AffineForm::empty();
        }
        let ia = self.eval();
        let ib = other.eval();
        if ia.hi() <= ib.lo() {
            return self.clone();
        }
        if ib.hi() <= ia.lo() {
            return other.clone();
        }
        let lo = ia.lo().min(ib.lo());
        let hi = ia.hi().min(ib.hi());
        AffineForm::degenerate(Interval::singleton(lo), Interval::new(0.0, hi - lo))
    }

    pub fn max(&self, other: &Self) -> Self {
        if self.is_empty() || other.is_empty() {
            return AffineForm::empty();
        }
        let ia = self.eval();
        let ib = other.eval();
        if ia.lo() >= ib.hi() {
            return self.clone();
        }
        if ib.lo() >= ia.hi() {
            return other.clone();
        }
        let lo = ia.lo().max(ib.lo());
        let hi = ia.hi().max(ib.hi());
        AffineForm::degenerate(Interval::singleton(lo), Interval::new(0.0, hi - lo))
    }

    fn periodic(&self, f: fn(f64) -> f64, fp: fn(f64) -> f64, period_bound: f64) -> Self {
        if self.is_empty() {
            return AffineForm::empty();
        }
        let image = self.eval();
        if !image.is_finite() || image.width() >= period_bound {
            let v = image.lo().max(-1.0).min(1.0);
            return AffineForm::degenerate(Interval::singleton(v), Interval::new(0.0, 2.0));
        }
        match linearization_mode() {
            // Neither branch is globally monotone-convex; fall back to
            // the secant, which remains sound (if not tightest) whenever
            // the interval doesn't span a full period.
            Linearization::Minrange | Linearization::Chebyshev => {
                let _ = fp;
                self.chebyshev(image, f)
            }
        }
    }

    pub fn sin(&self) -> Self {
        self.periodic(f64::sin, f64::cos, 2.0 * std::f64::consts::PI)
    }

    pub fn cos(&self) -> Self {
        self.periodic(f64::cos, |x| -x.sin(), 2.0 * std::f64::consts::PI)
    }

    pub fn tan(&self) -> Self {
        self.periodic(f64::tan, |x| 1.0 + x.tan().powi(2), std::f64::consts::PI)
    }

    /// Non-negative integer power via repeated squaring (`powrec`);
    /// negative exponents invert, `e == 0` is the constant `1`.
    pub fn pow(&self, e: i32) -> Self {
        if self.is_empty() {
            return AffineForm::empty();
        }
        if e < 0 {
            return self.pow(-e).udiv();
        }
        if e == 0 {
            return AffineForm::constant(Interval::singleton(1.0));
        }
        if e == 1 {
            return self.clone();
        }
        if e == 2 {
            return self.sqr();
        }
        self.powrec(e as u32)
    }

    fn powrec(&self, e: u32) -> Self {
        if e == 1 {
            return self.clone();
        }
        let half = self.powrec(e / 2);
        let sq = half.sqr();
        if e % 2 == 0 {
            sq
        } else {
            sq.mul(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_of_constant_is_exact() {
        let f = AffineForm::constant(Interval::new(3.0, 3.0));
        assert_eq!(f.eval(), Interval::new(3.0, 3.0));
    }

    #[test]
    fn variable_form_encloses_its_domain() {
        let idx = fresh_noise_index();
        let f = AffineForm::from_variable(idx, Interval::new(1.0, 5.0));
        let e = f.eval();
        assert!(e.contains_interval(&Interval::new(1.0, 5.0)) || e == Interval::new(1.0, 5.0));
    }

    #[test]
    fn add_of_two_variables_is_exact_linear() {
        let ix = fresh_noise_index();
        let iy = fresh_noise_index();
        let x = AffineForm::from_variable(ix, Interval::new(0.0, 2.0));
        let y = AffineForm::from_variable(iy, Interval::new(0.0, 2.0));
        let z = x.add(&y);
        assert!(z.eval().contains_interval(&Interval::new(0.0, 4.0)));
    }

    #[test]
    fn self_minus_self_cancels_correlation() {
        let ix = fresh_noise_index();
        let x = AffineForm::from_variable(ix, Interval::new(-1.0, 1.0));
        let z = x.sub(&x);
        // exact cancellation: a0 = 0, no linear terms, zero error
        assert_eq!(z.eval(), Interval::singleton(0.0));
    }

    #[test]
    fn sqr_is_nonnegative_and_sound() {
        let ix = fresh_noise_index();
        let x = AffineForm::from_variable(ix, Interval::new(-3.0, 2.0));
        let z = x.sqr();
        let img = z.eval();
        assert!(img.lo() >= -1e-9);
        assert!(img.hi() >= 9.0 - 1e-9);
    }

    #[test]
    fn cos_periodic_matches_scenario_d_bounds() {
        set_linearization_mode(Linearization::Minrange);
        let ix = fresh_noise_index();
        // one period offset from [0.2, 1.2]
        let x = AffineForm::from_variable(ix, Interval::new(12.77, 13.77));
        let z = x.cos();
        let img = z.eval();
        assert!(img.lo() <= 1.0 && img.hi() >= -1.0);
    }

    #[test]
    fn udiv_of_zero_straddling_is_inf() {
        let ix = fresh_noise_index();
        let x = AffineForm::from_variable(ix, Interval::new(-1.0, 1.0));
        assert!(x.udiv().is_inf());
    }

    #[test]
    fn udiv_of_zero_image_is_empty() {
        let x = AffineForm::constant(Interval::singleton(0.0));
        assert!(x.udiv().is_empty());
    }

    #[test]
    fn pow_zero_is_constant_one() {
        let ix = fresh_noise_index();
        let x = AffineForm::from_variable(ix, Interval::new(1.0, 5.0));
        assert_eq!(x.pow(0).eval(), Interval::singleton(1.0));
    }
}
