//! The [`Domain`] sum type and the binary [`ZeroOne`] domain.

use realpaver_interval::{Interval, IntervalUnion, Range, RangeUnion};
use realpaver_num::Integer;

/// A two-bit subset of `{0, 1}`, tracking membership of each value
/// independently rather than as a `Range`. Starts as the full set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZeroOne {
    has_zero: bool,
    has_one: bool,
}

impl Default for ZeroOne {
    fn default() -> Self {
        ZeroOne { has_zero: true, has_one: true }
    }
}

impl ZeroOne {
    pub fn full() -> Self {
        ZeroOne::default()
    }

    pub fn empty() -> Self {
        ZeroOne { has_zero: false, has_one: false }
    }

    pub fn zero() -> Self {
        ZeroOne { has_zero: true, has_one: false }
    }

    pub fn one() -> Self {
        ZeroOne { has_zero: false, has_one: true }
    }

    pub fn has_zero(&self) -> bool {
        self.has_zero
    }

    pub fn has_one(&self) -> bool {
        self.has_one
    }

    pub fn set_zero(&mut self, present: bool) {
        self.has_zero = present;
    }

    pub fn set_one(&mut self, present: bool) {
        self.has_one = present;
    }

    pub fn is_empty(&self) -> bool {
        !self.has_zero && !self.has_one
    }

    pub fn is_canonical(&self) -> bool {
        !(self.has_zero && self.has_one)
    }

    pub fn intersect(&self, other: &ZeroOne) -> ZeroOne {
        ZeroOne { has_zero: self.has_zero && other.has_zero, has_one: self.has_one && other.has_one }
    }

    pub fn to_range(&self) -> Range {
        match (self.has_zero, self.has_one) {
            (true, true) => Range::new(Integer::new(0), Integer::new(1)),
            (true, false) => Range::singleton(Integer::new(0)),
            (false, true) => Range::singleton(Integer::new(1)),
            (false, false) => Range::empty(),
        }
    }
}

/// Sum type over every representable variable domain.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    Interval(Interval),
    IntervalUnion(IntervalUnion),
    Range(Range),
    RangeUnion(RangeUnion),
    Binary(ZeroOne),
}

impl Domain {
    pub fn is_empty(&self) -> bool {
        match self {
            Domain::Interval(i) => i.is_empty(),
            Domain::IntervalUnion(u) => u.is_empty(),
            Domain::Range(r) => r.is_empty(),
            Domain::RangeUnion(u) => u.is_empty(),
            Domain::Binary(z) => z.is_empty(),
        }
    }

    /// `true` only for [`Domain::Interval`]: the only variant guaranteed
    /// to be a single connected set.
    pub fn is_connected(&self) -> bool {
        matches!(self, Domain::Interval(_))
    }

    pub fn hull(&self) -> Interval {
        match self {
            Domain::Interval(i) => *i,
            Domain::IntervalUnion(u) => u.hull(),
            Domain::Range(r) => r.to_interval(),
            Domain::RangeUnion(u) => u.hull().to_interval(),
            Domain::Binary(z) => z.to_range().to_interval(),
        }
    }

    /// Width for continuous domains, cardinality for discrete ones.
    pub fn size(&self) -> f64 {
        match self {
            Domain::Interval(i) => i.width(),
            Domain::IntervalUnion(u) => u.width(),
            Domain::Range(r) => r.cardinality(),
            Domain::RangeUnion(u) => u.cardinality(),
            Domain::Binary(z) => if z.is_canonical() { 1.0 } else { 2.0 },
        }
    }

    pub fn is_canonical(&self, tolerance: f64) -> bool {
        match self {
            Domain::Interval(i) => i.width() <= tolerance,
            Domain::IntervalUnion(u) => u.is_canonical(tolerance),
            Domain::Range(r) => r.cardinality() <= 1.0,
            Domain::RangeUnion(u) => u.is_canonical(),
            Domain::Binary(z) => z.is_canonical(),
        }
    }

    pub fn is_discrete_canonical(&self) -> bool {
        self.is_canonical(0.0)
    }

    /// Assigns `self` to `hull(self ∩ x)`, the single-interval contraction
    /// every domain variant supports.
    pub fn contract_to_hull(&mut self, x: &Interval) {
        match self {
            Domain::Interval(i) => *i = i.intersection(x),
            Domain::IntervalUnion(u) => *u = IntervalUnion::from_intervals(vec![u.contract(x)]),
            Domain::Range(r) => *r = r.intersection(&Range::from_interval_hull(x)),
            Domain::RangeUnion(u) => {
                let rx = Range::from_interval_hull(x);
                *u = RangeUnion::from_ranges(vec![u.hull().intersection(&rx)]);
            }
            Domain::Binary(z) => {
                let rx = Range::from_interval_hull(x);
                *z = z.intersect(&ZeroOne {
                    has_zero: rx.contains(Integer::new(0)),
                    has_one: rx.contains(Integer::new(1)),
                });
            }
        }
    }

    /// Assigns `self` to its exact intersection with `x` where the
    /// variant allows it (unions keep their disjoint structure rather
    /// than collapsing to a hull).
    pub fn contract_with(&mut self, x: &Interval) {
        match self {
            Domain::IntervalUnion(u) => *u = u.intersect_union(x),
            _ => self.contract_to_hull(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_one_starts_full_and_narrows() {
        let mut z = ZeroOne::full();
        assert!(!z.is_canonical());
        z.set_one(false);
        assert!(z.is_canonical());
        assert_eq!(z.to_range(), Range::singleton(Integer::new(0)));
    }

    #[test]
    fn zero_one_both_cleared_is_empty() {
        let mut z = ZeroOne::full();
        z.set_zero(false);
        z.set_one(false);
        assert!(z.is_empty());
    }

    #[test]
    fn interval_union_contract_keeps_disjoint_parts() {
        let u = IntervalUnion::from_intervals(vec![Interval::new(0.0, 1.0), Interval::new(5.0, 6.0)]);
        let mut d = Domain::IntervalUnion(u);
        d.contract_with(&Interval::new(0.5, 5.5));
        if let Domain::IntervalUnion(u) = d {
            assert_eq!(u.len(), 2);
        } else {
            panic!("expected IntervalUnion");
        }
    }
}
