//! Integer intervals, built on [`realpaver_num::Integer`]'s checked
//! arithmetic with the same set-theoretic contract as [`Interval`].

use crate::interval::Interval;
use realpaver_num::Integer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    lo: Integer,
    hi: Integer,
    empty: bool,
}

impl Range {
    pub fn new(lo: Integer, hi: Integer) -> Self {
        if lo > hi {
            Range::empty()
        } else {
            Range { lo, hi, empty: false }
        }
    }

    pub fn singleton(x: Integer) -> Self {
        Range::new(x, x)
    }

    pub fn empty() -> Self {
        Range { lo: Integer::ZERO, hi: Integer::ZERO, empty: true }
    }

    pub fn universe() -> Self {
        Range::new(Integer::MIN, Integer::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn lo(&self) -> Integer {
        self.lo
    }

    pub fn hi(&self) -> Integer {
        self.hi
    }

    pub fn is_singleton(&self) -> bool {
        !self.empty && self.lo == self.hi
    }

    /// Number of integers in the range, as `f64` (may exceed `i64` range
    /// for very wide ranges, hence the float).
    pub fn cardinality(&self) -> f64 {
        if self.empty {
            0.0
        } else {
            self.hi.as_f64() - self.lo.as_f64() + 1.0
        }
    }

    pub fn contains(&self, x: Integer) -> bool {
        !self.empty && self.lo <= x && x <= self.hi
    }

    pub fn hull(&self, other: &Range) -> Range {
        if self.empty {
            return *other;
        }
        if other.empty {
            return *self;
        }
        Range::new(self.lo.min(other.lo), self.hi.max(other.hi))
    }

    pub fn intersection(&self, other: &Range) -> Range {
        if self.empty || other.empty {
            return Range::empty();
        }
        Range::new(self.lo.max(other.lo), self.hi.min(other.hi))
    }

    pub fn overlaps(&self, other: &Range) -> bool {
        !self.empty && !other.empty && self.lo <= other.hi && other.lo <= self.hi
    }

    pub fn midpoint(&self) -> Integer {
        if self.lo == Integer::MIN || self.hi == Integer::MAX {
            return self.lo;
        }
        Integer::floor(0.5 * (self.lo.as_f64() + self.hi.as_f64())).unwrap_or(self.lo)
    }

    /// Converts to the (outward-rounded) real interval with the same
    /// bounds; `Integer::MIN`/`MAX` map to the corresponding infinities.
    pub fn to_interval(&self) -> Interval {
        if self.empty {
            return Interval::empty();
        }
        let lo = if self.lo == Integer::MIN { f64::NEG_INFINITY } else { self.lo.as_f64() };
        let hi = if self.hi == Integer::MAX { f64::INFINITY } else { self.hi.as_f64() };
        Interval::new(lo, hi)
    }

    /// The smallest range containing every integer in `x`.
    pub fn from_interval_hull(x: &Interval) -> Range {
        if x.is_empty() {
            return Range::empty();
        }
        let lo = Integer::ceil(x.lo()).unwrap_or(Integer::MIN);
        let hi = Integer::floor(x.hi()).unwrap_or(Integer::MAX);
        Range::new(lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_and_hull() {
        let a = Range::new(Integer::new(0), Integer::new(10));
        let b = Range::new(Integer::new(5), Integer::new(20));
        assert_eq!(a.intersection(&b), Range::new(Integer::new(5), Integer::new(10)));
        assert_eq!(a.hull(&b), Range::new(Integer::new(0), Integer::new(20)));
    }

    #[test]
    fn cardinality_counts_inclusive() {
        let r = Range::new(Integer::new(3), Integer::new(7));
        assert_eq!(r.cardinality(), 5.0);
    }

    #[test]
    fn from_interval_hull_rounds_inward() {
        let i = Interval::new(1.2, 3.7);
        let r = Range::from_interval_hull(&i);
        assert_eq!(r, Range::new(Integer::new(2), Integer::new(3)));
    }
}
