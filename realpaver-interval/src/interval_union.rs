//! Ordered, pairwise-disjoint unions of intervals.

use crate::interval::Interval;
use smallvec::SmallVec;

/// A sequence of disjoint intervals kept in increasing order, with a
/// strict gap (`a.hi() < b.lo()`) between any two consecutive elements.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalUnion {
    parts: SmallVec<[Interval; 4]>,
}

impl IntervalUnion {
    pub fn empty() -> Self {
        IntervalUnion { parts: SmallVec::new() }
    }

    /// Builds a union from arbitrary (possibly overlapping, unordered,
    /// empty) intervals, normalizing to the strict-gap invariant.
    pub fn from_intervals(mut items: Vec<Interval>) -> Self {
        items.retain(|i| !i.is_empty());
        items.sort_by(|a, b| a.lo().partial_cmp(&b.lo()).unwrap());
        let mut parts: SmallVec<[Interval; 4]> = SmallVec::new();
        for item in items {
            if let Some(last) = parts.last_mut() {
                if item.lo() <= last.hi() {
                    *last = last.hull(&item);
                    continue;
                }
            }
            parts.push(item);
        }
        IntervalUnion { parts }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn parts(&self) -> &[Interval] {
        &self.parts
    }

    pub fn hull(&self) -> Interval {
        match (self.parts.first(), self.parts.last()) {
            (Some(a), Some(b)) => Interval::new(a.lo(), b.hi()),
            _ => Interval::empty(),
        }
    }

    pub fn width(&self) -> f64 {
        self.parts.iter().map(|p| p.width()).sum()
    }

    /// Contracts `x` against this union, returning `hull(x) ∩ union`
    /// collapsed back to the tightest single interval containing every
    /// overlapping component's overlap (a conservative single-interval
    /// enclosure; callers needing the disjoint structure use
    /// [`IntervalUnion::intersect_union`]).
    pub fn contract(&self, x: &Interval) -> Interval {
        self.intersect_union(x).hull()
    }

    pub fn intersect_union(&self, x: &Interval) -> IntervalUnion {
        let items: Vec<Interval> = self
            .parts
            .iter()
            .map(|p| p.intersection(x))
            .filter(|p| !p.is_empty())
            .collect();
        IntervalUnion::from_intervals(items)
    }

    pub fn remove_empties(mut self) -> Self {
        self.parts.retain(|p| !p.is_empty());
        self
    }

    pub fn contains(&self, x: f64) -> bool {
        self.parts.iter().any(|p| p.contains(x))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_canonical(&self, tolerance: f64) -> bool {
        self.parts.len() <= 1 && self.hull().width() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_overlapping_and_sorts() {
        let u = IntervalUnion::from_intervals(vec![
            Interval::new(5.0, 6.0),
            Interval::new(0.0, 2.0),
            Interval::new(1.5, 3.0),
        ]);
        assert_eq!(u.parts().len(), 2);
        assert_eq!(u.parts()[0], Interval::new(0.0, 3.0));
        assert_eq!(u.parts()[1], Interval::new(5.0, 6.0));
    }

    #[test]
    fn strict_gap_invariant_holds() {
        let u = IntervalUnion::from_intervals(vec![Interval::new(0.0, 1.0), Interval::new(1.0, 2.0)]);
        assert_eq!(u.parts().len(), 1);
    }

    #[test]
    fn intersect_union_keeps_disjoint_components() {
        let u = IntervalUnion::from_intervals(vec![Interval::new(0.0, 1.0), Interval::new(5.0, 6.0)]);
        let contracted = u.intersect_union(&Interval::new(0.5, 5.5));
        assert_eq!(contracted.parts().len(), 2);
        assert_eq!(contracted.parts()[0], Interval::new(0.5, 1.0));
        assert_eq!(contracted.parts()[1], Interval::new(5.0, 5.5));
    }
}
