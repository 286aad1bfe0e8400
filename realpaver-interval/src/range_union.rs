//! Ordered, disjoint unions of integer ranges with a minimum gap of one
//! between consecutive components (adjacent integer ranges merge).

use crate::range::Range;
use realpaver_num::Integer;
use smallvec::SmallVec;

#[derive(Debug, Clone, PartialEq)]
pub struct RangeUnion {
    parts: SmallVec<[Range; 4]>,
}

impl RangeUnion {
    pub fn empty() -> Self {
        RangeUnion { parts: SmallVec::new() }
    }

    pub fn from_ranges(mut items: Vec<Range>) -> Self {
        items.retain(|r| !r.is_empty());
        items.sort_by(|a, b| a.lo().cmp(&b.lo()));
        let mut parts: SmallVec<[Range; 4]> = SmallVec::new();
        for item in items {
            if let Some(last) = parts.last_mut() {
                let adjacent = last.hi().checked_add(Integer::ONE).map(|n| n >= item.lo()).unwrap_or(true);
                if adjacent {
                    *last = last.hull(&item);
                    continue;
                }
            }
            parts.push(item);
        }
        RangeUnion { parts }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn parts(&self) -> &[Range] {
        &self.parts
    }

    pub fn hull(&self) -> Range {
        match (self.parts.first(), self.parts.last()) {
            (Some(a), Some(b)) => Range::new(a.lo(), b.hi()),
            _ => Range::empty(),
        }
    }

    pub fn cardinality(&self) -> f64 {
        self.parts.iter().map(|r| r.cardinality()).sum()
    }

    pub fn contains(&self, x: Integer) -> bool {
        self.parts.iter().any(|r| r.contains(x))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_canonical(&self) -> bool {
        self.parts.len() <= 1 && self.hull().cardinality() <= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_ranges_merge() {
        let u = RangeUnion::from_ranges(vec![
            Range::new(Integer::new(0), Integer::new(2)),
            Range::new(Integer::new(3), Integer::new(5)),
        ]);
        assert_eq!(u.parts().len(), 1);
        assert_eq!(u.parts()[0], Range::new(Integer::new(0), Integer::new(5)));
    }

    #[test]
    fn gapped_ranges_stay_disjoint() {
        let u = RangeUnion::from_ranges(vec![
            Range::new(Integer::new(0), Integer::new(2)),
            Range::new(Integer::new(4), Integer::new(5)),
        ]);
        assert_eq!(u.parts().len(), 2);
    }
}
