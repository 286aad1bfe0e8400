//! Slicers: split a domain into an ordered sequence of sub-domains.

use crate::error::{ContractorError, ContractorResult};
use realpaver_interval::{Interval, Range};
use realpaver_model::{Domain, ZeroOne};
use realpaver_num::Integer;

#[derive(Debug, Clone, Copy)]
pub enum IntervalSlicer {
    Bisect,
    /// Peels a `percent`-wide slice off each end, leaving the body as the
    /// third slice.
    Peel { percent: f64 },
    Partition { n: u32 },
}

impl IntervalSlicer {
    pub fn slice(&self, x: &Interval) -> ContractorResult<Vec<Interval>> {
        if x.is_empty() {
            return Ok(vec![]);
        }
        match self {
            IntervalSlicer::Bisect => {
                let m = x.midpoint();
                Ok(vec![Interval::new(x.lo(), m), Interval::new(m, x.hi())])
            }
            IntervalSlicer::Peel { percent } => {
                if *percent <= 0.0 || *percent >= 100.0 {
                    return Err(ContractorError::BadPeelFactor(*percent));
                }
                let w = x.width();
                let peel = w * (percent / 100.0);
                let left = Interval::new(x.lo(), x.lo() + peel);
                let right = Interval::new(x.hi() - peel, x.hi());
                let mid = Interval::new(x.lo() + peel, x.hi() - peel);
                Ok(vec![left, mid, right].into_iter().filter(|i| !i.is_empty()).collect())
            }
            IntervalSlicer::Partition { n } => {
                if *n < 2 {
                    return Err(ContractorError::BadSliceCount(*n));
                }
                let w = x.width() / (*n as f64);
                let mut out = Vec::with_capacity(*n as usize);
                for i in 0..*n {
                    let lo = x.lo() + w * (i as f64);
                    let hi = if i == n - 1 { x.hi() } else { x.lo() + w * ((i + 1) as f64) };
                    out.push(Interval::new(lo, hi));
                }
                Ok(out)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum RangeSlicer {
    Bisect,
    /// Singleton at each end, body in between.
    Peel,
    LeftFix,
    RightFix,
    /// One slice per integer value.
    Spray,
}

impl RangeSlicer {
    pub fn slice(&self, x: &Range) -> Vec<Range> {
        if x.is_empty() {
            return vec![];
        }
        if x.is_singleton() {
            return vec![*x];
        }
        match self {
            RangeSlicer::Bisect => {
                let m = x.midpoint();
                vec![Range::new(x.lo(), m), Range::new(m.checked_add(Integer::ONE).unwrap_or(m), x.hi())]
                    .into_iter()
                    .filter(|r| !r.is_empty())
                    .collect()
            }
            RangeSlicer::Peel => {
                let lo_s = Range::singleton(x.lo());
                let hi_s = Range::singleton(x.hi());
                let body_lo = x.lo().checked_add(Integer::ONE).unwrap_or(x.lo());
                let body_hi = x.hi().checked_sub(Integer::ONE).unwrap_or(x.hi());
                let body = Range::new(body_lo, body_hi);
                vec![lo_s, body, hi_s].into_iter().filter(|r| !r.is_empty()).collect()
            }
            RangeSlicer::LeftFix => {
                let lo_s = Range::singleton(x.lo());
                let rest_lo = x.lo().checked_add(Integer::ONE).unwrap_or(x.lo());
                let rest = Range::new(rest_lo, x.hi());
                vec![lo_s, rest].into_iter().filter(|r| !r.is_empty()).collect()
            }
            RangeSlicer::RightFix => {
                let hi_s = Range::singleton(x.hi());
                let rest_hi = x.hi().checked_sub(Integer::ONE).unwrap_or(x.hi());
                let rest = Range::new(x.lo(), rest_hi);
                vec![rest, hi_s].into_iter().filter(|r| !r.is_empty()).collect()
            }
            RangeSlicer::Spray => {
                let lo = x.lo().value();
                let hi = x.hi().value();
                (lo..=hi).map(|v| Range::singleton(Integer::new(v))).collect()
            }
        }
    }
}

/// Dispatches on the [`Domain`] variant: bisects continuous domains,
/// bisects integer ranges exactly, halves the number of components of a
/// union (or bisects the lone component), and splits a binary domain into
/// `{0}`/`{1}` when both are present.
pub struct DomainSlicer;

impl DomainSlicer {
    pub fn slice(d: &Domain) -> Vec<Domain> {
        match d {
            Domain::Interval(i) => IntervalSlicer::Bisect
                .slice(i)
                .unwrap_or_default()
                .into_iter()
                .map(Domain::Interval)
                .collect(),
            Domain::Range(r) => RangeSlicer::Bisect.slice(r).into_iter().map(Domain::Range).collect(),
            Domain::IntervalUnion(u) => {
                let parts = u.parts();
                if parts.len() > 1 {
                    let mid = parts.len() / 2;
                    let (a, b) = parts.split_at(mid);
                    vec![
                        Domain::IntervalUnion(realpaver_interval::IntervalUnion::from_intervals(a.to_vec())),
                        Domain::IntervalUnion(realpaver_interval::IntervalUnion::from_intervals(b.to_vec())),
                    ]
                } else if let Some(&only) = parts.first() {
                    IntervalSlicer::Bisect
                        .slice(&only)
                        .unwrap_or_default()
                        .into_iter()
                        .map(|i| Domain::IntervalUnion(realpaver_interval::IntervalUnion::from_intervals(vec![i])))
                        .collect()
                } else {
                    vec![]
                }
            }
            Domain::RangeUnion(u) => {
                let parts = u.parts();
                if parts.len() > 1 {
                    let mid = parts.len() / 2;
                    let (a, b) = parts.split_at(mid);
                    vec![
                        Domain::RangeUnion(realpaver_interval::RangeUnion::from_ranges(a.to_vec())),
                        Domain::RangeUnion(realpaver_interval::RangeUnion::from_ranges(b.to_vec())),
                    ]
                } else if let Some(&only) = parts.first() {
                    RangeSlicer::Bisect
                        .slice(&only)
                        .into_iter()
                        .map(|r| Domain::RangeUnion(realpaver_interval::RangeUnion::from_ranges(vec![r])))
                        .collect()
                } else {
                    vec![]
                }
            }
            Domain::Binary(z) => {
                if z.has_zero() && z.has_one() {
                    vec![Domain::Binary(ZeroOne::zero()), Domain::Binary(ZeroOne::one())]
                } else {
                    vec![Domain::Binary(*z)]
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bisect_splits_at_midpoint() {
        let x = Interval::new(0.0, 10.0);
        let parts = IntervalSlicer::Bisect.slice(&x).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].hi(), parts[1].lo());
    }

    #[test]
    fn peel_rejects_bad_percent() {
        let x = Interval::new(0.0, 10.0);
        assert!(IntervalSlicer::Peel { percent: 0.0 }.slice(&x).is_err());
        assert!(IntervalSlicer::Peel { percent: 150.0 }.slice(&x).is_err());
    }

    #[test]
    fn range_spray_yields_one_slice_per_integer() {
        let r = Range::new(Integer::new(1), Integer::new(4));
        let parts = RangeSlicer::Spray.slice(&r);
        assert_eq!(parts.len(), 4);
    }

    #[test]
    fn binary_domain_splits_when_both_present() {
        let parts = DomainSlicer::slice(&Domain::Binary(ZeroOne::full()));
        assert_eq!(parts.len(), 2);
    }
}
