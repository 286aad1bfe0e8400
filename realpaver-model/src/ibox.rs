//! [`DomainBox`] and [`IntervalBox`]: a [`Scope`] paired with dense
//! per-variable storage.

use crate::domain::Domain;
use crate::error::{ModelError, ModelResult};
use crate::scope::Scope;
use crate::var::VarId;
use realpaver_interval::Interval;

#[derive(Debug, Clone, PartialEq)]
pub struct DomainBox {
    scope: Scope,
    domains: Vec<Domain>,
}

impl DomainBox {
    pub fn new(scope: Scope, domains: Vec<Domain>) -> ModelResult<Self> {
        if domains.len() != scope.len() {
            return Err(ModelError::BoxScopeMismatch { box_len: domains.len(), scope_len: scope.len() });
        }
        Ok(DomainBox { scope, domains })
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn get(&self, id: VarId) -> ModelResult<&Domain> {
        let idx = self.scope.index(id).ok_or(ModelError::VariableNotInScope(id))?;
        Ok(&self.domains[idx])
    }

    pub fn get_mut(&mut self, id: VarId) -> ModelResult<&mut Domain> {
        let idx = self.scope.index(id).ok_or(ModelError::VariableNotInScope(id))?;
        Ok(&mut self.domains[idx])
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn is_empty_box(&self) -> bool {
        self.domains.iter().any(|d| d.is_empty())
    }

    pub fn to_interval_box(&self) -> IntervalBox {
        let intervals = self.domains.iter().map(|d| d.hull()).collect();
        IntervalBox { scope: self.scope.clone(), intervals }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntervalBox {
    scope: Scope,
    intervals: Vec<Interval>,
}

impl IntervalBox {
    pub fn new(scope: Scope, intervals: Vec<Interval>) -> ModelResult<Self> {
        if intervals.len() != scope.len() {
            return Err(ModelError::BoxScopeMismatch { box_len: intervals.len(), scope_len: scope.len() });
        }
        Ok(IntervalBox { scope, intervals })
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn get(&self, id: VarId) -> ModelResult<Interval> {
        let idx = self.scope.index(id).ok_or(ModelError::VariableNotInScope(id))?;
        Ok(self.intervals[idx])
    }

    pub fn set(&mut self, id: VarId, x: Interval) -> ModelResult<()> {
        let idx = self.scope.index(id).ok_or(ModelError::VariableNotInScope(id))?;
        self.intervals[idx] = x;
        Ok(())
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn intervals_mut(&mut self) -> &mut [Interval] {
        &mut self.intervals
    }

    pub fn is_empty_box(&self) -> bool {
        self.intervals.iter().any(|i| i.is_empty())
    }

    pub fn midpoint(&self) -> Vec<f64> {
        self.intervals.iter().map(|i| i.midpoint()).collect()
    }

    /// A corner of the box selected by `bits` (bit `i` set ⇒ take the
    /// upper bound of dimension `i`, else the lower bound).
    pub fn corner(&self, bits: &[bool]) -> Vec<f64> {
        self.intervals
            .iter()
            .zip(bits.iter())
            .map(|(i, &b)| if b { i.hi() } else { i.lo() })
            .collect()
    }

    pub fn opposite_corner(&self, bits: &[bool]) -> Vec<f64> {
        self.intervals
            .iter()
            .zip(bits.iter())
            .map(|(i, &b)| if b { i.lo() } else { i.hi() })
            .collect()
    }

    /// L-infinity distance between this box and `other` over their
    /// shared scope.
    pub fn linf_gap(&self, other: &IntervalBox) -> f64 {
        self.intervals
            .iter()
            .zip(other.intervals.iter())
            .map(|(a, b)| {
                if a.hi() < b.lo() {
                    b.lo() - a.hi()
                } else if b.hi() < a.lo() {
                    a.lo() - b.hi()
                } else {
                    0.0
                }
            })
            .fold(0.0, f64::max)
    }

    pub fn hausdorff_distance(&self, other: &IntervalBox) -> f64 {
        self.intervals
            .iter()
            .zip(other.intervals.iter())
            .map(|(a, b)| (a.lo() - b.lo()).abs().max((a.hi() - b.hi()).abs()))
            .fold(0.0, f64::max)
    }

    pub fn inflate(&self, delta: f64, chi: f64) -> IntervalBox {
        let intervals = self.intervals.iter().map(|i| i.inflate(delta, chi)).collect();
        IntervalBox { scope: self.scope.clone(), intervals }
    }

    pub fn perimeter(&self) -> f64 {
        self.intervals.iter().map(|i| i.width()).sum()
    }

    /// Relative perimeter shrink from `before` to `self`, in `[0, 1]`:
    /// `1 - perimeter(self) / perimeter(before)`. Used by ACID's learning
    /// phase to decide how many variable contractors were worth running.
    pub fn gain_ratio(&self, before: &IntervalBox) -> f64 {
        let p0 = before.perimeter();
        if p0 <= 0.0 {
            0.0
        } else {
            1.0 - self.perimeter() / p0
        }
    }

    /// `Σ width(x_i) / tolerance_i` over variables not yet within
    /// tolerance; variables already canonical contribute zero.
    pub fn grid_perimeter(&self, tolerances: &[f64]) -> f64 {
        self.intervals
            .iter()
            .zip(tolerances.iter())
            .map(|(i, &tol)| if i.width() > tol { i.width() / tol } else { 0.0 })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::var::VarId;

    #[test]
    fn linf_gap_zero_when_overlapping() {
        let scope = Scope::from_ids(vec![VarId::new(0)]);
        let a = IntervalBox::new(scope.clone(), vec![Interval::new(0.0, 2.0)]).unwrap();
        let b = IntervalBox::new(scope, vec![Interval::new(1.0, 3.0)]).unwrap();
        assert_eq!(a.linf_gap(&b), 0.0);
    }

    #[test]
    fn linf_gap_positive_when_disjoint() {
        let scope = Scope::from_ids(vec![VarId::new(0)]);
        let a = IntervalBox::new(scope.clone(), vec![Interval::new(0.0, 1.0)]).unwrap();
        let b = IntervalBox::new(scope, vec![Interval::new(3.0, 4.0)]).unwrap();
        assert_eq!(a.linf_gap(&b), 2.0);
    }
}
