//! The [`Contractor`] trait and its two structural composites, [`List`]
//! (sequential, stop on empty) and [`Propag`] (fixpoint queue).

use crate::error::ContractorResult;
use realpaver_dag::{Dag, Proof};
use realpaver_model::{IntervalBox, Scope};
use std::collections::VecDeque;

/// A sound operator `X -> X'` with `X' ⊆ X`. Every primitive contractor
/// in this crate and every composite built from them implements this.
pub trait Contractor {
    fn scope(&self) -> &Scope;
    fn contract(&self, dag: &Dag, box_: &mut IntervalBox) -> ContractorResult<Proof>;
}

/// Runs a fixed sequence of contractors in order, stopping immediately on
/// `Empty`. The overall proof is the strongest (`max`) proof seen among
/// the sub-results, starting from `Maybe` (so an empty list, or a list of
/// contractors that all report `Maybe`, never overclaims `Inner`).
pub struct List {
    scope: Scope,
    parts: Vec<Box<dyn Contractor>>,
}

impl List {
    pub fn new(parts: Vec<Box<dyn Contractor>>) -> Self {
        let scope = parts.iter().fold(Scope::empty(), |acc, c| acc.union(c.scope()));
        List { scope, parts }
    }
}

impl Contractor for List {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn contract(&self, dag: &Dag, box_: &mut IntervalBox) -> ContractorResult<Proof> {
        let mut overall = Proof::Maybe;
        for c in &self.parts {
            let p = c.contract(dag, box_)?;
            if p == Proof::Empty {
                return Ok(Proof::Empty);
            }
            overall = overall.max(p);
        }
        Ok(overall)
    }
}

/// Maintains a worklist of contractors; when one of them changes the box,
/// every other contractor whose scope overlaps the changed variables is
/// re-enqueued. Terminates when the queue drains or `iter_limit` is hit.
pub struct Propag {
    scope: Scope,
    parts: Vec<Box<dyn Contractor>>,
    rel_tol: f64,
    iter_limit: u32,
}

impl Propag {
    pub fn new(parts: Vec<Box<dyn Contractor>>, rel_tol: f64, iter_limit: u32) -> Self {
        let scope = parts.iter().fold(Scope::empty(), |acc, c| acc.union(c.scope()));
        Propag { scope, parts, rel_tol, iter_limit }
    }

    fn changed_enough(before: &IntervalBox, after: &IntervalBox, rel_tol: f64) -> bool {
        before.intervals().iter().zip(after.intervals().iter()).any(|(b, a)| {
            let w = b.width();
            if !w.is_finite() || w == 0.0 {
                a.width() < w
            } else {
                (w - a.width()) / w > rel_tol
            }
        })
    }
}

impl Contractor for Propag {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn contract(&self, dag: &Dag, box_: &mut IntervalBox) -> ContractorResult<Proof> {
        let n = self.parts.len();
        if n == 0 {
            return Ok(Proof::Maybe);
        }
        let mut queue: VecDeque<usize> = (0..n).collect();
        let mut queued = vec![true; n];
        let mut overall = Proof::Maybe;
        let mut iters = 0u32;
        while let Some(i) = queue.pop_front() {
            queued[i] = false;
            if iters >= self.iter_limit {
                break;
            }
            iters += 1;
            let before = box_.clone();
            let p = self.parts[i].contract(dag, box_)?;
            if p == Proof::Empty {
                return Ok(Proof::Empty);
            }
            overall = overall.max(p);
            if Self::changed_enough(&before, box_, self.rel_tol) {
                for (j, c) in self.parts.iter().enumerate() {
                    if j != i && !queued[j] && !c.scope().is_disjoint(self.parts[i].scope()) {
                        queued[j] = true;
                        queue.push_back(j);
                    }
                }
            }
        }
        Ok(overall)
    }
}

/// Delegates contraction to an arbitrary semantic rule not reduced to DAG
/// form (discrete, table, or otherwise opaque constraints).
pub struct ConstraintContractor {
    scope: Scope,
    rule: Box<dyn Fn(&mut IntervalBox) -> Proof>,
}

impl ConstraintContractor {
    pub fn new(scope: Scope, rule: Box<dyn Fn(&mut IntervalBox) -> Proof>) -> Self {
        ConstraintContractor { scope, rule }
    }
}

impl Contractor for ConstraintContractor {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn contract(&self, _dag: &Dag, box_: &mut IntervalBox) -> ContractorResult<Proof> {
        Ok((self.rule)(box_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hc4::Hc4;
    use realpaver_dag::{BinOp, Constraint};
    use realpaver_interval::Interval;
    use realpaver_model::VarId;

    #[test]
    fn list_stops_on_empty() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let c = dag.insert_const(Interval::singleton(100.0));
        let root = dag.insert_bin(BinOp::Add, x, c).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0)]);
        let constraint = Constraint::eq(root, scope.clone());
        let hc4 = Hc4::new(constraint.to_fun());
        let list = List::new(vec![Box::new(hc4)]);
        let mut b = IntervalBox::new(scope, vec![Interval::new(0.0, 1.0)]).unwrap();
        let p = list.contract(&dag, &mut b).unwrap();
        assert_eq!(p, Proof::Empty);
    }
}
