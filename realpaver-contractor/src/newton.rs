//! Interval-Newton via Gauss-Seidel over a square system, plus the
//! single-variable Newton step [`Bc3Revise`](crate::bc3::Bc3Revise) uses
//! to refine a peeled bound.

use crate::contractor::Contractor;
use crate::error::ContractorResult;
use realpaver_dag::{Dag, DagFun, Proof};
use realpaver_interval::Interval;
use realpaver_model::{IntervalBox, Scope, VarId};

/// One interval-Newton step for a single variable of a single function:
/// `x' = m - f(m) / f'(x)`, intersected with `x`. `f(m)` is evaluated at
/// the midpoint of `x` (other variables held at their box value); `f'(x)`
/// is the interval derivative over the whole box. Returns `None` when the
/// derivative interval contains zero (division would be unsound without
/// splitting, which is the caller's job, not this helper's).
pub fn newton_step_1var(dag: &Dag, fun: &DagFun, var: VarId, box_: &IntervalBox) -> ContractorResult<Option<Interval>> {
    let x = box_.get(var).unwrap_or(Interval::empty());
    if x.is_empty() {
        return Ok(None);
    }
    let m = x.midpoint();
    let mut mid_box = box_.clone();
    mid_box.set(var, Interval::singleton(m)).ok();
    let vals = dag.interval_eval(|v| mid_box.get(v).unwrap_or(Interval::universe()));
    let fm = vals[fun.root()].sub(&fun.image());

    let full_vals = dag.interval_eval(|v| box_.get(v).unwrap_or(Interval::universe()));
    let adj = dag.interval_diff(fun.root(), &full_vals)?;
    let var_node = match dag.var_node(var) {
        Some(n) => n,
        None => return Ok(None),
    };
    let deriv = adj[var_node];
    if deriv.is_empty() || deriv.contains(0.0) {
        return Ok(None);
    }
    let candidate = Interval::singleton(m).sub(&fm.div(&deriv));
    Ok(Some(x.intersection(&candidate)))
}

pub struct IntervalNewton {
    funs: Vec<DagFun>,
    scope: Scope,
    rel_tol: f64,
    iter_limit: u32,
    delta: f64,
    chi: f64,
}

impl IntervalNewton {
    pub fn new(funs: Vec<DagFun>, scope: Scope, rel_tol: f64, iter_limit: u32, delta: f64, chi: f64) -> Self {
        IntervalNewton { funs, scope, rel_tol, iter_limit, delta, chi }
    }
}

impl Contractor for IntervalNewton {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn contract(&self, dag: &Dag, box_: &mut IntervalBox) -> ContractorResult<Proof> {
        if self.funs.len() != self.scope.len() {
            // Non-square systems fall back to per-equation HC4-style
            // tightening via the single-variable Newton step above,
            // applied to the first variable of each function.
            for fun in &self.funs {
                if let Some(&v) = fun.scope().ids().first() {
                    if let Some(nx) = newton_step_1var(dag, fun, v, box_)? {
                        if nx.is_empty() {
                            return Ok(Proof::Empty);
                        }
                        box_.set(v, nx).ok();
                    }
                }
            }
            // Each step only certifies its own equation with the other
            // variables held fixed, not the coupled system, so the box as
            // a whole is never more than narrowed here.
            return Ok(Proof::Maybe);
        }

        let inflated = box_.inflate(self.delta, self.chi);
        let mut current = inflated.clone();
        for _ in 0..self.iter_limit {
            let before = current.clone();
            let mid: Vec<f64> = current.midpoint();
            let mut converged = true;
            for (i, fun) in self.funs.iter().enumerate() {
                let v = self.scope.ids()[i];
                let mut mid_box = current.clone();
                for (k, id) in self.scope.ids().iter().enumerate() {
                    mid_box.set(*id, Interval::singleton(mid[k])).ok();
                }
                let vals = dag.interval_eval(|vv| mid_box.get(vv).unwrap_or(Interval::universe()));
                let fm = vals[fun.root()].sub(&fun.image());

                let full_vals = dag.interval_eval(|vv| current.get(vv).unwrap_or(Interval::universe()));
                let adj = dag.interval_diff(fun.root(), &full_vals)?;
                let var_node = match dag.var_node(v) {
                    Some(n) => n,
                    None => continue,
                };
                let jii = adj[var_node];
                if jii.is_empty() || jii.contains(0.0) {
                    continue;
                }
                let mut residual = fm;
                for (k, id) in self.scope.ids().iter().enumerate() {
                    if *id == v {
                        continue;
                    }
                    if let Some(node) = dag.var_node(*id) {
                        let jik = adj[node];
                        let diff = current.get(*id).unwrap_or(Interval::universe()).sub(&Interval::singleton(mid[k]));
                        residual = residual.add(&jik.mul(&diff));
                    }
                }
                let candidate = Interval::singleton(mid[i]).sub(&residual.div(&jii));
                let x = current.get(v).unwrap_or(Interval::empty());
                let new_x = x.intersection(&candidate);
                if new_x.is_empty() {
                    return Ok(Proof::Empty);
                }
                current.set(v, new_x).ok();
            }
            for (a, b) in before.intervals().iter().zip(current.intervals().iter()) {
                let w = a.width();
                if w.is_finite() && w > 0.0 && (w - b.width()) / w > self.rel_tol {
                    converged = false;
                }
            }
            if converged {
                break;
            }
        }

        // Existence/uniqueness certified by containment: if the
        // Gauss-Seidel image falls strictly inside the inflated box on
        // every component, the system has exactly one root in `inflated`.
        let feasible = self
            .scope
            .ids()
            .iter()
            .enumerate()
            .all(|(k, id)| inflated.get(*id).unwrap_or(Interval::empty()).strictly_contains_interval(&current.intervals()[k]));

        for (k, id) in self.scope.ids().iter().enumerate() {
            let before = box_.get(*id).unwrap_or(Interval::empty());
            let after = current.intervals()[k].intersection(&before);
            if after.is_empty() {
                return Ok(Proof::Empty);
            }
            box_.set(*id, after).ok();
        }
        Ok(if feasible { Proof::Feasible } else { Proof::Maybe })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realpaver_dag::{BinOp, UnOp};
    use realpaver_model::Scope;

    #[test]
    fn newton_step_narrows_square_root_equation() {
        // x^2 = 2, x in [1, 2] -> should narrow toward sqrt(2)
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let sq = dag.insert_un(UnOp::Sqr, x).unwrap();
        let two = dag.insert_const(Interval::singleton(2.0));
        let root = dag.insert_bin(BinOp::Sub, sq, two).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0)]);
        let fun = DagFun::new(root, Interval::zero(), scope.clone());
        let mut b = IntervalBox::new(scope.clone(), vec![Interval::new(1.0, 2.0)]).unwrap();
        let nx = newton_step_1var(&dag, &fun, VarId::new(0), &b).unwrap().unwrap();
        b.set(VarId::new(0), nx).ok();
        let after = b.get(VarId::new(0)).unwrap();
        assert!(after.width() < 1.0);
        assert!(after.contains(std::f64::consts::SQRT_2));
    }

    #[test]
    fn square_system_certifies_feasible_on_containment() {
        // x^2 = 2, x in [1.3, 1.5]: well inside the basin of convergence,
        // so the inflated image should land strictly inside the inflated
        // box and certify existence/uniqueness.
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let sq = dag.insert_un(UnOp::Sqr, x).unwrap();
        let two = dag.insert_const(Interval::singleton(2.0));
        let root = dag.insert_bin(BinOp::Sub, sq, two).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0)]);
        let fun = DagFun::new(root, Interval::zero(), scope.clone());
        let contractor = IntervalNewton::new(vec![fun], scope.clone(), 1e-10, 50, 1.125, 0.01);
        let mut b = IntervalBox::new(scope, vec![Interval::new(1.3, 1.5)]).unwrap();
        let proof = contractor.contract(&dag, &mut b).unwrap();
        assert_eq!(proof, Proof::Feasible);
        let after = b.get(VarId::new(0)).unwrap();
        assert!(after.contains(std::f64::consts::SQRT_2));
    }
}
