//! BC3-Revise: box consistency for one variable of a function, found by
//! alternating peeling (ratio-based shaving from each end) with a
//! single-variable interval-Newton step on what peeling leaves behind.

use crate::error::ContractorResult;
use crate::newton::newton_step_1var;
use realpaver_dag::{Dag, DagFun, Proof};
use realpaver_interval::Interval;
use realpaver_model::{IntervalBox, VarId};

/// One BC3-Revise instance narrows a single variable `v` of a single
/// function `fun`. `peel_percent` must be in `(0, 100)`; `iter_limit`
/// bounds the peel/Newton alternation per bound.
pub struct Bc3Revise {
    fun: DagFun,
    var: VarId,
    peel_percent: f64,
    iter_limit: u32,
}

impl Bc3Revise {
    pub fn new(fun: DagFun, var: VarId, peel_percent: f64, iter_limit: u32) -> Self {
        Bc3Revise { fun, var, peel_percent, iter_limit }
    }

    pub fn var(&self) -> VarId {
        self.var
    }

    pub fn fun(&self) -> &DagFun {
        &self.fun
    }

    fn eval_at(&self, dag: &Dag, box_: &IntervalBox, x: Interval) -> ContractorResult<Interval> {
        let mut probe = box_.clone();
        probe.set(self.var, x).ok();
        Ok(self.fun.eval(dag, &probe))
    }

    fn is_consistent(&self, dag: &Dag, box_: &IntervalBox, x: Interval) -> ContractorResult<Proof> {
        let e = self.eval_at(dag, box_, x)?;
        let image = self.fun.image();
        if e.is_empty() {
            Ok(Proof::Empty)
        } else if !e.overlaps(&image) {
            Ok(Proof::Empty)
        } else if image.contains_interval(&e) {
            Ok(Proof::Inner)
        } else {
            Ok(Proof::Maybe)
        }
    }

    fn peel_left(&self, x: Interval) -> (Interval, Interval) {
        let w = x.width() * (self.peel_percent / 100.0);
        let b = Interval::new(x.lo(), x.lo() + w);
        (b, Interval::new(b.hi(), x.hi()))
    }

    fn peel_right(&self, x: Interval) -> (Interval, Interval) {
        let w = x.width() * (self.peel_percent / 100.0);
        let b = Interval::new(x.hi() - w, x.hi());
        (b, Interval::new(x.lo(), b.lo()))
    }

    /// Shrinks towards `left` (`leftward = true`) or `right`: peel the
    /// outermost slice, test it for consistency, and if inconsistent run
    /// a Newton step on the remainder, splitting in two and continuing
    /// whenever the step makes no further progress.
    fn shrink(
        &self,
        dag: &Dag,
        box_: &IntervalBox,
        x: Interval,
        leftward: bool,
    ) -> ContractorResult<(Proof, Interval)> {
        let mut stack = vec![x];
        let mut iters = 0u32;
        while let Some(y) = stack.pop() {
            if y.is_empty() {
                continue;
            }
            iters += 1;
            if iters > self.iter_limit {
                return Ok((Proof::Maybe, y));
            }
            let (b, rest) = if leftward { self.peel_left(y) } else { self.peel_right(y) };
            let proof = self.is_consistent(dag, box_, b)?;
            if proof != Proof::Empty {
                return Ok((proof, b));
            }

            let mut probe = box_.clone();
            probe.set(self.var, rest).ok();
            match newton_step_1var(dag, &self.fun, self.var, &probe)? {
                None => {
                    // No derivative information: fall back to bisection.
                    if rest.is_singleton() {
                        continue;
                    }
                    let m = rest.midpoint();
                    if leftward {
                        stack.push(Interval::new(m, rest.hi()));
                        stack.push(Interval::new(rest.lo(), m));
                    } else {
                        stack.push(Interval::new(rest.lo(), m));
                        stack.push(Interval::new(m, rest.hi()));
                    }
                }
                Some(z) if z.is_empty() => continue,
                Some(z) => {
                    if z.strictly_contains_interval(&rest) || z == rest {
                        // No progress: report the Newton-narrowed piece.
                        return Ok((Proof::Maybe, z));
                    }
                    if rest.strictly_contains_interval(&z) {
                        // Existence/uniqueness certified by containment.
                        return Ok((Proof::Feasible, z));
                    }
                    if z.is_singleton() {
                        continue;
                    }
                    let m = z.midpoint();
                    if leftward {
                        stack.push(Interval::new(m, z.hi()));
                        stack.push(Interval::new(z.lo(), m));
                    } else {
                        stack.push(Interval::new(z.lo(), m));
                        stack.push(Interval::new(m, z.hi()));
                    }
                }
            }
        }
        Ok((Proof::Empty, Interval::empty()))
    }

    pub fn contract(&self, dag: &Dag, box_: &mut IntervalBox) -> ContractorResult<Proof> {
        let x = box_.get(self.var).unwrap_or(Interval::empty());
        if x.is_empty() {
            return Ok(Proof::Empty);
        }
        let e = self.fun.eval(dag, box_);
        if e.is_empty() {
            return Ok(Proof::Empty);
        }
        if !e.overlaps(&self.fun.image()) {
            return Ok(Proof::Empty);
        }
        if self.fun.image().contains_interval(&e) {
            return Ok(Proof::Inner);
        }

        let (left_proof, lsol) = self.shrink(dag, box_, x, true)?;
        if left_proof == Proof::Empty {
            return Ok(Proof::Empty);
        }

        let y = Interval::new(lsol.lo(), x.hi());
        let (right_proof, rsol) = self.shrink(dag, box_, y, false)?;
        if right_proof == Proof::Empty {
            return Ok(Proof::Empty);
        }

        let result = lsol.hull(&rsol);
        if result.is_empty() {
            return Ok(Proof::Empty);
        }
        box_.set(self.var, x.intersection(&result)).ok();
        Ok(left_proof.max(right_proof))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realpaver_dag::{BinOp, UnOp};
    use realpaver_model::Scope;

    #[test]
    fn bc3_narrows_x_squared_equals_one() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let sq = dag.insert_un(UnOp::Sqr, x).unwrap();
        let one = dag.insert_const(Interval::singleton(1.0));
        let root = dag.insert_bin(BinOp::Sub, sq, one).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0)]);
        let fun = DagFun::new(root, Interval::zero(), scope.clone());
        let bc3 = Bc3Revise::new(fun, VarId::new(0), 10.0, 50);
        let mut b = IntervalBox::new(scope, vec![Interval::new(0.5, 1.5)]).unwrap();
        let proof = bc3.contract(&dag, &mut b).unwrap();
        assert_ne!(proof, Proof::Empty);
        let after = b.get(VarId::new(0)).unwrap();
        assert!(after.contains(1.0));
        assert!(after.width() < 1.0);
    }

    #[test]
    fn bc3_detects_infeasible_equation() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let sq = dag.insert_un(UnOp::Sqr, x).unwrap();
        let four = dag.insert_const(Interval::singleton(4.0));
        let root = dag.insert_bin(BinOp::Add, sq, four).unwrap();
        // x^2 + 4 = 0 has no real solution
        let scope = Scope::from_ids(vec![VarId::new(0)]);
        let fun = DagFun::new(root, Interval::zero(), scope.clone());
        let bc3 = Bc3Revise::new(fun, VarId::new(0), 10.0, 50);
        let mut b = IntervalBox::new(scope, vec![Interval::new(-3.0, 3.0)]).unwrap();
        let proof = bc3.contract(&dag, &mut b).unwrap();
        assert_eq!(proof, Proof::Empty);
    }
}
