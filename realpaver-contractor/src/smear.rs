//! SmearSumRel: a per-variable impact score derived from the interval
//! Jacobian of a function vector, used by ACID's learning phase and by
//! the SSR variable-selection policy. For each function row the
//! row-normalized `|∂f_i/∂x_j| * width(x_j)` is summed down its column.

use realpaver_dag::{Dag, DagFun};
use realpaver_interval::Interval;
use realpaver_model::{IntervalBox, Scope, VarId};

pub struct SmearSumRel {
    funs: Vec<DagFun>,
    scope: Scope,
}

impl SmearSumRel {
    pub fn new(funs: Vec<DagFun>, scope: Scope) -> Self {
        SmearSumRel { funs, scope }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Per-variable score, in the same order as `self.scope().ids()`.
    pub fn scores(&self, dag: &Dag, box_: &IntervalBox) -> Vec<f64> {
        let vals = dag.interval_eval(|v| box_.get(v).unwrap_or(Interval::universe()));
        let mut totals = vec![0.0; self.scope.len()];
        for fun in &self.funs {
            let adj = match dag.interval_diff(fun.root(), &vals) {
                Ok(a) => a,
                Err(_) => continue,
            };
            let mut row = vec![0.0; self.scope.len()];
            let mut row_sum = 0.0;
            for (k, v) in self.scope.ids().iter().enumerate() {
                let node = match dag.var_node(*v) {
                    Some(n) => n,
                    None => continue,
                };
                let width = box_.get(*v).unwrap_or(Interval::empty()).width();
                if !width.is_finite() {
                    continue;
                }
                let smear = adj[node].mag() * width;
                row[k] = smear;
                row_sum += smear;
            }
            if row_sum > 0.0 {
                for k in 0..row.len() {
                    totals[k] += row[k] / row_sum;
                }
            }
        }
        totals
    }

    /// Variables in descending score order, ties broken by scope order.
    pub fn ranked_vars(&self, dag: &Dag, box_: &IntervalBox) -> Vec<VarId> {
        let scores = self.scores(dag, box_);
        let mut idx: Vec<usize> = (0..self.scope.len()).collect();
        idx.sort_by(|&a, &b| scores[b].partial_cmp(&scores[a]).unwrap_or(std::cmp::Ordering::Equal));
        idx.into_iter().map(|i| self.scope.ids()[i]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realpaver_dag::{BinOp, UnOp};

    #[test]
    fn smear_prefers_variable_with_larger_impact() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let y = dag.insert_var(VarId::new(1));
        let x2 = dag.insert_un(UnOp::Sqr, x).unwrap();
        let root = dag.insert_bin(BinOp::Add, x2, y).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let fun = DagFun::new(root, Interval::zero(), scope.clone());
        let ssr = SmearSumRel::new(vec![fun], scope.clone());
        let b = IntervalBox::new(scope, vec![Interval::new(5.0, 6.0), Interval::new(0.0, 0.01)]).unwrap();
        let ranked = ssr.ranked_vars(&dag, &b);
        assert_eq!(ranked[0], VarId::new(0));
    }
}
