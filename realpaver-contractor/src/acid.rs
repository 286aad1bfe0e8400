//! ACID: adaptive CID. Alternates a learning phase, which applies
//! variable-level 3BCID in SmearSumRel impact order and tracks how many
//! of them made a significant difference, with an exploitation phase
//! that applies exactly that many next cycle.

use crate::cid::Var3BCid;
use crate::contractor::Contractor;
use crate::error::ContractorResult;
use crate::smear::SmearSumRel;
use realpaver_dag::{Dag, Proof};
use realpaver_model::{IntervalBox, Scope};

pub struct Acid {
    ssr: SmearSumRel,
    fallback: Box<dyn Contractor>,
    var3bcid: Vec<Var3BCid>,
    learn_length: usize,
    cycle_length: usize,
    ct_ratio: f64,
    num_var_cid: std::cell::Cell<usize>,
    call: std::cell::Cell<usize>,
    k_var_cid: std::cell::RefCell<Vec<usize>>,
}

impl Acid {
    /// `var3bcid` must have one entry per variable of `ssr.scope()`, in
    /// the same order as `ssr.scope().ids()`. `fallback` runs when a
    /// learned `numVarCID` of zero means no variable-level contractor is
    /// worth its cost (plain HC4/propagation, typically).
    pub fn new(
        ssr: SmearSumRel,
        fallback: Box<dyn Contractor>,
        var3bcid: Vec<Var3BCid>,
        learn_length: usize,
        cycle_length: usize,
        ct_ratio: f64,
    ) -> ContractorResult<Self> {
        if var3bcid.len() != ssr.scope().len() {
            return Err(crate::error::ContractorError::EmptyScope);
        }
        let n = var3bcid.len();
        Ok(Acid {
            ssr,
            fallback,
            var3bcid,
            learn_length,
            cycle_length,
            ct_ratio,
            num_var_cid: std::cell::Cell::new(n),
            call: std::cell::Cell::new(0),
            k_var_cid: std::cell::RefCell::new(vec![0; learn_length]),
        })
    }

    fn last_significant_gain(gains: &[f64], ratio: f64) -> usize {
        let mut i = gains.len();
        while i > 0 && gains[i - 1] <= ratio {
            i -= 1;
        }
        i
    }

    fn avg_num_var_cid(values: &[usize]) -> usize {
        let sum: usize = values.iter().sum();
        let avg = sum as f64 / values.len() as f64;
        let f = avg.floor();
        let d = avg - f;
        (if d <= 0.5 { f } else { f + 1.0 }) as usize
    }
}

impl Contractor for Acid {
    fn scope(&self) -> &Scope {
        self.ssr.scope()
    }

    fn contract(&self, dag: &Dag, box_: &mut IntervalBox) -> ContractorResult<Proof> {
        let ranked = self.ssr.ranked_vars(dag, box_);
        let n = self.var3bcid.len();
        let mcall = self.call.get() % self.cycle_length;
        let mut proof = Proof::Maybe;

        if mcall < self.learn_length {
            let n_var_cid = (2 * self.num_var_cid.get()).max(2);
            let mut gains = Vec::with_capacity(n_var_cid);
            let mut i = 0usize;
            while proof != Proof::Empty && i < n_var_cid {
                let save = box_.clone();
                let v = ranked[i % n];
                let k = self.ssr.scope().index(v).unwrap();
                proof = self.var3bcid[k].contract(dag, box_)?;
                if proof != Proof::Empty {
                    gains.push(box_.gain_ratio(&save));
                    i += 1;
                }
            }

            let learned = if proof == Proof::Empty { i + 1 } else { Self::last_significant_gain(&gains, self.ct_ratio) };
            self.k_var_cid.borrow_mut()[mcall] = learned;

            if mcall == self.learn_length - 1 {
                self.num_var_cid.set(Self::avg_num_var_cid(&self.k_var_cid.borrow()));
            }
        } else if self.num_var_cid.get() == 0 {
            proof = self.fallback.contract(dag, box_)?;
        } else {
            let mut i = 0usize;
            while proof != Proof::Empty && i < self.num_var_cid.get() {
                let v = ranked[i % n];
                let k = self.ssr.scope().index(v).unwrap();
                proof = self.var3bcid[k].contract(dag, box_)?;
                i += 1;
            }
        }

        self.call.set(self.call.get() + 1);
        Ok(proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cid::ThreeBCid;
    use crate::hc4::Hc4;
    use crate::slicer::IntervalSlicer;
    use realpaver_dag::{BinOp, Constraint, DagFun, UnOp};
    use realpaver_interval::Interval;
    use realpaver_model::VarId;

    fn build() -> (Dag, Scope, DagFun) {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let y = dag.insert_var(VarId::new(1));
        let x2 = dag.insert_un(UnOp::Sqr, x).unwrap();
        let root = dag.insert_bin(BinOp::Add, x2, y).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let constraint = Constraint::eq(root, scope.clone());
        (dag, scope, constraint.to_fun())
    }

    #[test]
    fn acid_applies_learned_number_of_contractors_without_empty() {
        let (dag, scope, fun) = build();
        let ssr = SmearSumRel::new(vec![fun.clone()], scope.clone());
        let fallback: Box<dyn Contractor> = Box::new(Hc4::new(fun.clone()));
        let var3bcid: Vec<Var3BCid> = scope
            .ids()
            .iter()
            .map(|&v| {
                ThreeBCid::new(
                    Box::new(Hc4::new(fun.clone())),
                    Box::new(Hc4::new(fun.clone())),
                    v,
                    IntervalSlicer::Partition { n: 4 },
                    IntervalSlicer::Partition { n: 4 },
                )
            })
            .collect();
        let acid = Acid::new(ssr, fallback, var3bcid, 2, 4, 0.01).unwrap();
        let mut b = IntervalBox::new(scope, vec![Interval::new(-3.0, 3.0), Interval::new(-9.0, 9.0)]).unwrap();
        for _ in 0..6 {
            let proof = acid.contract(&dag, &mut b).unwrap();
            assert_ne!(proof, Proof::Empty);
        }
    }
}
