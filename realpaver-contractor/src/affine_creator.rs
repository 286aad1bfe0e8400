//! [`AffineCreator`]: builds an [`AffineForm`] for a DAG node over a box,
//! and [`AffineRevise`]: a contractor that uses the resulting form to
//! tighten variable domains from the constant-term balance.

use crate::contractor::Contractor;
use crate::error::ContractorResult;
use realpaver_dag::{BinOp, Dag, DagFun, NodeKind, Proof, UnOp};
use realpaver_interval::{AffineForm, Interval};
use realpaver_model::{IntervalBox, Scope, VarId};
use rustc_hash::FxHashMap;

/// Builds one affine form per DAG node over a box, bottom-up, caching by
/// node index so a shared sub-expression is linearized once.
pub struct AffineCreator<'a> {
    dag: &'a Dag,
    cache: FxHashMap<usize, AffineForm>,
}

impl<'a> AffineCreator<'a> {
    pub fn new(dag: &'a Dag) -> Self {
        AffineCreator { dag, cache: FxHashMap::default() }
    }

    /// Returns the affine form of `root` over `box_`. Each variable node
    /// is seeded from its own noise index (the raw variable id), so the
    /// same variable contributes the same noise symbol everywhere it
    /// occurs in the DAG and correlations across occurrences survive.
    pub fn build(&mut self, root: usize, box_: &IntervalBox) -> ContractorResult<AffineForm> {
        self.build_rec(root, box_)
    }

    fn build_rec(&mut self, id: usize, box_: &IntervalBox) -> ContractorResult<AffineForm> {
        if let Some(f) = self.cache.get(&id) {
            return Ok(f.clone());
        }
        let node = self.dag.node(id)?;
        let form = match &node.kind {
            NodeKind::Const(c) => AffineForm::constant(*c),
            NodeKind::Var(v) => {
                let x = box_.get(*v).unwrap_or(Interval::universe());
                AffineForm::from_variable(v.raw(), x)
            }
            NodeKind::Bin(op, a, b) => {
                let (a, b) = (*a, *b);
                let fa = self.build_rec(a, box_)?;
                let fb = self.build_rec(b, box_)?;
                match op {
                    BinOp::Add => fa.add(&fb),
                    BinOp::Sub => fa.sub(&fb),
                    BinOp::Mul => fa.mul(&fb),
                    BinOp::Div => fa.div(&fb),
                    BinOp::Min => fa.min(&fb),
                    BinOp::Max => fa.max(&fb),
                }
            }
            NodeKind::Un(op, a) => {
                let a = *a;
                let fa = self.build_rec(a, box_)?;
                match op {
                    UnOp::Usb => fa.neg(),
                    UnOp::Abs => fa.abs(),
                    UnOp::Sgn => fa.sgn(),
                    UnOp::Sqr => fa.sqr(),
                    UnOp::Sqrt => fa.sqrt(),
                    UnOp::Exp => fa.exp(),
                    UnOp::Log => fa.log(),
                    UnOp::Cos => fa.cos(),
                    UnOp::Sin => fa.sin(),
                    UnOp::Tan => fa.tan(),
                    UnOp::Cosh => fa.cosh(),
                    UnOp::Sinh => fa.sinh(),
                    UnOp::Tanh => fa.tanh(),
                }
            }
            NodeKind::Pow(a, e) => {
                let (a, e) = (*a, *e);
                let fa = self.build_rec(a, box_)?;
                fa.pow(e)
            }
            NodeKind::Lin(cst, terms) => {
                let mut acc = AffineForm::constant(*cst);
                for (c, n) in terms.clone() {
                    let fn_ = self.build_rec(n, box_)?;
                    acc = acc.add(&fn_.scale(c));
                }
                acc
            }
        };
        self.cache.insert(id, form.clone());
        Ok(form)
    }
}

/// A contractor that linearizes `f` over the box and derives per-variable
/// tightenings from the affine constant-term balance: `a0 + e·[-1,1] +
/// Σ L_i·[-1,1] ⊆ image` forces each noise term's interval toward
/// `(image - a0 - e·[-1,1] - Σ_{j≠i} L_j·[-1,1]) / L_i`, intersected back
/// into the variable's current interval.
pub struct AffineRevise {
    fun: DagFun,
}

impl AffineRevise {
    pub fn new(fun: DagFun) -> Self {
        AffineRevise { fun }
    }
}

impl Contractor for AffineRevise {
    fn scope(&self) -> &Scope {
        self.fun.scope()
    }

    fn contract(&self, dag: &Dag, box_: &mut IntervalBox) -> ContractorResult<Proof> {
        let mut creator = AffineCreator::new(dag);
        let form = creator.build(self.fun.root(), box_)?;
        if form.is_empty() {
            return Ok(Proof::Empty);
        }
        let whole = form.eval();
        if whole.disjoint(&self.fun.image()) {
            return Ok(Proof::Empty);
        }
        let inner = self.fun.image().contains_interval(&whole);
        if form.is_inf() {
            return Ok(if inner { Proof::Inner } else { Proof::Maybe });
        }

        let noise_unit = Interval::new(-1.0, 1.0);
        let linear = form.linear_terms();
        for i in 0..linear.len() {
            let (coef_i, idx_i) = linear[i];
            if coef_i.lo() == 0.0 && coef_i.hi() == 0.0 {
                continue;
            }
            let v = VarId::new(idx_i);
            if !self.fun.scope().contains(v) {
                continue;
            }
            let mut residual = self.fun.image().sub(&form.constant_term());
            residual = residual.sub(&form.error_term().mul(&noise_unit));
            for (j, &(coef_j, idx_j)) in linear.iter().enumerate() {
                if j == i {
                    continue;
                }
                let xj = box_.get(VarId::new(idx_j)).unwrap_or(Interval::universe());
                let ej = noise_of(xj);
                residual = residual.sub(&coef_j.mul(&ej));
            }
            let projected_noise = residual.div(&coef_i).intersection(&noise_unit);
            if projected_noise.is_empty() {
                return Ok(Proof::Empty);
            }
            let xi = box_.get(v).unwrap_or(Interval::universe());
            let (c, r) = (xi.midpoint(), xi.width() / 2.0);
            let new_xi = xi.intersection(&Interval::new(c + r * projected_noise.lo(), c + r * projected_noise.hi()));
            if new_xi.is_empty() {
                return Ok(Proof::Empty);
            }
            box_.set(v, new_xi).ok();
        }

        Ok(if inner { Proof::Inner } else { Proof::Maybe })
    }
}

/// The noise value `e ∈ [-1, 1]` an interval `x` corresponds to under the
/// centered representation `x = c + r·e`; the full `[-1, 1]` range since
/// the affine form has already fixed `c, r` at construction time and `x`
/// here is the current (possibly tighter) domain.
fn noise_of(_x: Interval) -> Interval {
    Interval::new(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use realpaver_dag::{BinOp, Constraint};
    use realpaver_model::Scope;

    #[test]
    fn affine_revise_on_linear_equation_matches_hc4() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let y = dag.insert_var(VarId::new(1));
        let root = dag.insert_bin(BinOp::Add, x, y).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let constraint = Constraint::eq(root, scope.clone());
        let contractor = AffineRevise::new(constraint.to_fun());
        let mut b = IntervalBox::new(scope, vec![Interval::new(0.6, 1.0), Interval::new(0.0, 1.0)]).unwrap();
        let proof = contractor.contract(&dag, &mut b).unwrap();
        assert_ne!(proof, Proof::Empty);
    }

    #[test]
    fn affine_revise_detects_infeasibility() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let c = dag.insert_const(Interval::singleton(10.0));
        let root = dag.insert_bin(BinOp::Add, x, c).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0)]);
        let constraint = Constraint::eq(root, scope.clone());
        let contractor = AffineRevise::new(constraint.to_fun());
        let mut b = IntervalBox::new(scope, vec![Interval::new(0.0, 1.0)]).unwrap();
        let proof = contractor.contract(&dag, &mut b).unwrap();
        assert_eq!(proof, Proof::Empty);
    }
}
