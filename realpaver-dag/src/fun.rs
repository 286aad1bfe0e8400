//! [`DagFun`]: a root node, the image interval a constraint requires of
//! it, and the scope of variables it depends on; plus [`DagFun::hc4_revise`],
//! reverse propagation through the subtree rooted there.

use crate::dag::Dag;
use crate::error::DagResult;
use crate::node::{BinOp, NodeId, NodeKind, UnOp};
use realpaver_interval::Interval;
use realpaver_model::{IntervalBox, Scope, VarId};

/// Proof certificate produced by contraction. Ordered
/// `Empty < Maybe < Feasible <= Inner`: `Empty` means the box is
/// infeasible, `Maybe` means contraction made progress but proved
/// nothing, `Feasible` certifies at least one point is a solution,
/// `Inner` certifies every point in the box is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Proof {
    Empty,
    Maybe,
    Feasible,
    Inner,
}

impl Proof {
    pub fn merge(self, other: Proof) -> Proof {
        if self == Proof::Empty || other == Proof::Empty {
            Proof::Empty
        } else {
            self.max(other)
        }
    }
}

#[derive(Debug, Clone)]
pub struct DagFun {
    root: NodeId,
    image: Interval,
    scope: Scope,
}

impl DagFun {
    pub fn new(root: NodeId, image: Interval, scope: Scope) -> Self {
        DagFun { root, image, scope }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn image(&self) -> Interval {
        self.image
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Forward-evaluates this function over `box_` (not reduced to the
    /// image — the raw interval of the expression tree at the root).
    pub fn eval(&self, dag: &Dag, box_: &IntervalBox) -> Interval {
        let vals = dag.interval_eval(|v| box_.get(v).unwrap_or(Interval::universe()));
        vals[self.root]
    }

    /// Reverse (HC4-Revise) propagation: evaluates forward, intersects the
    /// root with `image`, then walks back down the subtree tightening
    /// every node (and therefore every variable domain) consistent with
    /// that root value, writing the result into `box_`.
    pub fn hc4_revise(&self, dag: &Dag, box_: &mut IntervalBox) -> DagResult<Proof> {
        let mut vals = dag.interval_eval(|v| box_.get(v).unwrap_or(Interval::universe()));
        let forward = vals[self.root];
        if forward.is_empty() {
            return Ok(Proof::Empty);
        }
        let inner = self.image.contains_interval(&forward);
        let tightened_root = forward.intersection(&self.image);
        if tightened_root.is_empty() {
            return Ok(Proof::Empty);
        }
        vals[self.root] = tightened_root;

        for id in (0..=self.root).rev() {
            let z = vals[id];
            if z.is_empty() {
                return Ok(Proof::Empty);
            }
            let kind = dag.node(id)?.kind.clone();
            match kind {
                NodeKind::Const(_) | NodeKind::Var(_) => {}
                NodeKind::Bin(op, a, b) => {
                    let (x, y) = (vals[a], vals[b]);
                    let (nx, ny) = proj_bin(op, x, y, z);
                    vals[a] = x.intersection(&nx);
                    vals[b] = y.intersection(&ny);
                    if vals[a].is_empty() || vals[b].is_empty() {
                        return Ok(Proof::Empty);
                    }
                }
                NodeKind::Un(op, a) => {
                    let x = vals[a];
                    let nx = proj_un(op, x, z);
                    vals[a] = x.intersection(&nx);
                    if vals[a].is_empty() {
                        return Ok(Proof::Empty);
                    }
                }
                NodeKind::Pow(a, e) => {
                    // No general n-th-root projection; narrowing here is
                    // sound-but-absent rather than incorrect. Squares
                    // (e == 2) are rewritten through Sqr at construction
                    // time in practice, so this mainly affects odd or
                    // high-degree exponents.
                    let _ = (a, e, z);
                }
                NodeKind::Lin(cst, terms) => {
                    for i in 0..terms.len() {
                        let (ci, ni) = terms[i];
                        if ci.lo() == 0.0 && ci.hi() == 0.0 {
                            continue;
                        }
                        let mut residual = z.sub(&cst);
                        for (j, (cj, nj)) in terms.iter().enumerate() {
                            if j != i {
                                residual = residual.sub(&cj.mul(&vals[*nj]));
                            }
                        }
                        let projected = residual.div(&ci);
                        vals[ni] = vals[ni].intersection(&projected);
                        if vals[ni].is_empty() {
                            return Ok(Proof::Empty);
                        }
                    }
                }
            }
        }

        for v in self.scope.iter() {
            if let Some(id) = dag.var_node(v) {
                box_.set(v, box_.get(v).unwrap_or(Interval::universe()).intersection(&vals[id]))
                    .ok();
            }
        }

        Ok(if inner { Proof::Inner } else { Proof::Maybe })
    }
}

fn proj_bin(op: BinOp, x: Interval, y: Interval, z: Interval) -> (Interval, Interval) {
    match op {
        BinOp::Add => (Interval::add_px(&x, &y, &z), Interval::add_py(&x, &y, &z)),
        BinOp::Sub => (Interval::sub_px(&x, &y, &z), Interval::sub_py(&x, &y, &z)),
        BinOp::Mul => (Interval::mul_px(&x, &y, &z), Interval::mul_py(&x, &y, &z)),
        BinOp::Div => (Interval::div_px(&x, &y, &z), Interval::div_py(&x, &y, &z)),
        BinOp::Min => (Interval::min_px(&x, &y, &z), Interval::min_py(&x, &y, &z)),
        BinOp::Max => (Interval::max_px(&x, &y, &z), Interval::max_py(&x, &y, &z)),
    }
}

fn proj_un(op: UnOp, x: Interval, z: Interval) -> Interval {
    match op {
        UnOp::Usb => x.intersection(&z.neg()),
        UnOp::Abs => Interval::abs_px(&x, &z),
        UnOp::Sgn => Interval::sgn_px(&x, &z),
        UnOp::Sqr => Interval::sqr_px(&x, &z),
        UnOp::Sqrt => x.intersection(&z.sqr()),
        UnOp::Exp => x.intersection(&z.log()),
        UnOp::Log => x.intersection(&z.exp()),
        // Trigonometric/hyperbolic projections are multi-valued in
        // general; only the hyperbolic ones (strictly monotone) invert
        // cleanly. The circular functions fall back to "no narrowing",
        // which is sound.
        UnOp::Sinh => x.intersection(&asinh(&z)),
        UnOp::Cosh => x,
        UnOp::Tanh => x.intersection(&atanh(&z)),
        UnOp::Sin | UnOp::Cos | UnOp::Tan => x,
    }
}

fn asinh(z: &Interval) -> Interval {
    if z.is_empty() {
        return Interval::empty();
    }
    Interval::new((z.lo() + (z.lo() * z.lo() + 1.0).sqrt()).ln(), (z.hi() + (z.hi() * z.hi() + 1.0).sqrt()).ln())
}

fn atanh(z: &Interval) -> Interval {
    if z.is_empty() {
        return Interval::empty();
    }
    let c = z.intersection(&Interval::new(-0.999999999, 0.999999999));
    if c.is_empty() {
        return Interval::universe();
    }
    Interval::new(0.5 * ((1.0 + c.lo()) / (1.0 - c.lo())).ln(), 0.5 * ((1.0 + c.hi()) / (1.0 - c.hi())).ln())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::Dag;
    use crate::node::BinOp;
    use realpaver_model::Scope;

    #[test]
    fn hc4_on_sum_constraint_tightens_both_variables() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let y = dag.insert_var(VarId::new(1));
        let root = dag.insert_bin(BinOp::Add, x, y).unwrap();
        let fun = DagFun::new(root, Interval::singleton(1.0), Scope::from_ids(vec![VarId::new(0), VarId::new(1)]));

        let mut b = IntervalBox::new(
            Scope::from_ids(vec![VarId::new(0), VarId::new(1)]),
            vec![Interval::new(0.6, 1.0), Interval::new(0.0, 1.0)],
        )
        .unwrap();
        let proof = fun.hc4_revise(&dag, &mut b).unwrap();
        assert_ne!(proof, Proof::Empty);
        assert_eq!(b.get(VarId::new(1)).unwrap(), Interval::new(0.0, 0.4));
    }

    #[test]
    fn hc4_detects_infeasibility() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let c = dag.insert_const(Interval::singleton(10.0));
        let root = dag.insert_bin(BinOp::Add, x, c).unwrap();
        let fun = DagFun::new(root, Interval::singleton(0.0), Scope::from_ids(vec![VarId::new(0)]));
        let mut b = IntervalBox::new(Scope::from_ids(vec![VarId::new(0)]), vec![Interval::new(0.0, 1.0)]).unwrap();
        let proof = fun.hc4_revise(&dag, &mut b).unwrap();
        assert_eq!(proof, Proof::Empty);
    }
}
