//! [`Constraint`]: a DAG function plus a relation, and [`ConstraintRelaxor`],
//! which rewrites an equality constraint into a narrow-interval membership
//! constraint for relaxed propagation.

use crate::error::{DagError, DagResult};
use crate::fun::DagFun;
use crate::node::NodeId;
use realpaver_interval::Interval;
use realpaver_model::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
    Lt,
    Ge,
    Gt,
    In,
}

/// A DAG function together with the relation a solution must satisfy.
/// `dag_image` turns the relation into the interval handed to
/// HC4/BC3/BC4/AffineRevise.
///
/// Strict inequalities (`Lt`, `Gt`) are not interval-representable
/// exactly — a rigorous enclosure cannot certify a point lies strictly
/// inside an open set any more tightly than it can for the closed one —
/// so they are treated identically to their non-strict counterparts here,
/// the same relaxation every rigorous interval solver makes.
#[derive(Debug, Clone)]
pub struct Constraint {
    root: NodeId,
    relation: Relation,
    bound: Interval,
    scope: Scope,
}

impl Constraint {
    pub fn new(root: NodeId, relation: Relation, bound: Interval, scope: Scope) -> Self {
        Constraint { root, relation, bound, scope }
    }

    pub fn eq(root: NodeId, scope: Scope) -> Self {
        Constraint::new(root, Relation::Eq, Interval::zero(), scope)
    }

    pub fn le(root: NodeId, scope: Scope) -> Self {
        Constraint::new(root, Relation::Le, Interval::zero(), scope)
    }

    pub fn ge(root: NodeId, scope: Scope) -> Self {
        Constraint::new(root, Relation::Ge, Interval::zero(), scope)
    }

    pub fn in_interval(root: NodeId, bound: Interval, scope: Scope) -> Self {
        Constraint::new(root, Relation::In, bound, scope)
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// The image interval to hand to `DagFun::hc4_revise` and friends.
    pub fn dag_image(&self) -> Interval {
        match self.relation {
            Relation::Eq => Interval::zero(),
            Relation::Le | Relation::Lt => Interval::new(f64::NEG_INFINITY, 0.0),
            Relation::Ge | Relation::Gt => Interval::new(0.0, f64::INFINITY),
            Relation::In => self.bound,
        }
    }

    pub fn to_fun(&self) -> DagFun {
        DagFun::new(self.root, self.dag_image(), self.scope.clone())
    }
}

/// Rewrites an equality constraint `f(x) = 0` into `f(x) ∈ [-ν, ν]` for a
/// relaxation parameter `ν > 0`. Only equality constraints may be relaxed;
/// relaxing an inequality is a logic error here (it would weaken a bound
/// the model actually requires), reported rather than silently ignored.
pub struct ConstraintRelaxor {
    nu: f64,
}

impl ConstraintRelaxor {
    pub fn new(nu: f64) -> DagResult<Self> {
        if nu <= 0.0 {
            return Err(DagError::NonPositiveRelaxation(nu));
        }
        Ok(ConstraintRelaxor { nu })
    }

    pub fn apply(&self, c: &Constraint) -> DagResult<Constraint> {
        if c.relation != Relation::Eq {
            return Err(DagError::RelaxNonEquality);
        }
        Ok(Constraint::new(c.root, Relation::In, Interval::new(-self.nu, self.nu), c.scope.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::Dag;
    use crate::node::BinOp;
    use realpaver_model::VarId;

    #[test]
    fn relaxor_widens_equality_to_interval() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let c = dag.insert_const(Interval::singleton(1.0));
        let root = dag.insert_bin(BinOp::Sub, x, c).unwrap();
        let constraint = Constraint::eq(root, Scope::from_ids(vec![VarId::new(0)]));
        let relaxor = ConstraintRelaxor::new(0.01).unwrap();
        let relaxed = relaxor.apply(&constraint).unwrap();
        assert_eq!(relaxed.dag_image(), Interval::new(-0.01, 0.01));
    }

    #[test]
    fn relaxor_rejects_inequality() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let constraint = Constraint::le(x, Scope::from_ids(vec![VarId::new(0)]));
        let relaxor = ConstraintRelaxor::new(0.01).unwrap();
        assert!(relaxor.apply(&constraint).is_err());
    }
}
