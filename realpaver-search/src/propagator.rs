//! Propagator wrappers: round-trip a node's [`DomainBox`] through the
//! [`IntervalBox`] representation a [`Contractor`] operates on, so the
//! branch-and-prune driver never has to know about that conversion.

use crate::node::NcspNode;
use realpaver_contractor::{Acid, Contractor, ContractorFactory, ContractorResult};
use realpaver_dag::{Dag, Proof};

/// Reads `node`'s domain box as an interval box, contracts it with
/// `op`, and writes the result back, hull-intersecting each variable's
/// (possibly disconnected) domain with its contracted interval.
fn contract_node(dag: &Dag, op: &dyn Contractor, node: &mut NcspNode) -> ContractorResult<Proof> {
    let mut ibox = node.domain_box().to_interval_box();
    let proof = op.contract(dag, &mut ibox)?;
    if proof == Proof::Empty {
        return Ok(Proof::Empty);
    }
    let domain_box = node.domain_box_mut();
    for &v in op.scope().ids() {
        if let (Ok(d), Ok(i)) = (domain_box.get_mut(v), ibox.get(v)) {
            d.contract_to_hull(&i);
        }
    }
    Ok(proof)
}

/// HC4 propagation over a node, built once from a [`ContractorFactory`]
/// and reused across every node it visits.
pub struct NcspHC4 {
    op: realpaver_contractor::Propag,
}

impl NcspHC4 {
    pub fn new(factory: &ContractorFactory) -> Self {
        NcspHC4 { op: factory.make_hc4() }
    }

    pub fn contract(&self, dag: &Dag, node: &mut NcspNode) -> ContractorResult<Proof> {
        contract_node(dag, &self.op, node)
    }
}

/// HC4 followed by interval Newton when the equation system is square.
pub struct NcspHC4Newton {
    op: Box<dyn Contractor>,
}

impl NcspHC4Newton {
    pub fn new(factory: &ContractorFactory) -> Self {
        NcspHC4Newton { op: factory.make_hc4_newton() }
    }

    pub fn contract(&self, dag: &Dag, node: &mut NcspNode) -> ContractorResult<Proof> {
        contract_node(dag, self.op.as_ref(), node)
    }
}

/// ACID propagation over a node.
pub struct NcspACID {
    op: Acid,
}

impl NcspACID {
    pub fn new(factory: &ContractorFactory) -> ContractorResult<Self> {
        Ok(NcspACID { op: factory.make_acid()? })
    }

    pub fn contract(&self, dag: &Dag, node: &mut NcspNode) -> ContractorResult<Proof> {
        contract_node(dag, &self.op, node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realpaver_contractor::Params;
    use realpaver_dag::{BinOp, Constraint};
    use realpaver_interval::Interval;
    use realpaver_model::{Domain, DomainBox, Scope, VarId};

    fn sum_and_product() -> (Dag, Vec<Constraint>, Scope) {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let y = dag.insert_var(VarId::new(1));
        let sum = dag.insert_bin(BinOp::Add, x, y).unwrap();
        let prod = dag.insert_bin(BinOp::Mul, x, y).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let c1 = Constraint::eq(sum, scope.clone());
        let c2 = Constraint::eq(prod, scope.clone());
        (dag, vec![c1, c2], scope)
    }

    #[test]
    fn hc4_contracts_node_domain_box() {
        let (dag, constraints, scope) = sum_and_product();
        let factory = ContractorFactory::new(&dag, &constraints, vec![], Params::default());
        let hc4 = NcspHC4::new(&factory);
        let b = DomainBox::new(scope, vec![Domain::Interval(Interval::new(-1.0, 3.0)), Domain::Interval(Interval::new(-1.0, 3.0))]).unwrap();
        let mut node = NcspNode::root(b, 0);
        let proof = hc4.contract(&dag, &mut node).unwrap();
        assert_ne!(proof, Proof::Empty);
    }
}
