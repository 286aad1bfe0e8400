//! [`NcspSplit`]: selects a variable at a node, slices its domain, and
//! clones the node once per slice.

use crate::context::{Context, NodeInfo};
use crate::node::{NcspNode, NodeIndex};
use crate::selector::Selector;
use realpaver_contractor::DomainSlicer;
use realpaver_model::{DomainBox, Variable};

/// Splits one node into its children along the variable its selector
/// picks out. Owns the node-index counter: every child gets the next
/// unused index, in creation order.
pub struct NcspSplit<S: Selector> {
    selector: S,
    next_index: NodeIndex,
}

impl<S: Selector> NcspSplit<S> {
    pub fn new(selector: S, next_index: NodeIndex) -> Self {
        NcspSplit { selector, next_index }
    }

    fn fresh_index(&mut self) -> NodeIndex {
        let i = self.next_index;
        self.next_index += 1;
        i
    }

    /// `None` when the selector finds nothing left to split (the node is
    /// canonical). Otherwise returns the children, and records the split
    /// variable for `node` in `ctx` so a round-robin selector can resume
    /// from it at the next level.
    pub fn split_one(&mut self, node: &NcspNode, ctx: &mut Context, vars: &[Variable]) -> Option<Vec<NcspNode>> {
        let var = self.selector.select_var(node, ctx, vars)?;
        ctx.insert(node.index(), NodeInfo::SplitVar(var));

        let domain = node.domain_box().get(var).ok()?;
        let slices = DomainSlicer::slice(domain);
        if slices.len() < 2 {
            return None;
        }

        let mut children = Vec::with_capacity(slices.len());
        for slice in slices {
            let mut domains = node.domain_box().domains().to_vec();
            let idx = node.scope().index(var)?;
            domains[idx] = slice;
            let box_ = DomainBox::new(node.scope().clone(), domains).ok()?;
            let index = self.fresh_index();
            children.push(node.child(box_, index));
        }
        Some(children)
    }

    /// Clears every context entry attached to `index`; called once a
    /// node has been split (its annotations no longer apply to any live
    /// node) or discarded.
    pub fn remove_info(&self, ctx: &mut Context, index: NodeIndex) {
        ctx.remove(index);
    }

    pub fn reset(&mut self, next_index: NodeIndex) {
        self.next_index = next_index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Lf;
    use realpaver_interval::Interval;
    use realpaver_model::{Domain, Scope, Tolerance, VarId, VarKind};

    fn vars() -> Vec<Variable> {
        vec![
            Variable::new(VarId::new(0), "x", VarKind::Real, Domain::Interval(Interval::new(0.0, 10.0)), Tolerance::Absolute(1e-8)),
            Variable::new(VarId::new(1), "y", VarKind::Real, Domain::Interval(Interval::new(0.0, 1.0)), Tolerance::Absolute(1e-8)),
        ]
    }

    #[test]
    fn split_one_produces_two_children_with_fresh_indices() {
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let b = DomainBox::new(scope, vec![Domain::Interval(Interval::new(0.0, 10.0)), Domain::Interval(Interval::new(0.0, 1.0))]).unwrap();
        let root = NcspNode::root(b, 0);
        let mut splitter = NcspSplit::new(Lf::new(root.scope().clone()), 1);
        let mut ctx = Context::new();
        let children = splitter.split_one(&root, &mut ctx, &vars()).unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].index(), 1);
        assert_eq!(children[1].index(), 2);
        assert_eq!(children[0].depth(), 1);
        assert_eq!(ctx.split_var(0), Some(VarId::new(0)));
    }

    #[test]
    fn split_one_returns_none_when_canonical() {
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let b = DomainBox::new(scope, vec![Domain::Interval(Interval::singleton(5.0)), Domain::Interval(Interval::singleton(0.5))]).unwrap();
        let root = NcspNode::root(b, 0);
        let mut splitter = NcspSplit::new(Lf::new(root.scope().clone()), 1);
        let mut ctx = Context::new();
        assert!(splitter.split_one(&root, &mut ctx, &vars()).is_none());
    }
}
