//! [`NcspNode`]: a search node of the branch-and-prune driver. A node
//! owns a domain box and knows its place in the search tree; selected
//! split variables and CID counts live in the [`crate::context::Context`]
//! side-table, not on the node itself.

use realpaver_dag::Proof;
use realpaver_model::{DomainBox, Scope};

/// Monotonically increasing identifier assigned when a node is created.
pub type NodeIndex = u64;

#[derive(Debug, Clone)]
pub struct NcspNode {
    scope: Scope,
    domain_box: DomainBox,
    depth: u32,
    index: NodeIndex,
    parent: Option<NodeIndex>,
    proof: Proof,
}

impl NcspNode {
    /// The root node: the scope's initial declared domains, depth 0, no
    /// parent. `index` is assigned by whoever owns the node counter
    /// (typically a [`crate::space::SearchSpace`]).
    pub fn root(domain_box: DomainBox, index: NodeIndex) -> Self {
        let scope = domain_box.scope().clone();
        NcspNode { scope, domain_box, depth: 0, index, parent: None, proof: Proof::Maybe }
    }

    /// A child of `self` carrying a (possibly narrower) box, one depth
    /// level down, with a fresh index assigned by the caller.
    pub fn child(&self, domain_box: DomainBox, index: NodeIndex) -> Self {
        NcspNode { scope: self.scope.clone(), domain_box, depth: self.depth + 1, index, parent: Some(self.index), proof: Proof::Maybe }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn domain_box(&self) -> &DomainBox {
        &self.domain_box
    }

    pub fn domain_box_mut(&mut self) -> &mut DomainBox {
        &mut self.domain_box
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn proof(&self) -> Proof {
        self.proof
    }

    pub fn set_proof(&mut self, p: Proof) {
        self.proof = p;
    }
}
