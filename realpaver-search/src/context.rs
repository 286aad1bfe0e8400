//! [`Context`]: a sparse map from node index to a typed list of
//! annotations, purged when a node is dropped from the search.

use crate::node::NodeIndex;
use realpaver_model::VarId;
use rustc_hash::FxHashMap;

/// An annotation attached to a search node. A sum type stands in for the
/// source's small hierarchy of node-info subclasses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeInfo {
    /// The variable selected for the last splitting step at this node.
    SplitVar(VarId),
    /// The number of CID contractors applied at this node (ACID).
    NbCid(u32),
}

impl NodeInfo {
    fn same_kind(&self, other: &NodeInfo) -> bool {
        matches!((self, other), (NodeInfo::SplitVar(_), NodeInfo::SplitVar(_)) | (NodeInfo::NbCid(_), NodeInfo::NbCid(_)))
    }
}

/// Per-node annotation storage. A node index carries at most one
/// annotation of each kind; inserting a second of the same kind replaces
/// the first (the source asserts against this instead, but a replace is
/// the more useful behavior for a library and never silently drops
/// information the caller didn't already have).
#[derive(Debug, Default)]
pub struct Context {
    map: FxHashMap<NodeIndex, Vec<NodeInfo>>,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    pub fn insert(&mut self, index: NodeIndex, info: NodeInfo) {
        let entry = self.map.entry(index).or_default();
        if let Some(slot) = entry.iter_mut().find(|existing| existing.same_kind(&info)) {
            *slot = info;
        } else {
            entry.push(info);
        }
    }

    /// Drops every annotation recorded for `index`; called when a node
    /// leaves the search (solved, discarded, or split into children).
    pub fn remove(&mut self, index: NodeIndex) {
        self.map.remove(&index);
    }

    pub fn split_var(&self, index: NodeIndex) -> Option<VarId> {
        self.map.get(&index)?.iter().find_map(|info| match info {
            NodeInfo::SplitVar(v) => Some(*v),
            _ => None,
        })
    }

    pub fn nb_cid(&self, index: NodeIndex) -> Option<u32> {
        self.map.get(&index)?.iter().find_map(|info| match info {
            NodeInfo::NbCid(n) => Some(*n),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_same_kind() {
        let mut ctx = Context::new();
        ctx.insert(0, NodeInfo::SplitVar(VarId::new(0)));
        ctx.insert(0, NodeInfo::SplitVar(VarId::new(1)));
        assert_eq!(ctx.split_var(0), Some(VarId::new(1)));
    }

    #[test]
    fn remove_purges_all_kinds() {
        let mut ctx = Context::new();
        ctx.insert(3, NodeInfo::SplitVar(VarId::new(0)));
        ctx.insert(3, NodeInfo::NbCid(2));
        ctx.remove(3);
        assert_eq!(ctx.split_var(3), None);
        assert_eq!(ctx.nb_cid(3), None);
    }
}
