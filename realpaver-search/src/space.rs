//! [`SearchSpace`]: pending/solution node storage for the branch-and-prune
//! driver, plus the DFS, BFS, distant-most DFS and hybrid DFS strategies.

use crate::node::NcspNode;
use realpaver_dag::Proof;
use realpaver_model::IntervalBox;

/// Storage strategy for a branch-and-prune search: how pending nodes are
/// ordered for extraction, and how solved nodes accumulate.
pub trait SearchSpace {
    fn nb_pending_nodes(&self) -> usize;
    fn next_pending_node(&mut self) -> Option<NcspNode>;
    fn insert_pending_node(&mut self, node: NcspNode);

    fn nb_sol_nodes(&self) -> usize;
    fn push_sol_node(&mut self, node: NcspNode);
    fn pop_sol_node(&mut self) -> Option<NcspNode>;
    fn sol_nodes(&self) -> &[NcspNode];

    fn has_feasible_sol_node(&self) -> bool {
        self.sol_nodes().iter().any(|n| matches!(n.proof(), Proof::Feasible | Proof::Inner))
    }

    /// Merges solution nodes whose boxes lie within `gap` of one another
    /// (Hausdorff distance on the interval hull), keeping one
    /// representative per cluster. No-op for a negative gap.
    fn make_sol_clusters(&mut self, gap: f64);
}

fn cluster(nodes: Vec<NcspNode>, gap: f64) -> Vec<NcspNode> {
    if gap < 0.0 {
        return nodes;
    }
    let mut pending = nodes;
    let mut kept: Vec<NcspNode> = Vec::new();
    'outer: while let Some(node) = pending.pop() {
        let box_a = node.domain_box().to_interval_box();
        for other in kept.iter_mut() {
            let box_b = other.domain_box().to_interval_box();
            if box_a.hausdorff_distance(&box_b) <= gap {
                *other = merge_hull(other, &node);
                continue 'outer;
            }
        }
        kept.push(node);
    }
    kept
}

/// Componentwise interval-hull merge of two nodes sharing a scope;
/// deliberately loses non-interval domain substructure (range unions,
/// binary domains) on merge, keeping only the hull.
fn merge_hull(a: &NcspNode, b: &NcspNode) -> NcspNode {
    let ia = a.domain_box().to_interval_box();
    let ib = b.domain_box().to_interval_box();
    let merged: Vec<_> = ia.intervals().iter().zip(ib.intervals().iter()).map(|(x, y)| x.hull(y)).collect();
    let merged = IntervalBox::new(a.scope().clone(), merged).unwrap_or(ia);
    let mut out = a.clone();
    for &v in a.scope().ids() {
        if let (Ok(d), Ok(i)) = (out.domain_box_mut().get_mut(v), merged.get(v)) {
            d.contract_to_hull(&i);
        }
    }
    out
}

/// Depth-first: pending nodes extracted in LIFO order.
#[derive(Default)]
pub struct Dfs {
    pending: Vec<NcspNode>,
    sol: Vec<NcspNode>,
}

impl Dfs {
    pub fn new() -> Self {
        Dfs::default()
    }
}

impl SearchSpace for Dfs {
    fn nb_pending_nodes(&self) -> usize {
        self.pending.len()
    }
    fn next_pending_node(&mut self) -> Option<NcspNode> {
        self.pending.pop()
    }
    fn insert_pending_node(&mut self, node: NcspNode) {
        self.pending.push(node);
    }
    fn nb_sol_nodes(&self) -> usize {
        self.sol.len()
    }
    fn push_sol_node(&mut self, node: NcspNode) {
        self.sol.push(node);
    }
    fn pop_sol_node(&mut self) -> Option<NcspNode> {
        self.sol.pop()
    }
    fn sol_nodes(&self) -> &[NcspNode] {
        &self.sol
    }
    fn make_sol_clusters(&mut self, gap: f64) {
        let taken = std::mem::take(&mut self.sol);
        self.sol = cluster(taken, gap);
    }
}

/// Breadth-first: pending nodes extracted in FIFO order.
#[derive(Default)]
pub struct Bfs {
    pending: std::collections::VecDeque<NcspNode>,
    sol: Vec<NcspNode>,
}

impl Bfs {
    pub fn new() -> Self {
        Bfs::default()
    }
}

impl SearchSpace for Bfs {
    fn nb_pending_nodes(&self) -> usize {
        self.pending.len()
    }
    fn next_pending_node(&mut self) -> Option<NcspNode> {
        self.pending.pop_back()
    }
    fn insert_pending_node(&mut self, node: NcspNode) {
        self.pending.push_front(node);
    }
    fn nb_sol_nodes(&self) -> usize {
        self.sol.len()
    }
    fn push_sol_node(&mut self, node: NcspNode) {
        self.sol.push(node);
    }
    fn pop_sol_node(&mut self) -> Option<NcspNode> {
        self.sol.pop()
    }
    fn sol_nodes(&self) -> &[NcspNode] {
        &self.sol
    }
    fn make_sol_clusters(&mut self, gap: f64) {
        let taken = std::mem::take(&mut self.sol);
        self.sol = cluster(taken, gap);
    }
}

/// Distant-most depth-first: pending nodes are kept sorted by ascending
/// distance to the nearest solution box found so far, and the farthest
/// is extracted first. Every push of a solution re-sorts the pending
/// list against the new distances.
pub struct Dmdfs {
    pending: Vec<(NcspNode, f64)>,
    sol: Vec<NcspNode>,
}

impl Default for Dmdfs {
    fn default() -> Self {
        Dmdfs { pending: Vec::new(), sol: Vec::new() }
    }
}

impl Dmdfs {
    pub fn new() -> Self {
        Dmdfs::default()
    }

    fn dist_to_nearest_sol(&self, node: &NcspNode) -> f64 {
        let b = node.domain_box().to_interval_box();
        self.sol.iter().map(|s| b.hausdorff_distance(&s.domain_box().to_interval_box())).fold(f64::INFINITY, f64::min)
    }

    fn resort(&mut self) {
        self.pending.sort_by(|(na, da), (nb, db)| da.partial_cmp(db).unwrap_or(std::cmp::Ordering::Equal).then(na.index().cmp(&nb.index())));
    }
}

impl SearchSpace for Dmdfs {
    fn nb_pending_nodes(&self) -> usize {
        self.pending.len()
    }
    fn next_pending_node(&mut self) -> Option<NcspNode> {
        self.pending.pop().map(|(n, _)| n)
    }
    fn insert_pending_node(&mut self, node: NcspNode) {
        let d = self.dist_to_nearest_sol(&node);
        self.pending.push((node, d));
        self.resort();
    }
    fn nb_sol_nodes(&self) -> usize {
        self.sol.len()
    }
    fn push_sol_node(&mut self, node: NcspNode) {
        self.sol.push(node);
        for (n, d) in self.pending.iter_mut() {
            let nd = n.domain_box().to_interval_box().hausdorff_distance(&self.sol.last().unwrap().domain_box().to_interval_box());
            if nd < *d {
                *d = nd;
            }
        }
        self.resort();
    }
    fn pop_sol_node(&mut self) -> Option<NcspNode> {
        self.sol.pop()
    }
    fn sol_nodes(&self) -> &[NcspNode] {
        &self.sol
    }
    fn make_sol_clusters(&mut self, gap: f64) {
        let taken = std::mem::take(&mut self.sol);
        self.sol = cluster(taken, gap);
        let mut pending: Vec<NcspNode> = std::mem::take(&mut self.pending).into_iter().map(|(n, _)| n).collect();
        while let Some(n) = pending.pop() {
            self.insert_pending_node(n);
        }
    }
}

/// Ordering criterion for [`HybridDfs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HybridDfsStyle {
    Depth,
    Perimeter,
    GridPerimeter,
}

/// Hybrid depth-first search: maintains pending nodes in a single set
/// ordered by `style`, alternating implicitly with plain DFS order since
/// depth order degenerates to a stack. Simplified relative to the
/// original's separate stack/best-first modes into one ordered
/// structure parameterized by the comparison key.
pub struct HybridDfs {
    style: HybridDfsStyle,
    pending: Vec<NcspNode>,
    sol: Vec<NcspNode>,
    tolerances: Vec<f64>,
}

impl HybridDfs {
    pub fn new(style: HybridDfsStyle, tolerances: Vec<f64>) -> Self {
        HybridDfs { style, pending: Vec::new(), sol: Vec::new(), tolerances }
    }

    fn key(&self, node: &NcspNode) -> f64 {
        match self.style {
            HybridDfsStyle::Depth => node.depth() as f64,
            HybridDfsStyle::Perimeter => node.domain_box().to_interval_box().perimeter(),
            HybridDfsStyle::GridPerimeter => node.domain_box().to_interval_box().grid_perimeter(&self.tolerances),
        }
    }
}

impl SearchSpace for HybridDfs {
    fn nb_pending_nodes(&self) -> usize {
        self.pending.len()
    }

    fn next_pending_node(&mut self) -> Option<NcspNode> {
        // Depth is ascending (smallest-depth worst case sits at the
        // front); perimeter/grid-perimeter are descending. Either way
        // the node to extract next sits at the back once sorted.
        self.pending.pop()
    }

    fn insert_pending_node(&mut self, node: NcspNode) {
        let k = self.key(&node);
        let pos = match self.style {
            HybridDfsStyle::Depth => self.pending.partition_point(|n| self.key(n) > k),
            _ => self.pending.partition_point(|n| self.key(n) < k),
        };
        self.pending.insert(pos, node);
    }

    fn nb_sol_nodes(&self) -> usize {
        self.sol.len()
    }
    fn push_sol_node(&mut self, node: NcspNode) {
        self.sol.push(node);
    }
    fn pop_sol_node(&mut self) -> Option<NcspNode> {
        self.sol.pop()
    }
    fn sol_nodes(&self) -> &[NcspNode] {
        &self.sol
    }
    fn make_sol_clusters(&mut self, gap: f64) {
        let taken = std::mem::take(&mut self.sol);
        self.sol = cluster(taken, gap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realpaver_interval::Interval;
    use realpaver_model::{Domain, DomainBox, Scope, VarId};

    fn box_at(lo: f64, hi: f64) -> DomainBox {
        let scope = Scope::from_ids(vec![VarId::new(0)]);
        DomainBox::new(scope, vec![Domain::Interval(Interval::new(lo, hi))]).unwrap()
    }

    #[test]
    fn dfs_is_lifo() {
        let mut dfs = Dfs::new();
        dfs.insert_pending_node(NcspNode::root(box_at(0.0, 1.0), 0));
        dfs.insert_pending_node(NcspNode::root(box_at(1.0, 2.0), 1));
        assert_eq!(dfs.next_pending_node().unwrap().index(), 1);
        assert_eq!(dfs.next_pending_node().unwrap().index(), 0);
    }

    #[test]
    fn bfs_is_fifo() {
        let mut bfs = Bfs::new();
        bfs.insert_pending_node(NcspNode::root(box_at(0.0, 1.0), 0));
        bfs.insert_pending_node(NcspNode::root(box_at(1.0, 2.0), 1));
        assert_eq!(bfs.next_pending_node().unwrap().index(), 0);
        assert_eq!(bfs.next_pending_node().unwrap().index(), 1);
    }

    #[test]
    fn clustering_merges_close_solutions() {
        let mut dfs = Dfs::new();
        dfs.push_sol_node(NcspNode::root(box_at(0.0, 1.0), 0));
        dfs.push_sol_node(NcspNode::root(box_at(1.0000001, 2.0), 1));
        dfs.make_sol_clusters(0.1);
        assert_eq!(dfs.nb_sol_nodes(), 1);
    }

    #[test]
    fn clustering_keeps_distant_solutions_separate() {
        let mut dfs = Dfs::new();
        dfs.push_sol_node(NcspNode::root(box_at(0.0, 1.0), 0));
        dfs.push_sol_node(NcspNode::root(box_at(10.0, 11.0), 1));
        dfs.make_sol_clusters(0.1);
        assert_eq!(dfs.nb_sol_nodes(), 2);
    }
}
