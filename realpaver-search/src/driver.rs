//! [`Driver`]: the branch-and-prune loop tying a [`SearchSpace`], a
//! propagator and a [`NcspSplit`] together.

use crate::context::Context;
use crate::node::NcspNode;
use crate::propagator::{NcspACID, NcspHC4, NcspHC4Newton};
use crate::selector::Selector;
use crate::space::SearchSpace;
use crate::split::NcspSplit;
use realpaver_dag::{Dag, Proof};
use realpaver_model::{DomainBox, Variable};
use std::time::{Duration, Instant};

/// Which propagation pipeline a node is contracted with. Built once
/// from a [`realpaver_contractor::ContractorFactory`] and shared across
/// every node the driver visits.
pub enum Propagator {
    Hc4(NcspHC4),
    Hc4Newton(NcspHC4Newton),
    Acid(NcspACID),
}

impl Propagator {
    fn contract(&self, dag: &Dag, node: &mut NcspNode) -> realpaver_contractor::ContractorResult<Proof> {
        match self {
            Propagator::Hc4(p) => p.contract(dag, node),
            Propagator::Hc4Newton(p) => p.contract(dag, node),
            Propagator::Acid(p) => p.contract(dag, node),
        }
    }
}

/// Why the driver stopped. `Optimal` means the pending queue drained
/// with no limit hit (the search is exhaustive up to tolerance).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Optimal,
    NodeLimit,
    TimeLimit,
    DepthLimit,
    FirstSolution,
}

/// Stopping conditions checked once per iteration, in addition to the
/// pending queue draining.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_nodes: Option<u64>,
    pub max_time: Option<Duration>,
    pub max_depth: Option<u32>,
    pub stop_at_first_solution: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Limits { max_nodes: None, max_time: None, max_depth: None, stop_at_first_solution: false }
    }
}

pub struct Driver<Sp: SearchSpace, S: Selector> {
    space: Sp,
    ctx: Context,
    splitter: NcspSplit<S>,
    propagator: Propagator,
    limits: Limits,
    vars: Vec<Variable>,
    nodes_visited: u64,
}

impl<Sp: SearchSpace, S: Selector> Driver<Sp, S> {
    pub fn new(initial: DomainBox, space: Sp, splitter: NcspSplit<S>, propagator: Propagator, vars: Vec<Variable>, limits: Limits) -> Self {
        let mut space = space;
        space.insert_pending_node(NcspNode::root(initial, 0));
        Driver { space, ctx: Context::new(), splitter, propagator, limits, vars, nodes_visited: 0 }
    }

    fn is_solution(&self, node: &NcspNode) -> bool {
        self.vars.iter().all(|v| match node.domain_box().get(v.id()) {
            Ok(d) => v.is_canonical(d),
            Err(_) => false,
        })
    }

    /// Runs the search to completion or until a limit fires.
    pub fn run(&mut self, dag: &Dag) -> SearchStatus {
        let start = Instant::now();
        loop {
            if let Some(max_nodes) = self.limits.max_nodes {
                if self.nodes_visited >= max_nodes {
                    return SearchStatus::NodeLimit;
                }
            }
            if let Some(max_time) = self.limits.max_time {
                if start.elapsed() >= max_time {
                    return SearchStatus::TimeLimit;
                }
            }

            let mut node = match self.space.next_pending_node() {
                Some(n) => n,
                None => return SearchStatus::Optimal,
            };
            self.nodes_visited += 1;

            let proof = match self.propagator.contract(dag, &mut node) {
                Ok(p) => p,
                Err(_) => Proof::Empty,
            };
            node.set_proof(proof);

            if proof == Proof::Empty {
                self.splitter.remove_info(&mut self.ctx, node.index());
                continue;
            }

            if self.is_solution(&node) {
                self.space.push_sol_node(node);
                self.splitter.remove_info(&mut self.ctx, self.space.sol_nodes().last().unwrap().index());
                if self.limits.stop_at_first_solution {
                    return SearchStatus::FirstSolution;
                }
                continue;
            }

            if let Some(max_depth) = self.limits.max_depth {
                if node.depth() >= max_depth {
                    return SearchStatus::DepthLimit;
                }
            }

            match self.splitter.split_one(&node, &mut self.ctx, &self.vars) {
                Some(children) => {
                    self.splitter.remove_info(&mut self.ctx, node.index());
                    for child in children {
                        self.space.insert_pending_node(child);
                    }
                }
                None => {
                    node.set_proof(Proof::Maybe);
                    self.space.push_sol_node(node);
                }
            }
        }
    }

    pub fn space(&self) -> &Sp {
        &self.space
    }

    pub fn space_mut(&mut self) -> &mut Sp {
        &mut self.space
    }

    pub fn nodes_visited(&self) -> u64 {
        self.nodes_visited
    }

    /// Merges near-duplicate solutions; see [`SearchSpace::make_sol_clusters`].
    pub fn cluster_solutions(&mut self, gap: f64) {
        self.space.make_sol_clusters(gap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::Lf;
    use crate::space::Dfs;
    use realpaver_contractor::{ContractorFactory, Params};
    use realpaver_dag::{BinOp, Constraint};
    use realpaver_interval::Interval;
    use realpaver_model::{Domain, Scope, Tolerance, VarId, VarKind};

    fn vars() -> Vec<Variable> {
        vec![
            Variable::new(VarId::new(0), "x", VarKind::Real, Domain::Interval(Interval::new(0.0, 1.0)), Tolerance::Absolute(0.2)),
            Variable::new(VarId::new(1), "y", VarKind::Real, Domain::Interval(Interval::new(0.0, 1.0)), Tolerance::Absolute(0.2)),
        ]
    }

    #[test]
    fn driver_terminates_and_produces_solutions() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let y = dag.insert_var(VarId::new(1));
        let sum = dag.insert_bin(BinOp::Add, x, y).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let constraints = vec![Constraint::eq(sum, scope.clone())];
        let factory = ContractorFactory::new(&dag, &constraints, vec![], Params::default());
        let hc4 = NcspHC4::new(&factory);

        let initial = DomainBox::new(scope.clone(), vec![Domain::Interval(Interval::new(0.0, 1.0)), Domain::Interval(Interval::new(0.0, 1.0))]).unwrap();
        let splitter = NcspSplit::new(Lf::new(scope), 1);
        let limits = Limits { max_nodes: Some(5000), ..Limits::default() };
        let mut driver = Driver::new(initial, Dfs::new(), splitter, Propagator::Hc4(hc4), vars(), limits);

        let status = driver.run(&dag);
        assert!(matches!(status, SearchStatus::Optimal | SearchStatus::NodeLimit));
        assert!(driver.space().nb_sol_nodes() > 0);
    }
}
