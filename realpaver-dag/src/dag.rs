//! The [`Dag`] itself: node storage, structural-hash insertion, forward
//! evaluation and reverse-mode automatic differentiation.

use crate::error::{DagError, DagResult};
use crate::node::{BinOp, DagNode, NodeId, NodeKey, NodeKind, UnOp};
use realpaver_interval::Interval;
use realpaver_model::VarId;
use rustc_hash::{FxHashMap, FxHashSet};

/// Maximal-sharing expression graph. Nodes are stored in insertion order,
/// which is also a valid topological order since a node's children are
/// always inserted (and therefore indexed) before it.
#[derive(Debug, Clone, Default)]
pub struct Dag {
    nodes: Vec<DagNode>,
    by_key: FxHashMap<NodeKey, NodeId>,
    var_nodes: FxHashMap<VarId, NodeId>,
}

impl Dag {
    pub fn new() -> Self {
        Dag::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> DagResult<&DagNode> {
        self.nodes.get(id).ok_or(DagError::BadNodeIndex(id))
    }

    pub fn var_node(&self, v: VarId) -> Option<NodeId> {
        self.var_nodes.get(&v).copied()
    }

    fn insert_raw(&mut self, kind: NodeKind, deps: FxHashSet<VarId>) -> NodeId {
        let key = kind.key();
        if let Some(&existing) = self.by_key.get(&key) {
            return existing;
        }
        let id = self.nodes.len();
        let children: Vec<NodeId> = match &kind {
            NodeKind::Const(_) | NodeKind::Var(_) => Vec::new(),
            NodeKind::Bin(_, a, b) => vec![*a, *b],
            NodeKind::Un(_, a) | NodeKind::Pow(a, _) => vec![*a],
            NodeKind::Lin(_, terms) => terms.iter().map(|(_, n)| *n).collect(),
        };
        self.nodes.push(DagNode::new(kind, deps));
        for c in children {
            self.nodes[c].parents.push(id);
        }
        self.by_key.insert(key, id);
        id
    }

    pub fn insert_const(&mut self, value: Interval) -> NodeId {
        self.insert_raw(NodeKind::Const(value), FxHashSet::default())
    }

    pub fn insert_var(&mut self, v: VarId) -> NodeId {
        if let Some(&id) = self.var_nodes.get(&v) {
            return id;
        }
        let mut deps = FxHashSet::default();
        deps.insert(v);
        let id = self.insert_raw(NodeKind::Var(v), deps);
        self.var_nodes.insert(v, id);
        id
    }

    pub fn insert_bin(&mut self, op: BinOp, a: NodeId, b: NodeId) -> DagResult<NodeId> {
        self.check(a)?;
        self.check(b)?;
        let mut deps = self.nodes[a].deps.clone();
        deps.extend(self.nodes[b].deps.iter().copied());
        Ok(self.insert_raw(NodeKind::Bin(op, a, b), deps))
    }

    pub fn insert_un(&mut self, op: UnOp, a: NodeId) -> DagResult<NodeId> {
        self.check(a)?;
        let deps = self.nodes[a].deps.clone();
        Ok(self.insert_raw(NodeKind::Un(op, a), deps))
    }

    pub fn insert_pow(&mut self, a: NodeId, exp: i32) -> DagResult<NodeId> {
        self.check(a)?;
        if exp == 0 {
            return Err(DagError::BadExponent(exp));
        }
        let deps = self.nodes[a].deps.clone();
        Ok(self.insert_raw(NodeKind::Pow(a, exp), deps))
    }

    pub fn insert_lin(&mut self, cst: Interval, terms: Vec<(Interval, NodeId)>) -> DagResult<NodeId> {
        for (_, n) in &terms {
            self.check(*n)?;
        }
        let mut deps = FxHashSet::default();
        for (_, n) in &terms {
            deps.extend(self.nodes[*n].deps.iter().copied());
        }
        Ok(self.insert_raw(NodeKind::Lin(cst, terms), deps))
    }

    fn check(&self, id: NodeId) -> DagResult<()> {
        if id < self.nodes.len() {
            Ok(())
        } else {
            Err(DagError::BadNodeIndex(id))
        }
    }

    /// Forward interval evaluation of every node, given a lookup from
    /// variable id to its current domain interval. Returns the per-node
    /// value table, indexed the same way as the node arena.
    pub fn interval_eval<F>(&self, var_value: F) -> Vec<Interval>
    where
        F: Fn(VarId) -> Interval,
    {
        let mut vals = vec![Interval::empty(); self.nodes.len()];
        for (id, node) in self.nodes.iter().enumerate() {
            vals[id] = match &node.kind {
                NodeKind::Const(c) => *c,
                NodeKind::Var(v) => var_value(*v),
                NodeKind::Bin(op, a, b) => eval_bin(*op, vals[*a], vals[*b]),
                NodeKind::Un(op, a) => eval_un(*op, vals[*a]),
                NodeKind::Pow(a, e) => vals[*a].powi(*e),
                NodeKind::Lin(cst, terms) => {
                    terms.iter().fold(*cst, |acc, (c, n)| acc.add(&c.mul(&vals[*n])))
                }
            };
        }
        vals
    }

    /// Reverse-mode interval automatic differentiation. `vals` must be the
    /// result of [`Dag::interval_eval`] over the same box. Returns the
    /// adjoint (partial derivative of `root`) at every node; the
    /// derivative with respect to variable `v` is the adjoint at
    /// `insert_var(v)`.
    pub fn interval_diff(&self, root: NodeId, vals: &[Interval]) -> DagResult<Vec<Interval>> {
        self.check(root)?;
        let mut adj = vec![Interval::zero(); self.nodes.len()];
        adj[root] = Interval::singleton(1.0);
        for id in (0..self.nodes.len()).rev() {
            let bar = adj[id];
            if bar.is_empty() {
                continue;
            }
            match &self.nodes[id].kind {
                NodeKind::Const(_) | NodeKind::Var(_) => {}
                NodeKind::Bin(op, a, b) => {
                    let (da, db) = bin_partials(*op, vals[*a], vals[*b]);
                    adj[*a] = adj[*a].add(&bar.mul(&da));
                    adj[*b] = adj[*b].add(&bar.mul(&db));
                }
                NodeKind::Un(op, a) => {
                    let d = un_partial(*op, vals[*a]);
                    adj[*a] = adj[*a].add(&bar.mul(&d));
                }
                NodeKind::Pow(a, e) => {
                    let d = Interval::singleton(*e as f64).mul(&vals[*a].powi(e - 1));
                    adj[*a] = adj[*a].add(&bar.mul(&d));
                }
                NodeKind::Lin(_, terms) => {
                    for (c, n) in terms {
                        adj[*n] = adj[*n].add(&bar.mul(c));
                    }
                }
            }
        }
        Ok(adj)
    }

    /// Real (floating-point) forward evaluation at a concrete point.
    pub fn real_eval<F>(&self, var_value: F) -> Vec<f64>
    where
        F: Fn(VarId) -> f64,
    {
        let mut vals = vec![0.0; self.nodes.len()];
        for (id, node) in self.nodes.iter().enumerate() {
            vals[id] = match &node.kind {
                NodeKind::Const(c) => c.midpoint(),
                NodeKind::Var(v) => var_value(*v),
                NodeKind::Bin(op, a, b) => real_eval_bin(*op, vals[*a], vals[*b]),
                NodeKind::Un(op, a) => real_eval_un(*op, vals[*a]),
                NodeKind::Pow(a, e) => vals[*a].powi(*e),
                NodeKind::Lin(cst, terms) => {
                    terms.iter().fold(cst.midpoint(), |acc, (c, n)| acc + c.midpoint() * vals[*n])
                }
            };
        }
        vals
    }

    pub fn real_diff(&self, root: NodeId, vals: &[f64]) -> DagResult<Vec<f64>> {
        self.check(root)?;
        let mut adj = vec![0.0; self.nodes.len()];
        adj[root] = 1.0;
        for id in (0..self.nodes.len()).rev() {
            let bar = adj[id];
            if bar == 0.0 {
                continue;
            }
            match &self.nodes[id].kind {
                NodeKind::Const(_) | NodeKind::Var(_) => {}
                NodeKind::Bin(op, a, b) => {
                    let (da, db) = real_bin_partials(*op, vals[*a], vals[*b]);
                    adj[*a] += bar * da;
                    adj[*b] += bar * db;
                }
                NodeKind::Un(op, a) => {
                    adj[*a] += bar * real_un_partial(*op, vals[*a]);
                }
                NodeKind::Pow(a, e) => {
                    adj[*a] += bar * (*e as f64) * vals[*a].powi(e - 1);
                }
                NodeKind::Lin(_, terms) => {
                    for (c, n) in terms {
                        adj[*n] += bar * c.midpoint();
                    }
                }
            }
        }
        Ok(adj)
    }
}

fn eval_bin(op: BinOp, x: Interval, y: Interval) -> Interval {
    match op {
        BinOp::Add => x.add(&y),
        BinOp::Sub => x.sub(&y),
        BinOp::Mul => x.mul(&y),
        BinOp::Div => x.div(&y),
        BinOp::Min => x.min(&y),
        BinOp::Max => x.max(&y),
    }
}

fn eval_un(op: UnOp, x: Interval) -> Interval {
    match op {
        UnOp::Usb => x.neg(),
        UnOp::Abs => x.abs(),
        UnOp::Sgn => x.sgn(),
        UnOp::Sqr => x.sqr(),
        UnOp::Sqrt => x.sqrt(),
        UnOp::Exp => x.exp(),
        UnOp::Log => x.log(),
        UnOp::Cos => x.cos(),
        UnOp::Sin => x.sin(),
        UnOp::Tan => x.tan(),
        UnOp::Cosh => x.cosh(),
        UnOp::Sinh => x.sinh(),
        UnOp::Tanh => x.tanh(),
    }
}

fn real_eval_bin(op: BinOp, x: f64, y: f64) -> f64 {
    match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        BinOp::Div => x / y,
        BinOp::Min => x.min(y),
        BinOp::Max => x.max(y),
    }
}

fn real_eval_un(op: UnOp, x: f64) -> f64 {
    match op {
        UnOp::Usb => -x,
        UnOp::Abs => x.abs(),
        UnOp::Sgn => x.signum(),
        UnOp::Sqr => x * x,
        UnOp::Sqrt => x.sqrt(),
        UnOp::Exp => x.exp(),
        UnOp::Log => x.ln(),
        UnOp::Cos => x.cos(),
        UnOp::Sin => x.sin(),
        UnOp::Tan => x.tan(),
        UnOp::Cosh => x.cosh(),
        UnOp::Sinh => x.sinh(),
        UnOp::Tanh => x.tanh(),
    }
}

/// `(d/dx op(x,y), d/dy op(x,y))` as interval enclosures, per the AD
/// table: `Add -> (1,1)`, `Sub -> (1,-1)`, `Mul -> (y,x)`,
/// `Div -> (1/y, -x/y^2)`, `Min`/`Max -> one-hot by certain ordering,
/// [0,1] both when the operand images overlap.
fn bin_partials(op: BinOp, x: Interval, y: Interval) -> (Interval, Interval) {
    let one = Interval::singleton(1.0);
    match op {
        BinOp::Add => (one, one),
        BinOp::Sub => (one, Interval::singleton(-1.0)),
        BinOp::Mul => (y, x),
        BinOp::Div => (one.div(&y), x.neg().div(&y.sqr())),
        BinOp::Min => {
            if x.lt_certain(&y) {
                (one, Interval::zero())
            } else if y.lt_certain(&x) {
                (Interval::zero(), one)
            } else {
                (Interval::new(0.0, 1.0), Interval::new(0.0, 1.0))
            }
        }
        BinOp::Max => {
            if x.gt_certain(&y) {
                (one, Interval::zero())
            } else if y.gt_certain(&x) {
                (Interval::zero(), one)
            } else {
                (Interval::new(0.0, 1.0), Interval::new(0.0, 1.0))
            }
        }
    }
}

fn real_bin_partials(op: BinOp, x: f64, y: f64) -> (f64, f64) {
    match op {
        BinOp::Add => (1.0, 1.0),
        BinOp::Sub => (1.0, -1.0),
        BinOp::Mul => (y, x),
        BinOp::Div => (1.0 / y, -x / (y * y)),
        BinOp::Min => {
            if x < y {
                (1.0, 0.0)
            } else {
                (0.0, 1.0)
            }
        }
        BinOp::Max => {
            if x > y {
                (1.0, 0.0)
            } else {
                (0.0, 1.0)
            }
        }
    }
}

/// `d/dx op(x)`, per the AD table in §4.4: `Usb -> -1`, `Abs -> sign(x)`
/// (`[-1,1]` straddling zero), `Sgn -> 0` (except exactly at zero, where
/// the derivative is undefined and `[0,0]` is the sound conservative
/// choice), `Sqr -> 2x`, `Sqrt -> 1/(2 sqrt x)`, `Exp -> exp(x)`,
/// `Log -> 1/x`, `Sin -> cos(x)`, `Cos -> -sin(x)`, `Tan -> 1+tan(x)^2`,
/// `Sinh -> cosh(x)`, `Cosh -> sinh(x)`, `Tanh -> 1/cosh(x)^2`.
fn un_partial(op: UnOp, x: Interval) -> Interval {
    match op {
        UnOp::Usb => Interval::singleton(-1.0),
        UnOp::Abs => x.sgn(),
        UnOp::Sgn => Interval::zero(),
        UnOp::Sqr => Interval::singleton(2.0).mul(&x),
        UnOp::Sqrt => Interval::singleton(1.0).div(&Interval::singleton(2.0).mul(&x.sqrt())),
        UnOp::Exp => x.exp(),
        UnOp::Log => Interval::singleton(1.0).div(&x),
        UnOp::Sin => x.cos(),
        UnOp::Cos => x.sin().neg(),
        UnOp::Tan => Interval::singleton(1.0).add(&x.tan().sqr()),
        UnOp::Sinh => x.cosh(),
        UnOp::Cosh => x.sinh(),
        UnOp::Tanh => Interval::singleton(1.0).div(&x.cosh().sqr()),
    }
}

fn real_un_partial(op: UnOp, x: f64) -> f64 {
    match op {
        UnOp::Usb => -1.0,
        UnOp::Abs => x.signum(),
        UnOp::Sgn => 0.0,
        UnOp::Sqr => 2.0 * x,
        UnOp::Sqrt => 1.0 / (2.0 * x.sqrt()),
        UnOp::Exp => x.exp(),
        UnOp::Log => 1.0 / x,
        UnOp::Sin => x.cos(),
        UnOp::Cos => -x.sin(),
        UnOp::Tan => 1.0 + x.tan().powi(2),
        UnOp::Sinh => x.cosh(),
        UnOp::Cosh => x.sinh(),
        UnOp::Tanh => 1.0 / x.cosh().powi(2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realpaver_model::VarId;

    #[test]
    fn structural_sharing_dedups_identical_subexpressions() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let c = dag.insert_const(Interval::singleton(2.0));
        let a = dag.insert_bin(BinOp::Mul, x, c).unwrap();
        let b = dag.insert_bin(BinOp::Mul, x, c).unwrap();
        assert_eq!(a, b);
        assert_eq!(dag.len(), 3);
    }

    #[test]
    fn forward_eval_matches_recursive_arithmetic() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let y = dag.insert_var(VarId::new(1));
        let sum = dag.insert_bin(BinOp::Add, x, y).unwrap();
        let sq = dag.insert_un(UnOp::Sqr, sum).unwrap();
        let vals = dag.interval_eval(|v| {
            if v == VarId::new(0) {
                Interval::new(1.0, 2.0)
            } else {
                Interval::new(3.0, 4.0)
            }
        });
        // x+y in [4,6], sq in [16,36]
        assert_eq!(vals[sum], Interval::new(4.0, 6.0));
        assert_eq!(vals[sq], Interval::new(16.0, 36.0));
    }

    #[test]
    fn diff_of_product_matches_product_rule() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let y = dag.insert_var(VarId::new(1));
        let root = dag.insert_bin(BinOp::Mul, x, y).unwrap();
        let vals = dag.interval_eval(|v| {
            if v == VarId::new(0) {
                Interval::singleton(3.0)
            } else {
                Interval::singleton(4.0)
            }
        });
        let adj = dag.interval_diff(root, &vals).unwrap();
        assert_eq!(adj[x], Interval::singleton(4.0));
        assert_eq!(adj[y], Interval::singleton(3.0));
    }

    #[test]
    fn lin_node_evaluates_as_affine_combination() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let y = dag.insert_var(VarId::new(1));
        let lin = dag
            .insert_lin(Interval::singleton(1.0), vec![(Interval::singleton(2.0), x), (Interval::singleton(-1.0), y)])
            .unwrap();
        let vals = dag.interval_eval(|v| {
            if v == VarId::new(0) {
                Interval::singleton(3.0)
            } else {
                Interval::singleton(5.0)
            }
        });
        // 1 + 2*3 - 1*5 = 2
        assert_eq!(vals[lin], Interval::singleton(2.0));
    }
}
