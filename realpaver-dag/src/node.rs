//! Node variants and the arena-indexed node record.

use realpaver_interval::Interval;
use realpaver_model::VarId;
use rustc_hash::FxHashSet;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    Usb,
    Abs,
    Sgn,
    Sqr,
    Sqrt,
    Exp,
    Log,
    Cos,
    Sin,
    Tan,
    Cosh,
    Sinh,
    Tanh,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Const(Interval),
    Var(VarId),
    Bin(BinOp, NodeId, NodeId),
    Un(UnOp, NodeId),
    Pow(NodeId, i32),
    /// `cst + Σ coef_i * var_i`, a flattened affine combination over
    /// variable nodes only (used by the model layer to avoid building a
    /// deep chain of binary `Add`/`Mul` nodes for linear expressions).
    Lin(Interval, Vec<(Interval, NodeId)>),
}

/// A key used purely for structural-hash deduplication. `Interval`
/// doesn't implement `Eq`/`Hash` (its bounds are `f64`), so constants and
/// linear coefficients are hashed/compared through their bit patterns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum NodeKey {
    Const(u64, u64),
    Var(u32),
    Bin(BinOp, NodeId, NodeId),
    Un(UnOp, NodeId),
    Pow(NodeId, i32),
    Lin(u64, u64, Vec<(u64, u64, NodeId)>),
}

fn bits(x: f64) -> u64 {
    x.to_bits()
}

impl NodeKind {
    pub(crate) fn key(&self) -> NodeKey {
        match self {
            NodeKind::Const(i) => NodeKey::Const(bits(i.lo()), bits(i.hi())),
            NodeKind::Var(v) => NodeKey::Var(v.raw()),
            NodeKind::Bin(op, a, b) => NodeKey::Bin(*op, *a, *b),
            NodeKind::Un(op, a) => NodeKey::Un(*op, *a),
            NodeKind::Pow(a, e) => NodeKey::Pow(*a, *e),
            NodeKind::Lin(cst, terms) => NodeKey::Lin(
                bits(cst.lo()),
                bits(cst.hi()),
                terms.iter().map(|(c, n)| (bits(c.lo()), bits(c.hi()), *n)).collect(),
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DagNode {
    pub kind: NodeKind,
    pub parents: Vec<NodeId>,
    pub deps: FxHashSet<VarId>,
}

impl DagNode {
    pub(crate) fn new(kind: NodeKind, deps: FxHashSet<VarId>) -> Self {
        DagNode { kind, parents: Vec::new(), deps }
    }

    pub fn depends_on(&self, v: VarId) -> bool {
        self.deps.contains(&v)
    }
}
