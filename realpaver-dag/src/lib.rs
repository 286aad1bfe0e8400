//! # realpaver-dag: the shared expression graph
//!
//! A [`Dag`] holds every term and constraint function of a problem in a
//! single maximal-sharing graph: inserting the same sub-expression twice
//! returns the same node index, found through structural-hash
//! deduplication rather than pointer equality. Each [`DagFun`] is a root
//! index plus the image interval a constraint requires of it and the
//! [`Scope`](realpaver_model::Scope) of variables it depends on.
//!
//! The graph supports four operations per function, all driven from the
//! same node table:
//!
//! - forward interval/real evaluation ([`Dag::interval_eval`], [`Dag::real_eval`]),
//! - reverse-mode automatic differentiation ([`Dag::interval_diff`], [`Dag::real_diff`]),
//! - HC4-Revise propagation ([`DagFun::hc4_revise`]), which reuses the
//!   forward pass and then walks back down using the projection operators
//!   from `realpaver-interval`.

pub mod constraint;
pub mod dag;
pub mod error;
pub mod fun;
pub mod node;

pub use constraint::{Constraint, ConstraintRelaxor, Relation};
pub use dag::Dag;
pub use error::{DagError, DagResult};
pub use fun::{DagFun, Proof};
pub use node::{BinOp, NodeId, NodeKind, UnOp};
