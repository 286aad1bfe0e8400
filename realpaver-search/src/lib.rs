//! # realpaver-search: branch-and-prune search over NCSP nodes
//!
//! Builds on [`realpaver_contractor`]'s propagation pipelines to explore
//! the tree of sub-boxes produced by splitting: [`node`] and [`context`]
//! define a search node and its side-table of per-node annotations,
//! [`selector`] and [`split`] pick a variable and slice it,
//! [`propagator`] wraps contractor pipelines to operate on nodes
//! directly, [`space`] holds the pending/solution queues under four
//! ordering strategies, and [`driver`] runs the branch-and-prune loop.
//! [`bospace`] is a standalone bound-optimization priority structure,
//! not wired into the NCSP driver.

pub mod bospace;
pub mod context;
pub mod driver;
pub mod node;
pub mod propagator;
pub mod selector;
pub mod space;
pub mod split;

pub use bospace::{BoNode, BoSpace};
pub use context::{Context, NodeInfo};
pub use driver::{Driver, Limits, Propagator, SearchStatus};
pub use node::{NcspNode, NodeIndex};
pub use propagator::{NcspACID, NcspHC4, NcspHC4Newton};
pub use selector::{Lf, Rr, Selector, Sf, Slf, Ssr};
pub use space::{Bfs, Dfs, Dmdfs, HybridDfs, HybridDfsStyle, SearchSpace};
pub use split::NcspSplit;
