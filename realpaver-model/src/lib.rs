//! # realpaver-model: variables, domains, scopes and boxes
//!
//! This crate owns the vocabulary every higher layer shares: a
//! [`Variable`] has a [`Domain`] (real interval, integer range, a union of
//! either, or a binary [`ZeroOne`]); a [`Scope`] is the ordered set of
//! variables a function or constraint depends on, deduplicated process-wide
//! through a [`ScopeBank`]; and a [`DomainBox`]/[`IntervalBox`] pairs a
//! scope with a dense vector of per-variable state.

pub mod domain;
pub mod error;
pub mod ibox;
pub mod scope;
pub mod var;

pub use domain::{Domain, ZeroOne};
pub use error::{ModelError, ModelResult};
pub use ibox::{DomainBox, IntervalBox};
pub use scope::{Scope, ScopeBank};
pub use var::{Tolerance, VarId, VarKind, Variable};
