//! # realpaver-interval: rigorous interval and affine arithmetic
//!
//! This crate is the reliable-arithmetic kernel the rest of the solver
//! trusts: every public operation returns the smallest representable
//! enclosure of the mathematical result, rounded outward using
//! [`realpaver_num::rounding`].
//!
//! - [`Interval`] / [`IntervalUnion`]: closed (possibly disconnected)
//!   subsets of the extended reals, with set operations, arithmetic,
//!   elementary functions, and the projection operators (`mulPX`, …) that
//!   drive reverse propagation.
//! - [`Range`] / [`RangeUnion`]: the integer-domain analogues.
//! - [`AffineForm`]: AF1 affine arithmetic with interval coefficients,
//!   used where correlation between operations (not just their final
//!   range) matters — e.g. as a cheaper, often-tighter alternative to
//!   repeated interval evaluation inside a contractor.

pub mod affine;
pub mod interval;
pub mod interval_union;
pub mod range;
pub mod range_union;

pub use affine::{AffineForm, Linearization};
pub use interval::Interval;
pub use interval_union::IntervalUnion;
pub use range::Range;
pub use range_union::RangeUnion;
