//! # realpaver-num: directed rounding and safe integer arithmetic
//!
//! This crate provides the two lowest-level primitives the rest of the
//! solver builds on:
//!
//! - [`rounding`]: outward-rounded floating point operations. Rigorous
//!   interval arithmetic needs every primitive operation to round away
//!   from the true mathematical result, in the direction requested by the
//!   caller, rather than to the nearest representable value.
//! - [`Integer`]: a fixed-width signed integer wrapper whose arithmetic
//!   detects overflow instead of wrapping, plus the floor/ceiling integer
//!   division and square-root helpers the branch-and-prune search needs
//!   for integer-domain variables.
//!
//! Nothing here depends on the rest of the workspace; this crate exists so
//! that [`realpaver-interval`](../realpaver_interval/index.html) and above
//! can assume every float operation they call already rounds the right way.

pub mod integer;
pub mod rounding;

pub use integer::{Integer, IntegerError, IntegerResult};
pub use rounding::{round_down, round_up};
