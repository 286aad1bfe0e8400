//! # realpaver-contractor: the contractor algebra
//!
//! A contractor is a sound operator `X -> X'` with `X' ⊆ X` that never
//! discards a solution. This crate provides the primitive contractors
//! (HC4, BC3-Revise, BC4, affine revise, CID, 3B/3BCID, ACID, interval
//! Newton), the composites that combine them (list, fixpoint
//! propagation), the slicers that split a domain into consistency-tested
//! pieces, [`factory::ContractorFactory`] which assembles the standard
//! propagation pipeline for a problem, and the RLT linear relaxation.

pub mod acid;
pub mod affine_creator;
pub mod bc3;
pub mod bc4;
pub mod cid;
pub mod contractor;
pub mod domain_contractor;
pub mod error;
pub mod factory;
pub mod hc4;
pub mod newton;
pub mod rlt;
pub mod slicer;
pub mod smear;

pub use acid::Acid;
pub use affine_creator::{AffineCreator, AffineRevise};
pub use bc3::Bc3Revise;
pub use bc4::Bc4;
pub use cid::{Cid, ThreeB, ThreeBCid, Var3BCid, VarCid};
pub use contractor::{Contractor, ConstraintContractor, List, Propag};
pub use domain_contractor::DomainContractor;
pub use error::{ContractorError, ContractorResult};
pub use factory::{ContractorFactory, Params};
pub use hc4::Hc4;
pub use newton::IntervalNewton;
pub use realpaver_dag::Proof;
pub use rlt::{LinExpr, LinVar, LinearSolverSink, RecordingSink, RltRelaxer};
pub use slicer::{DomainSlicer, IntervalSlicer, RangeSlicer};
pub use smear::SmearSumRel;
