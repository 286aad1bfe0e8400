//! Constructive Interval Disjunction ([`Cid`]) and 3B-style shaving
//! ([`ThreeB`]), plus their composition ([`ThreeBCid`]). [`VarCid`] and
//! [`Var3BCid`] are the same contractors under the names ACID binds them
//! to — see the Open Question note in `DESIGN.md` on why this crate
//! keeps one implementation rather than a parallel box-level/variable-level
//! pair.

use crate::contractor::Contractor;
use crate::error::ContractorResult;
use crate::slicer::IntervalSlicer;
use realpaver_dag::{Dag, Proof};
use realpaver_interval::Interval;
use realpaver_model::{IntervalBox, Scope, VarId};

/// Slices `var`'s domain with `slicer`, runs `op` on each resulting
/// facet, and returns the hull (over `op`'s whole scope) of the facets
/// that survive. A single slice degenerates to running `op` directly.
pub struct Cid {
    op: Box<dyn Contractor>,
    var: VarId,
    slicer: IntervalSlicer,
}

impl Cid {
    pub fn new(op: Box<dyn Contractor>, var: VarId, slicer: IntervalSlicer) -> Self {
        Cid { op, var, slicer }
    }

    pub fn var(&self) -> VarId {
        self.var
    }
}

impl Contractor for Cid {
    fn scope(&self) -> &Scope {
        self.op.scope()
    }

    fn contract(&self, dag: &Dag, box_: &mut IntervalBox) -> ContractorResult<Proof> {
        let dom = box_.get(self.var).unwrap_or(Interval::empty());
        let slices = self.slicer.slice(&dom)?;
        if slices.len() <= 1 {
            return self.op.contract(dag, box_);
        }

        let init = box_.clone();
        let mut merged: Option<(Vec<Interval>, Proof)> = None;
        for s in slices {
            let mut slice_box = init.clone();
            slice_box.set(self.var, s).ok();
            let certif = self.op.contract(dag, &mut slice_box)?;
            if certif == Proof::Empty {
                continue;
            }
            let values: Vec<Interval> = self.op.scope().iter().map(|v| slice_box.get(v).unwrap_or(Interval::empty())).collect();
            merged = Some(match merged {
                None => (values, certif),
                Some((acc, acc_proof)) => {
                    let hulled = acc.iter().zip(values.iter()).map(|(a, b)| a.hull(b)).collect();
                    (hulled, acc_proof.min(certif))
                }
            });
        }

        match merged {
            None => Ok(Proof::Empty),
            Some((values, proof)) => {
                for (v, x) in self.op.scope().iter().zip(values) {
                    box_.set(v, x).ok();
                }
                Ok(proof)
            }
        }
    }
}

/// Shaves outermost inconsistent slices off both ends of `var`'s domain:
/// slices it with `slicer`, drops leading facets on which `op` reports
/// `Empty`, then trailing facets likewise, and keeps the interval
/// spanning what remains.
pub struct ThreeB {
    op: Box<dyn Contractor>,
    var: VarId,
    slicer: IntervalSlicer,
}

impl ThreeB {
    pub fn new(op: Box<dyn Contractor>, var: VarId, slicer: IntervalSlicer) -> Self {
        ThreeB { op, var, slicer }
    }

    pub fn var(&self) -> VarId {
        self.var
    }
}

impl Contractor for ThreeB {
    fn scope(&self) -> &Scope {
        self.op.scope()
    }

    fn contract(&self, dag: &Dag, box_: &mut IntervalBox) -> ContractorResult<Proof> {
        let dom = box_.get(self.var).unwrap_or(Interval::empty());
        let slices = self.slicer.slice(&dom)?;
        let n = slices.len();
        if n <= 1 {
            return self.op.contract(dag, box_);
        }

        let test = |s: Interval| -> ContractorResult<bool> {
            let mut facet = box_.clone();
            facet.set(self.var, s).ok();
            Ok(self.op.contract(dag, &mut facet)? != Proof::Empty)
        };

        let mut left = 0usize;
        while left < n && !test(slices[left])? {
            left += 1;
        }
        if left == n {
            return Ok(Proof::Empty);
        }

        let mut right = n - 1;
        while right > left && !test(slices[right])? {
            right -= 1;
        }

        let kept = slices[left].hull(&slices[right]);
        box_.set(self.var, dom.intersection(&kept)).ok();
        Ok(Proof::Maybe)
    }
}

/// Runs [`ThreeB`]; if that strictly narrowed `var`'s domain, follows up
/// with [`Cid`] on the shaved remainder (shaving alone, with no further
/// gain, is cheaper than re-slicing for CID).
pub struct ThreeBCid {
    var: VarId,
    three_b: ThreeB,
    cid: Cid,
}

impl ThreeBCid {
    pub fn new(op3b: Box<dyn Contractor>, opcid: Box<dyn Contractor>, var: VarId, slicer3b: IntervalSlicer, slicer_cid: IntervalSlicer) -> Self {
        ThreeBCid { var, three_b: ThreeB::new(op3b, var, slicer3b), cid: Cid::new(opcid, var, slicer_cid) }
    }

    pub fn var(&self) -> VarId {
        self.var
    }
}

impl Contractor for ThreeBCid {
    fn scope(&self) -> &Scope {
        self.three_b.scope()
    }

    fn contract(&self, dag: &Dag, box_: &mut IntervalBox) -> ContractorResult<Proof> {
        let before = box_.get(self.var).unwrap_or(Interval::empty());
        let proof = self.three_b.contract(dag, box_)?;
        if proof == Proof::Empty {
            return Ok(Proof::Empty);
        }
        let after = box_.get(self.var).unwrap_or(Interval::empty());
        if after == before {
            return Ok(Proof::Maybe);
        }
        self.cid.contract(dag, box_)
    }
}

pub type VarCid = Cid;
pub type Var3BCid = ThreeBCid;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hc4::Hc4;
    use realpaver_dag::{BinOp, Constraint};
    use realpaver_model::Scope;

    fn sum_eq_one() -> (Dag, Box<dyn Contractor>, Scope) {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let y = dag.insert_var(VarId::new(1));
        let root = dag.insert_bin(BinOp::Add, x, y).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let constraint = Constraint::eq(root, scope.clone());
        let hc4: Box<dyn Contractor> = Box::new(Hc4::new(constraint.to_fun()));
        (dag, hc4, scope)
    }

    #[test]
    fn cid_returns_hull_of_surviving_slices() {
        let (dag, hc4, scope) = sum_eq_one();
        let cid = Cid::new(hc4, VarId::new(0), IntervalSlicer::Partition { n: 4 });
        let mut b = IntervalBox::new(scope, vec![Interval::new(0.0, 1.0), Interval::new(0.0, 1.0)]).unwrap();
        let proof = cid.contract(&dag, &mut b).unwrap();
        assert_ne!(proof, Proof::Empty);
    }

    #[test]
    fn three_b_shaves_outer_slices() {
        let (dag, hc4, scope) = sum_eq_one();
        let threeb = ThreeB::new(hc4, VarId::new(0), IntervalSlicer::Partition { n: 4 });
        let mut b = IntervalBox::new(scope, vec![Interval::new(-10.0, 10.0), Interval::new(0.0, 1.0)]).unwrap();
        let proof = threeb.contract(&dag, &mut b).unwrap();
        assert_ne!(proof, Proof::Empty);
        let after = b.get(VarId::new(0)).unwrap();
        assert!(after.width() < 20.0);
    }
}
