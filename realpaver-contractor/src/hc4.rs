//! HC4: forward evaluation plus one backward (reverse) projection pass
//! through a single constraint's expression tree.

use crate::contractor::Contractor;
use crate::error::ContractorResult;
use realpaver_dag::{Dag, DagFun, Proof};
use realpaver_model::{IntervalBox, Scope};

pub struct Hc4 {
    fun: DagFun,
}

impl Hc4 {
    pub fn new(fun: DagFun) -> Self {
        Hc4 { fun }
    }

    pub fn fun(&self) -> &DagFun {
        &self.fun
    }
}

impl Contractor for Hc4 {
    fn scope(&self) -> &Scope {
        self.fun.scope()
    }

    fn contract(&self, dag: &Dag, box_: &mut IntervalBox) -> ContractorResult<Proof> {
        Ok(self.fun.hc4_revise(dag, box_)?)
    }
}
