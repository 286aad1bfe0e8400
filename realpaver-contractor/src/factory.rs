//! [`ContractorFactory`]: assembles the standard propagation pipelines
//! (HC4, BC4, HC4+Newton, ACID) from a problem's constraints, and
//! [`Params`]: the parameter surface those pipelines read from.

use crate::acid::Acid;
use crate::bc4::Bc4;
use crate::cid::{ThreeBCid, Var3BCid};
use crate::contractor::{Contractor, List, Propag};
use crate::domain_contractor::DomainContractor;
use crate::error::ContractorResult;
use crate::hc4::Hc4;
use crate::newton::IntervalNewton;
use crate::slicer::IntervalSlicer;
use crate::smear::SmearSumRel;
use realpaver_dag::{Constraint, Dag, DagFun, Relation};
use realpaver_model::{Domain, Scope, VarId};

/// The parameter surface every contractor-building method reads from.
/// Field names follow the source's parameter-file keys; the defaults
/// below are typical values for this family of solver, not measured
/// against a retrieved defaults file (none was present in the corpus).
#[derive(Debug, Clone, Copy)]
pub struct Params {
    pub bc3_peel_factor: f64,
    pub bc3_iter_limit: u32,
    pub newton_rel_tol: f64,
    pub newton_iter_limit: u32,
    pub inflation_delta: f64,
    pub inflation_chi: f64,
    pub propagation_rel_tol: f64,
    pub propagation_abs_tol: f64,
    pub propagation_iter_limit: u32,
    pub nb_slice_3b: u32,
    pub nb_slice_cid: u32,
    pub acid_learn_length: usize,
    pub acid_cycle_length: usize,
    pub acid_ct_ratio: f64,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            bc3_peel_factor: 10.0,
            bc3_iter_limit: 30,
            newton_rel_tol: 1.0e-8,
            newton_iter_limit: 30,
            inflation_delta: 1.125,
            inflation_chi: 0.01,
            propagation_rel_tol: 1.0e-8,
            propagation_abs_tol: 1.0e-10,
            propagation_iter_limit: 50,
            nb_slice_3b: 7,
            nb_slice_cid: 3,
            acid_learn_length: 50,
            acid_cycle_length: 1000,
            acid_ct_ratio: 0.01,
        }
    }
}

/// Splits a problem's constraints into equations and inequalities over a
/// shared dag, and builds the standard contractor pipelines from them.
pub struct ContractorFactory<'a> {
    dag: &'a Dag,
    equations: Vec<DagFun>,
    inequalities: Vec<DagFun>,
    scope: Scope,
    domains: Vec<(VarId, Domain)>,
    params: Params,
}

impl<'a> ContractorFactory<'a> {
    /// `constraints` are already dag-backed (built against `dag`);
    /// `domains` lists every variable's declared domain, used to build
    /// the domain contractor for the variables whose domain isn't a
    /// single connected interval.
    pub fn new(dag: &'a Dag, constraints: &[Constraint], domains: Vec<(VarId, Domain)>, params: Params) -> Self {
        let mut equations = Vec::new();
        let mut inequalities = Vec::new();
        let mut scope = Scope::empty();
        for c in constraints {
            scope = scope.union(c.scope());
            let fun = c.to_fun();
            if c.relation() == Relation::Eq {
                equations.push(fun);
            } else {
                inequalities.push(fun);
            }
        }
        ContractorFactory { dag, equations, inequalities, scope, domains, params }
    }

    pub fn dag(&self) -> &'a Dag {
        self.dag
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// One [`DomainContractor`] covering every variable (equation,
    /// inequality, or otherwise declared) whose domain isn't a single
    /// connected interval.
    pub fn make_domain_contractor(&self) -> DomainContractor {
        DomainContractor::new(self.domains.clone())
    }

    fn ssr(&self) -> SmearSumRel {
        let funs: Vec<DagFun> = self.equations.iter().chain(self.inequalities.iter()).cloned().collect();
        SmearSumRel::new(funs, self.scope.clone())
    }

    /// HC4 on every equation and inequality, plus the domain contractor
    /// if any variable needs one, composed as a fixpoint [`Propag`].
    pub fn make_hc4(&self) -> Propag {
        let mut pool: Vec<Box<dyn Contractor>> = Vec::new();
        for fun in self.equations.iter().chain(self.inequalities.iter()) {
            pool.push(Box::new(Hc4::new(fun.clone())));
        }
        let dop = self.make_domain_contractor();
        if dop.scope().len() > 0 {
            pool.push(Box::new(dop));
        }
        Propag::new(pool, self.params.propagation_rel_tol, self.params.propagation_iter_limit)
    }

    /// BC4 on every equation and inequality, plus the domain contractor,
    /// composed as a fixpoint [`Propag`].
    pub fn make_bc4(&self) -> ContractorResult<Propag> {
        let mut pool: Vec<Box<dyn Contractor>> = Vec::new();
        for fun in self.equations.iter().chain(self.inequalities.iter()) {
            pool.push(Box::new(Bc4::new(self.dag, fun.clone(), self.params.bc3_peel_factor, self.params.bc3_iter_limit)?));
        }
        let dop = self.make_domain_contractor();
        if dop.scope().len() > 0 {
            pool.push(Box::new(dop));
        }
        Ok(Propag::new(pool, self.params.propagation_rel_tol, self.params.propagation_iter_limit))
    }

    /// The interval Newton operator over the equation system, if it is
    /// square (at least two equations, as many equations as variables in
    /// their combined scope); `None` otherwise.
    pub fn make_interval_newton(&self) -> Option<IntervalNewton> {
        let eq_scope = self.equations.iter().fold(Scope::empty(), |acc, f| acc.union(f.scope()));
        if self.equations.len() < 2 || self.equations.len() != eq_scope.len() {
            return None;
        }
        Some(IntervalNewton::new(
            self.equations.clone(),
            eq_scope,
            self.params.newton_rel_tol,
            self.params.newton_iter_limit,
            self.params.inflation_delta,
            self.params.inflation_chi,
        ))
    }

    /// HC4 followed by interval Newton when the equation system is
    /// square, HC4 alone otherwise.
    pub fn make_hc4_newton(&self) -> Box<dyn Contractor> {
        let hc4 = self.make_hc4();
        match self.make_interval_newton() {
            Some(newton) => Box::new(List::new(vec![Box::new(hc4), Box::new(newton)])),
            None => Box::new(hc4),
        }
    }

    /// ACID: HC4 as the learning-phase fallback and exploit-phase
    /// base, ranked by SmearSumRel, shaving with `Var3BCid` sliced by
    /// `nb_slice_3b`/`nb_slice_cid`.
    pub fn make_acid(&self) -> ContractorResult<Acid> {
        let ssr = self.ssr();
        let hc4 = self.make_hc4();
        let var3bcid: ContractorResult<Vec<Var3BCid>> = self
            .scope
            .ids()
            .iter()
            .map(|&v| {
                let op3b: Box<dyn Contractor> = Box::new(self.make_hc4());
                let opcid: Box<dyn Contractor> = Box::new(self.make_hc4());
                Ok(ThreeBCid::new(
                    op3b,
                    opcid,
                    v,
                    IntervalSlicer::Partition { n: self.params.nb_slice_3b },
                    IntervalSlicer::Partition { n: self.params.nb_slice_cid },
                ))
            })
            .collect();
        Acid::new(
            ssr,
            Box::new(hc4),
            var3bcid?,
            self.params.acid_learn_length,
            self.params.acid_cycle_length,
            self.params.acid_ct_ratio,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realpaver_dag::{BinOp, Proof};
    use realpaver_interval::Interval;
    use realpaver_model::IntervalBox;

    fn sum_and_product() -> (Dag, Vec<Constraint>, Scope) {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let y = dag.insert_var(VarId::new(1));
        let sum = dag.insert_bin(BinOp::Add, x, y).unwrap();
        let prod = dag.insert_bin(BinOp::Mul, x, y).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let c1 = Constraint::eq(sum, scope.clone());
        let c2 = Constraint::eq(prod, scope.clone());
        (dag, vec![c1, c2], scope)
    }

    #[test]
    fn make_hc4_contracts_both_equations() {
        let (dag, constraints, scope) = sum_and_product();
        let factory = ContractorFactory::new(&dag, &constraints, vec![], Params::default());
        let hc4 = factory.make_hc4();
        let mut b = IntervalBox::new(scope, vec![Interval::new(-1.0, 3.0), Interval::new(-1.0, 3.0)]).unwrap();
        let proof = hc4.contract(&dag, &mut b).unwrap();
        assert_ne!(proof, Proof::Empty);
    }

    #[test]
    fn make_interval_newton_present_for_square_system() {
        let (dag, constraints, _scope) = sum_and_product();
        let factory = ContractorFactory::new(&dag, &constraints, vec![], Params::default());
        assert!(factory.make_interval_newton().is_some());
    }

    #[test]
    fn make_interval_newton_absent_for_single_equation() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let c = dag.insert_const(Interval::singleton(1.0));
        let root = dag.insert_bin(BinOp::Add, x, c).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0)]);
        let constraints = vec![Constraint::eq(root, scope)];
        let factory = ContractorFactory::new(&dag, &constraints, vec![], Params::default());
        assert!(factory.make_interval_newton().is_none());
    }

    #[test]
    fn make_acid_runs_without_emptying_a_feasible_box() {
        let (dag, constraints, scope) = sum_and_product();
        let factory = ContractorFactory::new(&dag, &constraints, vec![], Params::default());
        let acid = factory.make_acid().unwrap();
        let mut b = IntervalBox::new(scope, vec![Interval::new(-1.0, 3.0), Interval::new(-1.0, 3.0)]).unwrap();
        let proof = acid.contract(&dag, &mut b).unwrap();
        assert_ne!(proof, Proof::Empty);
    }
}
