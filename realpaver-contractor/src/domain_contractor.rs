//! The domain contractor: keeps a variable's working interval consistent
//! with the hull of its declared (possibly disconnected) domain.

use crate::contractor::Contractor;
use crate::error::ContractorResult;
use realpaver_dag::{Dag, Proof};
use realpaver_model::{Domain, IntervalBox, Scope, VarId};

/// For every variable whose declared domain is a union or range (not a
/// single `Interval`), assigns the box's interval to `hull(box ∩
/// domain)`. Variables with a connected `Interval` domain are not
/// tracked here — nothing to contract against beyond what other
/// contractors already enforce.
pub struct DomainContractor {
    scope: Scope,
    domains: Vec<(VarId, Domain)>,
}

impl DomainContractor {
    pub fn new(domains: Vec<(VarId, Domain)>) -> Self {
        let tracked: Vec<(VarId, Domain)> = domains.into_iter().filter(|(_, d)| !d.is_connected()).collect();
        let scope = Scope::from_ids(tracked.iter().map(|(v, _)| *v).collect());
        DomainContractor { scope, domains: tracked }
    }
}

impl Contractor for DomainContractor {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn contract(&self, _dag: &Dag, box_: &mut IntervalBox) -> ContractorResult<Proof> {
        for (v, d) in &self.domains {
            let current = box_.get(*v).unwrap_or(realpaver_interval::Interval::empty());
            if current.is_empty() {
                return Ok(Proof::Empty);
            }
            let mut d = d.clone();
            d.contract_with(&current);
            if d.is_empty() {
                return Ok(Proof::Empty);
            }
            box_.set(*v, d.hull()).ok();
        }
        // Hull-intersection against a declared domain narrows but never
        // certifies feasibility: every point of the narrowed hull still
        // needs checking against the union's gaps and every other
        // constraint.
        Ok(Proof::Maybe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realpaver_interval::{Interval, IntervalUnion};
    use realpaver_model::Domain;

    #[test]
    fn contracts_box_to_hull_of_intersection() {
        let v = VarId::new(0);
        let u = IntervalUnion::from_intervals(vec![Interval::new(0.0, 1.0), Interval::new(5.0, 6.0)]);
        let dc = DomainContractor::new(vec![(v, Domain::IntervalUnion(u))]);
        let scope = Scope::from_ids(vec![v]);
        let mut b = IntervalBox::new(scope, vec![Interval::new(0.5, 5.5)]).unwrap();
        let dag = Dag::new();
        let proof = dc.contract(&dag, &mut b).unwrap();
        assert_ne!(proof, Proof::Empty);
        let after = b.get(v).unwrap();
        assert_eq!(after, Interval::new(0.5, 5.5));
    }

    #[test]
    fn connected_interval_domain_is_not_tracked() {
        let v = VarId::new(0);
        let dc = DomainContractor::new(vec![(v, Domain::Interval(Interval::new(0.0, 1.0)))]);
        assert!(dc.scope().is_empty());
    }
}
