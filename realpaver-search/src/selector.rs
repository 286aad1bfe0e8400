//! Variable selectors used by [`crate::split::NcspSplit`]: RR, LF, SF,
//! SLF and SSR.

use crate::context::Context;
use crate::node::NcspNode;
use realpaver_contractor::SmearSumRel;
use realpaver_dag::Dag;
use realpaver_model::{Domain, Scope, Tolerance, VarId, VarKind, Variable};

fn is_splittable(var: &Variable, domain: &Domain) -> bool {
    !var.is_canonical(domain)
}

/// `size(domain) / tolerance`, so LF/SF compare variables of different
/// tolerances on the same scale. Integer domains use raw cardinality
/// (tolerance is a discreteness threshold there, not a rescaling).
fn normalized_size(var: &Variable, domain: &Domain) -> f64 {
    match var.kind() {
        VarKind::Integer | VarKind::Binary => domain.size(),
        VarKind::Real => match var.tolerance() {
            Tolerance::Absolute(tol) if tol > 0.0 => domain.size() / tol,
            Tolerance::Relative(tol) if tol > 0.0 => domain.size() / (tol * domain.hull().mag().max(1.0)),
            _ => domain.size(),
        },
    }
}

/// Finds `var`'s `Variable` record by id.
fn lookup(vars: &[Variable], id: VarId) -> Option<&Variable> {
    vars.iter().find(|v| v.id() == id)
}

pub trait Selector {
    fn scope(&self) -> &Scope;

    /// `None` if every variable in scope is already canonical (the node
    /// cannot be split further).
    fn select_var(&self, node: &NcspNode, ctx: &Context, vars: &[Variable]) -> Option<VarId>;
}

/// Round-robin: starting from the successor (in scope order) of the
/// variable split at the parent node, scans for the first splittable
/// variable, wrapping once.
pub struct Rr {
    scope: Scope,
}

impl Rr {
    pub fn new(scope: Scope) -> Self {
        Rr { scope }
    }
}

impl Selector for Rr {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn select_var(&self, node: &NcspNode, ctx: &Context, vars: &[Variable]) -> Option<VarId> {
        let ids = self.scope.ids();
        if ids.is_empty() {
            return None;
        }
        let start = match node.parent().and_then(|p| ctx.split_var(p)) {
            Some(v) => self.scope.index(v).map(|i| (i + 1) % ids.len()).unwrap_or(0),
            None => 0,
        };
        for offset in 0..ids.len() {
            let id = ids[(start + offset) % ids.len()];
            let var = lookup(vars, id)?;
            let domain = node.domain_box().get(id).ok()?;
            if is_splittable(var, domain) {
                return Some(id);
            }
        }
        None
    }
}

/// Largest-first: the splittable variable with the largest normalized
/// size.
pub struct Lf {
    scope: Scope,
}

impl Lf {
    pub fn new(scope: Scope) -> Self {
        Lf { scope }
    }
}

impl Selector for Lf {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn select_var(&self, node: &NcspNode, _ctx: &Context, vars: &[Variable]) -> Option<VarId> {
        best_by(&self.scope, node, vars, |a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }
}

/// Smallest-first: the dual of [`Lf`].
pub struct Sf {
    scope: Scope,
}

impl Sf {
    pub fn new(scope: Scope) -> Self {
        Sf { scope }
    }
}

impl Selector for Sf {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn select_var(&self, node: &NcspNode, _ctx: &Context, vars: &[Variable]) -> Option<VarId> {
        best_by(&self.scope, node, vars, |a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal))
    }
}

fn best_by(scope: &Scope, node: &NcspNode, vars: &[Variable], better: impl Fn(&f64, &f64) -> std::cmp::Ordering) -> Option<VarId> {
    let mut best: Option<(VarId, f64)> = None;
    for &id in scope.ids() {
        let var = lookup(vars, id)?;
        let domain = node.domain_box().get(id).ok()?;
        if !is_splittable(var, domain) {
            continue;
        }
        let size = normalized_size(var, domain);
        let keep = match &best {
            None => true,
            Some((_, b)) => better(&size, b) == std::cmp::Ordering::Greater,
        };
        if keep {
            best = Some((id, size));
        }
    }
    best.map(|(id, _)| id)
}

/// Mixed strategy: among splittable integer variables, the one with
/// smallest cardinality; if none is splittable, falls back to
/// largest-first among the reals.
pub struct Slf {
    scope: Scope,
}

impl Slf {
    pub fn new(scope: Scope) -> Self {
        Slf { scope }
    }
}

impl Selector for Slf {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn select_var(&self, node: &NcspNode, ctx: &Context, vars: &[Variable]) -> Option<VarId> {
        let mut best_int: Option<(VarId, f64)> = None;
        for &id in self.scope.ids() {
            let var = lookup(vars, id)?;
            if !matches!(var.kind(), VarKind::Integer | VarKind::Binary) {
                continue;
            }
            let domain = node.domain_box().get(id).ok()?;
            if !is_splittable(var, domain) {
                continue;
            }
            let size = domain.size();
            if best_int.as_ref().map(|(_, b)| size < *b).unwrap_or(true) {
                best_int = Some((id, size));
            }
        }
        if let Some((id, _)) = best_int {
            return Some(id);
        }
        Lf::new(self.scope.clone()).select_var(node, ctx, vars)
    }
}

/// Smear-sum-relative: the splittable variable maximizing the
/// [`SmearSumRel`] score over the node's current box. Unlike the other
/// selectors, ranking requires the dag the underlying functions were
/// built from, so `Ssr` is driven through [`Ssr::select_var`] directly
/// rather than through the [`Selector`] trait object.
pub struct Ssr {
    ssr: SmearSumRel,
}

impl Ssr {
    pub fn new(ssr: SmearSumRel) -> Self {
        Ssr { ssr }
    }

    pub fn scope(&self) -> &Scope {
        self.ssr.scope()
    }

    pub fn select_var(&self, dag: &Dag, node: &NcspNode, vars: &[Variable]) -> Option<VarId> {
        let ibox = node.domain_box().to_interval_box();
        let ranked = self.ssr.ranked_vars(dag, &ibox);
        for id in ranked {
            let var = lookup(vars, id)?;
            let domain = node.domain_box().get(id).ok()?;
            if is_splittable(var, domain) {
                return Some(id);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realpaver_interval::Interval;
    use realpaver_model::{DomainBox, Tolerance};

    fn vars() -> Vec<Variable> {
        vec![
            Variable::new(VarId::new(0), "x", VarKind::Real, Domain::Interval(Interval::new(0.0, 10.0)), Tolerance::Absolute(1e-8)),
            Variable::new(VarId::new(1), "y", VarKind::Real, Domain::Interval(Interval::new(0.0, 1.0)), Tolerance::Absolute(1e-8)),
        ]
    }

    fn node_with(x: Interval, y: Interval) -> NcspNode {
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let b = DomainBox::new(scope, vec![Domain::Interval(x), Domain::Interval(y)]).unwrap();
        NcspNode::root(b, 0)
    }

    #[test]
    fn lf_picks_widest_variable() {
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let lf = Lf::new(scope);
        let node = node_with(Interval::new(0.0, 10.0), Interval::new(0.0, 1.0));
        let ctx = Context::new();
        assert_eq!(lf.select_var(&node, &ctx, &vars()), Some(VarId::new(0)));
    }

    #[test]
    fn sf_picks_narrowest_variable() {
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let sf = Sf::new(scope);
        let node = node_with(Interval::new(0.0, 10.0), Interval::new(0.0, 1.0));
        let ctx = Context::new();
        assert_eq!(sf.select_var(&node, &ctx, &vars()), Some(VarId::new(1)));
    }

    #[test]
    fn rr_wraps_to_successor_of_parent_split() {
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let rr = Rr::new(scope);
        let b = node_with(Interval::new(0.0, 10.0), Interval::new(0.0, 1.0)).domain_box().clone();
        let root = NcspNode::root(b.clone(), 0);
        let child = root.child(b, 1);
        let mut ctx = Context::new();
        ctx.insert(0, crate::context::NodeInfo::SplitVar(VarId::new(0)));
        assert_eq!(rr.select_var(&child, &ctx, &vars()), Some(VarId::new(1)));
    }

    #[test]
    fn none_when_all_canonical() {
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let lf = Lf::new(scope);
        let node = node_with(Interval::singleton(5.0), Interval::singleton(0.5));
        let ctx = Context::new();
        assert_eq!(lf.select_var(&node, &ctx, &vars()), None);
    }
}
