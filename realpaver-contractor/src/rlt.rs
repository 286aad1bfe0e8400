//! RLT (Reformulation-Linearization Technique) relaxation: emits one
//! linear variable per dag node plus a defining constraint, to an
//! opaque LP/MIP solver reachable only through [`LinearSolverSink`].
//!
//! `Add`/`Sub` get an exact linear reformulation and `Mul` the standard
//! four-inequality McCormick envelope. Every other node kind is left
//! unconstrained upstream; here it instead gets a linear envelope
//! derived from [`AffineCreator`]'s linearization, which is sound (every
//! feasible point of the node stays feasible in the relaxation) but not
//! as tight as a bespoke envelope would be.

use crate::affine_creator::AffineCreator;
use crate::error::ContractorResult;
use realpaver_dag::{BinOp, Dag, NodeKind};
use realpaver_interval::Interval;
use realpaver_model::{IntervalBox, VarId};

pub type LinVar = usize;

/// A sparse linear combination `Σ coeffs[i] * vars[i]`.
#[derive(Debug, Clone, Default)]
pub struct LinExpr {
    pub coeffs: Vec<f64>,
    pub vars: Vec<LinVar>,
}

impl LinExpr {
    pub fn new(coeffs: Vec<f64>, vars: Vec<LinVar>) -> Self {
        debug_assert_eq!(coeffs.len(), vars.len());
        LinExpr { coeffs, vars }
    }
}

/// The boundary to an external linear/mixed-integer solver. Realpaver
/// never implements a solver itself; it only ever builds a model through
/// this trait and reads bounds back from whatever the caller wires up.
pub trait LinearSolverSink {
    fn make_var(&mut self, lo: f64, up: f64) -> LinVar;
    fn set_integer(&mut self, v: LinVar);
    fn add_ctr(&mut self, lo: f64, expr: LinExpr, up: f64);
}

/// A [`LinearSolverSink`] that records the model instead of solving it.
/// Useful for tests and for callers who want to inspect or translate the
/// relaxation before handing it to a real solver.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub bounds: Vec<(f64, f64)>,
    pub integer: Vec<bool>,
    pub ctrs: Vec<(f64, LinExpr, f64)>,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink::default()
    }
}

impl LinearSolverSink for RecordingSink {
    fn make_var(&mut self, lo: f64, up: f64) -> LinVar {
        self.bounds.push((lo, up));
        self.integer.push(false);
        self.bounds.len() - 1
    }

    fn set_integer(&mut self, v: LinVar) {
        self.integer[v] = true;
    }

    fn add_ctr(&mut self, lo: f64, expr: LinExpr, up: f64) {
        self.ctrs.push((lo, expr, up));
    }
}

/// Walks a dag over a box and emits its linear relaxation into a sink.
pub struct RltRelaxer<'a> {
    dag: &'a Dag,
}

impl<'a> RltRelaxer<'a> {
    pub fn new(dag: &'a Dag) -> Self {
        RltRelaxer { dag }
    }

    /// Creates one linear variable per node (bounded by the node's
    /// current interval value) and constrains it against its operands,
    /// in arena order so every operand's `LinVar` exists before its
    /// parent's is built. Returns the per-node `LinVar` table. `int_vars`
    /// marks which original variables are integral.
    pub fn relax<S: LinearSolverSink>(&self, sink: &mut S, box_: &IntervalBox, int_vars: &[VarId]) -> ContractorResult<Vec<LinVar>> {
        let vals = self.dag.interval_eval(|v| box_.get(v).unwrap_or(Interval::universe()));
        let mut creator = AffineCreator::new(self.dag);
        let mut linvars: Vec<LinVar> = Vec::with_capacity(self.dag.len());

        for id in 0..self.dag.len() {
            let val = vals[id];
            let lo = if val.lo().is_finite() { val.lo() } else { -1.0e30 };
            let hi = if val.hi().is_finite() { val.hi() } else { 1.0e30 };
            let v = sink.make_var(lo, hi);
            linvars.push(v);

            let node = self.dag.node(id)?;
            match &node.kind {
                NodeKind::Const(_) => {}
                NodeKind::Var(var) => {
                    if int_vars.contains(var) {
                        sink.set_integer(v);
                    }
                }
                NodeKind::Bin(BinOp::Add, a, b) => {
                    let (x, y) = (linvars[*a], linvars[*b]);
                    sink.add_ctr(0.0, LinExpr::new(vec![1.0, -1.0, -1.0], vec![v, x, y]), 0.0);
                }
                NodeKind::Bin(BinOp::Sub, a, b) => {
                    let (x, y) = (linvars[*a], linvars[*b]);
                    sink.add_ctr(0.0, LinExpr::new(vec![1.0, -1.0, 1.0], vec![v, x, y]), 0.0);
                }
                NodeKind::Bin(BinOp::Mul, a, b) => {
                    let (x, y) = (linvars[*a], linvars[*b]);
                    mccormick(sink, v, vals[*a], vals[*b], x, y);
                }
                _ => {
                    self.affine_envelope(sink, v, id, box_, &mut creator, &linvars)?;
                }
            }
        }
        Ok(linvars)
    }

    /// Falls back to the node's affine form for anything the exact
    /// reformulation above doesn't cover (`Div`, `Min`, `Max`, `Pow`,
    /// every unary elementary function, `Lin`): `z` is tied to the
    /// affine form's midpoint-coefficient linear part, widened by the
    /// form's own constant and coefficient uncertainty plus its
    /// linearization error so the envelope stays sound.
    fn affine_envelope<S: LinearSolverSink>(
        &self,
        sink: &mut S,
        z: LinVar,
        node_id: usize,
        box_: &IntervalBox,
        creator: &mut AffineCreator,
        linvars: &[LinVar],
    ) -> ContractorResult<()> {
        let form = creator.build(node_id, box_)?;
        if form.is_empty() || form.is_inf() {
            return Ok(());
        }
        let a0 = form.constant_term();
        let err = form.error_term();
        let mut coeffs = vec![1.0];
        let mut vars = vec![z];
        let mut center = a0.midpoint();
        let mut slack = a0.width() / 2.0 + err.hi().max(0.0);

        for (coef, idx) in form.linear_terms() {
            if coef.lo() == 0.0 && coef.hi() == 0.0 {
                continue;
            }
            slack += coef.width() / 2.0;
            let var = VarId::new(idx);
            let xi = match box_.get(var) {
                Ok(x) => x,
                Err(_) => continue,
            };
            if !xi.is_finite() {
                continue;
            }
            let r = xi.width() / 2.0;
            if r <= 0.0 {
                continue;
            }
            let var_node = match self.dag.var_node(var) {
                Some(n) => n,
                None => continue,
            };
            let slope = coef.midpoint() / r;
            coeffs.push(-slope);
            vars.push(linvars[var_node]);
            center -= slope * xi.midpoint();
        }

        sink.add_ctr(center - slack, LinExpr::new(coeffs, vars), center + slack);
        Ok(())
    }
}

/// McCormick envelope for `z = x*y` given the operands' current interval
/// bounds `[a,b] x [c,d]`. Degenerates to an exact linear equality when
/// one operand is a point.
fn mccormick<S: LinearSolverSink>(sink: &mut S, z: LinVar, ix: Interval, iy: Interval, x: LinVar, y: LinVar) {
    let (a, b) = (ix.lo(), ix.hi());
    let (c, d) = (iy.lo(), iy.hi());
    let xvar = a != b;
    let yvar = c != d;

    if xvar && yvar {
        sink.add_ctr(-a * c, LinExpr::new(vec![1.0, -c, -a], vec![z, x, y]), f64::INFINITY);
        sink.add_ctr(f64::NEG_INFINITY, LinExpr::new(vec![1.0, -d, -a], vec![z, x, y]), -a * d);
        sink.add_ctr(f64::NEG_INFINITY, LinExpr::new(vec![1.0, -c, -b], vec![z, x, y]), -b * c);
        sink.add_ctr(-b * d, LinExpr::new(vec![1.0, -d, -b], vec![z, x, y]), f64::INFINITY);
    } else if !xvar {
        sink.add_ctr(0.0, LinExpr::new(vec![1.0, -a], vec![z, y]), 0.0);
    } else if !yvar {
        sink.add_ctr(0.0, LinExpr::new(vec![1.0, -c], vec![z, x]), 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realpaver_dag::{BinOp, UnOp};
    use realpaver_model::Scope;

    #[test]
    fn add_emits_exact_equality() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let y = dag.insert_var(VarId::new(1));
        let root = dag.insert_bin(BinOp::Add, x, y).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let b = IntervalBox::new(scope, vec![Interval::new(0.0, 1.0), Interval::new(0.0, 2.0)]).unwrap();

        let mut sink = RecordingSink::new();
        let relaxer = RltRelaxer::new(&dag);
        let linvars = relaxer.relax(&mut sink, &b, &[]).unwrap();

        assert_eq!(linvars.len(), 3);
        let (lo, expr, up) = &sink.ctrs[root];
        assert_eq!(*lo, 0.0);
        assert_eq!(*up, 0.0);
        assert_eq!(expr.vars, vec![linvars[root], linvars[x], linvars[y]]);
    }

    #[test]
    fn mul_emits_four_mccormick_rows_when_both_operands_vary() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let y = dag.insert_var(VarId::new(1));
        let _root = dag.insert_bin(BinOp::Mul, x, y).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0), VarId::new(1)]);
        let b = IntervalBox::new(scope, vec![Interval::new(1.0, 2.0), Interval::new(3.0, 4.0)]).unwrap();

        let mut sink = RecordingSink::new();
        let relaxer = RltRelaxer::new(&dag);
        relaxer.relax(&mut sink, &b, &[]).unwrap();

        assert_eq!(sink.ctrs.len(), 4);
    }

    #[test]
    fn mul_with_fixed_operand_is_exact_equality() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let c = dag.insert_const(Interval::singleton(3.0));
        let root = dag.insert_bin(BinOp::Mul, x, c).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0)]);
        let b = IntervalBox::new(scope, vec![Interval::new(1.0, 2.0)]).unwrap();

        let mut sink = RecordingSink::new();
        let relaxer = RltRelaxer::new(&dag);
        let linvars = relaxer.relax(&mut sink, &b, &[]).unwrap();

        assert_eq!(sink.ctrs.len(), 1);
        let (lo, expr, up) = &sink.ctrs[0];
        assert_eq!((*lo, *up), (0.0, 0.0));
        assert_eq!(expr.vars, vec![linvars[root], linvars[x]]);
    }

    #[test]
    fn sqr_falls_back_to_a_sound_affine_envelope() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let root = dag.insert_un(UnOp::Sqr, x).unwrap();
        let scope = Scope::from_ids(vec![VarId::new(0)]);
        let b = IntervalBox::new(scope, vec![Interval::new(1.0, 3.0)]).unwrap();

        let mut sink = RecordingSink::new();
        let relaxer = RltRelaxer::new(&dag);
        let linvars = relaxer.relax(&mut sink, &b, &[]).unwrap();

        assert_eq!(sink.ctrs.len(), 1);
        let (lo, expr, up) = &sink.ctrs[0];
        assert!(lo.is_finite() && up.is_finite() && lo <= up);
        assert!(expr.vars.contains(&linvars[root]));
        assert!(expr.vars.contains(&linvars[x]));
    }

    #[test]
    fn discrete_variable_is_marked_integer() {
        let mut dag = Dag::new();
        let x = dag.insert_var(VarId::new(0));
        let scope = Scope::from_ids(vec![VarId::new(0)]);
        let b = IntervalBox::new(scope, vec![Interval::new(0.0, 5.0)]).unwrap();

        let mut sink = RecordingSink::new();
        let relaxer = RltRelaxer::new(&dag);
        let linvars = relaxer.relax(&mut sink, &b, &[VarId::new(0)]).unwrap();

        assert!(sink.integer[linvars[x]]);
    }
}
