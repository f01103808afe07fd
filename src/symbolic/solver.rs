/// Path-constraint feasibility and models.
///
/// The translation rules are fixed here: a nameless concrete `Int` is the
/// constant itself, a named `Int` is a free integer variable, `//` is
/// integer division truncating toward zero, `not` is logical negation, and
/// every distinct `ArrayElem` read is a fresh uninterpreted integer —
/// aliasing across reads and writes is deliberately not modelled.
///
/// The default backend searches candidate assignments instead of calling
/// an SMT process: candidates are derived from the constants occurring in
/// the path (`c-1, c, c+1` for each) plus a small fixed set, which is exact
/// for the short linear constraint systems the frontend emits. When the
/// assignment space outgrows its budget the backend answers "sat" — it may
/// keep an infeasible path alive, but it never prunes a feasible one.

use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

use super::expr::{SymExpr, SymOp};
use super::path::PathConstraint;

pub trait Solver {
    fn is_sat(&self, path: &PathConstraint) -> bool;
    fn get_model(&self, path: &PathConstraint) -> Option<BTreeMap<String, i64>>;
}

/// Stand-in for `use_solver = false`: everything is feasible.
pub struct TrustingSolver;

impl Solver for TrustingSolver {
    fn is_sat(&self, _path: &PathConstraint) -> bool {
        true
    }

    fn get_model(&self, _path: &PathConstraint) -> Option<BTreeMap<String, i64>> {
        None
    }
}

// ---------------------------------------------------------------------------
// Expression evaluation under an assignment
// ---------------------------------------------------------------------------

/// The solver-side name of an expression's free variable, if any.
/// Array reads key on their rendered form, so structurally equal reads
/// share one uninterpreted value.
fn var_key(expr: &SymExpr) -> Option<String> {
    match expr {
        SymExpr::Int { name: Some(n), concrete: None } => Some(n.clone()),
        SymExpr::ArrayElem { .. } => Some(expr.to_string()),
        _ => None,
    }
}

fn collect_vars(expr: &SymExpr, out: &mut BTreeSet<String>) {
    if let Some(key) = var_key(expr) {
        out.insert(key);
        return;
    }
    match expr {
        SymExpr::Binary { lhs, rhs, .. } => {
            collect_vars(lhs, out);
            collect_vars(rhs, out);
        }
        SymExpr::Not(inner) => collect_vars(inner, out),
        _ => {}
    }
}

fn collect_consts(expr: &SymExpr, out: &mut BTreeSet<i64>) {
    match expr {
        SymExpr::Int { concrete: Some(c), .. } => {
            out.insert(*c);
        }
        SymExpr::Binary { lhs, rhs, .. } => {
            collect_consts(lhs, out);
            collect_consts(rhs, out);
        }
        SymExpr::Not(inner) => collect_consts(inner, out),
        _ => {}
    }
}

/// Evaluate under an assignment. `None` when a variable is unassigned or a
/// division hits zero — either way the assignment does not witness the
/// constraint. Relations and connectives yield 0/1.
fn eval(expr: &SymExpr, env: &BTreeMap<String, i64>) -> Option<i64> {
    if let Some(key) = var_key(expr) {
        return env.get(&key).copied();
    }
    match expr {
        SymExpr::Int { concrete, .. } => *concrete,
        // array reads were handled as variables above; bare refs have no
        // integer meaning
        SymExpr::ArrayElem { .. } => None,
        SymExpr::ArrayRef { .. } => None,
        SymExpr::Not(inner) => Some((eval(inner, env)? == 0) as i64),
        SymExpr::Binary { op, lhs, rhs } => {
            let a = eval(lhs, env)?;
            let b = eval(rhs, env)?;
            match op {
                SymOp::Add => a.checked_add(b),
                SymOp::Sub => a.checked_sub(b),
                SymOp::Mul => a.checked_mul(b),
                SymOp::Div => a.checked_div(b),
                SymOp::Rem => a.checked_rem(b),
                SymOp::Eq => Some((a == b) as i64),
                SymOp::Ne => Some((a != b) as i64),
                SymOp::Lt => Some((a < b) as i64),
                SymOp::Le => Some((a <= b) as i64),
                SymOp::Gt => Some((a > b) as i64),
                SymOp::Ge => Some((a >= b) as i64),
                SymOp::And => Some((a != 0 && b != 0) as i64),
                SymOp::Or => Some((a != 0 || b != 0) as i64),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Bounded candidate search
// ---------------------------------------------------------------------------

pub struct SearchSolver {
    /// Assignment budget: above this the search degrades to "sat".
    max_assignments: u64,
}

impl Default for SearchSolver {
    fn default() -> Self {
        SearchSolver { max_assignments: 50_000 }
    }
}

impl SearchSolver {
    pub fn new(max_assignments: u64) -> Self {
        SearchSolver { max_assignments }
    }

    fn candidates(path: &PathConstraint) -> Vec<i64> {
        let mut consts = BTreeSet::new();
        for c in path.iter() {
            collect_consts(c, &mut consts);
        }
        let mut out = BTreeSet::new();
        for base in [-2i64, -1, 0, 1, 2] {
            out.insert(base);
        }
        for c in consts {
            for v in [c - 1, c, c + 1] {
                out.insert(v.clamp(i32::MIN as i64, i32::MAX as i64));
            }
        }
        out.into_iter().collect()
    }

    /// Depth-first assignment search. Constraints are re-checked as soon as
    /// all their variables are bound, pruning dead prefixes early.
    fn search(
        vars: &[String],
        var_sets: &[BTreeSet<String>],
        path: &PathConstraint,
        candidates: &[i64],
        env: &mut BTreeMap<String, i64>,
    ) -> bool {
        if env.len() == vars.len() {
            return path
                .iter()
                .all(|c| eval(c, env).map(|v| v != 0).unwrap_or(false));
        }
        let var = vars[env.len()].clone();
        for v in candidates {
            env.insert(var.clone(), *v);
            let bound: BTreeSet<String> = env.keys().cloned().collect();
            let consistent = path.iter().zip(var_sets).all(|(c, needs)| {
                if needs.is_subset(&bound) {
                    eval(c, env).map(|v| v != 0).unwrap_or(false)
                } else {
                    true
                }
            });
            if consistent && Self::search(vars, var_sets, path, candidates, env) {
                return true;
            }
        }
        env.remove(&var);
        false
    }

    fn solve(&self, path: &PathConstraint) -> Result<Option<BTreeMap<String, i64>>, ()> {
        if path.is_empty() {
            return Ok(Some(BTreeMap::new()));
        }

        let mut vars = BTreeSet::new();
        for c in path.iter() {
            collect_vars(c, &mut vars);
        }
        let vars: Vec<String> = vars.into_iter().collect();

        if vars.is_empty() {
            let env = BTreeMap::new();
            let holds = path
                .iter()
                .all(|c| eval(c, &env).map(|v| v != 0).unwrap_or(false));
            return Ok(holds.then(BTreeMap::new));
        }

        let candidates = Self::candidates(path);
        let space = (candidates.len() as u64).checked_pow(vars.len() as u32);
        match space {
            Some(n) if n <= self.max_assignments => {}
            _ => {
                trace!(
                    "assignment space over budget for {} vars, answering sat",
                    vars.len()
                );
                return Err(());
            }
        }

        let var_sets: Vec<BTreeSet<String>> = path
            .iter()
            .map(|c| {
                let mut s = BTreeSet::new();
                collect_vars(c, &mut s);
                s
            })
            .collect();

        let mut env = BTreeMap::new();
        if Self::search(&vars, &var_sets, path, &candidates, &mut env) {
            Ok(Some(env))
        } else {
            Ok(None)
        }
    }
}

impl Solver for SearchSolver {
    fn is_sat(&self, path: &PathConstraint) -> bool {
        match self.solve(path) {
            Ok(model) => model.is_some(),
            // over budget: conservative
            Err(()) => true,
        }
    }

    fn get_model(&self, path: &PathConstraint) -> Option<BTreeMap<String, i64>> {
        self.solve(path).ok().flatten()
    }
}
