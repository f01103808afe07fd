/// The symbolic exploration driver.
///
/// Per popped state, in order: terminated states are feasibility-checked
/// and recorded; the per-state step bound, global step budget, depth bound,
/// and wall-clock timeout drop or stop exploration; feasible live states
/// expand through the frontend. States over a bound are dropped silently —
/// only a run with zero findings synthesises a single `*` finding, read as
/// "no terminating path within the bounds".

use std::time::Instant;
use tracing::{debug, warn};

use crate::errors::AnalysisError;
use crate::outcome::Outcome;

use super::config::{SymConfig, MAX_STEPS_PER_STATE};
use super::findings::Finding;
use super::frontend::Frontend;
use super::solver::Solver;
use super::state::SymbolicState;
use super::strategy::Worklist;

pub struct Executor<'a> {
    frontend: Frontend<'a>,
    config: SymConfig,
    solver: Box<dyn Solver>,
}

impl<'a> Executor<'a> {
    pub fn new(frontend: Frontend<'a>, config: SymConfig, solver: Box<dyn Solver>) -> Self {
        Executor { frontend, config, solver }
    }

    pub fn run(&self, initial: SymbolicState) -> Result<Vec<Finding>, AnalysisError> {
        let mut worklist = Worklist::new(self.config.order, initial.clone());
        let mut findings: Vec<Finding> = Vec::new();
        let mut steps = 0u32;
        let started = Instant::now();

        while let Some(state) = worklist.pop() {
            if started.elapsed().as_secs_f64() > self.config.timeout_seconds {
                warn!("timeout after {:.1}s, stopping exploration", self.config.timeout_seconds);
                worklist.clear();
                break;
            }

            if state.terminated {
                // infeasible error branches die here
                if self.config.use_solver && !self.solver.is_sat(&state.path) {
                    debug!("pruned unsat terminated state at {}", state.pc);
                    continue;
                }
                let finding = Finding::from_state(&state);
                debug!("finding: {finding} with {}", state.path);
                findings.push(finding);
                continue;
            }

            if state.steps >= MAX_STEPS_PER_STATE {
                // this one path ran out of fuel; drop it without classifying,
                // other paths may still terminate
                debug!("dropped state at {} over the per-state bound", state.pc);
                continue;
            }

            if let Some(max_steps) = self.config.max_steps {
                if steps >= max_steps {
                    warn!("global step budget {max_steps} exhausted");
                    worklist.clear();
                    break;
                }
            }
            steps += 1;

            if let Some(max_depth) = self.config.max_depth {
                if state.depth > max_depth {
                    debug!("dropped state at {} over the depth bound", state.pc);
                    continue;
                }
            }

            if self.config.use_solver && !self.solver.is_sat(&state.path) {
                debug!("pruned unsat state at {}", state.pc);
                continue;
            }

            let successors = match self.frontend.step(&state) {
                Ok(succs) => succs,
                Err(AnalysisError::MethodNotFound(m)) => {
                    warn!("method not found, classifying as *: {m}");
                    let cut = state.clone().terminate(Outcome::Diverges);
                    findings.push(Finding::from_state(&cut));
                    continue;
                }
                Err(e) => return Err(e),
            };

            for mut successor in successors {
                successor.steps = state.steps + 1;
                worklist.push(successor);
            }
        }

        // nothing terminated within the bounds: the method looks
        // non-terminating from here
        if findings.is_empty() {
            let cut = initial.terminate(Outcome::Diverges);
            findings.push(Finding::from_state(&cut));
        }

        Ok(findings)
    }
}
