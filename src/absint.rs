/// Worklist abstract interpreter.
///
/// One abstract state per bytecode offset, joined on every incoming edge;
/// an offset re-enters the worklist only when its joined state strictly
/// grew. Terminal labels accumulate in a multiset. Domains of finite
/// height converge on their own; the interval component relies on the
/// iteration bound.
///
/// Branches are two-sided: both successors of `If`/`Ifz` are produced
/// whenever the domain admits them, and neither when it refutes them.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::bytecode::{Bytecode, Opcode, PC};
use crate::domain::AbstractDomain;
use crate::errors::AnalysisError;
use crate::jvm::{MethodId, Type, Value};
use crate::outcome::Outcome;

/// Iteration bound; guarantees termination over the interval domain.
pub const MAX_ITERATIONS: u32 = 1000;

// ---------------------------------------------------------------------------
// Abstract frames and states
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AFrame<D> {
    pub locals: HashMap<u16, D>,
    pub stack: Vec<D>,
    pub pc: PC,
}

impl<D: AbstractDomain> AFrame<D> {
    fn join(&self, other: &AFrame<D>) -> AFrame<D> {
        let mut locals = self.locals.clone();
        for (k, v) in &other.locals {
            let joined = match locals.get(k) {
                Some(old) => old.join(v),
                None => v.clone(),
            };
            locals.insert(*k, joined);
        }
        // positions beyond the shorter stack join against bot
        let len = self.stack.len().max(other.stack.len());
        let bot = D::bot();
        let stack = (0..len)
            .map(|i| {
                let a = self.stack.get(i).unwrap_or(&bot);
                let b = other.stack.get(i).unwrap_or(&bot);
                a.join(b)
            })
            .collect();
        AFrame { locals, stack, pc: other.pc.clone() }
    }

    fn le(&self, other: &AFrame<D>) -> bool {
        let bot = D::bot();
        self.locals
            .iter()
            .all(|(k, v)| v.le(other.locals.get(k).unwrap_or(&bot)))
            && self
                .stack
                .iter()
                .enumerate()
                .all(|(i, v)| v.le(other.stack.get(i).unwrap_or(&bot)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AState<D> {
    pub heap: HashMap<u32, D>,
    pub frames: Vec<AFrame<D>>,
}

impl<D: AbstractDomain> AState<D> {
    /// Entry state with the arguments abstracted into locals 0..n-1.
    pub fn entry(method: Arc<MethodId>, args: Vec<D>) -> Self {
        let mut locals = HashMap::new();
        for (i, arg) in args.into_iter().enumerate() {
            locals.insert(i as u16, arg);
        }
        AState {
            heap: HashMap::new(),
            frames: vec![AFrame { locals, stack: Vec::new(), pc: PC::entry(method) }],
        }
    }

    pub fn pc(&self) -> &PC {
        &self.frames.last().expect("abstract state has no frames").pc
    }

    fn top_frame(&mut self) -> &mut AFrame<D> {
        self.frames.last_mut().expect("abstract state has no frames")
    }

    pub fn join(&self, other: &AState<D>) -> AState<D> {
        let mut heap = self.heap.clone();
        for (k, v) in &other.heap {
            let joined = match heap.get(k) {
                Some(old) => old.join(v),
                None => v.clone(),
            };
            heap.insert(*k, joined);
        }
        let frames = self
            .frames
            .iter()
            .zip(&other.frames)
            .map(|(a, b)| a.join(b))
            .collect();
        AState { heap, frames }
    }

    pub fn le(&self, other: &AState<D>) -> bool {
        let bot = D::bot();
        self.heap
            .iter()
            .all(|(k, v)| v.le(other.heap.get(k).unwrap_or(&bot)))
            && self.frames.len() == other.frames.len()
            && self.frames.iter().zip(&other.frames).all(|(a, b)| a.le(b))
    }
}

enum ASuccessor<D> {
    State(AState<D>),
    Terminal(Outcome),
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AbstractReport {
    /// Terminal labels in discovery order (a multiset).
    pub finals: Vec<Outcome>,
    pub iterations: u32,
    pub converged: bool,
}

impl AbstractReport {
    /// Single-label summary by the fixed priority order.
    pub fn classification(&self) -> Outcome {
        Outcome::classify(self.finals.iter().copied())
    }
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

pub struct AbstractInterpreter<'a, D> {
    code: &'a Bytecode,
    max_iterations: u32,
    _domain: std::marker::PhantomData<D>,
}

impl<'a, D: AbstractDomain> AbstractInterpreter<'a, D> {
    pub fn new(code: &'a Bytecode) -> Self {
        AbstractInterpreter {
            code,
            max_iterations: MAX_ITERATIONS,
            _domain: std::marker::PhantomData,
        }
    }

    pub fn with_max_iterations(mut self, bound: u32) -> Self {
        self.max_iterations = bound;
        self
    }

    /// Run the fixpoint loop from the method entry.
    pub fn analyze(
        &self,
        method: Arc<MethodId>,
        args: Vec<D>,
    ) -> Result<AbstractReport, AnalysisError> {
        if let Err(AnalysisError::MethodNotFound(m)) = self.code.method(&method) {
            warn!("method not found, classifying as *: {m}");
            return Ok(AbstractReport { finals: Vec::new(), iterations: 0, converged: false });
        }

        let entry = AState::entry(method, args);
        let mut analysis_map: HashMap<usize, AState<D>> = HashMap::new();
        let mut worklist: VecDeque<usize> = VecDeque::new();
        analysis_map.insert(0, entry);
        worklist.push_back(0);

        let mut finals = Vec::new();
        let mut iterations = 0u32;

        while let Some(offset) = worklist.pop_front() {
            if iterations >= self.max_iterations {
                warn!("fixpoint stopped at the {}-transition bound", self.max_iterations);
                return Ok(AbstractReport { finals, iterations, converged: false });
            }
            iterations += 1;

            let state = analysis_map[&offset].clone();
            for successor in self.step(&state)? {
                match successor {
                    ASuccessor::Terminal(outcome) => finals.push(outcome),
                    ASuccessor::State(succ) => {
                        let succ_offset = succ.pc().offset;
                        match analysis_map.get(&succ_offset) {
                            None => {
                                analysis_map.insert(succ_offset, succ);
                                worklist.push_back(succ_offset);
                            }
                            Some(old) => {
                                let joined = old.join(&succ);
                                if !joined.le(old) {
                                    analysis_map.insert(succ_offset, joined);
                                    worklist.push_back(succ_offset);
                                }
                            }
                        }
                    }
                }
            }
        }

        debug!("fixpoint converged after {iterations} transitions");
        Ok(AbstractReport { finals, iterations, converged: true })
    }

    fn step(&self, state: &AState<D>) -> Result<Vec<ASuccessor<D>>, AnalysisError> {
        let pc = state.pc().clone();
        let opcode = self.code.at(&pc)?;
        debug!("ASTEP {opcode:?} at {pc}");

        let mut next = state.clone();

        match opcode {
            Opcode::Push { value } => {
                let av = match value.widen() {
                    Value::Int(n) => D::abstract_value(n),
                    Value::Ref(r) => D::abstract_value(r as i32),
                    other => {
                        warn!("abstract push of {other} at {pc}, classifying as *");
                        return Ok(vec![ASuccessor::Terminal(Outcome::Diverges)]);
                    }
                };
                let frame = next.top_frame();
                frame.stack.push(av);
                frame.pc = &frame.pc + 1;
                Ok(vec![ASuccessor::State(next)])
            }

            Opcode::Load { index, .. } => {
                let frame = next.top_frame();
                let v = frame
                    .locals
                    .get(&index)
                    .cloned()
                    .ok_or(AnalysisError::MissingLocal { index, pc: pc.to_string() })?;
                frame.stack.push(v);
                frame.pc = &frame.pc + 1;
                Ok(vec![ASuccessor::State(next)])
            }

            Opcode::Store { index, .. } => {
                let v = Self::pop(&mut next, &pc, &opcode)?;
                let frame = next.top_frame();
                frame.locals.insert(index, v);
                frame.pc = &frame.pc + 1;
                Ok(vec![ASuccessor::State(next)])
            }

            Opcode::Incr { index, amount } => {
                let frame = next.top_frame();
                let old = frame
                    .locals
                    .get(&index)
                    .cloned()
                    .ok_or(AnalysisError::MissingLocal { index, pc: pc.to_string() })?;
                let r = D::binary_op(
                    crate::bytecode::BinOp::Add,
                    &old,
                    &D::abstract_value(amount),
                );
                let frame = next.top_frame();
                frame.locals.insert(index, r.value);
                frame.pc = &frame.pc + 1;
                Ok(vec![ASuccessor::State(next)])
            }

            Opcode::Binary { ty: Type::Int, op } => {
                let rhs = Self::pop(&mut next, &pc, &opcode)?;
                let lhs = Self::pop(&mut next, &pc, &opcode)?;
                let r = D::binary_op(op, &lhs, &rhs);

                let mut successors = Vec::new();
                if r.may_divide_by_zero {
                    successors.push(ASuccessor::Terminal(Outcome::DivideByZero));
                }
                if !r.value.is_bot() {
                    let frame = next.top_frame();
                    frame.stack.push(r.value);
                    frame.pc = &frame.pc + 1;
                    successors.push(ASuccessor::State(next));
                }
                Ok(successors)
            }

            Opcode::Binary { .. } => {
                warn!("non-int abstract binary at {pc}, classifying as *");
                Ok(vec![ASuccessor::Terminal(Outcome::Diverges)])
            }

            Opcode::Ifz { cond, target } => {
                let v = Self::pop(&mut next, &pc, &opcode)?;
                let (maybe_true, maybe_false) = D::compare_zero(cond, &v);
                Ok(Self::branch(next, target, maybe_true, maybe_false))
            }

            Opcode::If { cond, target } => {
                let rhs = Self::pop(&mut next, &pc, &opcode)?;
                let lhs = Self::pop(&mut next, &pc, &opcode)?;
                let (maybe_true, maybe_false) = D::compare(cond, &lhs, &rhs);
                Ok(Self::branch(next, target, maybe_true, maybe_false))
            }

            Opcode::Goto { target } => {
                let frame = next.top_frame();
                frame.pc = frame.pc.with_offset(target);
                Ok(vec![ASuccessor::State(next)])
            }

            Opcode::Return { ref ty } => {
                let ret = match ty {
                    Some(_) => Some(Self::pop(&mut next, &pc, &opcode)?),
                    None => None,
                };
                next.frames.pop();
                match next.frames.last_mut() {
                    Some(caller) => {
                        if let Some(v) = ret {
                            caller.stack.push(v);
                        }
                        caller.pc = &caller.pc + 1;
                        Ok(vec![ASuccessor::State(next)])
                    }
                    None => Ok(vec![ASuccessor::Terminal(Outcome::Ok)]),
                }
            }

            Opcode::Get { is_static: true, .. } => {
                let frame = next.top_frame();
                frame.stack.push(D::abstract_value(0));
                frame.pc = &frame.pc + 1;
                Ok(vec![ASuccessor::State(next)])
            }

            Opcode::New { .. } if opcode.is_assertion_alloc() => {
                Ok(vec![ASuccessor::Terminal(Outcome::AssertionError)])
            }

            Opcode::Throw => Ok(vec![ASuccessor::Terminal(Outcome::AssertionError)]),

            Opcode::Dup { words } => {
                let frame = next.top_frame();
                let n = (words as usize).max(1);
                if frame.stack.len() < n {
                    return Err(AnalysisError::StackUnderflow {
                        pc: pc.to_string(),
                        opcode: format!("{opcode:?}"),
                    });
                }
                let top = frame.stack[frame.stack.len() - n..].to_vec();
                frame.stack.extend(top);
                frame.pc = &frame.pc + 1;
                Ok(vec![ASuccessor::State(next)])
            }

            Opcode::Cast { .. } => {
                let frame = next.top_frame();
                frame.pc = &frame.pc + 1;
                Ok(vec![ASuccessor::State(next)])
            }

            // arrays, invocations, instance fields, other allocations:
            // no abstract transfer function
            other => {
                warn!("no abstract transfer for {other:?} at {pc}, classifying as *");
                Ok(vec![ASuccessor::Terminal(Outcome::Diverges)])
            }
        }
    }

    fn branch(
        state: AState<D>,
        target: usize,
        maybe_true: bool,
        maybe_false: bool,
    ) -> Vec<ASuccessor<D>> {
        let mut successors = Vec::new();
        if maybe_true {
            let mut jumped = state.clone();
            let frame = jumped.top_frame();
            frame.pc = frame.pc.with_offset(target);
            successors.push(ASuccessor::State(jumped));
        }
        if maybe_false {
            let mut fell = state;
            let frame = fell.top_frame();
            frame.pc = &frame.pc + 1;
            successors.push(ASuccessor::State(fell));
        }
        successors
    }

    fn pop(state: &mut AState<D>, pc: &PC, opcode: &Opcode) -> Result<D, AnalysisError> {
        state.top_frame().stack.pop().ok_or_else(|| AnalysisError::StackUnderflow {
            pc: pc.to_string(),
            opcode: format!("{opcode:?}"),
        })
    }
}
