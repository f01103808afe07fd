/// The symbolic step function.
///
/// Dispatches on the current opcode and produces a non-empty list of
/// successor states. Branching opcodes fork; error branches are emitted
/// before their continuation so the driver discovers failures early. Any
/// opcode without a symbolic model terminates its path as `*` — stuck,
/// never wrong.
///
/// `depth` increments only at control-flow forks (`If`/`Ifz`); the error
/// forks of divisions and array accesses lengthen the path constraint but
/// not the depth.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::bytecode::{BinOp, Bytecode, Opcode, PC};
use crate::errors::AnalysisError;
use crate::jvm::{MethodId, Type, Value};
use crate::outcome::Outcome;

use super::expr::{ExprRef, SymExpr, SymOp};
use super::state::{ArraySummary, LocalKey, LocalVal, SymbolicState};

/// The one helper call the engine inlines instead of treating as opaque.
const ASSERT_HELPER: (&str, &str) = ("assertBoolean", "(Z)V");

pub struct Frontend<'a> {
    code: &'a Bytecode,
    entry: Arc<MethodId>,
}

impl<'a> Frontend<'a> {
    pub fn new(code: &'a Bytecode, entry: Arc<MethodId>) -> Self {
        Frontend { code, entry }
    }

    pub fn entry_method(&self) -> &Arc<MethodId> {
        &self.entry
    }

    /// Build the initial state from the entry method's descriptor: ints
    /// become free variables, booleans 0/1-constrained variables, arrays a
    /// nullable reference variable plus a summary with a fresh non-negative
    /// length.
    pub fn initial_state(&self) -> SymbolicState {
        let mut state = SymbolicState::at(PC::entry(Arc::clone(&self.entry)));
        let params = self.entry.descriptor.params.clone();
        for (i, ty) in params.iter().enumerate() {
            let slot = LocalKey::Slot(i as u16);
            match ty {
                Type::Boolean => {
                    let v = SymExpr::var(format!("bool{i}"));
                    state
                        .path
                        .push(SymExpr::binary(SymOp::Ge, Arc::clone(&v), SymExpr::lit(0)));
                    state
                        .path
                        .push(SymExpr::binary(SymOp::Le, Arc::clone(&v), SymExpr::lit(1)));
                    state.locals.insert(slot, LocalVal::Value(v));
                }
                Type::Array(elem) => {
                    let name = format!("arg{i}");
                    let length = SymExpr::var(format!("len_{i}"));
                    state.path.push(SymExpr::binary(
                        SymOp::Ge,
                        Arc::clone(&length),
                        SymExpr::lit(0),
                    ));
                    state.locals.insert(
                        LocalKey::Array(name.clone()),
                        LocalVal::Array(ArraySummary {
                            length,
                            elem: (**elem).clone(),
                        }),
                    );
                    // the reference itself is an integer: 0 is null
                    state.locals.insert(slot, LocalVal::Value(SymExpr::var(name)));
                }
                // ints, chars, floats, opaque refs: a free integer variable
                _ => {
                    state
                        .locals
                        .insert(slot, LocalVal::Value(SymExpr::var(format!("arg{i}"))));
                }
            }
        }
        state
    }

    pub fn step(&self, s: &SymbolicState) -> Result<Vec<SymbolicState>, AnalysisError> {
        let pc = s.pc.clone();
        let opcode = self.code.at(&pc)?;
        debug!("SSTEP {opcode:?} | {s}");

        match opcode {
            Opcode::Push { value } => {
                let expr = match value.widen() {
                    Value::Int(n) => SymExpr::lit(n as i64),
                    Value::Ref(r) => SymExpr::lit(r as i64),
                    other => {
                        warn!("symbolic push of {other} at {pc}, marking stuck");
                        return Ok(vec![s.clone().terminate(Outcome::Diverges)]);
                    }
                };
                Ok(vec![self.advance(s, Some(expr))])
            }

            Opcode::Load { index, .. } => match s.slot(index) {
                Some(LocalVal::Value(e)) => {
                    let e = Arc::clone(e);
                    Ok(vec![self.advance(s, Some(e))])
                }
                _ => {
                    warn!("symbolic load of unset local {index} at {pc}, marking stuck");
                    Ok(vec![s.clone().terminate(Outcome::Diverges)])
                }
            },

            Opcode::Store { index, .. } => {
                let mut next = s.clone();
                let Some(v) = next.stack.pop() else {
                    return Err(self.underflow(&pc, &opcode));
                };
                next.locals.insert(LocalKey::Slot(index), LocalVal::Value(v));
                next.pc = &next.pc + 1;
                Ok(vec![next])
            }

            Opcode::Incr { index, amount } => match s.slot(index) {
                Some(LocalVal::Value(e)) => {
                    let bumped =
                        SymExpr::binary(SymOp::Add, Arc::clone(e), SymExpr::lit(amount as i64));
                    let mut next = s.clone();
                    next.locals.insert(LocalKey::Slot(index), LocalVal::Value(bumped));
                    next.pc = &next.pc + 1;
                    Ok(vec![next])
                }
                _ => Ok(vec![s.clone().terminate(Outcome::Diverges)]),
            },

            Opcode::Binary { ty: Type::Int, op } => self.binary(s, &pc, &opcode, op),

            Opcode::Binary { .. } => {
                warn!("non-int symbolic binary at {pc}, marking stuck");
                Ok(vec![s.clone().terminate(Outcome::Diverges)])
            }

            Opcode::Ifz { cond, target } => {
                let Some(value) = s.stack.last().cloned() else {
                    return Err(self.underflow(&pc, &opcode));
                };
                let cond_expr =
                    SymExpr::binary(SymOp::from_cmp(cond), value, SymExpr::lit(0));
                Ok(self.fork_branch(s, cond_expr, target, 1))
            }

            Opcode::If { cond, target } => {
                if s.stack.len() < 2 {
                    return Err(self.underflow(&pc, &opcode));
                }
                let rhs = Arc::clone(&s.stack[s.stack.len() - 1]);
                let lhs = Arc::clone(&s.stack[s.stack.len() - 2]);
                let cond_expr = SymExpr::binary(SymOp::from_cmp(cond), lhs, rhs);
                Ok(self.fork_branch(s, cond_expr, target, 2))
            }

            Opcode::Goto { target } => {
                let mut next = s.clone();
                next.pc = next.pc.with_offset(target);
                Ok(vec![next])
            }

            Opcode::Return { ref ty } => {
                let mut next = s.clone();
                if ty.is_some() {
                    let Some(v) = next.stack.pop() else {
                        return Err(self.underflow(&pc, &opcode));
                    };
                    next.return_value = Some(v);
                }
                Ok(vec![next.terminate(Outcome::Ok)])
            }

            Opcode::Get { is_static: true, .. } => {
                Ok(vec![self.advance(s, Some(SymExpr::lit(0)))])
            }

            Opcode::Get { is_static: false, .. } => {
                warn!("symbolic instance field read at {pc}, marking stuck");
                Ok(vec![s.clone().terminate(Outcome::Diverges)])
            }

            Opcode::New { ref class } => {
                if opcode.is_assertion_alloc() {
                    Ok(vec![s.clone().terminate(Outcome::AssertionError)])
                } else {
                    warn!("symbolic allocation of {class} at {pc}, marking stuck");
                    Ok(vec![s.clone().terminate(Outcome::Diverges)])
                }
            }

            Opcode::Throw => Ok(vec![s.clone().terminate(Outcome::AssertionError)]),

            Opcode::Dup { words } => {
                let n = (words as usize).max(1);
                if s.stack.len() < n {
                    return Err(self.underflow(&pc, &opcode));
                }
                let mut next = s.clone();
                let top = next.stack[next.stack.len() - n..].to_vec();
                next.stack.extend(top);
                next.pc = &next.pc + 1;
                Ok(vec![next])
            }

            Opcode::Cast { .. } => {
                let mut next = s.clone();
                next.pc = &next.pc + 1;
                Ok(vec![next])
            }

            Opcode::InvokeStatic { ref method } => self.invoke_static(s, &pc, &opcode, method),

            Opcode::InvokeSpecial { .. } => {
                // the AssertionError <init> never runs: New already terminated
                warn!("symbolic invokespecial at {pc}, marking stuck");
                Ok(vec![s.clone().terminate(Outcome::Diverges)])
            }

            Opcode::NewArray { ref ty } => {
                let mut next = s.clone();
                let Some(length) = next.stack.pop() else {
                    return Err(self.underflow(&pc, &opcode));
                };
                let name = format!("arr{}_{}", pc.offset, next.locals.len());
                next.locals.insert(
                    LocalKey::Array(name.clone()),
                    LocalVal::Array(ArraySummary { length, elem: ty.clone() }),
                );
                next.stack.push(SymExpr::array_ref(name));
                next.pc = &next.pc + 1;
                Ok(vec![next])
            }

            Opcode::ArrayLength => self.array_length(s, &pc, &opcode),

            Opcode::ArrayLoad { .. } => self.array_access(s, &pc, &opcode, true),

            Opcode::ArrayStore { .. } => self.array_access(s, &pc, &opcode, false),
        }
    }

    // ── Arithmetic ───────────────────────────────────────────────────────────

    fn binary(
        &self,
        s: &SymbolicState,
        pc: &PC,
        opcode: &Opcode,
        op: BinOp,
    ) -> Result<Vec<SymbolicState>, AnalysisError> {
        if s.stack.len() < 2 {
            return Err(self.underflow(pc, opcode));
        }
        let rhs = Arc::clone(&s.stack[s.stack.len() - 1]);
        let lhs = Arc::clone(&s.stack[s.stack.len() - 2]);

        let pure = |sym: SymOp| -> Vec<SymbolicState> {
            let mut next = s.clone();
            next.stack.truncate(next.stack.len() - 2);
            next.stack
                .push(SymExpr::binary(sym, Arc::clone(&lhs), Arc::clone(&rhs)));
            next.pc = &next.pc + 1;
            vec![next]
        };

        match op {
            BinOp::Add => Ok(pure(SymOp::Add)),
            BinOp::Sub => Ok(pure(SymOp::Sub)),
            BinOp::Mul => Ok(pure(SymOp::Mul)),

            BinOp::Div | BinOp::Rem => {
                let sym = if op == BinOp::Div { SymOp::Div } else { SymOp::Rem };
                let zero_divisor =
                    SymExpr::binary(SymOp::Eq, Arc::clone(&rhs), SymExpr::lit(0));

                let mut err = s.clone();
                err.stack.truncate(err.stack.len() - 2);
                err.path.push(Arc::clone(&zero_divisor));
                let err = err.terminate(Outcome::DivideByZero);

                let mut ok = s.clone();
                ok.stack.truncate(ok.stack.len() - 2);
                ok.stack.push(SymExpr::binary(sym, lhs, Arc::clone(&rhs)));
                ok.path.push(SymExpr::not(zero_divisor));
                ok.pc = &ok.pc + 1;

                Ok(vec![err, ok])
            }

            // bitwise and shift operators have no symbolic model
            _ => {
                warn!("symbolic {op:?} at {pc}, marking stuck");
                Ok(vec![s.clone().terminate(Outcome::Diverges)])
            }
        }
    }

    // ── Control flow ─────────────────────────────────────────────────────────

    /// True/false fork for `If`/`Ifz`: pops `operands`, adds the condition
    /// and its negation, bumps `depth` on both sides.
    fn fork_branch(
        &self,
        s: &SymbolicState,
        cond_expr: ExprRef,
        target: usize,
        operands: usize,
    ) -> Vec<SymbolicState> {
        let mut taken = s.clone();
        taken.stack.truncate(taken.stack.len() - operands);
        taken.path.push(Arc::clone(&cond_expr));
        taken.pc = taken.pc.with_offset(target);
        taken.depth += 1;

        let mut fallthrough = s.clone();
        fallthrough
            .stack
            .truncate(fallthrough.stack.len() - operands);
        fallthrough.path.push(SymExpr::not(cond_expr));
        fallthrough.pc = &fallthrough.pc + 1;
        fallthrough.depth += 1;

        vec![taken, fallthrough]
    }

    // ── Invocations ──────────────────────────────────────────────────────────

    fn invoke_static(
        &self,
        s: &SymbolicState,
        pc: &PC,
        opcode: &Opcode,
        method: &MethodId,
    ) -> Result<Vec<SymbolicState>, AnalysisError> {
        if (method.name.as_str(), method.descriptor.raw()) == ASSERT_HELPER {
            let Some(arg) = s.stack.last().cloned() else {
                return Err(self.underflow(pc, opcode));
            };
            let failed = SymExpr::binary(SymOp::Eq, arg, SymExpr::lit(0));

            let mut err = s.clone();
            err.stack.pop();
            err.path.push(Arc::clone(&failed));
            let err = err.terminate(Outcome::AssertionError);

            let mut ok = s.clone();
            ok.stack.pop();
            ok.path.push(SymExpr::not(failed));
            ok.pc = &ok.pc + 1;

            return Ok(vec![err, ok]);
        }

        // no interprocedural symbolic reasoning beyond the whitelist
        warn!("symbolic call to {method} at {pc}, marking stuck");
        Ok(vec![s.clone().terminate(Outcome::Diverges)])
    }

    // ── Arrays ───────────────────────────────────────────────────────────────

    /// The array behind a reference expression, with an optional null fork
    /// when the reference is an argument-style variable.
    fn resolve_array(
        &self,
        s: &SymbolicState,
        pc: &PC,
        array_ref: &ExprRef,
    ) -> ArrayResolution {
        match array_ref.as_ref() {
            SymExpr::ArrayRef { name } => ArrayResolution::Known { name: name.clone() },
            SymExpr::Int { name: Some(n), .. } => {
                ArrayResolution::Nullable { name: n.clone(), reference: Arc::clone(array_ref) }
            }
            // a bare concrete 0 with no name is null
            SymExpr::Int { name: None, concrete: Some(0) } => ArrayResolution::Null,
            _ => {
                warn!("opaque array reference {array_ref} at {pc} in {}", s.pc);
                ArrayResolution::Opaque
            }
        }
    }

    fn array_length(
        &self,
        s: &SymbolicState,
        pc: &PC,
        opcode: &Opcode,
    ) -> Result<Vec<SymbolicState>, AnalysisError> {
        let Some(array_ref) = s.stack.last().cloned() else {
            return Err(self.underflow(pc, opcode));
        };

        let (name, null_fork) = match self.resolve_array(s, pc, &array_ref) {
            ArrayResolution::Known { name } => (name, None),
            ArrayResolution::Nullable { name, reference } => (name, Some(reference)),
            ArrayResolution::Null => {
                let mut null = s.clone();
                null.stack.pop();
                return Ok(vec![null.terminate(Outcome::NullPointer)]);
            }
            ArrayResolution::Opaque => {
                return Ok(vec![s.clone().terminate(Outcome::Diverges)])
            }
        };

        let Some(summary) = s.array(&name) else {
            let mut null = s.clone();
            null.stack.pop();
            return Ok(vec![null.terminate(Outcome::NullPointer)]);
        };
        let length = Arc::clone(&summary.length);

        let mut successors = Vec::new();
        if let Some(reference) = &null_fork {
            successors.push(null_branch(s, reference, 1));
        }

        let mut ok = s.clone();
        ok.stack.pop();
        if let Some(reference) = null_fork {
            ok.path.push(SymExpr::not(SymExpr::binary(
                SymOp::Eq,
                reference,
                SymExpr::lit(0),
            )));
        }
        ok.stack.push(length);
        ok.pc = &ok.pc + 1;
        successors.push(ok);
        Ok(successors)
    }

    /// `ArrayLoad` / `ArrayStore`: three-way bounds fork plus the null fork
    /// for nullable argument references. Element writes are not tracked, so
    /// a successful store only advances; a successful load pushes an
    /// uninterpreted element read.
    fn array_access(
        &self,
        s: &SymbolicState,
        pc: &PC,
        opcode: &Opcode,
        is_load: bool,
    ) -> Result<Vec<SymbolicState>, AnalysisError> {
        let operands = if is_load { 2 } else { 3 };
        if s.stack.len() < operands {
            return Err(self.underflow(pc, opcode));
        }
        // stack (top down): [value,] index, arrayref
        let index = Arc::clone(&s.stack[s.stack.len() - operands + 1]);
        let array_ref = Arc::clone(&s.stack[s.stack.len() - operands]);

        let (name, null_fork) = match self.resolve_array(s, pc, &array_ref) {
            ArrayResolution::Known { name } => (name, None),
            ArrayResolution::Nullable { name, reference } => (name, Some(reference)),
            ArrayResolution::Null => {
                let mut null = s.clone();
                null.stack.truncate(null.stack.len() - operands);
                return Ok(vec![null.terminate(Outcome::NullPointer)]);
            }
            ArrayResolution::Opaque => {
                return Ok(vec![s.clone().terminate(Outcome::Diverges)])
            }
        };

        let Some(summary) = s.array(&name) else {
            let mut null = s.clone();
            null.stack.truncate(null.stack.len() - operands);
            return Ok(vec![null.terminate(Outcome::NullPointer)]);
        };
        let length = Arc::clone(&summary.length);

        let not_null = null_fork.as_ref().map(|reference| {
            SymExpr::not(SymExpr::binary(
                SymOp::Eq,
                Arc::clone(reference),
                SymExpr::lit(0),
            ))
        });

        let mut successors = Vec::new();
        if let Some(reference) = &null_fork {
            successors.push(null_branch(s, reference, operands));
        }

        let below = SymExpr::binary(SymOp::Lt, Arc::clone(&index), SymExpr::lit(0));
        let mut low = s.clone();
        low.stack.truncate(low.stack.len() - operands);
        if let Some(nn) = &not_null {
            low.path.push(Arc::clone(nn));
        }
        low.path.push(below);
        successors.push(low.terminate(Outcome::OutOfBounds));

        let beyond = SymExpr::binary(SymOp::Ge, Arc::clone(&index), Arc::clone(&length));
        let mut high = s.clone();
        high.stack.truncate(high.stack.len() - operands);
        if let Some(nn) = &not_null {
            high.path.push(Arc::clone(nn));
        }
        high.path.push(beyond);
        successors.push(high.terminate(Outcome::OutOfBounds));

        let mut ok = s.clone();
        ok.stack.truncate(ok.stack.len() - operands);
        if let Some(nn) = not_null {
            ok.path.push(nn);
        }
        ok.path
            .push(SymExpr::binary(SymOp::Ge, Arc::clone(&index), SymExpr::lit(0)));
        ok.path
            .push(SymExpr::binary(SymOp::Lt, Arc::clone(&index), length));
        if is_load {
            ok.stack.push(SymExpr::array_elem(name, index));
        }
        ok.pc = &ok.pc + 1;
        successors.push(ok);

        Ok(successors)
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn advance(&self, s: &SymbolicState, push: Option<ExprRef>) -> SymbolicState {
        let mut next = s.clone();
        if let Some(e) = push {
            next.stack.push(e);
        }
        next.pc = &next.pc + 1;
        next
    }

    fn underflow(&self, pc: &PC, opcode: &Opcode) -> AnalysisError {
        AnalysisError::StackUnderflow { pc: pc.to_string(), opcode: format!("{opcode:?}") }
    }
}

enum ArrayResolution {
    /// A reference produced by `NewArray`: cannot be null.
    Known { name: String },
    /// An argument-style reference: may be null, fork on `ref == 0`.
    Nullable { name: String, reference: ExprRef },
    Null,
    Opaque,
}


/// Terminated `null pointer` branch constrained by `ref == 0`.
fn null_branch(s: &SymbolicState, reference: &ExprRef, operands: usize) -> SymbolicState {
    let mut null = s.clone();
    null.stack.truncate(null.stack.len() - operands);
    null.path.push(SymExpr::binary(
        SymOp::Eq,
        Arc::clone(reference),
        SymExpr::lit(0),
    ));
    null.terminate(Outcome::NullPointer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{Cmp, OpcodeTable};
    use crate::jvm::{ClassName, MethodDescriptor};

    fn mid(name: &str, desc: &str) -> MethodId {
        MethodId::new(
            ClassName::new("jpamb/cases/Simple"),
            name,
            MethodDescriptor::parse(desc).unwrap(),
        )
    }

    fn frontend_for(id: MethodId, ops: Vec<Opcode>) -> (Bytecode, Arc<MethodId>) {
        let code = Bytecode::new(Box::new(OpcodeTable::new().with(id.clone(), ops)));
        (code, Arc::new(id))
    }

    #[test]
    fn initial_state_shapes_parameters_by_type() {
        let id = mid("mixed", "(IZ[I)V");
        let (code, id) = frontend_for(id, vec![Opcode::Return { ty: None }]);
        let frontend = Frontend::new(&code, id);
        let state = frontend.initial_state();

        // int: free variable
        assert!(matches!(
            state.slot(0),
            Some(LocalVal::Value(e)) if e.var_name() == Some("arg0")
        ));
        // boolean: free variable plus the 0..1 range constraints
        assert!(matches!(
            state.slot(1),
            Some(LocalVal::Value(e)) if e.var_name() == Some("bool1")
        ));
        // array: nullable reference variable plus a summary with a length
        assert!(matches!(
            state.slot(2),
            Some(LocalVal::Value(e)) if e.var_name() == Some("arg2")
        ));
        let summary = state.array("arg2").expect("array summary");
        assert_eq!(summary.elem, Type::Int);
        assert_eq!(summary.length.var_name(), Some("len_2"));
        // bool range (2) + array length non-negativity (1)
        assert_eq!(state.path.depth(), 3);
    }

    #[test]
    fn division_forks_error_before_continuation() {
        let id = mid("div", "(I)I");
        let (code, id) = frontend_for(
            id,
            vec![
                Opcode::Push { value: Value::Int(1) },
                Opcode::Load { ty: Type::Int, index: 0 },
                Opcode::Binary { ty: Type::Int, op: BinOp::Div },
                Opcode::Return { ty: Some(Type::Int) },
            ],
        );
        let frontend = Frontend::new(&code, id);
        let mut state = frontend.initial_state();
        state = frontend.step(&state).unwrap().remove(0);
        state = frontend.step(&state).unwrap().remove(0);

        let successors = frontend.step(&state).unwrap();
        assert_eq!(successors.len(), 2);
        assert!(successors[0].terminated);
        assert_eq!(successors[0].error, Some(Outcome::DivideByZero));
        assert!(!successors[1].terminated);
        assert_eq!(successors[1].pc.offset, 3);
        // neither side of the fork is a control-flow branch
        assert_eq!(successors[0].depth, 0);
    }

    #[test]
    fn branches_bump_depth_on_both_sides() {
        let id = mid("branch", "(I)V");
        let (code, id) = frontend_for(
            id,
            vec![
                Opcode::Load { ty: Type::Int, index: 0 },
                Opcode::Ifz { cond: Cmp::Eq, target: 2 },
                Opcode::Return { ty: None },
            ],
        );
        let frontend = Frontend::new(&code, id);
        let state = frontend.step(&frontend.initial_state()).unwrap().remove(0);
        let successors = frontend.step(&state).unwrap();
        assert_eq!(successors.len(), 2);
        assert_eq!(successors[0].pc.offset, 2);
        assert_eq!(successors[1].pc.offset, 2);
        assert!(successors.iter().all(|s| s.depth == 1));
        assert!(successors.iter().all(|s| s.path.depth() == 1));
    }

    #[test]
    fn assert_helper_is_inlined_as_a_fork() {
        let helper = mid("assertBoolean", "(Z)V");
        let id = mid("tricky", "(Z)V");
        let (code, id) = frontend_for(
            id,
            vec![
                Opcode::Load { ty: Type::Boolean, index: 0 },
                Opcode::InvokeStatic { method: helper },
                Opcode::Return { ty: None },
            ],
        );
        let frontend = Frontend::new(&code, id);
        let state = frontend.step(&frontend.initial_state()).unwrap().remove(0);
        let successors = frontend.step(&state).unwrap();
        assert_eq!(successors.len(), 2);
        assert_eq!(successors[0].error, Some(Outcome::AssertionError));
        assert!(!successors[1].terminated);
    }

    #[test]
    fn other_static_calls_are_stuck() {
        let opaque = mid("opaque", "(I)I");
        let id = mid("caller", "(I)V");
        let (code, id) = frontend_for(
            id,
            vec![
                Opcode::Load { ty: Type::Int, index: 0 },
                Opcode::InvokeStatic { method: opaque },
                Opcode::Return { ty: None },
            ],
        );
        let frontend = Frontend::new(&code, id);
        let state = frontend.step(&frontend.initial_state()).unwrap().remove(0);
        let successors = frontend.step(&state).unwrap();
        assert_eq!(successors.len(), 1);
        assert_eq!(successors[0].error, Some(Outcome::Diverges));
    }

    #[test]
    fn new_array_records_a_summary() {
        let id = mid("alloc", "()V");
        let (code, id) = frontend_for(
            id,
            vec![
                Opcode::Push { value: Value::Int(4) },
                Opcode::NewArray { ty: Type::Int },
                Opcode::Return { ty: None },
            ],
        );
        let frontend = Frontend::new(&code, id);
        let state = frontend.step(&frontend.initial_state()).unwrap().remove(0);
        let state = frontend.step(&state).unwrap().remove(0);
        let SymExpr::ArrayRef { name } = state.stack[0].as_ref() else {
            panic!("expected an array reference on the stack");
        };
        let summary = state.array(name).expect("summary stored under the ref name");
        assert!(summary.length.is_concrete(4));
    }

    #[test]
    fn fresh_array_load_skips_the_null_fork() {
        let id = mid("freshLoad", "()I");
        let (code, id) = frontend_for(
            id,
            vec![
                Opcode::Push { value: Value::Int(2) },
                Opcode::NewArray { ty: Type::Int },
                Opcode::Push { value: Value::Int(0) },
                Opcode::ArrayLoad { ty: Type::Int },
                Opcode::Return { ty: Some(Type::Int) },
            ],
        );
        let frontend = Frontend::new(&code, id);
        let mut state = frontend.initial_state();
        for _ in 0..3 {
            state = frontend.step(&state).unwrap().remove(0);
        }
        let successors = frontend.step(&state).unwrap();
        // low, high, ok; no null fork for a NewArray reference
        assert_eq!(successors.len(), 3);
        assert_eq!(successors[0].error, Some(Outcome::OutOfBounds));
        assert_eq!(successors[1].error, Some(Outcome::OutOfBounds));
        assert!(!successors[2].terminated);
        assert!(matches!(
            successors[2].stack[0].as_ref(),
            SymExpr::ArrayElem { .. }
        ));
    }
}
