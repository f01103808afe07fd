/// Concrete bytecode interpreter.
///
/// `step` is a total transition function over the supported opcode subset:
/// every modelled runtime outcome comes back as `Step::Terminate`, never as
/// an error. `Err` is reserved for programmer errors — stack underflow,
/// reads of never-written locals, offsets outside the method.
///
/// Integer arithmetic is two's-complement 32-bit. Add/Sub/Mul additionally
/// compare the mathematical (64-bit) result against the int range and record
/// an overflow event when it falls outside; the event is informational and
/// execution continues with the wrapped value.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::bytecode::{BinOp, Bytecode, Opcode, PC};
use crate::errors::AnalysisError;
use crate::jvm::{MethodId, Type, Value};
use crate::outcome::Outcome;

/// Default step budget of the driver loop.
pub const DEFAULT_FUEL: u32 = 1000;

// ---------------------------------------------------------------------------
// Frames and states
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub locals: HashMap<u16, Value>,
    pub stack: Vec<Value>,
    pub pc: PC,
}

impl Frame {
    pub fn from_method(method: Arc<MethodId>) -> Self {
        Frame { locals: HashMap::new(), stack: Vec::new(), pc: PC::entry(method) }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut locals: Vec<_> = self.locals.iter().collect();
        locals.sort_by_key(|(k, _)| **k);
        write!(f, "<{{")?;
        for (i, (k, v)) in locals.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}:{v}")?;
        }
        write!(f, "}}, [")?;
        for (i, v) in self.stack.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "], {}>", self.pc)
    }
}

/// A heap-allocated array. References into the heap are plain integers;
/// index 0 is reserved for null and never allocated.
#[derive(Debug, Clone, PartialEq)]
pub struct HeapArray {
    pub elem: Type,
    pub data: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub heap: HashMap<u32, HeapArray>,
    pub frames: Vec<Frame>,
    next_ref: u32,
}

impl State {
    /// Entry state for a method call: arguments widened into locals 0..n-1.
    pub fn entry(method: Arc<MethodId>, args: &[Value]) -> Self {
        let mut frame = Frame::from_method(method);
        for (i, arg) in args.iter().enumerate() {
            frame.locals.insert(i as u16, arg.widen());
        }
        State { heap: HashMap::new(), frames: vec![frame], next_ref: 1 }
    }

    /// Entry state that also allocates array arguments into the heap.
    pub fn entry_with_arrays(
        method: Arc<MethodId>,
        args: &[crate::cases::InputValue],
    ) -> Self {
        let mut state = State::entry(method, &[]);
        for (i, arg) in args.iter().enumerate() {
            let v = match arg {
                crate::cases::InputValue::Int(n) => Value::Int(*n),
                crate::cases::InputValue::Bool(b) => Value::Int(*b as i32),
                crate::cases::InputValue::Char(c) => Value::Int(*c as i32),
                crate::cases::InputValue::Null => Value::NULL,
                crate::cases::InputValue::IntArray(xs) => {
                    let data = xs.iter().map(|x| Value::Int(*x)).collect();
                    state.alloc(HeapArray { elem: Type::Int, data })
                }
            };
            state.frames[0].locals.insert(i as u16, v);
        }
        state
    }

    fn alloc(&mut self, array: HeapArray) -> Value {
        let id = self.next_ref;
        self.next_ref += 1;
        self.heap.insert(id, array);
        Value::Ref(id)
    }

    fn top_frame(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("state has no frames")
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ", self.heap)?;
        for frame in &self.frames {
            write!(f, "{frame}")?;
        }
        Ok(())
    }
}

/// Result of one transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Continue(State),
    Terminate(Outcome),
}

/// Informational arithmetic-overflow record. Never terminal.
#[derive(Debug, Clone, PartialEq)]
pub struct OverflowEvent {
    pub pc: PC,
    pub op: BinOp,
    pub lhs: i32,
    pub rhs: i32,
}

// ---------------------------------------------------------------------------
// Interpreter
// ---------------------------------------------------------------------------

pub struct Interpreter<'a> {
    code: &'a Bytecode,
    events: Vec<OverflowEvent>,
}

impl<'a> Interpreter<'a> {
    pub fn new(code: &'a Bytecode) -> Self {
        Interpreter { code, events: Vec::new() }
    }

    /// Overflow events recorded so far, in execution order.
    pub fn events(&self) -> &[OverflowEvent] {
        &self.events
    }

    /// Drive `step` up to `fuel` transitions. Budget exhaustion scores `*`,
    /// and a method the provider cannot supply is reported and scores `*`.
    pub fn run(&mut self, mut state: State, fuel: u32) -> Result<Outcome, AnalysisError> {
        for _ in 0..fuel {
            match self.step(state) {
                Ok(Step::Continue(next)) => state = next,
                Ok(Step::Terminate(outcome)) => return Ok(outcome),
                Err(AnalysisError::MethodNotFound(m)) => {
                    warn!("method not found, classifying as *: {m}");
                    return Ok(Outcome::Diverges);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(Outcome::Diverges)
    }

    pub fn step(&mut self, mut state: State) -> Result<Step, AnalysisError> {
        let pc = state.top_frame().pc.clone();
        let opcode = self.code.at(&pc)?;
        debug!("STEP {opcode:?}\n{state}");

        match opcode {
            Opcode::Push { value } => {
                let frame = state.top_frame();
                frame.stack.push(value.widen());
                frame.pc = &frame.pc + 1;
                Ok(Step::Continue(state))
            }

            Opcode::Load { index, .. } => {
                let frame = state.top_frame();
                let v = *frame.locals.get(&index).ok_or(AnalysisError::MissingLocal {
                    index,
                    pc: pc.to_string(),
                })?;
                frame.stack.push(v);
                frame.pc = &frame.pc + 1;
                Ok(Step::Continue(state))
            }

            Opcode::Store { index, .. } => {
                let v = self.pop(&mut state, &pc, &opcode)?;
                let frame = state.top_frame();
                frame.locals.insert(index, v);
                frame.pc = &frame.pc + 1;
                Ok(Step::Continue(state))
            }

            Opcode::Incr { index, amount } => {
                let frame = state.top_frame();
                let old = frame
                    .locals
                    .get(&index)
                    .copied()
                    .ok_or(AnalysisError::MissingLocal { index, pc: pc.to_string() })?;
                let old = self.expect_int(old, &pc)?;
                let new = self.checked_arith(BinOp::Add, old, amount, &pc);
                let frame = state.top_frame();
                frame.locals.insert(index, Value::Int(new));
                frame.pc = &frame.pc + 1;
                Ok(Step::Continue(state))
            }

            Opcode::Binary { ty: Type::Int, op } => self.binary_int(state, pc, opcode, op),

            Opcode::Binary { .. } => {
                warn!("non-int binary at {pc}, classifying as *");
                Ok(Step::Terminate(Outcome::Diverges))
            }

            Opcode::Ifz { cond, target } => {
                let v = self.pop_int(&mut state, &pc, &opcode)?;
                let frame = state.top_frame();
                frame.pc = if cond.holds(v, 0) {
                    frame.pc.with_offset(target)
                } else {
                    &frame.pc + 1
                };
                Ok(Step::Continue(state))
            }

            Opcode::If { cond, target } => {
                let rhs = self.pop_int(&mut state, &pc, &opcode)?;
                let lhs = self.pop_int(&mut state, &pc, &opcode)?;
                let frame = state.top_frame();
                frame.pc = if cond.holds(lhs, rhs) {
                    frame.pc.with_offset(target)
                } else {
                    &frame.pc + 1
                };
                Ok(Step::Continue(state))
            }

            Opcode::Goto { target } => {
                let frame = state.top_frame();
                frame.pc = frame.pc.with_offset(target);
                Ok(Step::Continue(state))
            }

            Opcode::Return { ref ty } => {
                let ret = match ty {
                    Some(_) => Some(self.pop(&mut state, &pc, &opcode)?),
                    None => None,
                };
                state.frames.pop();
                match state.frames.last_mut() {
                    Some(caller) => {
                        if let Some(v) = ret {
                            caller.stack.push(v);
                        }
                        caller.pc = &caller.pc + 1;
                        Ok(Step::Continue(state))
                    }
                    None => Ok(Step::Terminate(Outcome::Ok)),
                }
            }

            // Unknown static fields read as zero. A soundness escape, kept
            // because field initialisers are not modelled.
            Opcode::Get { is_static: true, .. } => {
                let frame = state.top_frame();
                frame.stack.push(Value::Int(0));
                frame.pc = &frame.pc + 1;
                Ok(Step::Continue(state))
            }

            Opcode::Get { is_static: false, .. } => {
                warn!("instance field read at {pc}, classifying as *");
                Ok(Step::Terminate(Outcome::Diverges))
            }

            Opcode::New { ref class } => {
                if opcode.is_assertion_alloc() {
                    Ok(Step::Terminate(Outcome::AssertionError))
                } else {
                    warn!("allocation of {class} at {pc}, classifying as *");
                    Ok(Step::Terminate(Outcome::Diverges))
                }
            }

            Opcode::Throw => Ok(Step::Terminate(Outcome::AssertionError)),

            Opcode::Dup { words } => {
                let frame = state.top_frame();
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
                Ok(Step::Continue(state))
            }

            Opcode::NewArray { ref ty } => {
                let ty = ty.clone();
                let len = self.pop_int(&mut state, &pc, &opcode)?;
                let fill = match ty {
                    Type::Float => Value::Float(0.0),
                    Type::Ref | Type::Array(_) => Value::NULL,
                    _ => Value::Int(0),
                };
                let data = vec![fill; len.max(0) as usize];
                let r = state.alloc(HeapArray { elem: ty, data });
                let frame = state.top_frame();
                frame.stack.push(r);
                frame.pc = &frame.pc + 1;
                Ok(Step::Continue(state))
            }

            Opcode::ArrayLength => {
                let r = self.pop(&mut state, &pc, &opcode)?;
                let array = match self.deref_array(&state, r, &pc)? {
                    Some(a) => a,
                    None => return Ok(Step::Terminate(Outcome::NullPointer)),
                };
                let len = array.data.len() as i32;
                let frame = state.top_frame();
                frame.stack.push(Value::Int(len));
                frame.pc = &frame.pc + 1;
                Ok(Step::Continue(state))
            }

            Opcode::ArrayLoad { .. } => {
                let index = self.pop_int(&mut state, &pc, &opcode)?;
                let r = self.pop(&mut state, &pc, &opcode)?;
                let array = match self.deref_array(&state, r, &pc)? {
                    Some(a) => a,
                    None => return Ok(Step::Terminate(Outcome::NullPointer)),
                };
                if index < 0 || index as usize >= array.data.len() {
                    return Ok(Step::Terminate(Outcome::OutOfBounds));
                }
                let v = array.data[index as usize].widen();
                let frame = state.top_frame();
                frame.stack.push(v);
                frame.pc = &frame.pc + 1;
                Ok(Step::Continue(state))
            }

            Opcode::ArrayStore { .. } => {
                let value = self.pop(&mut state, &pc, &opcode)?;
                let index = self.pop_int(&mut state, &pc, &opcode)?;
                let r = self.pop(&mut state, &pc, &opcode)?;
                let id = match r {
                    Value::Ref(0) => return Ok(Step::Terminate(Outcome::NullPointer)),
                    Value::Ref(id) if state.heap.contains_key(&id) => id,
                    Value::Ref(_) => return Ok(Step::Terminate(Outcome::NullPointer)),
                    other => {
                        return Err(AnalysisError::TypeConfusion {
                            pc: pc.to_string(),
                            expected: "reference",
                            found: other.type_name().to_string(),
                        })
                    }
                };
                let len = state.heap[&id].data.len();
                if index < 0 || index as usize >= len {
                    return Ok(Step::Terminate(Outcome::OutOfBounds));
                }
                state.heap.get_mut(&id).expect("array vanished").data[index as usize] = value;
                let frame = state.top_frame();
                frame.pc = &frame.pc + 1;
                Ok(Step::Continue(state))
            }

            Opcode::Cast { .. } => {
                // int-family casts only; value already widened
                let frame = state.top_frame();
                frame.pc = &frame.pc + 1;
                Ok(Step::Continue(state))
            }

            Opcode::InvokeStatic { ref method } => {
                let n = method.descriptor.params.len();
                let mut args = Vec::with_capacity(n);
                for _ in 0..n {
                    args.push(self.pop(&mut state, &pc, &opcode)?);
                }
                args.reverse();
                let mut callee = Frame::from_method(Arc::new(method.clone()));
                for (i, arg) in args.into_iter().enumerate() {
                    callee.locals.insert(i as u16, arg);
                }
                // caller pc stays on the invoke; Return advances it
                state.frames.push(callee);
                Ok(Step::Continue(state))
            }

            Opcode::InvokeSpecial { .. } => {
                warn!("invokespecial at {pc}, classifying as *");
                Ok(Step::Terminate(Outcome::Diverges))
            }
        }
    }

    // ── Arithmetic ───────────────────────────────────────────────────────────

    fn binary_int(
        &mut self,
        mut state: State,
        pc: PC,
        opcode: Opcode,
        op: BinOp,
    ) -> Result<Step, AnalysisError> {
        let rhs = self.pop_int(&mut state, &pc, &opcode)?;
        let lhs = self.pop_int(&mut state, &pc, &opcode)?;

        let result = match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul => self.checked_arith(op, lhs, rhs, &pc),
            BinOp::Div => {
                if rhs == 0 {
                    info!("divzero at {pc}");
                    return Ok(Step::Terminate(Outcome::DivideByZero));
                }
                lhs.wrapping_div(rhs)
            }
            BinOp::Rem => {
                if rhs == 0 {
                    info!("divzero at {pc}");
                    return Ok(Step::Terminate(Outcome::DivideByZero));
                }
                lhs.wrapping_rem(rhs)
            }
            BinOp::And => lhs & rhs,
            BinOp::Or => lhs | rhs,
            BinOp::Xor => lhs ^ rhs,
            BinOp::Shl => lhs.wrapping_shl(rhs as u32 & 31),
            BinOp::Shr => lhs.wrapping_shr(rhs as u32 & 31),
            BinOp::Ushr => ((lhs as u32).wrapping_shr(rhs as u32 & 31)) as i32,
        };

        let frame = state.top_frame();
        frame.stack.push(Value::Int(result));
        frame.pc = &frame.pc + 1;
        Ok(Step::Continue(state))
    }

    /// Add/Sub/Mul with overflow detection against the mathematical result.
    fn checked_arith(&mut self, op: BinOp, lhs: i32, rhs: i32, pc: &PC) -> i32 {
        let wide = match op {
            BinOp::Add => lhs as i64 + rhs as i64,
            BinOp::Sub => lhs as i64 - rhs as i64,
            BinOp::Mul => lhs as i64 * rhs as i64,
            _ => unreachable!("checked_arith only covers add/sub/mul"),
        };
        if wide < i32::MIN as i64 || wide > i32::MAX as i64 {
            info!("overflow at {pc}: {lhs} {op:?} {rhs}");
            self.events.push(OverflowEvent { pc: pc.clone(), op, lhs, rhs });
        }
        wide as i32
    }

    // ── Stack helpers ────────────────────────────────────────────────────────

    fn pop(&self, state: &mut State, pc: &PC, opcode: &Opcode) -> Result<Value, AnalysisError> {
        state.top_frame().stack.pop().ok_or_else(|| AnalysisError::StackUnderflow {
            pc: pc.to_string(),
            opcode: format!("{opcode:?}"),
        })
    }

    fn pop_int(&self, state: &mut State, pc: &PC, opcode: &Opcode) -> Result<i32, AnalysisError> {
        let v = self.pop(state, pc, opcode)?;
        self.expect_int(v, pc)
    }

    fn expect_int(&self, v: Value, pc: &PC) -> Result<i32, AnalysisError> {
        v.as_int().ok_or_else(|| AnalysisError::TypeConfusion {
            pc: pc.to_string(),
            expected: "int",
            found: v.type_name().to_string(),
        })
    }

    /// Resolve an array reference. `Ok(None)` means null.
    fn deref_array<'s>(
        &self,
        state: &'s State,
        r: Value,
        pc: &PC,
    ) -> Result<Option<&'s HeapArray>, AnalysisError> {
        match r {
            Value::Ref(0) => Ok(None),
            Value::Ref(id) => Ok(state.heap.get(&id)),
            other => Err(AnalysisError::TypeConfusion {
                pc: pc.to_string(),
                expected: "reference",
                found: other.type_name().to_string(),
            }),
        }
    }
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

    fn run_one(
        name: &str,
        desc: &str,
        ops: Vec<Opcode>,
        args: &[Value],
    ) -> (Outcome, usize) {
        let id = mid(name, desc);
        let bc = Bytecode::new(Box::new(OpcodeTable::new().with(id.clone(), ops)));
        let mut interp = Interpreter::new(&bc);
        let state = State::entry(Arc::new(id), args);
        let outcome = interp.run(state, DEFAULT_FUEL).unwrap();
        (outcome, interp.events().len())
    }

    // 1 / n
    fn divide_by_n() -> Vec<Opcode> {
        vec![
            Opcode::Push { value: Value::Int(1) },
            Opcode::Load { ty: Type::Int, index: 0 },
            Opcode::Binary { ty: Type::Int, op: BinOp::Div },
            Opcode::Return { ty: Some(Type::Int) },
        ]
    }

    #[test]
    fn division_by_zero_terminates() {
        let (outcome, _) = run_one("divideByN", "(I)I", divide_by_n(), &[Value::Int(0)]);
        assert_eq!(outcome, Outcome::DivideByZero);
    }

    #[test]
    fn division_by_five_returns_ok() {
        let (outcome, _) = run_one("divideByN", "(I)I", divide_by_n(), &[Value::Int(5)]);
        assert_eq!(outcome, Outcome::Ok);
    }

    #[test]
    fn add_overflow_is_informational() {
        let ops = vec![
            Opcode::Load { ty: Type::Int, index: 0 },
            Opcode::Load { ty: Type::Int, index: 1 },
            Opcode::Binary { ty: Type::Int, op: BinOp::Add },
            Opcode::Return { ty: Some(Type::Int) },
        ];
        let (outcome, events) =
            run_one("add", "(II)I", ops, &[Value::Int(i32::MAX), Value::Int(1)]);
        assert_eq!(outcome, Outcome::Ok);
        assert_eq!(events, 1);
    }

    #[test]
    fn assertion_idiom_collapses() {
        // assert false: getstatic $assertionsDisabled, ifne end, new AE
        let ops = vec![
            Opcode::Get {
                is_static: true,
                field: crate::bytecode::FieldRef {
                    class: ClassName::new("jpamb/cases/Simple"),
                    name: "$assertionsDisabled".to_string(),
                },
            },
            Opcode::Ifz { cond: Cmp::Ne, target: 3 },
            Opcode::New { class: ClassName::new("java/lang/AssertionError") },
            Opcode::Return { ty: None },
        ];
        let (outcome, _) = run_one("alwaysAsserts", "()V", ops, &[]);
        assert_eq!(outcome, Outcome::AssertionError);
    }

    #[test]
    fn infinite_loop_exhausts_fuel() {
        let ops = vec![Opcode::Goto { target: 0 }];
        let (outcome, _) = run_one("loopForever", "()V", ops, &[]);
        assert_eq!(outcome, Outcome::Diverges);
    }

    #[test]
    fn branch_equality_takes_the_jump() {
        // if (a == b) return 1 else return 0
        let ops = vec![
            Opcode::Load { ty: Type::Int, index: 0 },
            Opcode::Load { ty: Type::Int, index: 1 },
            Opcode::If { cond: Cmp::Eq, target: 5 },
            Opcode::Push { value: Value::Int(0) },
            Opcode::Return { ty: Some(Type::Int) },
            Opcode::Push { value: Value::Int(1) },
            Opcode::Return { ty: Some(Type::Int) },
        ];
        let (outcome, _) = run_one("eq", "(II)I", ops, &[Value::Int(3), Value::Int(3)]);
        assert_eq!(outcome, Outcome::Ok);
    }

    #[test]
    fn array_access_checks_null_and_bounds() {
        // return a[i]
        let ops = vec![
            Opcode::Load { ty: Type::Ref, index: 0 },
            Opcode::Load { ty: Type::Int, index: 1 },
            Opcode::ArrayLoad { ty: Type::Int },
            Opcode::Return { ty: Some(Type::Int) },
        ];
        let id = mid("arrayAt", "([II)I");
        let bc = Bytecode::new(Box::new(OpcodeTable::new().with(id.clone(), ops)));

        // null array
        let mut interp = Interpreter::new(&bc);
        let state = State::entry(Arc::new(id.clone()), &[Value::NULL, Value::Int(0)]);
        assert_eq!(interp.run(state, DEFAULT_FUEL).unwrap(), Outcome::NullPointer);

        // out-of-bounds index on a real array
        use crate::cases::InputValue;
        let mut interp = Interpreter::new(&bc);
        let state = State::entry_with_arrays(
            Arc::new(id.clone()),
            &[InputValue::IntArray(vec![7, 8]), InputValue::Int(5)],
        );
        assert_eq!(interp.run(state, DEFAULT_FUEL).unwrap(), Outcome::OutOfBounds);

        // in-bounds read
        let mut interp = Interpreter::new(&bc);
        let state = State::entry_with_arrays(
            Arc::new(id),
            &[InputValue::IntArray(vec![7, 8]), InputValue::Int(1)],
        );
        assert_eq!(interp.run(state, DEFAULT_FUEL).unwrap(), Outcome::Ok);
    }

    #[test]
    fn new_array_store_load_round_trip() {
        // int[] a = new int[2]; a[1] = 9; return a[1];
        let ops = vec![
            Opcode::Push { value: Value::Int(2) },
            Opcode::NewArray { ty: Type::Int },
            Opcode::Store { ty: Type::Ref, index: 0 },
            Opcode::Load { ty: Type::Ref, index: 0 },
            Opcode::Push { value: Value::Int(1) },
            Opcode::Push { value: Value::Int(9) },
            Opcode::ArrayStore { ty: Type::Int },
            Opcode::Load { ty: Type::Ref, index: 0 },
            Opcode::Push { value: Value::Int(1) },
            Opcode::ArrayLoad { ty: Type::Int },
            Opcode::Return { ty: Some(Type::Int) },
        ];
        let (outcome, _) = run_one("roundTrip", "()I", ops, &[]);
        assert_eq!(outcome, Outcome::Ok);
    }

    #[test]
    fn static_invocation_resumes_caller() {
        // callee: return arg0 + 1 ; caller: return callee(41)
        let callee = mid("inc", "(I)I");
        let caller = mid("callsInc", "()I");
        let table = OpcodeTable::new()
            .with(
                callee.clone(),
                vec![
                    Opcode::Load { ty: Type::Int, index: 0 },
                    Opcode::Push { value: Value::Int(1) },
                    Opcode::Binary { ty: Type::Int, op: BinOp::Add },
                    Opcode::Return { ty: Some(Type::Int) },
                ],
            )
            .with(
                caller.clone(),
                vec![
                    Opcode::Push { value: Value::Int(41) },
                    Opcode::InvokeStatic { method: callee },
                    Opcode::Return { ty: Some(Type::Int) },
                ],
            );
        let bc = Bytecode::new(Box::new(table));
        let mut interp = Interpreter::new(&bc);
        let state = State::entry(Arc::new(caller), &[]);
        assert_eq!(interp.run(state, DEFAULT_FUEL).unwrap(), Outcome::Ok);
    }

    #[test]
    fn missing_method_scores_star() {
        let bc = Bytecode::new(Box::new(OpcodeTable::new()));
        let mut interp = Interpreter::new(&bc);
        let state = State::entry(Arc::new(mid("ghost", "()V")), &[]);
        assert_eq!(interp.run(state, DEFAULT_FUEL).unwrap(), Outcome::Diverges);
    }

    #[test]
    fn shifts_mask_the_count() {
        // 1 << 33 == 2 under JVM masking
        let ops = vec![
            Opcode::Push { value: Value::Int(1) },
            Opcode::Push { value: Value::Int(33) },
            Opcode::Binary { ty: Type::Int, op: BinOp::Shl },
            Opcode::Push { value: Value::Int(2) },
            Opcode::If { cond: Cmp::Eq, target: 6 },
            Opcode::New { class: ClassName::new("java/lang/AssertionError") },
            Opcode::Return { ty: None },
        ];
        let (outcome, _) = run_one("shl", "()V", ops, &[]);
        assert_eq!(outcome, Outcome::Ok);
    }

    #[test]
    fn ushr_is_logical() {
        // -1 >>> 28 == 15
        let ops = vec![
            Opcode::Push { value: Value::Int(-1) },
            Opcode::Push { value: Value::Int(28) },
            Opcode::Binary { ty: Type::Int, op: BinOp::Ushr },
            Opcode::Push { value: Value::Int(15) },
            Opcode::If { cond: Cmp::Eq, target: 6 },
            Opcode::New { class: ClassName::new("java/lang/AssertionError") },
            Opcode::Return { ty: None },
        ];
        let (outcome, _) = run_one("ushr", "()V", ops, &[]);
        assert_eq!(outcome, Outcome::Ok);
    }

    #[test]
    fn stack_underflow_is_fatal() {
        let ops = vec![Opcode::Binary { ty: Type::Int, op: BinOp::Add }];
        let id = mid("broken", "()V");
        let bc = Bytecode::new(Box::new(OpcodeTable::new().with(id.clone(), ops)));
        let mut interp = Interpreter::new(&bc);
        let state = State::entry(Arc::new(id), &[]);
        assert!(matches!(
            interp.run(state, DEFAULT_FUEL),
            Err(AnalysisError::StackUnderflow { .. })
        ));
    }
}
