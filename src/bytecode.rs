/// Bytecode model: opcodes, program counters, and the memoising cache.
///
/// The opcode catalog is the pragmatic JVM subset every engine shares.
/// Decoding class files is someone else's job — a `BytecodeProvider` hands
/// us the ordered opcode list for a method, and `Bytecode` memoises those
/// lists so each method is fetched exactly once per analysis.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Add;
use std::path::PathBuf;
use std::sync::Arc;

use crate::errors::AnalysisError;
use crate::jvm::{ClassName, MethodId, Type, Value};

// ---------------------------------------------------------------------------
// Operators and conditions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Ushr,
}

/// Branch conditions shared by `If` (two operands) and `Ifz` (against zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cmp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cmp {
    pub fn holds(self, lhs: i32, rhs: i32) -> bool {
        match self {
            Cmp::Eq => lhs == rhs,
            Cmp::Ne => lhs != rhs,
            Cmp::Lt => lhs < rhs,
            Cmp::Le => lhs <= rhs,
            Cmp::Gt => lhs > rhs,
            Cmp::Ge => lhs >= rhs,
        }
    }

    pub fn negate(self) -> Cmp {
        match self {
            Cmp::Eq => Cmp::Ne,
            Cmp::Ne => Cmp::Eq,
            Cmp::Lt => Cmp::Ge,
            Cmp::Ge => Cmp::Lt,
            Cmp::Gt => Cmp::Le,
            Cmp::Le => Cmp::Gt,
        }
    }
}

// ---------------------------------------------------------------------------
// Opcodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub class: ClassName,
    pub name: String,
}

/// The supported instruction set. Offsets in `If`/`Ifz`/`Goto` index into
/// the method's opcode list, not into raw bytecode bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "opr", rename_all = "snake_case")]
pub enum Opcode {
    Push { value: Value },
    Load { #[serde(rename = "type")] ty: Type, index: u16 },
    Store { #[serde(rename = "type")] ty: Type, index: u16 },
    Binary { #[serde(rename = "type")] ty: Type, op: BinOp },
    If { cond: Cmp, target: usize },
    Ifz { cond: Cmp, target: usize },
    Goto { target: usize },
    Return { #[serde(rename = "type")] ty: Option<Type> },
    Get { is_static: bool, field: FieldRef },
    New { class: ClassName },
    Dup { words: u8 },
    NewArray { #[serde(rename = "type")] ty: Type },
    ArrayLength,
    ArrayLoad { #[serde(rename = "type")] ty: Type },
    ArrayStore { #[serde(rename = "type")] ty: Type },
    Cast { from: Type, to: Type },
    InvokeStatic { method: MethodId },
    InvokeSpecial { method: MethodId, is_interface: bool },
    Throw,
    Incr { index: u16, amount: i32 },
}

pub const ASSERTION_ERROR_CLASS: &str = "java/lang/AssertionError";

impl Opcode {
    /// `new AssertionError` — the front half of the collapsed
    /// new/dup/&lt;init&gt;/throw assertion idiom.
    pub fn is_assertion_alloc(&self) -> bool {
        matches!(self, Opcode::New { class } if class.slashed() == ASSERTION_ERROR_CLASS)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Opcode::Push { .. }          => "push",
            Opcode::Load { .. }          => "load",
            Opcode::Store { .. }         => "store",
            Opcode::Binary { .. }        => "binary",
            Opcode::If { .. }            => "if",
            Opcode::Ifz { .. }           => "ifz",
            Opcode::Goto { .. }          => "goto",
            Opcode::Return { .. }        => "return",
            Opcode::Get { .. }           => "get",
            Opcode::New { .. }           => "new",
            Opcode::Dup { .. }           => "dup",
            Opcode::NewArray { .. }      => "newarray",
            Opcode::ArrayLength          => "arraylength",
            Opcode::ArrayLoad { .. }     => "arrayload",
            Opcode::ArrayStore { .. }    => "arraystore",
            Opcode::Cast { .. }          => "cast",
            Opcode::InvokeStatic { .. }  => "invokestatic",
            Opcode::InvokeSpecial { .. } => "invokespecial",
            Opcode::Throw                => "throw",
            Opcode::Incr { .. }          => "incr",
        }
    }
}

// ---------------------------------------------------------------------------
// Program counters
// ---------------------------------------------------------------------------

/// A position in a method's opcode list. Value object: `pc + n` yields a
/// fresh PC on the same method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PC {
    pub method: Arc<MethodId>,
    pub offset: usize,
}

impl PC {
    pub fn entry(method: Arc<MethodId>) -> Self {
        PC { method, offset: 0 }
    }

    pub fn with_offset(&self, offset: usize) -> Self {
        PC { method: Arc::clone(&self.method), offset }
    }
}

impl Add<usize> for &PC {
    type Output = PC;

    fn add(self, delta: usize) -> PC {
        PC { method: Arc::clone(&self.method), offset: self.offset + delta }
    }
}

impl fmt::Display for PC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.method, self.offset)
    }
}

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// External collaborator: yields the ordered opcode sequence of a method.
pub trait BytecodeProvider: Send + Sync {
    fn method_opcodes(&self, id: &MethodId) -> Result<Vec<Opcode>, AnalysisError>;
}

/// In-memory provider for tests and embedding callers.
#[derive(Default)]
pub struct OpcodeTable {
    methods: HashMap<MethodId, Vec<Opcode>>,
}

impl OpcodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: MethodId, ops: Vec<Opcode>) {
        self.methods.insert(id, ops);
    }

    pub fn with(mut self, id: MethodId, ops: Vec<Opcode>) -> Self {
        self.insert(id, ops);
        self
    }
}

impl BytecodeProvider for OpcodeTable {
    fn method_opcodes(&self, id: &MethodId) -> Result<Vec<Opcode>, AnalysisError> {
        self.methods
            .get(id)
            .cloned()
            .ok_or_else(|| AnalysisError::MethodNotFound(id.to_string()))
    }
}

/// Directory-backed provider. One JSON document per class,
/// `<dir>/<dotted.class.Name>.json`:
///
/// ```json
/// { "methods": { "divideByN:(I)I": [ { "opr": "load", ... }, ... ] } }
/// ```
pub struct JsonSuite {
    dir: PathBuf,
}

#[derive(Deserialize)]
struct SuiteDoc {
    methods: HashMap<String, Vec<Opcode>>,
}

impl JsonSuite {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonSuite { dir: dir.into() }
    }
}

impl BytecodeProvider for JsonSuite {
    fn method_opcodes(&self, id: &MethodId) -> Result<Vec<Opcode>, AnalysisError> {
        let path = self.dir.join(format!("{}.json", id.class.dotted()));
        let text = std::fs::read_to_string(&path)
            .map_err(|_| AnalysisError::MethodNotFound(id.to_string()))?;
        let doc: SuiteDoc = serde_json::from_str(&text)?;
        let key = format!("{}:{}", id.name, id.descriptor);
        doc.methods
            .get(&key)
            .cloned()
            .ok_or_else(|| AnalysisError::MethodNotFound(id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Memoising cache
// ---------------------------------------------------------------------------

/// `(method, offset) → opcode`, fetching each method from the provider at
/// most once. Reads vastly outnumber the one-time inserts, and the map
/// keeps insert semantics safe if a parallel driver ever shares it.
pub struct Bytecode {
    provider: Box<dyn BytecodeProvider>,
    methods: DashMap<MethodId, Arc<[Opcode]>>,
}

impl Bytecode {
    pub fn new(provider: Box<dyn BytecodeProvider>) -> Self {
        Bytecode { provider, methods: DashMap::new() }
    }

    /// The full opcode list of a method, memoised.
    pub fn method(&self, id: &MethodId) -> Result<Arc<[Opcode]>, AnalysisError> {
        if let Some(ops) = self.methods.get(id) {
            return Ok(Arc::clone(&ops));
        }
        let ops: Arc<[Opcode]> = self.provider.method_opcodes(id)?.into();
        self.methods.insert(id.clone(), Arc::clone(&ops));
        Ok(ops)
    }

    /// The opcode at `pc`. An out-of-range offset is a programmer error:
    /// branch targets and fall-throughs must stay inside the method.
    pub fn at(&self, pc: &PC) -> Result<Opcode, AnalysisError> {
        let ops = self.method(&pc.method)?;
        ops.get(pc.offset).cloned().ok_or_else(|| AnalysisError::OffsetOutOfRange {
            pc: pc.to_string(),
            len: ops.len(),
        })
    }

    /// Pretty-print a method's opcode list, one offset per line.
    pub fn disassemble(&self, id: &MethodId) -> Result<String, AnalysisError> {
        use std::fmt::Write;
        let ops = self.method(id)?;
        let mut out = format!("=== {id} ({} opcodes) ===\n", ops.len());
        for (offset, op) in ops.iter().enumerate() {
            let _ = writeln!(out, "  {offset:4}  {:<13} {op:?}", op.name());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jvm::MethodDescriptor;

    fn mid(name: &str) -> MethodId {
        MethodId::new(
            ClassName::new("jpamb/cases/Simple"),
            name,
            MethodDescriptor::parse("()V").unwrap(),
        )
    }

    #[test]
    fn cache_memoises_and_indexes() {
        let table = OpcodeTable::new().with(
            mid("noop"),
            vec![Opcode::Return { ty: None }],
        );
        let bc = Bytecode::new(Box::new(table));
        let pc = PC::entry(Arc::new(mid("noop")));
        assert_eq!(bc.at(&pc).unwrap(), Opcode::Return { ty: None });
        // second fetch hits the cache
        assert_eq!(bc.at(&pc).unwrap(), Opcode::Return { ty: None });
    }

    #[test]
    fn out_of_range_offset_is_fatal() {
        let table = OpcodeTable::new().with(mid("noop"), vec![Opcode::Return { ty: None }]);
        let bc = Bytecode::new(Box::new(table));
        let pc = PC { method: Arc::new(mid("noop")), offset: 7 };
        assert!(matches!(
            bc.at(&pc),
            Err(AnalysisError::OffsetOutOfRange { .. })
        ));
    }

    #[test]
    fn missing_method_is_reported() {
        let bc = Bytecode::new(Box::new(OpcodeTable::new()));
        let pc = PC::entry(Arc::new(mid("ghost")));
        assert!(matches!(bc.at(&pc), Err(AnalysisError::MethodNotFound(_))));
    }

    #[test]
    fn opcodes_round_trip_through_json() {
        let ops = vec![
            Opcode::Push { value: Value::Int(7) },
            Opcode::Load { ty: Type::Int, index: 0 },
            Opcode::Binary { ty: Type::Int, op: BinOp::Div },
            Opcode::Ifz { cond: Cmp::Eq, target: 5 },
            Opcode::Return { ty: Some(Type::Int) },
        ];
        let text = serde_json::to_string(&ops).unwrap();
        let back: Vec<Opcode> = serde_json::from_str(&text).unwrap();
        assert_eq!(ops, back);
    }

    #[test]
    fn assertion_alloc_is_recognised() {
        let op = Opcode::New { class: ClassName::new(ASSERTION_ERROR_CLASS) };
        assert!(op.is_assertion_alloc());
        let other = Opcode::New { class: ClassName::new("java/lang/Object") };
        assert!(!other.is_assertion_alloc());
    }
}
