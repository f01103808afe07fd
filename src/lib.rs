/// Verdict — outcome analysis for JVM bytecode methods.
///
/// Module layout:
///   - jvm         — method identities, descriptors, concrete values
///   - bytecode    — opcode model, program counters, memoising cache
///   - outcome     — the six-label outcome catalog
///   - interpreter — concrete interpreter (single-step + fuel-bounded run)
///   - domain      — Sign / Parity / Interval lattices + product
///   - absint      — worklist abstract interpreter with per-offset join
///   - baseline    — syntactic opcode-pattern screens
///   - symbolic    — symbolic executor, path constraints, solver, export
///   - scorer      — per-outcome confidence lines
///   - cases       — target + input parsing (case provider)
///   - coverage    — per-edge coverage tracking for the fuzzing glue
///   - errors      — programmer-error taxonomy

// ── Shared bytecode model ────────────────────────────────────────────────────
pub mod bytecode;
pub mod errors;
pub mod jvm;
pub mod outcome;

// ── Engines ──────────────────────────────────────────────────────────────────
pub mod absint;
pub mod baseline;
pub mod domain;
pub mod interpreter;
pub mod symbolic;

// ── Reporting & glue ─────────────────────────────────────────────────────────
pub mod cases;
pub mod coverage;
pub mod scorer;

// ── Re-exports for convenience ───────────────────────────────────────────────
pub use absint::{AbstractInterpreter, AbstractReport};
pub use bytecode::{Bytecode, BytecodeProvider, JsonSuite, Opcode, OpcodeTable, PC};
pub use cases::{Case, CaseProvider, CliCase, InputValue};
pub use domain::{AbstractDomain, All, Interval, ParitySet, SignSet};
pub use errors::AnalysisError;
pub use interpreter::{Interpreter, State, Step};
pub use jvm::{ClassName, MethodDescriptor, MethodId, Type, Value};
pub use outcome::Outcome;
pub use symbolic::{Executor, Finding, Frontend, SearchSolver, SymConfig};
