/// Symbolic execution engine.
///
/// Module layout:
///   - expr      — immutable Arc-shared expression trees + peephole rules
///   - path      — ordered conjunction of branch conditions
///   - state     — symbolic machine state (stack, locals, array summaries)
///   - config    — exploration bounds and switches
///   - strategy  — DFS / BFS worklist order
///   - solver    — feasibility checks and models over path constraints
///   - frontend  — the symbolic step function over the opcode model
///   - executor  — bounded worklist driver collecting findings
///   - findings  — terminated paths, ready for the scorer
///   - export    — SE_JSON framed output for downstream consumers

pub mod config;
pub mod executor;
pub mod export;
pub mod expr;
pub mod findings;
pub mod frontend;
pub mod path;
pub mod solver;
pub mod state;
pub mod strategy;

pub use config::{SymConfig, MAX_STEPS_PER_STATE};
pub use executor::Executor;
pub use expr::{ExprRef, SymExpr, SymOp};
pub use findings::Finding;
pub use frontend::Frontend;
pub use path::PathConstraint;
pub use solver::{SearchSolver, Solver, TrustingSolver};
pub use state::{ArraySummary, LocalKey, LocalVal, SymbolicState};
pub use strategy::{SearchOrder, Worklist};
