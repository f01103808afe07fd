/// Symbolic machine state.
///
/// One map serves two purposes: integer-keyed entries are the JVM local
/// slots, string-keyed entries are array summaries (symbolic length plus
/// element type) addressed by the array's symbolic name. Cloning a state
/// copies `Arc` handles and small maps; the expression graph is shared.

use std::collections::HashMap;
use std::fmt;

use crate::bytecode::PC;
use crate::jvm::Type;
use crate::outcome::Outcome;

use super::expr::ExprRef;
use super::path::PathConstraint;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocalKey {
    Slot(u16),
    Array(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocalVal {
    Value(ExprRef),
    Array(ArraySummary),
}

/// What the engine knows about an array: its length and element type.
/// Element contents are not tracked; reads become uninterpreted values.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySummary {
    pub length: ExprRef,
    pub elem: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicState {
    pub pc: PC,
    pub stack: Vec<ExprRef>,
    pub locals: HashMap<LocalKey, LocalVal>,
    pub path: PathConstraint,
    /// Control-flow branch count on this path; bounds exploration depth.
    pub depth: u32,
    /// Transitions taken on this path; bounds runaway single paths.
    pub steps: u32,
    pub terminated: bool,
    pub error: Option<Outcome>,
    pub return_value: Option<ExprRef>,
}

impl SymbolicState {
    pub fn at(pc: PC) -> Self {
        SymbolicState {
            pc,
            stack: Vec::new(),
            locals: HashMap::new(),
            path: PathConstraint::new(),
            depth: 0,
            steps: 0,
            terminated: false,
            error: None,
            return_value: None,
        }
    }

    /// Local slot lookup.
    pub fn slot(&self, index: u16) -> Option<&LocalVal> {
        self.locals.get(&LocalKey::Slot(index))
    }

    /// Array summary lookup by symbolic name.
    pub fn array(&self, name: &str) -> Option<&ArraySummary> {
        match self.locals.get(&LocalKey::Array(name.to_string())) {
            Some(LocalVal::Array(summary)) => Some(summary),
            _ => None,
        }
    }

    /// Once terminated, a state produces no successors.
    pub fn terminate(mut self, outcome: Outcome) -> Self {
        self.terminated = true;
        self.error = Some(outcome);
        self
    }
}

impl fmt::Display for SymbolicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pc={} stack=[", self.pc)?;
        for (i, e) in self.stack.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{e}")?;
        }
        write!(f, "] path={}", self.path)?;
        if self.terminated {
            match &self.error {
                Some(o) => write!(f, " terminated={o}")?,
                None => f.write_str(" terminated")?,
            }
        }
        Ok(())
    }
}
