/// Syntactic baseline screens.
///
/// Fast opcode-pattern passes that flag outcomes a method *could* reach
/// without executing anything: a division opcode can divide by zero, an
/// array access can go out of bounds, a backwards jump can loop. Useful as
/// a cheap first answer and as a sanity net under the real engines — a
/// screen never misses an outcome the engines can prove, it only
/// over-reports.

use crate::bytecode::{BinOp, Opcode};
use crate::errors::AnalysisError;
use crate::jvm::{MethodId, Type};
use crate::outcome::Outcome;
use crate::Bytecode;

/// One syntactic pass over a method's opcode list.
pub trait ScreenTool {
    fn name(&self) -> &'static str;
    fn screen(&self, ops: &[Opcode]) -> Vec<Outcome>;
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// Allocation of `AssertionError` (or a raw throw) means an assertion can
/// fire.
pub struct AssertScreen;

impl ScreenTool for AssertScreen {
    fn name(&self) -> &'static str {
        "assert"
    }

    fn screen(&self, ops: &[Opcode]) -> Vec<Outcome> {
        let fires = ops
            .iter()
            .any(|op| op.is_assertion_alloc() || matches!(op, Opcode::Throw));
        if fires {
            vec![Outcome::AssertionError]
        } else {
            vec![]
        }
    }
}

/// Any integer division or remainder can divide by zero.
pub struct DivZeroScreen;

impl ScreenTool for DivZeroScreen {
    fn name(&self) -> &'static str {
        "divzero"
    }

    fn screen(&self, ops: &[Opcode]) -> Vec<Outcome> {
        let divides = ops.iter().any(|op| {
            matches!(
                op,
                Opcode::Binary { ty: Type::Int, op: BinOp::Div }
                    | Opcode::Binary { ty: Type::Int, op: BinOp::Rem }
            )
        });
        if divides {
            vec![Outcome::DivideByZero]
        } else {
            vec![]
        }
    }
}

/// Array accesses can go out of bounds, and their reference can be null.
pub struct ArrayScreen;

impl ScreenTool for ArrayScreen {
    fn name(&self) -> &'static str {
        "array"
    }

    fn screen(&self, ops: &[Opcode]) -> Vec<Outcome> {
        let touches = ops.iter().any(|op| {
            matches!(
                op,
                Opcode::ArrayLoad { .. } | Opcode::ArrayStore { .. } | Opcode::ArrayLength
            )
        });
        if touches {
            vec![Outcome::OutOfBounds, Outcome::NullPointer]
        } else {
            vec![]
        }
    }
}

/// A back edge — a jump to its own offset or earlier — suggests a loop
/// that may never terminate.
pub struct LoopScreen;

impl ScreenTool for LoopScreen {
    fn name(&self) -> &'static str {
        "loop"
    }

    fn screen(&self, ops: &[Opcode]) -> Vec<Outcome> {
        let back_edge = ops.iter().enumerate().any(|(idx, op)| match op {
            Opcode::Goto { target }
            | Opcode::If { target, .. }
            | Opcode::Ifz { target, .. } => *target <= idx,
            _ => false,
        });
        if back_edge {
            vec![Outcome::Diverges]
        } else {
            vec![]
        }
    }
}

/// A reachable return opcode can complete normally.
pub struct OkScreen;

impl ScreenTool for OkScreen {
    fn name(&self) -> &'static str {
        "ok"
    }

    fn screen(&self, ops: &[Opcode]) -> Vec<Outcome> {
        if ops.iter().any(|op| matches!(op, Opcode::Return { .. })) {
            vec![Outcome::Ok]
        } else {
            vec![]
        }
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

pub fn default_screens() -> Vec<Box<dyn ScreenTool>> {
    vec![
        Box::new(LoopScreen),
        Box::new(ArrayScreen),
        Box::new(AssertScreen),
        Box::new(DivZeroScreen),
        Box::new(OkScreen),
    ]
}

/// Run every screen over the method and collect the flagged outcomes.
pub fn run_screens(
    code: &Bytecode,
    method: &MethodId,
    screens: &[Box<dyn ScreenTool>],
) -> Result<Vec<Outcome>, AnalysisError> {
    let ops = match code.method(method) {
        Ok(ops) => ops,
        Err(AnalysisError::MethodNotFound(m)) => {
            tracing::warn!("method not found, classifying as *: {m}");
            return Ok(vec![Outcome::Diverges]);
        }
        Err(e) => return Err(e),
    };
    let mut observed = Vec::new();
    for screen in screens {
        let found = screen.screen(&ops);
        if !found.is_empty() {
            tracing::debug!("screen {} flagged {:?}", screen.name(), found);
        }
        observed.extend(found);
    }
    Ok(observed)
}
