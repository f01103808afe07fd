/// Verdict error types.
///
/// Only *programmer errors* live here — a genuinely unexecutable state:
/// stack underflow, a read of a never-written local, an offset outside the
/// method, a descriptor that does not parse. Modelled runtime outcomes
/// (`divide by zero`, `null pointer`, …) are never errors; they are
/// `Outcome` values produced as ordinary data by the engines.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("method not found: {0}")]
    MethodNotFound(String),

    #[error("offset {pc} is outside the method ({len} opcodes)")]
    OffsetOutOfRange { pc: String, len: usize },

    #[error("operand stack underflow at {pc} while executing {opcode}")]
    StackUnderflow { pc: String, opcode: String },

    #[error("local slot {index} read before any write at {pc}")]
    MissingLocal { index: u16, pc: String },

    #[error("unsupported opcode {opcode} at {pc}")]
    UnsupportedOpcode { pc: String, opcode: String },

    #[error("expected {expected} operand at {pc}, found {found}")]
    TypeConfusion { pc: String, expected: &'static str, found: String },

    #[error("malformed method descriptor '{0}'")]
    BadDescriptor(String),

    #[error("malformed target '{0}' — expected pkg.Class.method[:descriptor]")]
    BadTarget(String),

    #[error("malformed input literal '{0}'")]
    BadInput(String),

    #[error("suite i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("suite decode: {0}")]
    Json(#[from] serde_json::Error),
}
