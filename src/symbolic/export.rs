/// SE_JSON export: a framed JSON block a downstream consumer (e.g. a
/// concolic fuzzer picking seeds) can cut out of the analyzer's stdout.
/// Gated behind the `SE_JSON=1` environment flag by the caller.
///
/// ```text
/// SE_JSON_BEGIN
/// {"method": "...", "findings": [...]}
/// SE_JSON_END
/// ```

use serde_json::{json, Value as Json};
use std::io::{self, Write};

use crate::jvm::MethodId;

use super::expr::SymExpr;
use super::findings::Finding;
use super::state::{LocalKey, LocalVal, SymbolicState};

pub const FRAME_BEGIN: &str = "SE_JSON_BEGIN";
pub const FRAME_END: &str = "SE_JSON_END";

pub fn expr_to_json(e: &SymExpr) -> Json {
    match e {
        SymExpr::Int { name, concrete } => json!({
            "kind": "symint",
            "name": name,
            "concrete": concrete,
        }),
        SymExpr::Binary { op, lhs, rhs } => json!({
            "kind": "binop",
            "op": op.symbol(),
            "lhs": expr_to_json(lhs),
            "rhs": expr_to_json(rhs),
        }),
        SymExpr::Not(inner) => json!({
            "kind": "not",
            "expr": expr_to_json(inner),
        }),
        SymExpr::ArrayRef { name } => json!({
            "kind": "arrayref",
            "name": name,
        }),
        SymExpr::ArrayElem { array, index } => json!({
            "kind": "arrayelem",
            "array": array,
            "index": expr_to_json(index),
        }),
    }
}

pub fn state_to_json(s: &SymbolicState) -> Json {
    // argument-style locals double as the path's input variables
    let mut inputs = serde_json::Map::new();
    for (key, val) in &s.locals {
        if let (LocalKey::Slot(i), LocalVal::Value(e)) = (key, val) {
            if matches!(e.as_ref(), SymExpr::Int { .. }) {
                inputs.insert(i.to_string(), expr_to_json(e));
            }
        }
    }

    json!({
        "terminated": s.terminated,
        "error": s.error.map(|o| o.label()),
        "pc": {
            "method": s.pc.method.to_string(),
            "offset": s.pc.offset,
        },
        "path": s.path.iter().map(|c| expr_to_json(c)).collect::<Vec<_>>(),
        "inputs": inputs,
    })
}

pub fn finding_to_json(f: &Finding) -> Json {
    json!({
        "kind": f.kind.label(),
        "state": state_to_json(&f.state),
    })
}

/// Write the full framed block.
pub fn emit(
    out: &mut impl Write,
    method: &MethodId,
    findings: &[Finding],
) -> io::Result<()> {
    let payload = json!({
        "method": method.to_string(),
        "findings": findings.iter().map(finding_to_json).collect::<Vec<_>>(),
    });
    writeln!(out, "{FRAME_BEGIN}")?;
    writeln!(out, "{payload}")?;
    writeln!(out, "{FRAME_END}")
}
