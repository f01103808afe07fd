/// Symbolic expressions.
///
/// An immutable tagged tree shared through `Arc`: states clone handles,
/// never nodes. Equality and hashing are structural. Constructors apply
/// light peephole simplification — fold two concretes, drop additive and
/// multiplicative identities — so paths stay readable and the solver sees
/// smaller terms.

use once_cell::sync::Lazy;
use std::fmt;
use std::sync::Arc;

pub type ExprRef = Arc<SymExpr>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl SymOp {
    pub fn symbol(self) -> &'static str {
        match self {
            SymOp::Add => "+",
            SymOp::Sub => "-",
            SymOp::Mul => "*",
            SymOp::Div => "//",
            SymOp::Rem => "%",
            SymOp::Eq => "==",
            SymOp::Ne => "!=",
            SymOp::Lt => "<",
            SymOp::Le => "<=",
            SymOp::Gt => ">",
            SymOp::Ge => ">=",
            SymOp::And => "and",
            SymOp::Or => "or",
        }
    }

    pub fn is_relation(self) -> bool {
        matches!(
            self,
            SymOp::Eq | SymOp::Ne | SymOp::Lt | SymOp::Le | SymOp::Gt | SymOp::Ge
        )
    }

    pub fn from_cmp(cond: crate::bytecode::Cmp) -> SymOp {
        use crate::bytecode::Cmp;
        match cond {
            Cmp::Eq => SymOp::Eq,
            Cmp::Ne => SymOp::Ne,
            Cmp::Lt => SymOp::Lt,
            Cmp::Le => SymOp::Le,
            Cmp::Gt => SymOp::Gt,
            Cmp::Ge => SymOp::Ge,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymExpr {
    /// A symbolic or concrete integer. At least one of the fields is set;
    /// a bare concrete 0 with no name denotes null.
    Int { name: Option<String>, concrete: Option<i64> },
    Binary { op: SymOp, lhs: ExprRef, rhs: ExprRef },
    Not(ExprRef),
    /// Symbolic pointer into the per-state array table.
    ArrayRef { name: String },
    /// Symbolic read of an array element at an index.
    ArrayElem { array: String, index: ExprRef },
}

static ZERO: Lazy<ExprRef> =
    Lazy::new(|| Arc::new(SymExpr::Int { name: None, concrete: Some(0) }));
static ONE: Lazy<ExprRef> =
    Lazy::new(|| Arc::new(SymExpr::Int { name: None, concrete: Some(1) }));

impl SymExpr {
    /// Fresh input variable of integer sort.
    pub fn var(name: impl Into<String>) -> ExprRef {
        Arc::new(SymExpr::Int { name: Some(name.into()), concrete: None })
    }

    /// Concrete constant; 0 and 1 are interned.
    pub fn lit(c: i64) -> ExprRef {
        match c {
            0 => Arc::clone(&ZERO),
            1 => Arc::clone(&ONE),
            _ => Arc::new(SymExpr::Int { name: None, concrete: Some(c) }),
        }
    }

    pub fn array_ref(name: impl Into<String>) -> ExprRef {
        Arc::new(SymExpr::ArrayRef { name: name.into() })
    }

    pub fn array_elem(array: impl Into<String>, index: ExprRef) -> ExprRef {
        Arc::new(SymExpr::ArrayElem { array: array.into(), index })
    }

    /// `lhs op rhs` with peephole simplification.
    pub fn binary(op: SymOp, lhs: ExprRef, rhs: ExprRef) -> ExprRef {
        if let (Some(a), Some(b)) = (lhs.as_concrete(), rhs.as_concrete()) {
            if let Some(folded) = Self::fold(op, a, b) {
                return Self::lit(folded);
            }
        }
        match op {
            SymOp::Add if rhs.is_concrete(0) => return lhs,
            SymOp::Add if lhs.is_concrete(0) => return rhs,
            SymOp::Sub if rhs.is_concrete(0) => return lhs,
            SymOp::Mul if rhs.is_concrete(1) => return lhs,
            SymOp::Mul if lhs.is_concrete(1) => return rhs,
            SymOp::Mul if lhs.is_concrete(0) || rhs.is_concrete(0) => {
                return Self::lit(0)
            }
            SymOp::Div if rhs.is_concrete(1) => return lhs,
            _ => {}
        }
        Arc::new(SymExpr::Binary { op, lhs, rhs })
    }

    /// Logical negation; double negation collapses.
    pub fn not(e: ExprRef) -> ExprRef {
        if let SymExpr::Not(inner) = e.as_ref() {
            return Arc::clone(inner);
        }
        Arc::new(SymExpr::Not(e))
    }

    fn fold(op: SymOp, a: i64, b: i64) -> Option<i64> {
        match op {
            SymOp::Add => Some(a.checked_add(b)?),
            SymOp::Sub => Some(a.checked_sub(b)?),
            SymOp::Mul => Some(a.checked_mul(b)?),
            // never fold a potential divide-by-zero away
            SymOp::Div if b != 0 => Some(a.checked_div(b)?),
            SymOp::Rem if b != 0 => Some(a.checked_rem(b)?),
            _ => None,
        }
    }

    pub fn as_concrete(&self) -> Option<i64> {
        match self {
            SymExpr::Int { name: None, concrete } => *concrete,
            _ => None,
        }
    }

    pub fn is_concrete(&self, c: i64) -> bool {
        self.as_concrete() == Some(c)
    }

    /// The symbolic-variable name, if this is an argument-style integer.
    pub fn var_name(&self) -> Option<&str> {
        match self {
            SymExpr::Int { name: Some(n), .. } => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for SymExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymExpr::Int { name: Some(n), concrete: Some(c) } => write!(f, "{n}={c}"),
            SymExpr::Int { name: Some(n), concrete: None } => write!(f, "{n}"),
            SymExpr::Int { name: None, concrete: Some(c) } => write!(f, "{c}"),
            SymExpr::Int { name: None, concrete: None } => f.write_str("?"),
            SymExpr::Binary { op, lhs, rhs } => {
                write!(f, "({lhs} {} {rhs})", op.symbol())
            }
            SymExpr::Not(e) => write!(f, "!({e})"),
            SymExpr::ArrayRef { name } => write!(f, "ArrayRef({name})"),
            SymExpr::ArrayElem { array, index } => write!(f, "{array}[{index}]"),
        }
    }
}
