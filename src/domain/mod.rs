/// Abstract domains for the static analysis.
///
/// Each domain is a bounded lattice over sets of 32-bit integers. The
/// abstract interpreter is generic over this trait; the product domain
/// `All` composes the three base domains componentwise.

use std::fmt;

use crate::bytecode::{BinOp, Cmp};

pub mod interval;
pub mod parity;
pub mod product;
pub mod sign;

pub use interval::Interval;
pub use parity::ParitySet;
pub use product::All;
pub use sign::SignSet;

/// Result of an abstract binary operator: the numeric over-approximation
/// plus the distinguished divide-by-zero alternative. Only `Div`/`Rem` can
/// raise the flag; the value component may be `bot` when the error is the
/// only possible outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOutcome<D> {
    pub value: D,
    pub may_divide_by_zero: bool,
}

impl<D> BinaryOutcome<D> {
    pub fn value(value: D) -> Self {
        BinaryOutcome { value, may_divide_by_zero: false }
    }
}

/// A bounded lattice with abstraction and sound transfer functions.
pub trait AbstractDomain: Clone + PartialEq + fmt::Debug {
    fn bot() -> Self;
    fn top() -> Self;
    fn is_bot(&self) -> bool;

    /// Partial order: `self ⊑ other`.
    fn le(&self, other: &Self) -> bool;
    fn join(&self, other: &Self) -> Self;
    fn meet(&self, other: &Self) -> Self;

    /// `abstract({v})` — the best abstraction of a single concrete value.
    fn abstract_value(v: i32) -> Self;

    /// `abstract(X)` for a finite set, via the join of the singletons.
    fn abstract_set<I: IntoIterator<Item = i32>>(vs: I) -> Self {
        vs.into_iter()
            .fold(Self::bot(), |acc, v| acc.join(&Self::abstract_value(v)))
    }

    /// Concretisation membership: `v ∈ γ(self)`.
    fn contains(&self, v: i32) -> bool;

    /// Sound transfer function for the integer binary operators.
    fn binary_op(op: BinOp, lhs: &Self, rhs: &Self) -> BinaryOutcome<Self>;

    /// Two-sided branch feasibility: `(may be true, may be false)` for
    /// `lhs cond rhs`. `(false, false)` only when an operand is `bot`.
    fn compare(cond: Cmp, lhs: &Self, rhs: &Self) -> (bool, bool);

    /// `Ifz` feasibility: `v cond 0`.
    fn compare_zero(cond: Cmp, v: &Self) -> (bool, bool) {
        Self::compare(cond, v, &Self::abstract_value(0))
    }
}
