/// Sign domain: subsets of {−, 0, +}.
///
/// Binary operators are defined by lookup over the atom pairs; division
/// truncates toward zero, so a quotient of opposite-sign operands may be
/// zero (`-1 / 2 == 0`). Division by a divisor that may be zero raises the
/// distinguished divide-by-zero alternative instead of producing atoms.

use bitflags::bitflags;
use std::cmp::Ordering;

use super::{AbstractDomain, BinaryOutcome};
use crate::bytecode::{BinOp, Cmp};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SignSet: u8 {
        const NEG  = 0b001;
        const ZERO = 0b010;
        const POS  = 0b100;
    }
}

/// One sign, for the operator tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Atom {
    Neg,
    Zero,
    Pos,
}

impl Atom {
    fn as_set(self) -> SignSet {
        match self {
            Atom::Neg => SignSet::NEG,
            Atom::Zero => SignSet::ZERO,
            Atom::Pos => SignSet::POS,
        }
    }
}

impl SignSet {
    fn atoms(self) -> impl Iterator<Item = Atom> {
        [Atom::Neg, Atom::Zero, Atom::Pos]
            .into_iter()
            .filter(move |a| self.contains(a.as_set()))
    }

    /// Mirror around zero: used by `Sub` via `a - b = a + (−b)`.
    fn negated(self) -> SignSet {
        let mut out = SignSet::empty();
        if self.contains(SignSet::NEG) {
            out |= SignSet::POS;
        }
        if self.contains(SignSet::ZERO) {
            out |= SignSet::ZERO;
        }
        if self.contains(SignSet::POS) {
            out |= SignSet::NEG;
        }
        out
    }

    /// Possible orderings between members of two sign atoms.
    fn orderings(a: Atom, b: Atom) -> &'static [Ordering] {
        use Ordering::*;
        match (a, b) {
            (Atom::Neg, Atom::Neg) | (Atom::Pos, Atom::Pos) => &[Less, Equal, Greater],
            (Atom::Neg, _) => &[Less],
            (Atom::Zero, Atom::Neg) => &[Greater],
            (Atom::Zero, Atom::Zero) => &[Equal],
            (Atom::Zero, Atom::Pos) => &[Less],
            (Atom::Pos, _) => &[Greater],
        }
    }

    fn add_atoms(a: Atom, b: Atom) -> SignSet {
        match (a, b) {
            (Atom::Zero, x) | (x, Atom::Zero) => x.as_set(),
            (Atom::Neg, Atom::Neg) => SignSet::NEG,
            (Atom::Pos, Atom::Pos) => SignSet::POS,
            // opposite signs: anything can happen
            _ => SignSet::all(),
        }
    }

    fn mul_atoms(a: Atom, b: Atom) -> SignSet {
        match (a, b) {
            (Atom::Zero, _) | (_, Atom::Zero) => SignSet::ZERO,
            (Atom::Neg, Atom::Neg) | (Atom::Pos, Atom::Pos) => SignSet::POS,
            _ => SignSet::NEG,
        }
    }

    /// Truncating division of atom by non-zero atom.
    fn div_atoms(a: Atom, b: Atom) -> SignSet {
        match (a, b) {
            (Atom::Zero, _) => SignSet::ZERO,
            (Atom::Neg, Atom::Neg) | (Atom::Pos, Atom::Pos) => SignSet::POS | SignSet::ZERO,
            _ => SignSet::NEG | SignSet::ZERO,
        }
    }

    /// Remainder sign follows the dividend (Java `irem`).
    fn rem_atoms(a: Atom) -> SignSet {
        match a {
            Atom::Zero => SignSet::ZERO,
            Atom::Neg => SignSet::NEG | SignSet::ZERO,
            Atom::Pos => SignSet::POS | SignSet::ZERO,
        }
    }
}

impl AbstractDomain for SignSet {
    fn bot() -> Self {
        SignSet::empty()
    }

    fn top() -> Self {
        SignSet::all()
    }

    fn is_bot(&self) -> bool {
        self.is_empty()
    }

    fn le(&self, other: &Self) -> bool {
        other.contains(*self)
    }

    fn join(&self, other: &Self) -> Self {
        *self | *other
    }

    fn meet(&self, other: &Self) -> Self {
        *self & *other
    }

    fn abstract_value(v: i32) -> Self {
        match v.cmp(&0) {
            Ordering::Less => SignSet::NEG,
            Ordering::Equal => SignSet::ZERO,
            Ordering::Greater => SignSet::POS,
        }
    }

    fn contains(&self, v: i32) -> bool {
        self.contains(Self::abstract_value(v))
    }

    fn binary_op(op: BinOp, lhs: &Self, rhs: &Self) -> BinaryOutcome<Self> {
        if lhs.is_bot() || rhs.is_bot() {
            return BinaryOutcome::value(Self::bot());
        }
        let table = |f: fn(Atom, Atom) -> SignSet| {
            let mut out = Self::bot();
            for a in lhs.atoms() {
                for b in rhs.atoms() {
                    out |= f(a, b);
                }
            }
            BinaryOutcome::value(out)
        };
        match op {
            BinOp::Add => table(Self::add_atoms),
            BinOp::Sub => Self::binary_op(BinOp::Add, lhs, &rhs.negated()),
            BinOp::Mul => table(Self::mul_atoms),
            BinOp::Div | BinOp::Rem => {
                let may_divide_by_zero = rhs.contains(SignSet::ZERO);
                let mut out = Self::bot();
                for b in rhs.atoms().filter(|b| *b != Atom::Zero) {
                    for a in lhs.atoms() {
                        out |= match op {
                            BinOp::Div => Self::div_atoms(a, b),
                            _ => Self::rem_atoms(a),
                        };
                    }
                }
                BinaryOutcome { value: out, may_divide_by_zero }
            }
            BinOp::And | BinOp::Or | BinOp::Xor => {
                if *lhs == SignSet::ZERO && *rhs == SignSet::ZERO {
                    BinaryOutcome::value(SignSet::ZERO)
                } else {
                    BinaryOutcome::value(Self::top())
                }
            }
            BinOp::Shl | BinOp::Shr | BinOp::Ushr => {
                if *lhs == SignSet::ZERO {
                    BinaryOutcome::value(SignSet::ZERO)
                } else {
                    BinaryOutcome::value(Self::top())
                }
            }
        }
    }

    fn compare(cond: Cmp, lhs: &Self, rhs: &Self) -> (bool, bool) {
        if lhs.is_bot() || rhs.is_bot() {
            return (false, false);
        }
        let satisfied = |ord: Ordering| match cond {
            Cmp::Eq => ord == Ordering::Equal,
            Cmp::Ne => ord != Ordering::Equal,
            Cmp::Lt => ord == Ordering::Less,
            Cmp::Le => ord != Ordering::Greater,
            Cmp::Gt => ord == Ordering::Greater,
            Cmp::Ge => ord != Ordering::Less,
        };
        let mut maybe_true = false;
        let mut maybe_false = false;
        for a in lhs.atoms() {
            for b in rhs.atoms() {
                for ord in Self::orderings(a, b) {
                    if satisfied(*ord) {
                        maybe_true = true;
                    } else {
                        maybe_false = true;
                    }
                }
            }
        }
        (maybe_true, maybe_false)
    }
}
