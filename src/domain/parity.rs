/// Parity domain: subsets of {even, odd}.
///
/// Zero is even, so a divisor that may be even also may be zero — division
/// raises the divide-by-zero alternative whenever the divisor admits even
/// values. Orderings are invisible to parity; only (dis)equality can ever
/// be refined, and only in the one direction parity can prove.

use bitflags::bitflags;

use super::{AbstractDomain, BinaryOutcome};
use crate::bytecode::{BinOp, Cmp};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ParitySet: u8 {
        const EVEN = 0b01;
        const ODD  = 0b10;
    }
}

impl ParitySet {
    fn atoms(self) -> impl Iterator<Item = ParitySet> {
        [ParitySet::EVEN, ParitySet::ODD]
            .into_iter()
            .filter(move |a| self.contains(*a))
    }

    fn add_atoms(a: ParitySet, b: ParitySet) -> ParitySet {
        if a == b {
            ParitySet::EVEN
        } else {
            ParitySet::ODD
        }
    }

    fn mul_atoms(a: ParitySet, b: ParitySet) -> ParitySet {
        if a == ParitySet::ODD && b == ParitySet::ODD {
            ParitySet::ODD
        } else {
            ParitySet::EVEN
        }
    }

    /// Parity of the low bit under `&`, `|`, `^`.
    fn bit_atoms(op: BinOp, a: ParitySet, b: ParitySet) -> ParitySet {
        let (x, y) = (a == ParitySet::ODD, b == ParitySet::ODD);
        let low = match op {
            BinOp::And => x && y,
            BinOp::Or => x || y,
            _ => x ^ y,
        };
        if low {
            ParitySet::ODD
        } else {
            ParitySet::EVEN
        }
    }
}

impl AbstractDomain for ParitySet {
    fn bot() -> Self {
        ParitySet::empty()
    }

    fn top() -> Self {
        ParitySet::all()
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
        if v % 2 == 0 {
            ParitySet::EVEN
        } else {
            ParitySet::ODD
        }
    }

    fn contains(&self, v: i32) -> bool {
        Self::abstract_value(v).le(self)
    }

    fn binary_op(op: BinOp, lhs: &Self, rhs: &Self) -> BinaryOutcome<Self> {
        if lhs.is_bot() || rhs.is_bot() {
            return BinaryOutcome::value(Self::bot());
        }
        let table = |f: fn(ParitySet, ParitySet) -> ParitySet| {
            let mut out = Self::bot();
            for a in lhs.atoms() {
                for b in rhs.atoms() {
                    out |= f(a, b);
                }
            }
            BinaryOutcome::value(out)
        };
        match op {
            // a - b has the parity of a + b
            BinOp::Add | BinOp::Sub => table(Self::add_atoms),
            BinOp::Mul => table(Self::mul_atoms),
            BinOp::Div | BinOp::Rem => BinaryOutcome {
                value: Self::top(),
                // zero is even
                may_divide_by_zero: rhs.contains(ParitySet::EVEN),
            },
            BinOp::And => table(|a, b| Self::bit_atoms(BinOp::And, a, b)),
            BinOp::Or => table(|a, b| Self::bit_atoms(BinOp::Or, a, b)),
            BinOp::Xor => table(|a, b| Self::bit_atoms(BinOp::Xor, a, b)),
            // a shift by an unknown count scrambles the low bit
            BinOp::Shl | BinOp::Shr | BinOp::Ushr => BinaryOutcome::value(Self::top()),
        }
    }

    fn compare(cond: Cmp, lhs: &Self, rhs: &Self) -> (bool, bool) {
        if lhs.is_bot() || rhs.is_bot() {
            return (false, false);
        }
        let overlap = !(*lhs & *rhs).is_empty();
        match cond {
            // distinct parities can never be equal
            Cmp::Eq => (overlap, true),
            Cmp::Ne => (true, overlap),
            // orderings are invisible to parity
            _ => (true, true),
        }
    }
}
