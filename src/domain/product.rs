/// Product domain: Sign × Parity × Interval, componentwise.
///
/// Each component over-approximates independently, so a concrete value is
/// in the product's concretisation only when every component admits it —
/// and a branch or error alternative is feasible only when every component
/// says it is.

use super::{AbstractDomain, BinaryOutcome, Interval, ParitySet, SignSet};
use crate::bytecode::{BinOp, Cmp};

#[derive(Debug, Clone, PartialEq)]
pub struct All {
    pub sign: SignSet,
    pub parity: ParitySet,
    pub interval: Interval,
}

impl AbstractDomain for All {
    fn bot() -> Self {
        All { sign: SignSet::bot(), parity: ParitySet::bot(), interval: Interval::bot() }
    }

    fn top() -> Self {
        All { sign: SignSet::top(), parity: ParitySet::top(), interval: Interval::top() }
    }

    /// Any empty component empties the whole concretisation.
    fn is_bot(&self) -> bool {
        self.sign.is_bot() || self.parity.is_bot() || self.interval.is_bot()
    }

    fn le(&self, other: &Self) -> bool {
        if self.is_bot() {
            return true;
        }
        self.sign.le(&other.sign)
            && self.parity.le(&other.parity)
            && self.interval.le(&other.interval)
    }

    fn join(&self, other: &Self) -> Self {
        if self.is_bot() {
            return other.clone();
        }
        if other.is_bot() {
            return self.clone();
        }
        All {
            sign: self.sign.join(&other.sign),
            parity: self.parity.join(&other.parity),
            interval: self.interval.join(&other.interval),
        }
    }

    fn meet(&self, other: &Self) -> Self {
        All {
            sign: self.sign.meet(&other.sign),
            parity: self.parity.meet(&other.parity),
            interval: self.interval.meet(&other.interval),
        }
    }

    fn abstract_value(v: i32) -> Self {
        All {
            sign: SignSet::abstract_value(v),
            parity: ParitySet::abstract_value(v),
            interval: Interval::abstract_value(v),
        }
    }

    fn contains(&self, v: i32) -> bool {
        // UFCS: the bitflags-derived inherent `contains` would shadow these
        AbstractDomain::contains(&self.sign, v)
            && AbstractDomain::contains(&self.parity, v)
            && AbstractDomain::contains(&self.interval, v)
    }

    fn binary_op(op: BinOp, lhs: &Self, rhs: &Self) -> BinaryOutcome<Self> {
        let s = SignSet::binary_op(op, &lhs.sign, &rhs.sign);
        let p = ParitySet::binary_op(op, &lhs.parity, &rhs.parity);
        let i = Interval::binary_op(op, &lhs.interval, &rhs.interval);
        BinaryOutcome {
            value: All { sign: s.value, parity: p.value, interval: i.value },
            // a zero divisor must be admitted by every component
            may_divide_by_zero: s.may_divide_by_zero
                && p.may_divide_by_zero
                && i.may_divide_by_zero,
        }
    }

    fn compare(cond: Cmp, lhs: &Self, rhs: &Self) -> (bool, bool) {
        let (st, sf) = SignSet::compare(cond, &lhs.sign, &rhs.sign);
        let (pt, pf) = ParitySet::compare(cond, &lhs.parity, &rhs.parity);
        let (it, if_) = Interval::compare(cond, &lhs.interval, &rhs.interval);
        (st && pt && it, sf && pf && if_)
    }
}
