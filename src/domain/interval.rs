/// Interval domain: closed ranges `[lo, hi]` with ±∞ saturation.
///
/// Bounds are held as `i64`, with `i64::MIN`/`i64::MAX` as the infinities;
/// every finite bound stays inside the `i32` range. The concrete machine
/// wraps on overflow, so any arithmetic whose mathematical bounds leave the
/// int range answers `top` — precise wrapping intervals are not worth their
/// complexity here. This domain has infinite ascending chains; the abstract
/// interpreter's iteration bound guarantees termination.

use super::{AbstractDomain, BinaryOutcome};
use crate::bytecode::{BinOp, Cmp};

const NEG_INF: i64 = i64::MIN;
const POS_INF: i64 = i64::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    lo: i64,
    hi: i64,
}

/// Canonical empty interval, so `PartialEq` can stay derived.
const EMPTY: Interval = Interval { lo: POS_INF, hi: NEG_INF };

impl Interval {
    pub fn new(lo: i64, hi: i64) -> Self {
        if lo > hi {
            EMPTY
        } else {
            Interval { lo, hi }
        }
    }

    pub fn lo(&self) -> i64 {
        self.lo
    }

    pub fn hi(&self) -> i64 {
        self.hi
    }

    fn is_singleton(&self) -> bool {
        self.lo == self.hi
    }

    fn has_finite_bounds(&self) -> bool {
        self.lo != NEG_INF && self.hi != POS_INF
    }

    fn fits_int(lo: i64, hi: i64) -> bool {
        lo >= i32::MIN as i64 && hi <= i32::MAX as i64
    }

    /// The sub-range of `self` excluding zero, on the requested side.
    fn without_zero(self, negative: bool) -> Interval {
        if negative {
            Interval::new(self.lo, self.hi.min(-1))
        } else {
            Interval::new(self.lo.max(1), self.hi)
        }
    }

    /// Hull of the four corner products/quotients of two finite intervals.
    fn from_corners(xs: [i64; 4]) -> Interval {
        let lo = xs.iter().copied().min().expect("four corners");
        let hi = xs.iter().copied().max().expect("four corners");
        Interval::new(lo, hi)
    }
}

impl AbstractDomain for Interval {
    fn bot() -> Self {
        EMPTY
    }

    fn top() -> Self {
        Interval { lo: NEG_INF, hi: POS_INF }
    }

    fn is_bot(&self) -> bool {
        self.lo > self.hi
    }

    fn le(&self, other: &Self) -> bool {
        self.is_bot() || (!other.is_bot() && other.lo <= self.lo && self.hi <= other.hi)
    }

    fn join(&self, other: &Self) -> Self {
        if self.is_bot() {
            return *other;
        }
        if other.is_bot() {
            return *self;
        }
        Interval::new(self.lo.min(other.lo), self.hi.max(other.hi))
    }

    fn meet(&self, other: &Self) -> Self {
        Interval::new(self.lo.max(other.lo), self.hi.min(other.hi))
    }

    fn abstract_value(v: i32) -> Self {
        Interval { lo: v as i64, hi: v as i64 }
    }

    fn contains(&self, v: i32) -> bool {
        self.lo <= v as i64 && (v as i64) <= self.hi
    }

    fn binary_op(op: BinOp, lhs: &Self, rhs: &Self) -> BinaryOutcome<Self> {
        if lhs.is_bot() || rhs.is_bot() {
            return BinaryOutcome::value(Self::bot());
        }
        match op {
            BinOp::Add | BinOp::Sub | BinOp::Mul => {
                if !lhs.has_finite_bounds() || !rhs.has_finite_bounds() {
                    return BinaryOutcome::value(Self::top());
                }
                let candidate = match op {
                    BinOp::Add => Interval::new(lhs.lo + rhs.lo, lhs.hi + rhs.hi),
                    BinOp::Sub => Interval::new(lhs.lo - rhs.hi, lhs.hi - rhs.lo),
                    _ => Interval::from_corners([
                        lhs.lo * rhs.lo,
                        lhs.lo * rhs.hi,
                        lhs.hi * rhs.lo,
                        lhs.hi * rhs.hi,
                    ]),
                };
                // wrapped results leave the int range: give up precisely there
                if Self::fits_int(candidate.lo, candidate.hi) {
                    BinaryOutcome::value(candidate)
                } else {
                    BinaryOutcome::value(Self::top())
                }
            }
            BinOp::Div => {
                let may_divide_by_zero = rhs.contains(0);
                let mut out = Self::bot();
                for side in [true, false] {
                    let divisor = rhs.without_zero(side);
                    if divisor.is_bot() {
                        continue;
                    }
                    if !lhs.has_finite_bounds() || !divisor.has_finite_bounds() {
                        out = Self::top();
                        break;
                    }
                    // truncating division; corners bound the quotient
                    let q = Interval::from_corners([
                        lhs.lo / divisor.lo,
                        lhs.lo / divisor.hi,
                        lhs.hi / divisor.lo,
                        lhs.hi / divisor.hi,
                    ]);
                    out = out.join(&q);
                }
                BinaryOutcome { value: out, may_divide_by_zero }
            }
            BinOp::Rem => {
                let may_divide_by_zero = rhs.contains(0);
                let value = if rhs.has_finite_bounds() {
                    // |lhs % rhs| < max(|rhs|), sign follows the dividend
                    let m = rhs.lo.abs().max(rhs.hi.abs());
                    if m == 0 {
                        Self::bot()
                    } else {
                        let lo = if lhs.lo >= 0 { 0 } else { -(m - 1) };
                        let hi = if lhs.hi <= 0 { 0 } else { m - 1 };
                        Interval::new(lo, hi)
                    }
                } else {
                    Self::top()
                };
                BinaryOutcome { value, may_divide_by_zero }
            }
            BinOp::And | BinOp::Or | BinOp::Xor | BinOp::Shl | BinOp::Shr | BinOp::Ushr => {
                BinaryOutcome::value(Self::top())
            }
        }
    }

    fn compare(cond: Cmp, lhs: &Self, rhs: &Self) -> (bool, bool) {
        if lhs.is_bot() || rhs.is_bot() {
            return (false, false);
        }
        match cond {
            Cmp::Eq => {
                let overlap = !lhs.meet(rhs).is_bot();
                let forced = lhs.is_singleton() && rhs.is_singleton() && lhs == rhs;
                (overlap, !forced)
            }
            Cmp::Ne => {
                let overlap = !lhs.meet(rhs).is_bot();
                let forced = lhs.is_singleton() && rhs.is_singleton() && lhs == rhs;
                (!forced, overlap)
            }
            Cmp::Lt => (lhs.lo < rhs.hi, lhs.hi >= rhs.lo),
            Cmp::Le => (lhs.lo <= rhs.hi, lhs.hi > rhs.lo),
            Cmp::Gt => (lhs.hi > rhs.lo, lhs.lo <= rhs.hi),
            Cmp::Ge => (lhs.hi >= rhs.lo, lhs.lo < rhs.hi),
        }
    }
}
