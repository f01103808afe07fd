/// Lattice and soundness laws, checked exhaustively over every non-empty
/// subset of a small concrete universe instead of by random sampling. The
/// universe straddles zero so division, remainder, and the sign tables all
/// get exercised on their edge rows.

use verdict::bytecode::{BinOp, Cmp};
use verdict::domain::{AbstractDomain, All, Interval, ParitySet, SignSet};

const UNIVERSE: [i32; 5] = [-2, -1, 0, 1, 2];

const ALL_OPS: [BinOp; 11] = [
    BinOp::Add,
    BinOp::Sub,
    BinOp::Mul,
    BinOp::Div,
    BinOp::Rem,
    BinOp::And,
    BinOp::Or,
    BinOp::Xor,
    BinOp::Shl,
    BinOp::Shr,
    BinOp::Ushr,
];

const ALL_CONDS: [Cmp; 6] = [Cmp::Eq, Cmp::Ne, Cmp::Lt, Cmp::Le, Cmp::Gt, Cmp::Ge];

/// All non-empty subsets of the universe.
fn subsets() -> Vec<Vec<i32>> {
    (1u32..(1 << UNIVERSE.len()))
        .map(|mask| {
            UNIVERSE
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, v)| *v)
                .collect()
        })
        .collect()
}

fn abstraction<D: AbstractDomain>(xs: &[i32]) -> D {
    D::abstract_set(xs.iter().copied())
}

/// The concrete machine's semantics for one operator; `None` is the
/// divide-by-zero error.
fn concrete(op: BinOp, x: i32, y: i32) -> Option<i32> {
    match op {
        BinOp::Add => Some(x.wrapping_add(y)),
        BinOp::Sub => Some(x.wrapping_sub(y)),
        BinOp::Mul => Some(x.wrapping_mul(y)),
        BinOp::Div => (y != 0).then(|| x.wrapping_div(y)),
        BinOp::Rem => (y != 0).then(|| x.wrapping_rem(y)),
        BinOp::And => Some(x & y),
        BinOp::Or => Some(x | y),
        BinOp::Xor => Some(x ^ y),
        BinOp::Shl => Some(x.wrapping_shl(y as u32 & 31)),
        BinOp::Shr => Some(x.wrapping_shr(y as u32 & 31)),
        BinOp::Ushr => Some(((x as u32).wrapping_shr(y as u32 & 31)) as i32),
    }
}

fn check_abstraction_soundness<D: AbstractDomain>() {
    for xs in subsets() {
        let a: D = abstraction(&xs);
        for v in &xs {
            assert!(a.contains(*v), "{v} missing from abstraction of {xs:?}: {a:?}");
        }
        assert!(a.le(&D::top()), "abstraction above top for {xs:?}");
        assert!(D::bot().le(&a), "bot not below abstraction of {xs:?}");
    }
}

fn check_abstraction_monotone<D: AbstractDomain>() {
    for xs in subsets() {
        for ys in subsets() {
            let union: Vec<i32> = {
                let mut u = xs.clone();
                u.extend(ys.iter().copied());
                u
            };
            let ax: D = abstraction(&xs);
            let ay: D = abstraction(&ys);
            let au: D = abstraction(&union);
            assert!(ax.le(&au), "abstraction not monotone: {xs:?} vs union {union:?}");
            assert_eq!(
                ax.join(&ay),
                au,
                "join is not the abstraction of the union for {xs:?} / {ys:?}"
            );
        }
    }
}

fn check_lattice_laws<D: AbstractDomain>() {
    let elems: Vec<D> = subsets().iter().map(|xs| abstraction(xs)).collect();
    for a in &elems {
        assert_eq!(a.join(a), *a, "join not idempotent");
        assert_eq!(a.meet(a), *a, "meet not idempotent");
        for b in &elems {
            assert_eq!(a.join(b), b.join(a), "join not commutative");
            assert_eq!(a.meet(b), b.meet(a), "meet not commutative");
            for c in &elems {
                assert_eq!(
                    a.join(&b.join(c)),
                    a.join(b).join(c),
                    "join not associative"
                );
                assert_eq!(
                    a.meet(&b.meet(c)),
                    a.meet(b).meet(c),
                    "meet not associative"
                );
            }
        }
    }
}

fn check_operator_soundness<D: AbstractDomain>() {
    for xs in subsets() {
        for ys in subsets() {
            let ax: D = abstraction(&xs);
            let ay: D = abstraction(&ys);
            for op in ALL_OPS {
                let result = D::binary_op(op, &ax, &ay);
                for x in &xs {
                    for y in &ys {
                        match concrete(op, *x, *y) {
                            Some(v) => assert!(
                                result.value.contains(v),
                                "{x} {op:?} {y} = {v} escapes {:?} (from {xs:?}, {ys:?})",
                                result.value
                            ),
                            None => assert!(
                                result.may_divide_by_zero,
                                "{x} {op:?} {y} divides by zero but the \
                                 alternative was not flagged (from {xs:?}, {ys:?})"
                            ),
                        }
                    }
                }
            }
        }
    }
}

fn check_comparison_soundness<D: AbstractDomain>() {
    for xs in subsets() {
        for ys in subsets() {
            let ax: D = abstraction(&xs);
            let ay: D = abstraction(&ys);
            for cond in ALL_CONDS {
                let (maybe_true, maybe_false) = D::compare(cond, &ax, &ay);
                for x in &xs {
                    for y in &ys {
                        if cond.holds(*x, *y) {
                            assert!(
                                maybe_true,
                                "{x} {cond:?} {y} holds but the true branch was refuted"
                            );
                        } else {
                            assert!(
                                maybe_false,
                                "{x} {cond:?} {y} fails but the false branch was refuted"
                            );
                        }
                    }
                }
            }
        }
    }
}

// ─── Sign ─────────────────────────────────────────────────────────────────────

#[test]
fn sign_abstraction_is_sound() {
    check_abstraction_soundness::<SignSet>();
}

#[test]
fn sign_abstraction_is_monotone() {
    check_abstraction_monotone::<SignSet>();
}

#[test]
fn sign_lattice_laws_hold() {
    check_lattice_laws::<SignSet>();
}

#[test]
fn sign_operators_are_sound() {
    check_operator_soundness::<SignSet>();
}

#[test]
fn sign_comparisons_are_sound() {
    check_comparison_soundness::<SignSet>();
}

// ─── Parity ───────────────────────────────────────────────────────────────────

#[test]
fn parity_abstraction_is_sound() {
    check_abstraction_soundness::<ParitySet>();
}

#[test]
fn parity_abstraction_is_monotone() {
    check_abstraction_monotone::<ParitySet>();
}

#[test]
fn parity_lattice_laws_hold() {
    check_lattice_laws::<ParitySet>();
}

#[test]
fn parity_operators_are_sound() {
    check_operator_soundness::<ParitySet>();
}

#[test]
fn parity_comparisons_are_sound() {
    check_comparison_soundness::<ParitySet>();
}

// ─── Interval ─────────────────────────────────────────────────────────────────

#[test]
fn interval_abstraction_is_sound() {
    check_abstraction_soundness::<Interval>();
}

#[test]
fn interval_abstraction_is_monotone() {
    check_abstraction_monotone::<Interval>();
}

#[test]
fn interval_lattice_laws_hold() {
    check_lattice_laws::<Interval>();
}

#[test]
fn interval_operators_are_sound() {
    check_operator_soundness::<Interval>();
}

#[test]
fn interval_comparisons_are_sound() {
    check_comparison_soundness::<Interval>();
}

// ─── Product ──────────────────────────────────────────────────────────────────

#[test]
fn product_abstraction_is_sound() {
    check_abstraction_soundness::<All>();
}

#[test]
fn product_lattice_laws_hold() {
    check_lattice_laws::<All>();
}

#[test]
fn product_operators_are_sound() {
    check_operator_soundness::<All>();
}

#[test]
fn product_comparisons_are_sound() {
    check_comparison_soundness::<All>();
}
