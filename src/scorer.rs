/// Outcome scorer.
///
/// Six `label;pct` lines in a fixed order. The policy is binary: a label
/// scores `100%` when at least one finding carries it, `0%` otherwise —
/// reachability, not likelihood.

use std::io::{self, Write};

use crate::outcome::Outcome;

/// The exact emission order of the protocol.
pub const SCORE_ORDER: [Outcome; 6] = [
    Outcome::AssertionError,
    Outcome::Ok,
    Outcome::Diverges,
    Outcome::DivideByZero,
    Outcome::OutOfBounds,
    Outcome::NullPointer,
];

pub fn score_lines(observed: &[Outcome]) -> Vec<String> {
    SCORE_ORDER
        .iter()
        .map(|label| {
            let pct = if observed.contains(label) { 100 } else { 0 };
            format!("{};{}%", label.label(), pct)
        })
        .collect()
}

pub fn write_scores(out: &mut impl Write, observed: &[Outcome]) -> io::Result<()> {
    for line in score_lines(observed) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
