/// Case selection: which method to analyse, with which concrete input.
///
/// Targets are benchmark qualnames (`jpamb.cases.Simple.divideByN:(I)I`);
/// inputs are the harness's tuple literals (`(0)`, `(1, true)`,
/// `([I:1,2,3], 4)`). An absent input means "initialise symbolically /
/// abstractly".

use crate::errors::AnalysisError;
use crate::jvm::MethodId;

#[derive(Debug, Clone, PartialEq)]
pub enum InputValue {
    Int(i32),
    Bool(bool),
    Char(char),
    IntArray(Vec<i32>),
    Null,
}

#[derive(Debug, Clone)]
pub struct Case {
    pub method: MethodId,
    pub input: Option<Vec<InputValue>>,
}

/// External collaborator: yields the method under analysis and its input.
pub trait CaseProvider {
    fn case(&self) -> Result<Case, AnalysisError>;
}

/// CLI-backed provider: target qualname plus an optional input literal.
pub struct CliCase {
    pub target: String,
    pub input: Option<String>,
}

impl CaseProvider for CliCase {
    fn case(&self) -> Result<Case, AnalysisError> {
        Ok(Case {
            method: MethodId::parse(&self.target)?,
            input: self.input.as_deref().map(parse_input).transpose()?,
        })
    }
}

/// Parse a harness input literal into typed values.
pub fn parse_input(text: &str) -> Result<Vec<InputValue>, AnalysisError> {
    let bad = || AnalysisError::BadInput(text.to_string());
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(bad)?;

    let mut values = Vec::new();
    for part in split_top_level(inner) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        values.push(parse_atom(part).ok_or_else(bad)?);
    }
    Ok(values)
}

/// Split on commas that are not inside `[...]`.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn parse_atom(part: &str) -> Option<InputValue> {
    match part {
        "true" => return Some(InputValue::Bool(true)),
        "false" => return Some(InputValue::Bool(false)),
        "null" => return Some(InputValue::Null),
        _ => {}
    }
    if let Some(body) = part.strip_prefix("[I:").and_then(|r| r.strip_suffix(']')) {
        let body = body.trim();
        if body.is_empty() {
            return Some(InputValue::IntArray(Vec::new()));
        }
        let elems: Option<Vec<i32>> = body
            .split(',')
            .map(|e| e.trim().parse::<i32>().ok())
            .collect();
        return Some(InputValue::IntArray(elems?));
    }
    if let Some(body) = part.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
        let mut chars = body.chars();
        let c = chars.next()?;
        return chars.next().is_none().then_some(InputValue::Char(c));
    }
    part.parse::<i32>().ok().map(InputValue::Int)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_scalars() {
        assert_eq!(
            parse_input("(1, true, -7)").unwrap(),
            vec![InputValue::Int(1), InputValue::Bool(true), InputValue::Int(-7)]
        );
        assert_eq!(parse_input("()").unwrap(), vec![]);
    }

    #[test]
    fn parses_arrays_and_chars() {
        assert_eq!(
            parse_input("([I:50,100,200], 'x', null)").unwrap(),
            vec![
                InputValue::IntArray(vec![50, 100, 200]),
                InputValue::Char('x'),
                InputValue::Null,
            ]
        );
        assert_eq!(
            parse_input("([I:])").unwrap(),
            vec![InputValue::IntArray(vec![])]
        );
    }

    #[test]
    fn rejects_malformed_literals() {
        assert!(parse_input("1, 2").is_err());
        assert!(parse_input("(nope)").is_err());
        assert!(parse_input("([I:1,x])").is_err());
    }

    #[test]
    fn cli_case_combines_target_and_input() {
        let provider = CliCase {
            target: "jpamb.cases.Simple.divideByN:(I)I".to_string(),
            input: Some("(5)".to_string()),
        };
        let case = provider.case().unwrap();
        assert_eq!(case.method.name, "divideByN");
        assert_eq!(case.input, Some(vec![InputValue::Int(5)]));
    }
}
