//! Textual filter conditions: `<field> <operator> <value>`.
//!
//! The input is scanned left to right; at each position operator tokens are
//! tried longest-first (so `>=` never splits into `>` and `=`), and the
//! first operator-shaped substring wins. The field is whatever precedes it,
//! trimmed; the value is whatever follows, trimmed and typed.

use crate::error::{Error, Result};
use crate::model::Value;

/// Comparison operator of a query condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    ArrayContains,
    ArrayContainsAny,
    In,
}

impl Operator {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Neq => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::ArrayContains => "array-contains",
            Self::ArrayContainsAny => "array-contains-any",
            Self::In => "in",
        }
    }
}

/// Operator tokens, longest first.
const OPERATORS: [(&str, Operator); 9] = [
    ("array-contains-any", Operator::ArrayContainsAny),
    ("array-contains", Operator::ArrayContains),
    (">=", Operator::Gte),
    ("<=", Operator::Lte),
    ("==", Operator::Eq),
    ("!=", Operator::Neq),
    ("in", Operator::In),
    (">", Operator::Gt),
    ("<", Operator::Lt),
];

/// A parsed filter condition, immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCondition {
    pub field: String,
    pub op: Operator,
    pub value: Value,
}

/// Parse one condition string.
pub fn parse_condition(input: &str) -> Result<QueryCondition> {
    for (at, _) in input.char_indices() {
        for (token, op) in OPERATORS {
            if input[at..].starts_with(token) {
                let field = input[..at].trim();
                let value = input[at + token.len()..].trim();
                if field.is_empty() || value.is_empty() {
                    break;
                }
                return Ok(QueryCondition {
                    field: field.to_string(),
                    op,
                    value: parse_value(value),
                });
            }
        }
    }
    Err(Error::InvalidCondition {
        condition: input.to_string(),
    })
}

/// Parse every `--where` argument.
pub fn parse_conditions(inputs: &[String]) -> Result<Vec<QueryCondition>> {
    inputs.iter().map(|s| parse_condition(s)).collect()
}

/// Type a condition value: quoted string, integer, decimal, boolean, null,
/// or bare string, tried in that order.
fn parse_value(raw: &str) -> Value {
    let bytes = raw.as_bytes();
    if raw.len() >= 2 {
        let (first, last) = (bytes[0], bytes[raw.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return Value::String(raw[1..raw.len() - 1].to_string());
        }
    }

    if let Ok(int) = raw.parse::<i64>() {
        return Value::Int(int);
    }
    if raw.contains('.')
        && raw
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-'))
    {
        if let Ok(float) = raw.parse::<f64>() {
            return Value::Float(float);
        }
    }
    match raw.to_ascii_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" | "none" => Value::Null,
        _ => Value::String(raw.to_string()),
    }
}
