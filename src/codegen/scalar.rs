//! # Scalar Encoding
//!
//! Renders primitive values into literal expression text:
//!
//! | Value | Literal |
//! |---|---|
//! | `Bool(true)` | `True` |
//! | `Float(0.5)` | `0.5` |
//! | `Set(["A", "B"])` | `{'A', 'B'}` |
//! | `Str("O'Brien")` | `'O\'Brien'` |
//! | vector `(1, 2)` | `(1.0, 2.0)` |
//! | matrix | `((1.0, 0.0), (0.0, 1.0))` |

use crate::codegen::target::TargetExpr;
use crate::model::Value;

/// Statement assigning the literal form of `value` to `target`.
///
/// Returns `None` for values that have no literal form.
pub fn encode(value: &Value, target: &TargetExpr) -> Option<String> {
    literal(value).map(|literal| target.assign(&literal))
}

/// Literal expression for a scalar, tuple or matrix value
pub fn literal(value: &Value) -> Option<String> {
    match value {
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(format_float(*f)),
        Value::Str(s) => Some(quote(s)),
        Value::Set(items) => Some(set_literal(items)),
        Value::Tuple { items, .. } => {
            let items = items.iter().map(literal).collect::<Option<Vec<_>>>()?;
            Some(tuple_literal(&items))
        }
        Value::Matrix(rows) => {
            let rows: Vec<String> = rows
                .iter()
                .map(|row| {
                    let cells: Vec<String> = row.iter().map(|f| format_float(*f)).collect();
                    tuple_literal(&cells)
                })
                .collect();
            Some(tuple_literal(&rows))
        }
        Value::None | Value::Collection(_) | Value::Object(_) => None,
    }
}

/// Single-quoted string literal
pub fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    for c in s.chars() {
        match c {
            '\'' => quoted.push_str("\\'"),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Shortest round-trip form; always reads back as a float
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        "float('nan')".to_string()
    } else if f.is_infinite() {
        if f > 0.0 {
            "float('inf')".to_string()
        } else {
            "float('-inf')".to_string()
        }
    } else {
        format!("{:?}", f)
    }
}

fn set_literal(items: &[String]) -> String {
    if items.is_empty() {
        return "set()".to_string();
    }
    let items: Vec<String> = items.iter().map(|item| quote(item)).collect();
    format!("{{{}}}", items.join(", "))
}

fn tuple_literal(items: &[String]) -> String {
    match items {
        [single] => format!("({},)", single),
        _ => format!("({})", items.join(", ")),
    }
}
