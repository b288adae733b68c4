//! Expression evaluator
//!
//! Expressions are evaluated on text. The top level is split at the first
//! operator found, trying operators in a fixed priority order; parenthesized
//! and quoted spans are opaque while searching. Both halves are evaluated
//! recursively and combined by [`eval_op`]. An expression without an operator
//! is unwrapped one paren level, or substituted as plain text.

use crate::resolve::{atoi, Scope};
use crate::subst::substitute;
use std::cmp::Ordering;

/// Operators in priority order: the first one found splits the expression
const OPERATORS: [&str; 14] = [
    "||", "&&", "==", "!=", "<=", ">=", "<", ">", "/=", "-", "+", "/", "*", "!",
];

/// Evaluate an expression to its text result
pub(crate) fn eval_expr(scope: &mut Scope<'_>, expr: &str) -> String {
    let expr = expr.trim_start();

    if let Some(result) = eval_lhs_op_rhs(scope, expr) {
        return result;
    }

    if expr.starts_with('(') {
        let close = matching_paren(expr, 0);
        let inner = expr.get(1..close).unwrap_or("");
        return eval_expr(scope, inner);
    }

    substitute(scope, expr)
}

/// Truth of an `if`, `while` or `case` condition
pub(crate) fn eval_condition(scope: &mut Scope<'_>, expr: &str) -> bool {
    truthy(&eval_expr(scope, expr))
}

/// Empty and anything starting with `0` are false
pub fn truthy(value: &str) -> bool {
    let value = value.trim_start();
    !value.is_empty() && !value.starts_with('0')
}

fn eval_lhs_op_rhs(scope: &mut Scope<'_>, expr: &str) -> Option<String> {
    let tokens = token_starts(expr);

    for op in OPERATORS {
        for &start in &tokens {
            if expr.as_bytes()[start..].starts_with(op.as_bytes()) {
                let lhs = eval_expr(scope, &expr[..start]);
                let rhs = eval_expr(scope, &expr[start + op.len()..]);
                return Some(eval_op(op, &lhs, &rhs, scope.legacy_string_ge));
            }
        }
    }
    None
}

/// Byte offsets where an operator may begin
///
/// A parenthesized group or a quoted string is a single token. A run of
/// letters and digits swallows the spaces after it.
fn token_starts(expr: &str) -> Vec<usize> {
    let bytes = expr.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        tokens.push(pos);
        pos = match bytes[pos] {
            b'(' => matching_paren(expr, pos) + 1,
            b'"' => matching_quote(expr, pos) + 1,
            b if b.is_ascii_alphanumeric() => {
                let run = bytes[pos + 1..]
                    .iter()
                    .take_while(|b| b.is_ascii_alphanumeric() || b.is_ascii_whitespace())
                    .count();
                pos + 1 + run
            }
            _ => pos + 1,
        };
    }
    tokens
}

/// Index of the quote closing the one at `open`, or of the last byte
fn matching_quote(expr: &str, open: usize) -> usize {
    let bytes = expr.as_bytes();
    let mut pos = open + 1;
    while pos < bytes.len() && bytes[pos] != b'"' {
        if bytes[pos] == b'\\' {
            pos += 1;
        }
        pos += 1;
    }
    pos.min(bytes.len().saturating_sub(1))
}

/// Index of the paren closing the one at `open`, or of the last byte
fn matching_paren(expr: &str, open: usize) -> usize {
    let bytes = expr.as_bytes();
    let mut depth = 1;
    let mut pos = open + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return pos;
                }
            }
            b'"' => pos = matching_quote(expr, pos),
            _ => {}
        }
        pos += 1;
    }
    bytes.len().saturating_sub(1)
}

/// Apply one operator to two evaluated operands
///
/// # Arguments
/// * `op` - One of the evaluator's operators
/// * `lhs`, `rhs` - Operand text; surrounding whitespace is ignored
/// * `legacy_string_ge` - Compare text with `>=` as if it were `<=`
///
/// # Returns
/// `0`/`1` for logical and comparison operators, a number for arithmetic
pub fn eval_op(op: &str, lhs: &str, rhs: &str, legacy_string_ge: bool) -> String {
    let lhs = lhs.trim();
    let rhs = rhs.trim();
    let numeric = is_num(lhs) && is_num(rhs);
    let bool_text = |b: bool| (if b { "1" } else { "0" }).to_string();

    match op {
        "||" => bool_text(truthy_operand(lhs) || truthy_operand(rhs)),
        "&&" => bool_text(truthy_operand(lhs) && truthy_operand(rhs)),
        "==" if numeric => bool_text(atoi(lhs) == atoi(rhs)),
        "==" => bool_text(str_cmp(lhs, rhs) == Ordering::Equal),
        "!=" if numeric => bool_text(atoi(lhs) != atoi(rhs)),
        "!=" => bool_text(str_cmp(lhs, rhs) != Ordering::Equal),
        "<=" if numeric => bool_text(atoi(lhs) <= atoi(rhs)),
        "<=" => bool_text(str_cmp(lhs, rhs) != Ordering::Greater),
        ">=" if numeric => bool_text(atoi(lhs) >= atoi(rhs)),
        ">=" if legacy_string_ge => bool_text(str_cmp(lhs, rhs) != Ordering::Greater),
        ">=" => bool_text(str_cmp(lhs, rhs) != Ordering::Less),
        "<" if numeric => bool_text(atoi(lhs) < atoi(rhs)),
        "<" => bool_text(str_cmp(lhs, rhs) == Ordering::Less),
        ">" if numeric => bool_text(atoi(lhs) > atoi(rhs)),
        ">" => bool_text(str_cmp(lhs, rhs) == Ordering::Greater),
        "/=" => bool_text(lhs.to_ascii_lowercase().contains(&rhs.to_ascii_lowercase())),
        "*" => atoi(lhs).wrapping_mul(atoi(rhs)).to_string(),
        "/" => match atoi(rhs) {
            0 => "0".to_string(),
            n => atoi(lhs).wrapping_div(n).to_string(),
        },
        "+" => atoi(lhs).wrapping_add(atoi(rhs)).to_string(),
        "-" => atoi(lhs).wrapping_sub(atoi(rhs)).to_string(),
        "!" if is_num(rhs) => bool_text(atoi(rhs) == 0),
        "!" => bool_text(rhs.is_empty()),
        _ => String::new(),
    }
}

#[inline]
fn truthy_operand(value: &str) -> bool {
    !value.is_empty() && !value.starts_with('0')
}

/// Optional sign followed by at least one digit, nothing else
pub fn is_num(text: &str) -> bool {
    let digits = text.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Case-insensitive ordering
pub fn str_cmp(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|b| b.to_ascii_lowercase())
        .cmp(b.bytes().map(|b| b.to_ascii_lowercase()))
}
