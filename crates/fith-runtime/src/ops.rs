//! Operator semantics over [`Value`].
//!
//! - **Equality** (`==`, `!=`) compares display forms, so `1 == "1"`.
//! - **Ordering** (`<`, `<=`, `>`, `>=`) is numeric when both sides are
//!   numbers and compares display forms otherwise.
//! - **Logical** (`&&`, `||`) works on truthiness; both operands are always
//!   evaluated.
//! - **Arithmetic** keeps integers for `+ - *` when both sides are integers
//!   (promoting to float on overflow). `/` always yields a float. `%`
//!   requires two integers. A zero divisor is always an error.

use std::cmp::Ordering;

use fith_core::{EvalError, Span, Value};
use fith_parser::ast::{BinaryOp, UnaryOp};

/// Apply a binary operator to evaluated operands.
pub fn binary(op: BinaryOp, left: &Value, right: &Value, span: Span) -> Result<Value, EvalError> {
    let result = match op {
        BinaryOp::Equal => Value::Bool(loose_eq(left, right)),
        BinaryOp::NotEqual => Value::Bool(!loose_eq(left, right)),
        BinaryOp::Less => Value::Bool(compare(left, right) == Ordering::Less),
        BinaryOp::LessEqual => Value::Bool(compare(right, left) != Ordering::Less),
        BinaryOp::Greater => Value::Bool(compare(right, left) == Ordering::Less),
        BinaryOp::GreaterEqual => Value::Bool(compare(left, right) != Ordering::Less),
        BinaryOp::And => Value::Bool(left.is_truthy() && right.is_truthy()),
        BinaryOp::Or => Value::Bool(left.is_truthy() || right.is_truthy()),
        BinaryOp::Add => arithmetic(op, left, right, span, i64::checked_add, |a, b| a + b)?,
        BinaryOp::Sub => arithmetic(op, left, right, span, i64::checked_sub, |a, b| a - b)?,
        BinaryOp::Mul => arithmetic(op, left, right, span, i64::checked_mul, |a, b| a * b)?,
        BinaryOp::Div => divide(left, right, span)?,
        BinaryOp::Mod => modulo(left, right, span)?,
    };
    Ok(result)
}

/// Apply a unary operator to an evaluated operand.
pub fn unary(op: UnaryOp, operand: &Value, span: Span) -> Result<Value, EvalError> {
    match (op, operand) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Neg, Value::Int(i)) => Ok(i
            .checked_neg()
            .map_or(Value::Float(-(*i as f64)), Value::Int)),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnaryOp::Neg, other) => Err(EvalError::InvalidUnaryOperand {
            op: op.to_string(),
            operand: other.kind_name(),
            span,
        }),
    }
}

/// Equality by display form.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        _ => left.to_string() == right.to_string(),
    }
}

/// Numeric ordering when both sides are numbers, else display-form ordering.
pub fn compare(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => left.to_string().cmp(&right.to_string()),
        },
    }
}

fn arithmetic(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    span: Span,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    if let (Value::Int(a), Value::Int(b)) = (left, right) {
        if let Some(result) = int_op(*a, *b) {
            return Ok(Value::Int(result));
        }
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => Ok(Value::Float(float_op(a, b))),
        _ => Err(invalid(op, left, right, span)),
    }
}

fn divide(left: &Value, right: &Value, span: Span) -> Result<Value, EvalError> {
    match (left.as_f64(), right.as_f64()) {
        (Some(_), Some(b)) if b == 0.0 => Err(EvalError::DivisionByZero { span }),
        (Some(a), Some(b)) => Ok(Value::Float(a / b)),
        _ => Err(invalid(BinaryOp::Div, left, right, span)),
    }
}

fn modulo(left: &Value, right: &Value, span: Span) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Int(_), Value::Int(0)) => Err(EvalError::ModuloByZero { span }),
        (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_rem(*b))),
        _ => Err(invalid(BinaryOp::Mod, left, right, span)),
    }
}

fn invalid(op: BinaryOp, left: &Value, right: &Value, span: Span) -> EvalError {
    EvalError::InvalidOperand {
        op: op.to_string(),
        left: left.kind_name(),
        right: right.kind_name(),
        span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(op: BinaryOp, left: impl Into<Value>, right: impl Into<Value>) -> Result<Value, EvalError> {
        binary(op, &left.into(), &right.into(), Span::default())
    }

    // =========================================
    // Comparison
    // =========================================

    #[test]
    fn equality_uses_display_form() {
        assert_eq!(eval(BinaryOp::Equal, 1, "1"), Ok(Value::Bool(true)));
        assert_eq!(eval(BinaryOp::Equal, 2.0, 2), Ok(Value::Bool(true)));
        assert_eq!(eval(BinaryOp::NotEqual, "a", "b"), Ok(Value::Bool(true)));
        assert_eq!(eval(BinaryOp::Equal, true, "true"), Ok(Value::Bool(true)));
    }

    #[test]
    fn ordering_is_numeric_for_numbers() {
        assert_eq!(eval(BinaryOp::Less, 2, 10), Ok(Value::Bool(true)));
        assert_eq!(eval(BinaryOp::Less, 2.5, 3), Ok(Value::Bool(true)));
        assert_eq!(eval(BinaryOp::GreaterEqual, 3, 3.0), Ok(Value::Bool(true)));
        assert_eq!(eval(BinaryOp::LessEqual, 4, 3), Ok(Value::Bool(false)));
        assert_eq!(eval(BinaryOp::Greater, 4, 3), Ok(Value::Bool(true)));
    }

    #[test]
    fn ordering_is_lexical_otherwise() {
        assert_eq!(eval(BinaryOp::Less, "10", "2"), Ok(Value::Bool(true)));
        assert_eq!(eval(BinaryOp::Greater, "b", "a"), Ok(Value::Bool(true)));
    }

    // =========================================
    // Logical
    // =========================================

    #[test]
    fn logical_ops_use_truthiness() {
        assert_eq!(eval(BinaryOp::And, "x", 1), Ok(Value::Bool(true)));
        assert_eq!(eval(BinaryOp::And, "x", ""), Ok(Value::Bool(false)));
        assert_eq!(eval(BinaryOp::Or, 0, Value::Null), Ok(Value::Bool(false)));
        assert_eq!(eval(BinaryOp::Or, 0, "0"), Ok(Value::Bool(true)));
    }

    // =========================================
    // Arithmetic
    // =========================================

    #[test]
    fn integer_arithmetic_stays_integral() {
        assert_eq!(eval(BinaryOp::Add, 2, 3), Ok(Value::Int(5)));
        assert_eq!(eval(BinaryOp::Sub, 2, 3), Ok(Value::Int(-1)));
        assert_eq!(eval(BinaryOp::Mul, 4, 3), Ok(Value::Int(12)));
        assert_eq!(eval(BinaryOp::Mod, 7, 3), Ok(Value::Int(1)));
    }

    #[test]
    fn mixed_arithmetic_promotes() {
        assert_eq!(eval(BinaryOp::Add, 2, 0.5), Ok(Value::Float(2.5)));
        assert_eq!(eval(BinaryOp::Div, 7, 2), Ok(Value::Float(3.5)));
        assert_eq!(eval(BinaryOp::Div, 6, 3), Ok(Value::Float(2.0)));
    }

    #[test]
    fn overflow_promotes_to_float() {
        assert_eq!(
            eval(BinaryOp::Add, i64::MAX, 1),
            Ok(Value::Float(i64::MAX as f64 + 1.0))
        );
    }

    #[test]
    fn division_and_modulo_by_zero_error() {
        assert_eq!(
            eval(BinaryOp::Div, 1, 0),
            Err(EvalError::DivisionByZero { span: Span::default() })
        );
        assert_eq!(
            eval(BinaryOp::Div, 1.5, 0.0),
            Err(EvalError::DivisionByZero { span: Span::default() })
        );
        assert_eq!(
            eval(BinaryOp::Mod, 1, 0),
            Err(EvalError::ModuloByZero { span: Span::default() })
        );
    }

    #[test]
    fn invalid_operands() {
        let err = eval(BinaryOp::Add, "a", 1).unwrap_err();
        assert_eq!(err.to_string(), "at 0:0: cannot apply '+' to string and int");
        assert!(matches!(eval(BinaryOp::Mod, 7.0, 2), Err(EvalError::InvalidOperand { .. })));
    }

    // =========================================
    // Unary
    // =========================================

    #[test]
    fn unary_ops() {
        let span = Span::default();
        assert_eq!(unary(UnaryOp::Not, &Value::from(""), span), Ok(Value::Bool(true)));
        assert_eq!(unary(UnaryOp::Neg, &Value::Int(3), span), Ok(Value::Int(-3)));
        assert_eq!(unary(UnaryOp::Neg, &Value::Float(1.5), span), Ok(Value::Float(-1.5)));
        assert!(matches!(
            unary(UnaryOp::Neg, &Value::from("x"), span),
            Err(EvalError::InvalidUnaryOperand { .. })
        ));
    }
}
