// Compile-time evaluation of operators applied to two literals

use super::operators::BinaryOp;
use crate::parser::lexer::Token;
use crate::parser::types::SourceLocation;

/// A numeric literal value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FoldError {
    #[error("Cannot divide by zero")]
    DivideByZero,
}

impl Number {
    /// The value of an integer or float literal token
    pub fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::IntLiteral(value, _) => Some(Number::Int(*value)),
            Token::FloatLiteral(value, _) => Some(Number::Float(*value)),
            _ => None,
        }
    }

    pub fn into_token(self, location: SourceLocation) -> Token {
        match self {
            Number::Int(value) => Token::IntLiteral(value, location),
            Number::Float(value) => Token::FloatLiteral(value, location),
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(value) => value == 0,
            Number::Float(value) => value == 0.0,
        }
    }

    /// Integers promote to float when mixed with one
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::Float(value) => value,
        }
    }
}

/// Evaluate `lhs op rhs`.
///
/// Two integers stay integer with wrapping 64-bit arithmetic; any float
/// operand promotes both sides. Comparisons produce integer 0 or 1.
pub fn apply(op: BinaryOp, lhs: Number, rhs: Number) -> Result<Number, FoldError> {
    match (lhs, rhs) {
        (Number::Int(a), Number::Int(b)) => apply_int(op, a, b),
        _ => apply_float(op, lhs.as_f64(), rhs.as_f64()),
    }
}

fn apply_int(op: BinaryOp, a: i64, b: i64) -> Result<Number, FoldError> {
    let value = match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div => {
            if b == 0 {
                return Err(FoldError::DivideByZero);
            }
            a.wrapping_div(b)
        }
        BinaryOp::Lt => (a < b) as i64,
        BinaryOp::Le => (a <= b) as i64,
        BinaryOp::Gt => (a > b) as i64,
        BinaryOp::Ge => (a >= b) as i64,
        BinaryOp::Eq => (a == b) as i64,
        BinaryOp::Ne => (a != b) as i64,
    };
    Ok(Number::Int(value))
}

fn apply_float(op: BinaryOp, a: f64, b: f64) -> Result<Number, FoldError> {
    let result = match op {
        BinaryOp::Add => Number::Float(a + b),
        BinaryOp::Sub => Number::Float(a - b),
        BinaryOp::Mul => Number::Float(a * b),
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(FoldError::DivideByZero);
            }
            Number::Float(a / b)
        }
        BinaryOp::Lt => Number::Int((a < b) as i64),
        BinaryOp::Le => Number::Int((a <= b) as i64),
        BinaryOp::Gt => Number::Int((a > b) as i64),
        BinaryOp::Ge => Number::Int((a >= b) as i64),
        BinaryOp::Eq => Number::Int((a == b) as i64),
        BinaryOp::Ne => Number::Int((a != b) as i64),
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(apply(BinaryOp::Add, Number::Int(2), Number::Int(3)), Ok(Number::Int(5)));
        assert_eq!(apply(BinaryOp::Div, Number::Int(7), Number::Int(2)), Ok(Number::Int(3)));
        assert_eq!(apply(BinaryOp::Div, Number::Int(-7), Number::Int(2)), Ok(Number::Int(-3)));
        assert_eq!(
            apply(BinaryOp::Add, Number::Int(i64::MAX), Number::Int(1)),
            Ok(Number::Int(i64::MIN))
        );
    }

    #[test]
    fn test_mixed_promotes_to_float() {
        assert_eq!(
            apply(BinaryOp::Mul, Number::Int(2), Number::Float(1.5)),
            Ok(Number::Float(3.0))
        );
        assert_eq!(
            apply(BinaryOp::Div, Number::Float(1.0), Number::Int(4)),
            Ok(Number::Float(0.25))
        );
    }

    #[test]
    fn test_comparisons_yield_int() {
        assert_eq!(apply(BinaryOp::Lt, Number::Int(1), Number::Int(2)), Ok(Number::Int(1)));
        assert_eq!(
            apply(BinaryOp::Eq, Number::Float(2.0), Number::Int(2)),
            Ok(Number::Int(1))
        );
        assert_eq!(
            apply(BinaryOp::Ge, Number::Float(0.5), Number::Float(0.75)),
            Ok(Number::Int(0))
        );
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(
            apply(BinaryOp::Div, Number::Int(1), Number::Int(0)),
            Err(FoldError::DivideByZero)
        );
        assert_eq!(
            apply(BinaryOp::Div, Number::Int(1), Number::Float(0.0)),
            Err(FoldError::DivideByZero)
        );
        assert_eq!(
            apply(BinaryOp::Div, Number::Float(1.0), Number::Int(0)),
            Err(FoldError::DivideByZero)
        );
        // A zero dividend is fine.
        assert_eq!(apply(BinaryOp::Div, Number::Int(0), Number::Int(5)), Ok(Number::Int(0)));
    }
}
