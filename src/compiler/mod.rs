//! Postfix evaluation with constant folding and register allocation
//!
//! [`crate::parser`] converts an infix expression into postfix order
//! (shunting-yard); [`evaluate`] then walks the postfix queue once and turns
//! it into pseudo-instructions.
//!
//! # Register model
//!
//! The evaluation stack doubles as the register file: the value at stack
//! position `k` lives in pseudo-register `rk`. Pushing an operand loads it
//! into the next free register, and a binary operator combines the top two
//! registers into the lower one, freeing the upper. At most
//! `register_count` values may be live at once.
//!
//! # Constant mode
//!
//! When every operand of the expression is a numeric literal nothing is
//! loaded: operators fold their operands at compile time and only the final
//! value is materialized. A single identifier, call or string anywhere in the
//! expression turns folding off for the whole expression.

pub mod fold;
pub mod operators;

pub use fold::Number;
pub use operators::{BinaryOp, Precedence};

use crate::error::{SyntaxError, SyntaxErrorKind};
use crate::parser::lexer::Token;
use crate::parser::types::SourceLocation;
use crate::trace::{Instruction, Operand};

/// One entry of the postfix queue
#[derive(Debug, Clone, PartialEq)]
pub enum PostfixItem {
    /// Literal, variable or call-result marker
    Operand(Token),
    Operator(BinaryOp, SourceLocation),
}

/// Where the final value of an expression should end up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSlot {
    /// Leave the value in `r0`
    Register,
    /// Push the value (call arguments)
    Stack,
}

/// The instruction operand a postfix operand token loads from
fn operand_of(token: &Token) -> Option<Operand> {
    match token {
        Token::IntLiteral(value, _) => Some(Operand::Int(*value)),
        Token::FloatLiteral(value, _) => Some(Operand::Float(*value)),
        Token::StringLiteral(text, _) => Some(Operand::Str(text.clone())),
        Token::Ident(name, _) => Some(Operand::Variable(name.clone())),
        Token::ReturnValue(_) => Some(Operand::ReturnValue),
        _ => None,
    }
}

fn number_operand(number: Number) -> Operand {
    match number {
        Number::Int(value) => Operand::Int(value),
        Number::Float(value) => Operand::Float(value),
    }
}

/// Compile one postfix expression into instructions.
///
/// Nothing is returned unless the whole expression is valid. `location`
/// is used for errors not tied to a particular token.
pub fn evaluate(
    items: &[PostfixItem],
    slot: ResultSlot,
    register_count: usize,
    location: SourceLocation,
) -> Result<Vec<Instruction>, SyntaxError> {
    let constant = items.iter().all(|item| match item {
        PostfixItem::Operand(token) => Number::from_token(token).is_some(),
        PostfixItem::Operator(..) => true,
    });

    let mut stack: Vec<Token> = Vec::new();
    let mut code = Vec::new();

    for item in items {
        match item {
            PostfixItem::Operand(token) => {
                if stack.len() >= register_count {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::ExpressionTooComplex,
                        format!(
                            "Expression is too complex: more than {} values live at once",
                            register_count
                        ),
                        token.location(),
                    ));
                }
                if !constant {
                    let value = operand_of(token).ok_or_else(|| {
                        SyntaxError::new(
                            SyntaxErrorKind::MalformedExpression,
                            format!("Unexpected {} in expression", token),
                            token.location(),
                        )
                    })?;
                    code.push(Instruction::Load {
                        dest: stack.len(),
                        value,
                    });
                }
                stack.push(token.clone());
            }
            PostfixItem::Operator(op, op_loc) => {
                let (Some(rhs), Some(lhs)) = (stack.pop(), stack.pop()) else {
                    return Err(SyntaxError::new(
                        SyntaxErrorKind::MalformedExpression,
                        format!("Expected 2 arguments for operation '{}'", op),
                        *op_loc,
                    ));
                };

                let divide_by_zero = || {
                    SyntaxError::new(
                        SyntaxErrorKind::DivideByZero,
                        "Cannot divide by zero",
                        *op_loc,
                    )
                };
                if *op == BinaryOp::Div && Number::from_token(&rhs).is_some_and(Number::is_zero) {
                    return Err(divide_by_zero());
                }

                match (constant, Number::from_token(&lhs), Number::from_token(&rhs)) {
                    (true, Some(a), Some(b)) => {
                        let folded = fold::apply(*op, a, b).map_err(|_| divide_by_zero())?;
                        stack.push(folded.into_token(*op_loc));
                    }
                    _ => {
                        let dest = stack.len();
                        code.push(Instruction::Binary {
                            dest,
                            lhs: dest,
                            op: *op,
                            rhs: dest + 1,
                        });
                        stack.push(Token::Accumulator(*op_loc));
                    }
                }
            }
        }
    }

    let result = match stack.as_slice() {
        [result] => result,
        [] => {
            return Err(SyntaxError::new(
                SyntaxErrorKind::MalformedExpression,
                "Expected expression",
                location,
            ));
        }
        [.., extra] => {
            return Err(SyntaxError::new(
                SyntaxErrorKind::MalformedExpression,
                "Expected operator between operands",
                extra.location(),
            ));
        }
    };

    match (constant, Number::from_token(result), slot) {
        (true, Some(value), ResultSlot::Stack) => {
            code.push(Instruction::Push(number_operand(value)));
        }
        (true, Some(value), ResultSlot::Register) => code.push(Instruction::Load {
            dest: 0,
            value: number_operand(value),
        }),
        (_, _, ResultSlot::Stack) => code.push(Instruction::Push(Operand::Register(0))),
        (_, _, ResultSlot::Register) => {}
    }

    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new(1, 1)
    }

    fn int(value: i64) -> PostfixItem {
        PostfixItem::Operand(Token::IntLiteral(value, loc()))
    }

    fn float(value: f64) -> PostfixItem {
        PostfixItem::Operand(Token::FloatLiteral(value, loc()))
    }

    fn var(name: &str) -> PostfixItem {
        PostfixItem::Operand(Token::Ident(name.to_string(), loc()))
    }

    fn op(op: BinaryOp) -> PostfixItem {
        PostfixItem::Operator(op, loc())
    }

    fn run(items: &[PostfixItem], slot: ResultSlot) -> Result<Vec<String>, SyntaxError> {
        evaluate(items, slot, 16, loc())
            .map(|code| code.iter().map(ToString::to_string).collect())
    }

    #[test]
    fn test_constant_folding() {
        // 2 3 4 * +
        let items = [int(2), int(3), int(4), op(BinaryOp::Mul), op(BinaryOp::Add)];
        assert_eq!(run(&items, ResultSlot::Register).unwrap(), vec!["r0 = 14"]);
        assert_eq!(run(&items, ResultSlot::Stack).unwrap(), vec!["push(14)"]);
    }

    #[test]
    fn test_mixed_fold() {
        let items = [int(1), float(0.5), op(BinaryOp::Add)];
        assert_eq!(run(&items, ResultSlot::Register).unwrap(), vec!["r0 = 1.5"]);
    }

    #[test]
    fn test_register_allocation() {
        // a b c * +
        let items = [var("a"), var("b"), var("c"), op(BinaryOp::Mul), op(BinaryOp::Add)];
        assert_eq!(
            run(&items, ResultSlot::Register).unwrap(),
            vec!["r0 = a", "r1 = b", "r2 = c", "r1 = r1 * r2", "r0 = r0 + r1"]
        );
    }

    #[test]
    fn test_identifier_disables_folding() {
        let items = [int(1), int(2), op(BinaryOp::Add), var("a"), op(BinaryOp::Add)];
        assert_eq!(
            run(&items, ResultSlot::Stack).unwrap(),
            vec!["r0 = 1", "r1 = 2", "r0 = r0 + r1", "r1 = a", "r0 = r0 + r1", "push(r0)"]
        );
    }

    #[test]
    fn test_single_variable() {
        assert_eq!(run(&[var("x")], ResultSlot::Register).unwrap(), vec!["r0 = x"]);
        assert_eq!(
            run(&[var("x")], ResultSlot::Stack).unwrap(),
            vec!["r0 = x", "push(r0)"]
        );
    }

    #[test]
    fn test_divide_by_literal_zero_in_register_mode() {
        let items = [var("a"), int(0), op(BinaryOp::Div)];
        let err = run(&items, ResultSlot::Register).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::DivideByZero);
    }

    #[test]
    fn test_divide_by_folded_zero() {
        // 4 / (2 - 2)
        let items = [int(4), int(2), int(2), op(BinaryOp::Sub), op(BinaryOp::Div)];
        let err = run(&items, ResultSlot::Register).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::DivideByZero);

        let items = [float(1.0), float(0.0), op(BinaryOp::Div)];
        assert_eq!(
            run(&items, ResultSlot::Register).unwrap_err().kind,
            SyntaxErrorKind::DivideByZero
        );
    }

    #[test]
    fn test_register_limit() {
        // a0 + (a1 + (a2 + ...)) keeps every operand live
        let mut items: Vec<PostfixItem> = (0..4).map(|i| var(&format!("a{i}"))).collect();
        items.extend((0..3).map(|_| op(BinaryOp::Add)));

        assert!(evaluate(&items, ResultSlot::Register, 4, loc()).is_ok());
        let err = evaluate(&items, ResultSlot::Register, 3, loc()).unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::ExpressionTooComplex);
    }

    #[test]
    fn test_malformed() {
        let missing_operand = [var("a"), op(BinaryOp::Add)];
        assert_eq!(
            run(&missing_operand, ResultSlot::Register).unwrap_err().kind,
            SyntaxErrorKind::MalformedExpression
        );

        let missing_operator = [var("a"), var("b")];
        assert_eq!(
            run(&missing_operator, ResultSlot::Register).unwrap_err().kind,
            SyntaxErrorKind::MalformedExpression
        );

        assert_eq!(
            run(&[], ResultSlot::Register).unwrap_err().kind,
            SyntaxErrorKind::MalformedExpression
        );
    }

    #[test]
    fn test_string_operand_is_loaded() {
        let items = [PostfixItem::Operand(Token::StringLiteral("hi".to_string(), loc()))];
        assert_eq!(
            run(&items, ResultSlot::Stack).unwrap(),
            vec!["r0 = \"hi\"", "push(r0)"]
        );
    }
}
