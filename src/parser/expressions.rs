//! Expression parsing
//!
//! Expressions are converted from infix to postfix order with the
//! shunting-yard algorithm while the tokens are read, then handed to
//! [`crate::compiler::evaluate`] for folding and register allocation.
//!
//! # Grammar
//!
//! ```text
//! expr     = operand { binop operand }
//! operand  = INT | FLOAT | STRING | ID | ID "(" [ expr { "," expr } ] ")" | "(" expr ")"
//! binop    = "+" | "-" | "*" | "/" | "<" | "<=" | ">" | ">=" | "==" | "!="
//! ```
//!
//! Precedence, loosest first: `+ -`, `* /`, `< <= > >=`, `== !=`.
//! An expression ends at the first token that cannot continue it (`;`, `,`,
//! an unmatched `)`, ...); that token is left as the lookahead.
//!
//! Call arguments are compiled and pushed as soon as the call is read, and the
//! call itself is emitted right away. The call's result then appears in the
//! postfix queue as a [`Token::ReturnValue`] marker.

use super::parse::{ParseResult, Parser};
use crate::compiler::{self, BinaryOp, PostfixItem, ResultSlot};
use crate::error::SyntaxErrorKind;
use crate::parser::lexer::Token;
use crate::parser::types::{ReturnType, SourceLocation};
use crate::symbols::SymbolKind;
use crate::trace::Instruction;

/// Operator stack entry
#[derive(Debug, Clone, Copy)]
enum Pending {
    Operator(BinaryOp, SourceLocation),
    LParen,
}

impl Parser {
    /// Compile one expression, leaving its value in `r0` or pushing it.
    ///
    /// On error everything the expression emitted (including nested call
    /// arguments) is dropped from the trace.
    pub(crate) fn parse_expression(&mut self, slot: ResultSlot) -> ParseResult<()> {
        let mark = self.trace.len();
        let result = self.compile_expression(slot);
        if result.is_err() {
            self.trace.truncate(mark);
        }
        result
    }

    fn compile_expression(&mut self, slot: ResultSlot) -> ParseResult<()> {
        let start = self.current_location();
        let postfix = self.parse_postfix()?;

        if postfix.is_empty() {
            return Err(self.error(
                SyntaxErrorKind::MalformedExpression,
                format!("Expected expression, found {}", self.peek()),
            ));
        }

        let code = compiler::evaluate(&postfix, slot, self.config.register_count, start)?;
        self.trace.extend(code);
        Ok(())
    }

    /// Shunting-yard pass: read the expression and return it in postfix order
    fn parse_postfix(&mut self) -> ParseResult<Vec<PostfixItem>> {
        let mut output = Vec::new();
        let mut operators: Vec<Pending> = Vec::new();
        let mut balance = 0usize;

        loop {
            let token = self.peek_token();
            match &token {
                Token::IntLiteral(..) | Token::FloatLiteral(..) | Token::StringLiteral(..) => {
                    output.push(PostfixItem::Operand(self.advance()?));
                }
                Token::Ident(name, loc) => match self.symbols.kind_of(name) {
                    Some(SymbolKind::Variable) => {
                        output.push(PostfixItem::Operand(self.advance()?));
                    }
                    Some(SymbolKind::Function) => {
                        self.advance()?;
                        let return_type = self.parse_call(name, *loc)?;
                        if return_type == ReturnType::Void {
                            return Err(self.error_at(
                                SyntaxErrorKind::TypeMismatch,
                                format!("Function '{name}' returns void and cannot be used in an expression"),
                                *loc,
                            ));
                        }
                        output.push(PostfixItem::Operand(Token::ReturnValue(*loc)));
                    }
                    _ => {
                        return Err(self.error_at(
                            SyntaxErrorKind::UndefinedReference,
                            format!("Referring to a variable or function that doesn't exist [{name}]"),
                            *loc,
                        ));
                    }
                },
                Token::LParen(_) => {
                    self.advance()?;
                    balance += 1;
                    operators.push(Pending::LParen);
                }
                Token::RParen(_) if balance > 0 => {
                    self.advance()?;
                    balance -= 1;
                    while let Some(Pending::Operator(op, op_loc)) = operators.pop() {
                        output.push(PostfixItem::Operator(op, op_loc));
                    }
                }
                other => {
                    let Some(op) = BinaryOp::from_token(other) else {
                        break;
                    };
                    let op_loc = other.location();
                    self.advance()?;

                    while let Some(&Pending::Operator(top, top_loc)) = operators.last() {
                        if !top.drains_before(op) {
                            break;
                        }
                        operators.pop();
                        output.push(PostfixItem::Operator(top, top_loc));
                    }
                    operators.push(Pending::Operator(op, op_loc));
                }
            }
        }

        if balance != 0 {
            return Err(self.error(
                SyntaxErrorKind::BracketBalance,
                format!("Invalid balance of parentheses: {} left unclosed", balance),
            ));
        }

        while let Some(Pending::Operator(op, op_loc)) = operators.pop() {
            output.push(PostfixItem::Operator(op, op_loc));
        }

        tracing::trace!(items = output.len(), "expression converted to postfix");
        Ok(output)
    }

    /// Call arguments through the closing parenthesis, then `call name`.
    ///
    /// Each argument is compiled and pushed in order. Returns the callee's
    /// return type.
    pub(crate) fn parse_call(
        &mut self,
        name: &str,
        location: SourceLocation,
    ) -> ParseResult<ReturnType> {
        let (arity, return_type) = match self.symbols.function(name) {
            Some(function) => (function.arity(), function.return_type),
            None => {
                return Err(self.error_at(
                    SyntaxErrorKind::UndefinedReference,
                    format!("Call to undefined function [{name}]"),
                    location,
                ));
            }
        };

        self.expect_lparen(&format!("after function name '{name}'"))?;
        let mut count = 0;
        if !self.check(&Token::RParen(self.current_location())) {
            loop {
                self.parse_expression(ResultSlot::Stack)?;
                count += 1;
                if !self.match_token(&Token::Comma(self.current_location()))? {
                    break;
                }
            }
        }
        self.expect_rparen(&format!("after arguments of call to '{name}'"))?;

        if count != arity {
            return Err(self.error_at(
                SyntaxErrorKind::ArityMismatch,
                format!("Function '{name}' expects {arity} arguments, got {count}"),
                location,
            ));
        }

        self.trace.push(Instruction::Call {
            function: name.to_string(),
        });
        Ok(return_type)
    }
}
