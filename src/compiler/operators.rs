// Binary operators and their precedence table

use crate::parser::lexer::Token;
use std::fmt;

/// Binary operators understood by the expression compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

/// Priority classes, loosest binding first.
///
/// Comparison binds tighter than arithmetic and equality tighter than the
/// relational operators, so `a + b < c` groups as `a + (b < c)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Additive,
    Multiplicative,
    Relational,
    Equality,
}

impl BinaryOp {
    pub fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::Plus(_) => Some(BinaryOp::Add),
            Token::Minus(_) => Some(BinaryOp::Sub),
            Token::Star(_) => Some(BinaryOp::Mul),
            Token::Slash(_) => Some(BinaryOp::Div),
            Token::Lt(_) => Some(BinaryOp::Lt),
            Token::Le(_) => Some(BinaryOp::Le),
            Token::Gt(_) => Some(BinaryOp::Gt),
            Token::Ge(_) => Some(BinaryOp::Ge),
            Token::EqEq(_) => Some(BinaryOp::Eq),
            Token::NotEq(_) => Some(BinaryOp::Ne),
            _ => None,
        }
    }

    pub fn precedence(self) -> Precedence {
        match self {
            BinaryOp::Add | BinaryOp::Sub => Precedence::Additive,
            BinaryOp::Mul | BinaryOp::Div => Precedence::Multiplicative,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                Precedence::Relational
            }
            BinaryOp::Eq | BinaryOp::Ne => Precedence::Equality,
        }
    }

    /// Whether `self`, already on the operator stack, must be emitted before
    /// `incoming` is pushed. Equal classes drain, giving left association.
    pub fn drains_before(self, incoming: BinaryOp) -> bool {
        self.precedence() >= incoming.precedence()
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
