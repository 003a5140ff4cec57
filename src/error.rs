//! Compile error types
//!
//! Errors are plain values: building one never prints anything. The driver
//! reports the first error it receives exactly once.

use crate::parser::lexer::LexError;
use crate::parser::types::SourceLocation;
use std::fmt;

/// Category of a syntax (grammar or semantic) error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// The lookahead token cannot continue the current rule
    UnexpectedToken,
    /// A name is declared twice or collides with another namespace
    Redefinition,
    /// A name is used that is not declared or not visible
    UndefinedReference,
    TypeMismatch,
    ArityMismatch,
    DivideByZero,
    /// More values are live than there are pseudo-registers
    ExpressionTooComplex,
    BracketBalance,
    /// Operators and operands do not form one value
    MalformedExpression,
    /// Recognised construct the compiler does not handle yet
    Unsupported,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyntaxErrorKind::UnexpectedToken => "unexpected token",
            SyntaxErrorKind::Redefinition => "redefinition",
            SyntaxErrorKind::UndefinedReference => "undefined reference",
            SyntaxErrorKind::TypeMismatch => "type mismatch",
            SyntaxErrorKind::ArityMismatch => "arity mismatch",
            SyntaxErrorKind::DivideByZero => "divide by zero",
            SyntaxErrorKind::ExpressionTooComplex => "expression too complex",
            SyntaxErrorKind::BracketBalance => "bracket balance",
            SyntaxErrorKind::MalformedExpression => "malformed expression",
            SyntaxErrorKind::Unsupported => "unsupported",
        };
        write!(f, "{}", name)
    }
}

/// Grammar or semantic error raised by the parser or expression compiler
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Syntax error at {location}: {message}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub location: SourceLocation,
}

impl SyntaxError {
    pub fn new(
        kind: SyntaxErrorKind,
        message: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }
}

/// Any error that stops compilation of a translation unit
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Lexical(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl CompileError {
    pub fn location(&self) -> SourceLocation {
        match self {
            CompileError::Lexical(err) => err.location,
            CompileError::Syntax(err) => err.location,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CompileError::Lexical(err) => &err.message,
            CompileError::Syntax(err) => &err.message,
        }
    }

    /// Syntax error category, `None` for lexical errors
    pub fn syntax_kind(&self) -> Option<SyntaxErrorKind> {
        match self {
            CompileError::Lexical(_) => None,
            CompileError::Syntax(err) => Some(err.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_location() {
        let err = CompileError::from(SyntaxError::new(
            SyntaxErrorKind::BracketBalance,
            "Invalid balance of parentheses",
            SourceLocation::new(3, 14),
        ));
        assert_eq!(
            err.to_string(),
            "Syntax error at line 3, column 14: Invalid balance of parentheses"
        );
        assert_eq!(err.syntax_kind(), Some(SyntaxErrorKind::BracketBalance));
    }

    #[test]
    fn test_lexical_errors_have_no_syntax_kind() {
        let err = CompileError::from(LexError {
            message: "Unexpected symbol: '%'".to_string(),
            location: SourceLocation::new(1, 2),
        });
        assert_eq!(err.syntax_kind(), None);
        assert!(err.to_string().starts_with("Lexer error at line 1, column 2"));
    }
}
