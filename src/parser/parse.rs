//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure:
//! the token cursor, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser is a recursive descent translator that emits the instruction
//! trace while it recognises the program; no syntax tree is built.
//! - This module: Parser struct, cursor helpers, and coordination
//! - `declarations`: functions, packages and variable declarations
//! - `statements`: function bodies (`return`, `if`, `while`, `for`, ...)
//! - `expressions`: infix to postfix conversion feeding [`crate::compiler`]
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state. The lexer is driven lazily:
//! `current` holds the single lookahead token and [`Parser::advance`] pulls
//! the next one, so a lexical error surfaces exactly where it is reached.

use crate::config::CompilerConfig;
use crate::error::{CompileError, SyntaxError, SyntaxErrorKind};
use crate::parser::lexer::{Lexer, Token};
use crate::parser::types::SourceLocation;
use crate::symbols::{SymbolError, SymbolTable};
use crate::trace::{Instruction, Trace};

pub type ParseResult<T> = Result<T, CompileError>;

/// Recursive descent parser for SILang
pub struct Parser {
    lexer: Lexer,
    current: Token,
    pub(crate) symbols: SymbolTable,
    pub(crate) trace: Trace,
    pub(crate) config: CompilerConfig,
}

impl Parser {
    pub fn new(source: &str) -> ParseResult<Self> {
        Self::with_config(source, CompilerConfig::default())
    }

    pub fn with_config(source: &str, config: CompilerConfig) -> ParseResult<Self> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            symbols: SymbolTable::new(),
            trace: Trace::new(),
            config,
        })
    }

    /// Parse the entire program (top-level declarations)
    ///
    /// The trace keeps everything emitted before an error, see
    /// [`Parser::trace`].
    pub fn parse_program(&mut self) -> ParseResult<()> {
        while !self.is_at_end() {
            self.parse_top_level_declaration()?;
        }
        Ok(())
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn into_trace(self) -> Trace {
        self.trace
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    // ===== Scope helpers =====

    pub(crate) fn enter_scope(&mut self) -> usize {
        let depth = self.symbols.enter_scope();
        self.trace.push(Instruction::ScopeChanged { depth });
        depth
    }

    pub(crate) fn exit_scope(&mut self) {
        let removed = self.symbols.exit_scope();
        tracing::debug!(?removed, "exit scope");
        self.trace.push(Instruction::ScopeChanged {
            depth: self.symbols.depth(),
        });
    }

    // ===== Helper methods =====

    pub(crate) fn match_token(&mut self, token: &Token) -> ParseResult<bool> {
        if self.check(token) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    /// Consume the lookahead and return it
    pub(crate) fn advance(&mut self) -> ParseResult<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.current
    }

    pub(crate) fn peek_token(&self) -> Token {
        self.current.clone()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn error(&self, kind: SyntaxErrorKind, message: impl Into<String>) -> CompileError {
        self.error_at(kind, message, self.current_location())
    }

    pub(crate) fn error_at(
        &self,
        kind: SyntaxErrorKind,
        message: impl Into<String>,
        location: SourceLocation,
    ) -> CompileError {
        SyntaxError::new(kind, message, location).into()
    }

    /// Convert a rejected symbol table update into a syntax error
    pub(crate) fn symbol_error(&self, err: SymbolError, location: SourceLocation) -> CompileError {
        let kind = match err {
            SymbolError::Unknown { .. } => SyntaxErrorKind::UndefinedReference,
            SymbolError::Redefined { .. }
            | SymbolError::NameClash { .. }
            | SymbolError::FieldRedefined { .. } => SyntaxErrorKind::Redefinition,
        };
        self.error_at(kind, err.to_string(), location)
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> ParseResult<Token> {
        if self.check(token) {
            self.advance()
        } else {
            Err(self.error(
                SyntaxErrorKind::UnexpectedToken,
                format!("{}, found {}", message, self.peek()),
            ))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> ParseResult<Token> {
        self.expect_token(
            &Token::LParen(self.current_location()),
            &format!("Expected '(' {ctx}"),
        )
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> ParseResult<Token> {
        self.expect_token(
            &Token::RParen(self.current_location()),
            &format!("Expected ')' {ctx}"),
        )
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> ParseResult<Token> {
        self.expect_token(
            &Token::LBrace(self.current_location()),
            &format!("Expected '{{' {ctx}"),
        )
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> ParseResult<Token> {
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            &format!("Expected ';' {ctx}"),
        )
    }

    pub(crate) fn expect_identifier(&mut self) -> ParseResult<(String, SourceLocation)> {
        if let Token::Ident(name, loc) = self.peek_token() {
            self.advance()?;
            Ok((name, loc))
        } else {
            Err(self.error(
                SyntaxErrorKind::UnexpectedToken,
                format!("Expected identifier, found {}", self.peek()),
            ))
        }
    }
}
