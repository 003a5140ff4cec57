//! SILang source parser
//!
//! This module turns (preprocessed) SILang text into the instruction trace:
//! - [`lexer`]: Tokenization (source text → tokens, on demand)
//! - [`parse`]: The [`parse::Parser`] cursor and entry point
//! - [`types`]: Source locations and the type vocabulary
//!
//! # Language
//!
//! - Types: `byte`, `int`, `float`, and packages (records of scalar fields)
//! - Top level: functions, packages, global variables
//! - Statements: declarations, assignments, calls, `return`, `if`/`else`,
//!   `while`, `for`
//! - Expressions: `+ - * /`, comparisons, calls, parentheses
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent with a single token of lookahead. Semantic
//! checks (redefinition, undefined names, arity) run against
//! [`crate::symbols`] while parsing.

pub mod declarations;
pub mod expressions;
pub mod lexer;
pub mod parse;
pub mod statements;
pub mod types;
