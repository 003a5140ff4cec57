//! # Introduction
//!
//! SILang is a small imperative language with `byte`, `int` and `float`
//! scalars, record types called packages, functions and structured control
//! flow. This crate is its front end: it reads source text and produces a
//! linear trace of pseudo-instructions over a bounded file of
//! pseudo-registers.
//!
//! ## Compilation pipeline
//!
//! ```text
//! Source → Preprocessor → Lexer → Parser (+ symbol tables) → Expression compiler → Trace
//! ```
//!
//! 1. [`preprocessor`]: expands `$inc "file"` and `$def name value`.
//! 2. [`parser`]: tokenises lazily and parses by recursive descent, checking
//!    names against [`symbols`].
//! 3. [`compiler`]: postfix evaluation with constant folding and
//!    pseudo-register allocation.
//! 4. [`trace`]: the ordered instruction and annotation list written out by
//!    the `silang` binary.
//!
//! ## Example
//!
//! ```
//! use silang::{compile, config::CompilerConfig};
//!
//! let trace = compile("int x = 2 + 3 * 4;", CompilerConfig::default()).unwrap();
//! assert_eq!(trace.lines()[0], "\tr0 = 14");
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod logging;
pub mod parser;
pub mod preprocessor;
pub mod symbols;
pub mod trace;

use config::CompilerConfig;
use error::CompileError;
use parser::parse::Parser;
use trace::Trace;

/// Compile a whole translation unit, returning its trace.
///
/// Use [`Parser`] directly to keep the partial trace of a failing unit.
pub fn compile(source: &str, config: CompilerConfig) -> Result<Trace, CompileError> {
    let mut parser = Parser::with_config(source, config)?;
    parser.parse_program()?;
    Ok(parser.into_trace())
}
