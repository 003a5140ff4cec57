// Shared front-end types: source locations and the SILang type vocabulary

use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Declared type of a variable, argument or package field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarType {
    Byte,
    Int,
    Float,
    /// Instance of the named package
    Record(String),
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::Byte => write!(f, "byte"),
            VarType::Int => write!(f, "int"),
            VarType::Float => write!(f, "float"),
            VarType::Record(package) => write!(f, "{}", package),
        }
    }
}

/// Return type of a function
///
/// Record return types are rejected by the parser, so only the scalar types
/// and `void` are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Byte,
    Int,
    Float,
    Void,
}

impl ReturnType {
    pub fn is_void(self) -> bool {
        self == ReturnType::Void
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Byte => write!(f, "byte"),
            ReturnType::Int => write!(f, "int"),
            ReturnType::Float => write!(f, "float"),
            ReturnType::Void => write!(f, "void"),
        }
    }
}
