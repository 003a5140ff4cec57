//! Instruction trace produced by the parser
//!
//! The trace is the compiler's only output: pseudo-instructions interleaved
//! with annotation lines that describe declarations and control flow, in the
//! order the grammar rules fired. Instructions render indented by one tab.

use crate::compiler::BinaryOp;
use crate::parser::lexer::escape_string;
use crate::parser::types::{ReturnType, VarType};
use std::fmt;
use std::io::{self, Write};

/// Value read by an instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Register(usize),
    Int(i64),
    Float(f64),
    Str(String),
    Variable(String),
    /// Result of the most recent call
    ReturnValue,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Register(index) => write!(f, "r{}", index),
            Operand::Int(value) => write!(f, "{}", value),
            Operand::Float(value) => write!(f, "{:?}", value),
            Operand::Str(text) => write!(f, "\"{}\"", escape_string(text)),
            Operand::Variable(name) => write!(f, "{}", name),
            Operand::ReturnValue => write!(f, "rr"),
        }
    }
}

/// Control-flow construct whose head was generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    If,
    ElseIf,
    Else,
    While,
    For,
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchKind::If => write!(f, "Generate if head"),
            BranchKind::ElseIf => write!(f, "Generate else if head"),
            BranchKind::Else => write!(f, "Generate else head"),
            BranchKind::While => write!(f, "Generate while"),
            BranchKind::For => write!(f, "Generate for"),
        }
    }
}

/// One line of the trace
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    // Instructions
    /// `rK = value`
    Load { dest: usize, value: Operand },
    /// `rK = rI op rJ`
    Binary {
        dest: usize,
        lhs: usize,
        op: BinaryOp,
        rhs: usize,
    },
    /// `call name`
    Call { function: String },
    /// `push(value)`
    Push(Operand),

    // Annotations
    FunctionCreated {
        name: String,
        return_type: ReturnType,
        arg_count: usize,
    },
    ScopeChanged { depth: usize },
    ArgumentDeclared {
        name: String,
        var_type: VarType,
        depth: usize,
    },
    VariableDeclared {
        name: String,
        var_type: VarType,
        depth: usize,
        initialized: bool,
    },
    PackageCreated { name: String },
    FieldAdded {
        package: String,
        field: String,
        field_type: VarType,
    },
    Assigned { name: String },
    Returned { function: String, with_value: bool },
    BranchHead(BranchKind),
}

impl Instruction {
    /// True for the descriptive lines that carry no executable meaning
    pub fn is_annotation(&self) -> bool {
        !matches!(
            self,
            Instruction::Load { .. }
                | Instruction::Binary { .. }
                | Instruction::Call { .. }
                | Instruction::Push(_)
        )
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Load { dest, value } => write!(f, "r{} = {}", dest, value),
            Instruction::Binary { dest, lhs, op, rhs } => {
                write!(f, "r{} = r{} {} r{}", dest, lhs, op, rhs)
            }
            Instruction::Call { function } => write!(f, "call {}", function),
            Instruction::Push(value) => write!(f, "push({})", value),
            Instruction::FunctionCreated {
                name,
                return_type,
                arg_count,
            } => write!(
                f,
                "Create function \"{}\" with return value of type \"{}\" and {} arguments",
                name, return_type, arg_count
            ),
            Instruction::ScopeChanged { depth } => write!(f, "Change scope to {}", depth),
            Instruction::ArgumentDeclared {
                name,
                var_type,
                depth,
            } => write!(
                f,
                "Define new argument \"{}\" of type \"{}\" in scope {}",
                name, var_type, depth
            ),
            Instruction::VariableDeclared {
                name,
                var_type,
                depth,
                initialized,
            } => {
                write!(f, "Define new variable \"{}\" of type \"{}\"", name, var_type)?;
                if *initialized {
                    write!(f, " and initialize with r0")?;
                }
                write!(f, " in scope {}", depth)
            }
            Instruction::PackageCreated { name } => {
                write!(f, "Create new package \"{}\"", name)
            }
            Instruction::FieldAdded {
                package,
                field,
                field_type,
            } => write!(
                f,
                "Add item into package \"{}\" <- \"{}\" of type \"{}\"",
                package, field, field_type
            ),
            Instruction::Assigned { name } => {
                write!(f, "Assign variable \"{}\" a new value r0", name)
            }
            Instruction::Returned {
                function,
                with_value,
            } => {
                write!(f, "Return from function \"{}\"", function)?;
                if *with_value {
                    write!(f, " with r0")?;
                }
                Ok(())
            }
            Instruction::BranchHead(kind) => write!(f, "{}", kind),
        }
    }
}

/// Ordered instruction sink
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    instructions: Vec<Instruction>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instruction: Instruction) {
        tracing::trace!(%instruction, "emit");
        self.instructions.push(instruction);
    }

    pub fn extend(&mut self, instructions: impl IntoIterator<Item = Instruction>) {
        for instruction in instructions {
            self.push(instruction);
        }
    }

    /// Drop everything emitted after the first `len` entries
    pub fn truncate(&mut self, len: usize) {
        self.instructions.truncate(len);
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Only the executable instructions, annotations skipped
    pub fn code(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter().filter(|i| !i.is_annotation())
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Rendered lines, instructions indented by a tab
    pub fn lines(&self) -> Vec<String> {
        self.instructions
            .iter()
            .map(|instruction| {
                if instruction.is_annotation() {
                    instruction.to_string()
                } else {
                    format!("\t{}", instruction)
                }
            })
            .collect()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for line in self.lines() {
            writeln!(writer, "{}", line)?;
        }
        writer.flush()
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_rendering() {
        let lines = [
            (
                Instruction::Load {
                    dest: 1,
                    value: Operand::Variable("a".to_string()),
                },
                "r1 = a",
            ),
            (
                Instruction::Binary {
                    dest: 0,
                    lhs: 0,
                    op: BinaryOp::Le,
                    rhs: 1,
                },
                "r0 = r0 <= r1",
            ),
            (
                Instruction::Load {
                    dest: 0,
                    value: Operand::ReturnValue,
                },
                "r0 = rr",
            ),
            (Instruction::Push(Operand::Float(2.5)), "push(2.5)"),
            (Instruction::Push(Operand::Float(3.0)), "push(3.0)"),
            (
                Instruction::Load {
                    dest: 0,
                    value: Operand::Str("hi\n".to_string()),
                },
                "r0 = \"hi\\n\"",
            ),
            (
                Instruction::Call {
                    function: "f".to_string(),
                },
                "call f",
            ),
        ];

        for (instruction, expected) in lines {
            assert_eq!(instruction.to_string(), expected);
        }
    }

    #[test]
    fn test_annotation_rendering() {
        let declared = Instruction::VariableDeclared {
            name: "x".to_string(),
            var_type: VarType::Int,
            depth: 1,
            initialized: true,
        };
        assert_eq!(
            declared.to_string(),
            "Define new variable \"x\" of type \"int\" and initialize with r0 in scope 1"
        );

        let created = Instruction::FunctionCreated {
            name: "f".to_string(),
            return_type: ReturnType::Void,
            arg_count: 2,
        };
        assert_eq!(
            created.to_string(),
            "Create function \"f\" with return value of type \"void\" and 2 arguments"
        );
    }

    #[test]
    fn test_lines_indent_instructions_only() {
        let mut trace = Trace::new();
        trace.push(Instruction::ScopeChanged { depth: 1 });
        trace.push(Instruction::Load {
            dest: 0,
            value: Operand::Int(5),
        });

        assert_eq!(trace.lines(), vec!["Change scope to 1", "\tr0 = 5"]);
        assert_eq!(trace.code().count(), 1);

        let mut out = Vec::new();
        trace.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Change scope to 1\n\tr0 = 5\n");
    }

    #[test]
    fn test_truncate() {
        let mut trace = Trace::new();
        trace.push(Instruction::BranchHead(BranchKind::While));
        trace.push(Instruction::Push(Operand::Register(0)));
        trace.truncate(1);
        assert_eq!(trace.to_string(), "Generate while\n");
    }
}
