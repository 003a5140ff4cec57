//! Function body parsing
//!
//! # Grammar
//!
//! ```text
//! body       = { statement } "}"
//! statement  = variable
//!            | "return" [ expr ] ";"
//!            | "if" "(" expr ")" block { "else" "if" "(" expr ")" block } [ "else" block ]
//!            | "while" "(" expr ")" block
//!            | "for" "(" expr ";" expr ";" expr ")" block
//!            | ID "=" expr ";"
//!            | ID "(" [ expr { "," expr } ] ")" ";"
//!            | ID ID ";"                       (record variable of package ID)
//! block      = "{" body
//! ```
//!
//! Every block runs in a fresh scope that is exited right after its `}`.

use super::parse::{ParseResult, Parser};
use crate::compiler::ResultSlot;
use crate::error::SyntaxErrorKind;
use crate::parser::lexer::Token;
use crate::parser::types::{ReturnType, SourceLocation, VarType};
use crate::symbols::SymbolKind;
use crate::trace::{BranchKind, Instruction};

/// The function whose body is being parsed
#[derive(Debug, Clone)]
pub(crate) struct FunctionContext {
    pub name: String,
    pub return_type: ReturnType,
}

impl Parser {
    /// Parse statements up to and including the closing brace
    pub(crate) fn parse_body(&mut self, function: &FunctionContext) -> ParseResult<()> {
        loop {
            match self.peek_token() {
                Token::RBrace(_) => {
                    self.advance()?;
                    return Ok(());
                }
                Token::Eof(_) => {
                    return Err(self.error(
                        SyntaxErrorKind::UnexpectedToken,
                        format!("Unexpected end of file in body of function '{}'", function.name),
                    ));
                }
                _ => self.parse_statement(function)?,
            }
        }
    }

    fn parse_statement(&mut self, function: &FunctionContext) -> ParseResult<()> {
        match self.peek_token() {
            Token::Byte(_) | Token::Int(_) | Token::Float(_) => self.parse_variable_declaration(),
            Token::Return(_) => self.parse_return(function),
            Token::If(_) => self.parse_if(function),
            Token::While(_) => self.parse_while(function),
            Token::For(_) => self.parse_for(function),
            Token::Ident(name, loc) => self.parse_identifier_statement(name, loc),
            Token::Else(_) => Err(self.error(
                SyntaxErrorKind::UnexpectedToken,
                "'else' without a matching 'if'",
            )),
            token if token.is_keyword() => Err(self.error(
                SyntaxErrorKind::UnexpectedToken,
                format!("Unexpected keyword {token} in function body"),
            )),
            token => Err(self.error(
                SyntaxErrorKind::UnexpectedToken,
                format!("Expected statement, found {token}"),
            )),
        }
    }

    /// `{ body }` in its own scope
    fn parse_block(&mut self, function: &FunctionContext, ctx: &str) -> ParseResult<()> {
        self.expect_lbrace(ctx)?;
        self.enter_scope();
        self.parse_body(function)?;
        self.exit_scope();
        Ok(())
    }

    /// `( expr )` of a conditional or loop head
    fn parse_condition(&mut self, keyword: &str) -> ParseResult<()> {
        self.expect_lparen(&format!("after '{keyword}'"))?;
        self.parse_expression(ResultSlot::Register)?;
        self.expect_rparen(&format!("after '{keyword}' condition"))?;
        Ok(())
    }

    fn parse_return(&mut self, function: &FunctionContext) -> ParseResult<()> {
        self.advance()?; // 'return'

        if self.match_token(&Token::Semicolon(self.current_location()))? {
            self.trace.push(Instruction::Returned {
                function: function.name.clone(),
                with_value: false,
            });
            return Ok(());
        }

        if function.return_type.is_void() {
            return Err(self.error(
                SyntaxErrorKind::TypeMismatch,
                format!("Cannot return a value from void function '{}'", function.name),
            ));
        }

        self.parse_expression(ResultSlot::Register)?;
        self.expect_semicolon("after return value")?;
        self.trace.push(Instruction::Returned {
            function: function.name.clone(),
            with_value: true,
        });
        Ok(())
    }

    fn parse_if(&mut self, function: &FunctionContext) -> ParseResult<()> {
        self.advance()?; // 'if'
        self.parse_condition("if")?;
        self.trace.push(Instruction::BranchHead(BranchKind::If));
        self.parse_block(function, "to open 'if' body")?;

        while self.match_token(&Token::Else(self.current_location()))? {
            if self.match_token(&Token::If(self.current_location()))? {
                self.parse_condition("else if")?;
                self.trace.push(Instruction::BranchHead(BranchKind::ElseIf));
                self.parse_block(function, "to open 'else if' body")?;
            } else {
                self.trace.push(Instruction::BranchHead(BranchKind::Else));
                self.parse_block(function, "to open 'else' body")?;
                break;
            }
        }

        Ok(())
    }

    fn parse_while(&mut self, function: &FunctionContext) -> ParseResult<()> {
        self.advance()?; // 'while'
        self.parse_condition("while")?;
        self.trace.push(Instruction::BranchHead(BranchKind::While));
        self.parse_block(function, "to open 'while' body")
    }

    /// `for (init; condition; step) { body }`, three plain expressions
    fn parse_for(&mut self, function: &FunctionContext) -> ParseResult<()> {
        self.advance()?; // 'for'
        self.expect_lparen("after 'for'")?;
        self.parse_expression(ResultSlot::Register)?;
        self.expect_semicolon("after first 'for' expression")?;
        self.parse_expression(ResultSlot::Register)?;
        self.expect_semicolon("after 'for' condition")?;
        self.parse_expression(ResultSlot::Register)?;
        self.expect_rparen("after 'for' step")?;
        self.trace.push(Instruction::BranchHead(BranchKind::For));
        self.parse_block(function, "to open 'for' body")
    }

    /// Assignment, call statement or record variable declaration
    fn parse_identifier_statement(
        &mut self,
        name: String,
        location: SourceLocation,
    ) -> ParseResult<()> {
        self.advance()?; // identifier

        match self.peek_token() {
            Token::Eq(_) => {
                if self.symbols.kind_of(&name) != Some(SymbolKind::Variable) {
                    return Err(self.error_at(
                        SyntaxErrorKind::UndefinedReference,
                        format!("Cannot assign expression to an undefined variable [{name}]"),
                        location,
                    ));
                }
                self.advance()?;
                self.parse_expression(ResultSlot::Register)?;
                self.expect_semicolon(&format!("after assignment to '{name}'"))?;
                self.trace.push(Instruction::Assigned { name });
                Ok(())
            }
            Token::LParen(_) => {
                self.parse_call(&name, location)?;
                self.expect_semicolon(&format!("after call to '{name}'"))?;
                Ok(())
            }
            Token::Ident(var, var_loc) => {
                if self.symbols.package(&name).is_none() {
                    return Err(self.error_at(
                        SyntaxErrorKind::UndefinedReference,
                        format!("Using undefined package [{name}]"),
                        location,
                    ));
                }
                self.advance()?;
                let var_type = VarType::Record(name);
                let depth = self.declare_variable(&var, var_type.clone(), var_loc)?;
                self.trace.push(Instruction::VariableDeclared {
                    name: var.clone(),
                    var_type,
                    depth,
                    initialized: false,
                });
                self.expect_semicolon(&format!("after declaration of '{var}'"))?;
                Ok(())
            }
            token => Err(self.error(
                SyntaxErrorKind::UnexpectedToken,
                format!("Expected '=', '(' or a variable name after '{name}', found {token}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{CompileError, SyntaxErrorKind};
    use crate::parser::parse::Parser;

    fn parse(source: &str) -> Result<Parser, CompileError> {
        let mut parser = Parser::new(source)?;
        parser.parse_program()?;
        Ok(parser)
    }

    fn kind_of(source: &str) -> Option<SyntaxErrorKind> {
        parse(source).err().and_then(|err| err.syntax_kind())
    }

    #[test]
    fn test_if_else_chain() {
        let source = r#"
            func sign(int x): int {
                if (x < 0) { return 0 - 1; }
                else if (x == 0) { return 0; }
                else { return 1; }
            }
        "#;
        let parser = parse(source).unwrap();
        let lines = parser.trace().lines();

        assert!(lines.contains(&"Generate if head".to_string()));
        assert!(lines.contains(&"Generate else if head".to_string()));
        assert!(lines.contains(&"Generate else head".to_string()));
    }

    #[test]
    fn test_else_without_if() {
        assert_eq!(
            kind_of("func f(): void { else { } }"),
            Some(SyntaxErrorKind::UnexpectedToken)
        );
    }

    #[test]
    fn test_block_scope_ends_at_brace() {
        let source = "func f(): void { if (1) { int y; } y = 2; }";
        assert_eq!(kind_of(source), Some(SyntaxErrorKind::UndefinedReference));
    }

    #[test]
    fn test_sibling_blocks_reuse_names() {
        let source = r#"
            func f(): void {
                while (1) { int i = 0; }
                while (1) { int i = 1; }
            }
        "#;
        assert!(parse(source).is_ok());
    }

    #[test]
    fn test_shadowing_is_rejected() {
        let source = "func f(int a): void { if (a) { int a; } }";
        assert_eq!(kind_of(source), Some(SyntaxErrorKind::Redefinition));
    }

    #[test]
    fn test_for_loop() {
        let source = "func f(int n): void { int i = 0; for (i; i < n; i) { i = i + 1; } }";
        let parser = parse(source).unwrap();
        assert!(parser.trace().lines().contains(&"Generate for".to_string()));
    }

    #[test]
    fn test_for_loop_rejects_assignment_head() {
        let source = "func f(): void { int i; for (i = 0; i < 3; i) { } }";
        assert_eq!(kind_of(source), Some(SyntaxErrorKind::UnexpectedToken));
    }

    #[test]
    fn test_assignment() {
        let parser = parse("int g; func f(): void { g = 4 / 2; }").unwrap();
        let lines = parser.trace().lines();
        let position = lines.iter().position(|l| l == "\tr0 = 2").unwrap();
        assert_eq!(lines[position + 1], "Assign variable \"g\" a new value r0");
    }

    #[test]
    fn test_assignment_to_non_variable() {
        assert_eq!(
            kind_of("func f(): void { x = 1; }"),
            Some(SyntaxErrorKind::UndefinedReference)
        );
        assert_eq!(
            kind_of("func f(): void { f = 1; }"),
            Some(SyntaxErrorKind::UndefinedReference)
        );
    }

    #[test]
    fn test_record_variable() {
        let source = "pack Point { int x; int y; } func f(): void { Point p; }";
        let parser = parse(source).unwrap();
        assert!(parser
            .trace()
            .lines()
            .contains(&"Define new variable \"p\" of type \"Point\" in scope 1".to_string()));
        assert_eq!(
            kind_of("func f(): void { Missing p; }"),
            Some(SyntaxErrorKind::UndefinedReference)
        );
    }

    #[test]
    fn test_call_statement() {
        let source = "func g(int a, int b): void { } func f(): void { g(1, 2); }";
        let parser = parse(source).unwrap();
        let lines = parser.trace().lines();
        let tail: Vec<&str> = lines.iter().rev().take(4).rev().map(String::as_str).collect();
        assert_eq!(tail, vec!["\tpush(1)", "\tpush(2)", "\tcall g", "Change scope to 0"]);
    }

    #[test]
    fn test_call_statement_errors() {
        assert_eq!(
            kind_of("func f(): void { g(); }"),
            Some(SyntaxErrorKind::UndefinedReference)
        );
        assert_eq!(
            kind_of("func g(int a): void { } func f(): void { g(); }"),
            Some(SyntaxErrorKind::ArityMismatch)
        );
    }

    #[test]
    fn test_return_rules() {
        assert!(parse("func f(): void { return; }").is_ok());
        assert_eq!(
            kind_of("func f(): void { return 1; }"),
            Some(SyntaxErrorKind::TypeMismatch)
        );
    }

    #[test]
    fn test_recursion_is_allowed() {
        let source = "func fact(int n): int { if (n < 2) { return 1; } return n * fact(n - 1); }";
        let parser = parse(source).unwrap();
        assert!(parser.trace().lines().contains(&"\tcall fact".to_string()));
    }

    #[test]
    fn test_unterminated_body() {
        assert_eq!(
            kind_of("func f(): void { int x;"),
            Some(SyntaxErrorKind::UnexpectedToken)
        );
    }

    #[test]
    fn test_misplaced_keyword() {
        assert_eq!(
            kind_of("func f(): void { func g(): void {} }"),
            Some(SyntaxErrorKind::UnexpectedToken)
        );
    }
}
