//! Declaration parsing
//!
//! This module handles the top level of a translation unit and the
//! declarations that may also appear inside function bodies.
//!
//! # Grammar
//!
//! ```text
//! program      = { function | package | variable } EOF
//! function     = "func" ID "(" [ arg { "," arg } ] ")" ":" return-type "{" body
//! arg          = scalar-type ID
//! return-type  = scalar-type | "void"
//! package      = "pack" ID "{" field { field } "}"
//! field        = scalar-type ID ";"
//! variable     = scalar-type ID [ "=" expr ] ";"
//! scalar-type  = "byte" | "int" | "float"
//! ```

use super::parse::{ParseResult, Parser};
use super::statements::FunctionContext;
use crate::compiler::ResultSlot;
use crate::error::SyntaxErrorKind;
use crate::parser::lexer::Token;
use crate::parser::types::{ReturnType, SourceLocation, VarType};
use crate::trace::Instruction;

/// The scalar type named by a type keyword
pub(crate) fn scalar_type(token: &Token) -> Option<VarType> {
    match token {
        Token::Byte(_) => Some(VarType::Byte),
        Token::Int(_) => Some(VarType::Int),
        Token::Float(_) => Some(VarType::Float),
        _ => None,
    }
}

impl Parser {
    pub(crate) fn parse_top_level_declaration(&mut self) -> ParseResult<()> {
        match self.peek_token() {
            Token::Func(_) => self.parse_function_definition(),
            Token::Pack(_) => self.parse_package_definition(),
            Token::Byte(_) | Token::Int(_) | Token::Float(_) => self.parse_variable_declaration(),
            Token::Ident(name, _) => Err(self.error(
                SyntaxErrorKind::Unsupported,
                format!("Record variables can only be declared inside a function body [{name}]"),
            )),
            token if token.is_keyword() => Err(self.error(
                SyntaxErrorKind::UnexpectedToken,
                format!("Unexpected keyword {token} in the global scope"),
            )),
            token => Err(self.error(
                SyntaxErrorKind::UnexpectedToken,
                format!("Expected declaration, found {token}"),
            )),
        }
    }

    /// `func name(args): type { body }`
    ///
    /// The function is registered before its arguments so the body may call
    /// it recursively. Arguments live in the scope the body runs in.
    fn parse_function_definition(&mut self) -> ParseResult<()> {
        self.advance()?; // 'func'
        let (name, name_loc) = self.expect_identifier()?;
        self.symbols
            .declare_function(&name)
            .map_err(|err| self.symbol_error(err, name_loc))?;

        self.expect_lparen(&format!("after function name '{name}'"))?;
        self.enter_scope();
        let arg_count = self.parse_argument_list(&name)?;

        self.expect_token(
            &Token::Colon(self.current_location()),
            &format!("Expected ':' before return type of function '{name}'"),
        )?;
        let return_type = self.parse_return_type()?;
        self.symbols
            .set_return_type(&name, return_type)
            .map_err(|err| self.symbol_error(err, name_loc))?;

        self.trace.push(Instruction::FunctionCreated {
            name: name.clone(),
            return_type,
            arg_count,
        });

        self.expect_lbrace(&format!("to open body of function '{name}'"))?;
        let function = FunctionContext { name, return_type };
        self.parse_body(&function)?;
        self.exit_scope();
        Ok(())
    }

    /// Arguments up to and including the closing parenthesis
    fn parse_argument_list(&mut self, function: &str) -> ParseResult<usize> {
        if self.match_token(&Token::RParen(self.current_location()))? {
            return Ok(0);
        }

        let mut count = 0;
        loop {
            let var_type = self.parse_item_type("arguments")?;
            let (arg, arg_loc) = self.expect_identifier()?;
            let depth = self.declare_variable(&arg, var_type.clone(), arg_loc)?;
            self.symbols
                .add_argument(function, var_type.clone())
                .map_err(|err| self.symbol_error(err, arg_loc))?;
            self.trace.push(Instruction::ArgumentDeclared {
                name: arg,
                var_type,
                depth,
            });
            count += 1;

            if !self.match_token(&Token::Comma(self.current_location()))? {
                break;
            }
        }

        self.expect_rparen(&format!("after arguments of function '{function}'"))?;
        Ok(count)
    }

    /// Type of an argument or package field; only scalars are accepted
    fn parse_item_type(&mut self, what: &str) -> ParseResult<VarType> {
        match self.peek_token() {
            Token::Ident(name, _) => Err(self.error(
                SyntaxErrorKind::Unsupported,
                format!("Using packages as {what} is not yet implemented [{name}]"),
            )),
            token => match scalar_type(&token) {
                Some(var_type) => {
                    self.advance()?;
                    Ok(var_type)
                }
                None => Err(self.error(
                    SyntaxErrorKind::UnexpectedToken,
                    format!("Expected type of {what}, found {token}"),
                )),
            },
        }
    }

    fn parse_return_type(&mut self) -> ParseResult<ReturnType> {
        let return_type = match self.peek_token() {
            Token::Byte(_) => ReturnType::Byte,
            Token::Int(_) => ReturnType::Int,
            Token::Float(_) => ReturnType::Float,
            Token::Void(_) => ReturnType::Void,
            Token::Ident(name, _) => {
                return Err(self.error(
                    SyntaxErrorKind::Unsupported,
                    format!("Returning packages is not yet implemented [{name}]"),
                ));
            }
            token => {
                return Err(self.error(
                    SyntaxErrorKind::UnexpectedToken,
                    format!("Unexpected function return type, found {token}"),
                ));
            }
        };
        self.advance()?;
        Ok(return_type)
    }

    /// `pack Name { type field; ... }`
    fn parse_package_definition(&mut self) -> ParseResult<()> {
        self.advance()?; // 'pack'
        let (name, name_loc) = self.expect_identifier()?;
        self.symbols
            .declare_package(&name)
            .map_err(|err| self.symbol_error(err, name_loc))?;
        self.trace.push(Instruction::PackageCreated { name: name.clone() });

        self.expect_lbrace(&format!("after package name '{name}'"))?;
        if self.check(&Token::RBrace(self.current_location())) {
            return Err(self.error(
                SyntaxErrorKind::UnexpectedToken,
                format!("Expected at least one item in package [{name}]"),
            ));
        }

        while !self.match_token(&Token::RBrace(self.current_location()))? {
            let field_type = self.parse_item_type("package items")?;
            let (field, field_loc) = self.expect_identifier()?;
            self.symbols
                .add_field(&name, &field, field_type.clone())
                .map_err(|err| self.symbol_error(err, field_loc))?;
            self.trace.push(Instruction::FieldAdded {
                package: name.clone(),
                field,
                field_type,
            });
            self.expect_semicolon("after package item")?;
        }

        Ok(())
    }

    /// `type name [= expr];` at any scope depth
    ///
    /// The name is registered after the initializer is compiled, so an
    /// initializer cannot refer to the variable it initializes.
    pub(crate) fn parse_variable_declaration(&mut self) -> ParseResult<()> {
        let type_token = self.advance()?;
        let var_type = scalar_type(&type_token).ok_or_else(|| {
            self.error_at(
                SyntaxErrorKind::UnexpectedToken,
                format!("Expected variable type, found {type_token}"),
                type_token.location(),
            )
        })?;
        let (name, name_loc) = self.expect_identifier()?;

        let initialized = self.match_token(&Token::Eq(self.current_location()))?;
        if initialized {
            self.parse_expression(ResultSlot::Register)?;
        }

        let depth = self.declare_variable(&name, var_type.clone(), name_loc)?;
        self.trace.push(Instruction::VariableDeclared {
            name: name.clone(),
            var_type,
            depth,
            initialized,
        });
        self.expect_semicolon(&format!("after declaration of '{name}'"))?;
        Ok(())
    }

    /// Register a variable in the innermost scope, returning its depth
    pub(crate) fn declare_variable(
        &mut self,
        name: &str,
        var_type: VarType,
        location: SourceLocation,
    ) -> ParseResult<usize> {
        let declared = self
            .symbols
            .declare_variable(name, var_type)
            .map(|variable| variable.depth);
        declared.map_err(|err| self.symbol_error(err, location))
    }
}
