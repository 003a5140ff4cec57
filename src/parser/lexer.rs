//! Lexer (tokenizer) for SILang source code
//!
//! Converts raw source text into [`Token`]s on demand: the parser pulls one
//! token at a time through [`Lexer::next_token`], so no token history is kept.
//! Preprocessor directives (`$inc`, `$def`) must already be expanded by
//! [`crate::preprocessor`]; a stray `$` is an unexpected character here.
//!
//! # Lexical grammar
//!
//! ```text
//! ident    = [A-Za-z_] [A-Za-z0-9_]*
//! integer  = digit+ | "0x" hexdigit+ | "0o" octdigit+ | "0b" bindigit+
//! float    = digit+ ( "." digit+ )? ( [eE] [+-]? digit+ )?
//! string   = '"' ( printable | escape )* '"'
//! escape   = "\" ( [abefnrtv\\'"] | "x" hexdigit hexdigit )
//! comment  = "#" ... end of line | "##" ... "##"
//! ```

use super::types::SourceLocation;
use std::fmt;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line and column without a separate token→location table.
/// [`Token::Accumulator`] and [`Token::ReturnValue`] are never produced from
/// source text; the expression compiler creates them as stand-ins for values
/// that live in a register or in the call-return slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    IntLiteral(i64, SourceLocation),
    FloatLiteral(f64, SourceLocation),
    StringLiteral(String, SourceLocation),

    // Identifiers
    Ident(String, SourceLocation),

    // Keywords
    Func(SourceLocation),
    Pack(SourceLocation),
    Byte(SourceLocation),
    Int(SourceLocation),
    Float(SourceLocation),
    Void(SourceLocation),
    If(SourceLocation),
    Else(SourceLocation),
    While(SourceLocation),
    For(SourceLocation),
    Return(SourceLocation),

    // Arithmetic
    Plus(SourceLocation),  // +
    Minus(SourceLocation), // -
    Star(SourceLocation),  // *
    Slash(SourceLocation), // /

    // Comparison
    EqEq(SourceLocation),  // ==
    NotEq(SourceLocation), // !=
    Lt(SourceLocation),    // <
    Le(SourceLocation),    // <=
    Gt(SourceLocation),    // >
    Ge(SourceLocation),    // >=

    // Assignment
    Eq(SourceLocation), // =

    // Punctuation
    Dot(SourceLocation),       // .
    Colon(SourceLocation),     // :
    Comma(SourceLocation),     // ,
    Semicolon(SourceLocation), // ;
    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }

    // Compiler-internal markers
    Accumulator(SourceLocation),
    ReturnValue(SourceLocation),

    // End of file
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::IntLiteral(_, loc)
            | Token::FloatLiteral(_, loc)
            | Token::StringLiteral(_, loc)
            | Token::Ident(_, loc)
            | Token::Func(loc)
            | Token::Pack(loc)
            | Token::Byte(loc)
            | Token::Int(loc)
            | Token::Float(loc)
            | Token::Void(loc)
            | Token::If(loc)
            | Token::Else(loc)
            | Token::While(loc)
            | Token::For(loc)
            | Token::Return(loc)
            | Token::Plus(loc)
            | Token::Minus(loc)
            | Token::Star(loc)
            | Token::Slash(loc)
            | Token::EqEq(loc)
            | Token::NotEq(loc)
            | Token::Lt(loc)
            | Token::Le(loc)
            | Token::Gt(loc)
            | Token::Ge(loc)
            | Token::Eq(loc)
            | Token::Dot(loc)
            | Token::Colon(loc)
            | Token::Comma(loc)
            | Token::Semicolon(loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::Accumulator(loc)
            | Token::ReturnValue(loc)
            | Token::Eof(loc) => *loc,
        }
    }

    /// True for the reserved words of the language.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Func(_)
                | Token::Pack(_)
                | Token::Byte(_)
                | Token::Int(_)
                | Token::Float(_)
                | Token::Void(_)
                | Token::If(_)
                | Token::Else(_)
                | Token::While(_)
                | Token::For(_)
                | Token::Return(_)
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::IntLiteral(n, _) => write!(f, "int literal {}", n),
            Token::FloatLiteral(x, _) => write!(f, "float literal {:?}", x),
            Token::StringLiteral(s, _) => {
                write!(f, "string literal \"{}\"", escape_string(s))
            }
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Func(_) => write!(f, "'func'"),
            Token::Pack(_) => write!(f, "'pack'"),
            Token::Byte(_) => write!(f, "'byte'"),
            Token::Int(_) => write!(f, "'int'"),
            Token::Float(_) => write!(f, "'float'"),
            Token::Void(_) => write!(f, "'void'"),
            Token::If(_) => write!(f, "'if'"),
            Token::Else(_) => write!(f, "'else'"),
            Token::While(_) => write!(f, "'while'"),
            Token::For(_) => write!(f, "'for'"),
            Token::Return(_) => write!(f, "'return'"),
            Token::Plus(_) => write!(f, "'+'"),
            Token::Minus(_) => write!(f, "'-'"),
            Token::Star(_) => write!(f, "'*'"),
            Token::Slash(_) => write!(f, "'/'"),
            Token::EqEq(_) => write!(f, "'=='"),
            Token::NotEq(_) => write!(f, "'!='"),
            Token::Lt(_) => write!(f, "'<'"),
            Token::Le(_) => write!(f, "'<='"),
            Token::Gt(_) => write!(f, "'>'"),
            Token::Ge(_) => write!(f, "'>='"),
            Token::Eq(_) => write!(f, "'='"),
            Token::Dot(_) => write!(f, "'.'"),
            Token::Colon(_) => write!(f, "':'"),
            Token::Comma(_) => write!(f, "','"),
            Token::Semicolon(_) => write!(f, "';'"),
            Token::LParen(_) => write!(f, "'('"),
            Token::RParen(_) => write!(f, "')'"),
            Token::LBrace(_) => write!(f, "'{{'"),
            Token::RBrace(_) => write!(f, "'}}'"),
            Token::Accumulator(_) => write!(f, "accumulator"),
            Token::ReturnValue(_) => write!(f, "return value"),
            Token::Eof(_) => write!(f, "end of file"),
        }
    }
}

/// Re-escape decoded string contents so they can be printed as a literal.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            ' '..='~' => out.push(ch),
            _ => out.push_str(&format!("\\x{:02x}", ch as u32 & 0xff)),
        }
    }
    out
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Lexer error at {location}: {message}")]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// States of the numeric literal recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberState {
    /// Decimal digits, possibly the leading `0` of a base prefix
    Integer,
    /// Digits after a `0x`, `0o` or `0b` prefix
    Radix(u32),
    /// Just consumed `.`, a digit must follow
    FractionStart,
    Fraction,
    /// Just consumed `e`/`E`, a sign or digit must follow
    ExponentStart,
    /// Just consumed the exponent sign, a digit must follow
    ExponentSign,
    Exponent,
}

/// Lexer for SILang source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input, including the trailing [`Token::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let done = matches!(token, Token::Eof(_));
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(tokens)
    }

    /// Consume exactly one token.
    ///
    /// Once the input is exhausted every further call yields [`Token::Eof`].
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace_and_comments()?;

        let loc = self.current_location();
        let Some(ch) = self.advance() else {
            return Ok(Token::Eof(loc));
        };

        let token = match ch {
            '"' => self.string_literal()?,
            '0'..='9' => self.number_literal(ch)?,
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(ch),

            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::EqEq(loc)
                } else {
                    Token::Eq(loc)
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::NotEq(loc)
                } else {
                    return Err(LexError {
                        message: "Expected '=' after '!'".to_string(),
                        location: loc,
                    });
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::Le(loc)
                } else {
                    Token::Lt(loc)
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    Token::Ge(loc)
                } else {
                    Token::Gt(loc)
                }
            }
            '+' => Token::Plus(loc),
            '-' => Token::Minus(loc),
            '*' => Token::Star(loc),
            '/' => Token::Slash(loc),
            '.' => Token::Dot(loc),
            ':' => Token::Colon(loc),
            ',' => Token::Comma(loc),
            ';' => Token::Semicolon(loc),
            '(' => Token::LParen(loc),
            ')' => Token::RParen(loc),
            '{' => Token::LBrace(loc),
            '}' => Token::RBrace(loc),

            _ => {
                return Err(LexError {
                    message: format!("Unexpected symbol: '{}'", ch.escape_default()),
                    location: loc,
                });
            }
        };

        tracing::trace!(token = %token, "lexed");
        Ok(token)
    }

    /// Parse string literal; the opening quote is already consumed.
    fn string_literal(&mut self) -> Result<Token, LexError> {
        let loc = SourceLocation::new(self.line, self.column - 1);
        let mut string = String::new();

        loop {
            let ch = self.peek().ok_or_else(|| LexError {
                message: "Unterminated string literal".to_string(),
                location: loc,
            })?;

            match ch {
                '"' => {
                    self.advance();
                    return Ok(Token::StringLiteral(string, loc));
                }
                '\\' => {
                    self.advance();
                    string.push(self.escape_sequence()?);
                }
                ' '..='~' => {
                    string.push(ch);
                    self.advance();
                }
                _ => {
                    return Err(LexError {
                        message: format!(
                            "Non-printable symbol inside a string: '{}'",
                            ch.escape_default()
                        ),
                        location: self.current_location(),
                    });
                }
            }
        }
    }

    /// Decode the escape following a backslash.
    fn escape_sequence(&mut self) -> Result<char, LexError> {
        let loc = self.current_location();
        let escaped = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file in string literal".to_string(),
            location: loc,
        })?;

        let decoded = match escaped {
            'a' => '\x07',
            'b' => '\x08',
            'e' => '\x1b',
            'f' => '\x0c',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\x0b',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            'x' => {
                let mut value = 0u8;
                for _ in 0..2 {
                    let digit = self
                        .peek()
                        .and_then(|c| c.to_digit(16))
                        .ok_or_else(|| LexError {
                            message: "Hex escape must have exactly two hex digits"
                                .to_string(),
                            location: self.current_location(),
                        })?;
                    self.advance();
                    value = value * 16 + digit as u8;
                }
                char::from(value)
            }
            _ => {
                return Err(LexError {
                    message: format!(
                        "Unknown escape sequence: \\{}",
                        escaped.escape_default()
                    ),
                    location: loc,
                });
            }
        };

        Ok(decoded)
    }

    /// Parse an integer (any base) or float literal.
    fn number_literal(&mut self, first_digit: char) -> Result<Token, LexError> {
        let loc = SourceLocation::new(self.line, self.column - 1);
        let mut text = String::new();
        text.push(first_digit);
        let mut state = NumberState::Integer;

        loop {
            let next = self.peek();
            let next_state = match (state, next) {
                (NumberState::Integer, Some(c)) if c.is_ascii_digit() => {
                    NumberState::Integer
                }
                (NumberState::Integer, Some(prefix @ ('x' | 'o' | 'b'))) => {
                    let (radix, base) = match prefix {
                        'x' => (16, "hex"),
                        'o' => (8, "oct"),
                        _ => (2, "bin"),
                    };
                    if text != "0" {
                        return Err(LexError {
                            message: format!(
                                "Number in {} base must be lead by \"0{}\"",
                                base, prefix
                            ),
                            location: self.current_location(),
                        });
                    }
                    // The prefix is not part of the digits handed to the parser.
                    self.advance();
                    text.clear();
                    state = NumberState::Radix(radix);
                    continue;
                }
                (NumberState::Integer, Some('.')) => NumberState::FractionStart,
                (
                    NumberState::Integer | NumberState::Fraction,
                    Some('e' | 'E'),
                ) => NumberState::ExponentStart,
                (NumberState::Radix(radix), Some(c)) if c.is_digit(radix) => {
                    NumberState::Radix(radix)
                }
                (
                    NumberState::FractionStart | NumberState::Fraction,
                    Some(c),
                ) if c.is_ascii_digit() => NumberState::Fraction,
                (NumberState::FractionStart, _) => {
                    return Err(LexError {
                        message: "Expected digit after decimal point".to_string(),
                        location: self.current_location(),
                    });
                }
                (NumberState::ExponentStart, Some('+' | '-')) => {
                    NumberState::ExponentSign
                }
                (
                    NumberState::ExponentStart
                    | NumberState::ExponentSign
                    | NumberState::Exponent,
                    Some(c),
                ) if c.is_ascii_digit() => NumberState::Exponent,
                (NumberState::ExponentStart | NumberState::ExponentSign, _) => {
                    return Err(LexError {
                        message: "Expected digit in exponent".to_string(),
                        location: self.current_location(),
                    });
                }
                _ => break,
            };

            state = next_state;
            if let Some(c) = self.advance() {
                text.push(c);
            }
        }

        match state {
            NumberState::Integer => {
                let value = text.parse::<i64>().map_err(|_| LexError {
                    message: format!("Integer literal out of range: {}", text),
                    location: loc,
                })?;
                Ok(Token::IntLiteral(value, loc))
            }
            NumberState::Radix(radix) => {
                if text.is_empty() {
                    return Err(LexError {
                        message: "Expected digits after base prefix".to_string(),
                        location: loc,
                    });
                }
                let value =
                    i64::from_str_radix(&text, radix).map_err(|_| LexError {
                        message: format!(
                            "Integer literal out of range: {} (base {})",
                            text, radix
                        ),
                        location: loc,
                    })?;
                Ok(Token::IntLiteral(value, loc))
            }
            _ => {
                let value = text
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| LexError {
                        message: format!("Float literal out of range: {}", text),
                        location: loc,
                    })?;
                Ok(Token::FloatLiteral(value, loc))
            }
        }
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char) -> Token {
        let loc = SourceLocation::new(self.line, self.column - 1);
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "func" => Token::Func(loc),
            "pack" => Token::Pack(loc),
            "byte" => Token::Byte(loc),
            "int" => Token::Int(loc),
            "float" => Token::Float(loc),
            "void" => Token::Void(loc),
            "if" => Token::If(loc),
            "else" => Token::Else(loc),
            "while" => Token::While(loc),
            "for" => Token::For(loc),
            "return" => Token::Return(loc),
            _ => Token::Ident(ident, loc),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\n' | '\x0b' | '\x0c') => {
                    self.advance();
                }
                Some('#') => {
                    if self.peek_ahead(1) == Some('#') {
                        self.skip_block_comment()?;
                    } else {
                        self.skip_line_comment();
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (# ...)
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
    }

    /// Skip block comment (## ... ##)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance();
        self.advance();

        while !self.is_at_end() {
            if self.peek() == Some('#') && self.peek_ahead(1) == Some('#') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source).tokenize().unwrap()
    }

    fn lex_err(source: &str) -> LexError {
        Lexer::new(source).tokenize().unwrap_err()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = lex("func main(): int { return 0; }");

        assert!(matches!(tokens[0], Token::Func(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "main"));
        assert!(matches!(tokens[2], Token::LParen(_)));
        assert!(matches!(tokens[3], Token::RParen(_)));
        assert!(matches!(tokens[4], Token::Colon(_)));
        assert!(matches!(tokens[5], Token::Int(_)));
        assert!(matches!(tokens[6], Token::LBrace(_)));
        assert!(matches!(tokens[7], Token::Return(_)));
        assert!(matches!(tokens[8], Token::IntLiteral(0, _)));
        assert!(matches!(tokens[9], Token::Semicolon(_)));
        assert!(matches!(tokens[10], Token::RBrace(_)));
        assert!(matches!(tokens[11], Token::Eof(_)));
    }

    #[test]
    fn test_keywords() {
        let tokens =
            lex("func else if return while for byte int float pack void");
        assert_eq!(tokens.len(), 12);
        assert!(tokens[..11].iter().all(Token::is_keyword));
        assert!(matches!(lex("funcs")[0], Token::Ident(ref s, _) if s == "funcs"));
    }

    #[test]
    fn test_operators() {
        let tokens = lex("< <= > >= = == != + - * /");

        assert!(matches!(tokens[0], Token::Lt(_)));
        assert!(matches!(tokens[1], Token::Le(_)));
        assert!(matches!(tokens[2], Token::Gt(_)));
        assert!(matches!(tokens[3], Token::Ge(_)));
        assert!(matches!(tokens[4], Token::Eq(_)));
        assert!(matches!(tokens[5], Token::EqEq(_)));
        assert!(matches!(tokens[6], Token::NotEq(_)));
        assert!(matches!(tokens[7], Token::Plus(_)));
        assert!(matches!(tokens[8], Token::Minus(_)));
        assert!(matches!(tokens[9], Token::Star(_)));
        assert!(matches!(tokens[10], Token::Slash(_)));
    }

    #[test]
    fn test_bang_requires_equals() {
        let err = lex_err("a ! b");
        assert!(err.message.contains("'='"));
        assert_eq!(err.location, SourceLocation::new(1, 3));
    }

    #[test]
    fn test_number_bases() {
        let tokens = lex("42 0x1F 0o17 0b101 007");

        assert!(matches!(tokens[0], Token::IntLiteral(42, _)));
        assert!(matches!(tokens[1], Token::IntLiteral(31, _)));
        assert!(matches!(tokens[2], Token::IntLiteral(15, _)));
        assert!(matches!(tokens[3], Token::IntLiteral(5, _)));
        assert!(matches!(tokens[4], Token::IntLiteral(7, _)));
    }

    #[test]
    fn test_base_prefix_needs_single_zero() {
        let err = lex_err("12x4");
        assert!(err.message.contains("hex"));
        let err = lex_err("00b1");
        assert!(err.message.contains("bin"));
        assert!(lex_err("0x;").message.contains("digits"));
    }

    #[test]
    fn test_floats() {
        let tokens = lex("1.5 2e3 4.25E-2 0.5e+1");

        assert!(matches!(tokens[0], Token::FloatLiteral(x, _) if x == 1.5));
        assert!(matches!(tokens[1], Token::FloatLiteral(x, _) if x == 2000.0));
        assert!(matches!(tokens[2], Token::FloatLiteral(x, _) if x == 0.0425));
        assert!(matches!(tokens[3], Token::FloatLiteral(x, _) if x == 5.0));
    }

    #[test]
    fn test_malformed_floats() {
        assert!(lex_err("1.;").message.contains("decimal point"));
        assert!(lex_err("1e;").message.contains("exponent"));
        assert!(lex_err("1e+").message.contains("exponent"));
    }

    #[test]
    fn test_integer_overflow_is_rejected() {
        assert!(lex_err("9223372036854775808").message.contains("out of range"));
        assert!(matches!(
            lex("9223372036854775807")[0],
            Token::IntLiteral(i64::MAX, _)
        ));
    }

    #[test]
    fn test_digits_followed_by_letters() {
        let tokens = lex("12abc");
        assert!(matches!(tokens[0], Token::IntLiteral(12, _)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "abc"));
    }

    #[test]
    fn test_string_literal_escapes() {
        let tokens = lex(r#""a\tb\n\"q\" \\ \x41\x7e""#);

        match &tokens[0] {
            Token::StringLiteral(s, _) => assert_eq!(s, "a\tb\n\"q\" \\ A~"),
            other => panic!("Expected string literal, got {other}"),
        }
    }

    #[test]
    fn test_string_errors() {
        assert!(lex_err(r#""abc"#).message.contains("Unterminated"));
        assert!(lex_err("\"ab\ncd\"").message.contains("Non-printable"));
        assert!(lex_err(r#""\q""#).message.contains("Unknown escape"));
        assert!(lex_err(r#""\x4""#).message.contains("two hex digits"));
    }

    #[test]
    fn test_comments() {
        let tokens = lex("int x; # comment\nint y; ## block\ncomment ## int z;");

        assert!(matches!(tokens[0], Token::Int(_)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "x"));
        assert!(matches!(tokens[2], Token::Semicolon(_)));
        assert!(matches!(tokens[3], Token::Int(_)));
        assert!(matches!(tokens[4], Token::Ident(ref s, _) if s == "y"));
        assert!(matches!(tokens[5], Token::Semicolon(_)));
        assert!(matches!(tokens[6], Token::Int(_)));
        assert!(matches!(tokens[7], Token::Ident(ref s, _) if s == "z"));
        assert!(matches!(tokens[9], Token::Eof(_)));
    }

    #[test]
    fn test_empty_line_comment_keeps_next_line() {
        let tokens = lex("#\nint x;");
        assert!(matches!(tokens[0], Token::Int(_)));
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = lex_err("int ## never closed");
        assert_eq!(err.location, SourceLocation::new(1, 5));
    }

    #[test]
    fn test_unexpected_symbol() {
        let err = lex_err("int a = 3 % 2;");
        assert!(err.message.contains("Unexpected symbol"));
        assert_eq!(err.location, SourceLocation::new(1, 11));
    }

    #[test]
    fn test_locations() {
        let tokens = lex("int\n  x = 1;");
        assert_eq!(tokens[0].location(), SourceLocation::new(1, 1));
        assert_eq!(tokens[1].location(), SourceLocation::new(2, 3));
        assert_eq!(tokens[3].location(), SourceLocation::new(2, 7));
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("x");
        assert!(matches!(lexer.next_token(), Ok(Token::Ident(_, _))));
        assert!(matches!(lexer.next_token(), Ok(Token::Eof(_))));
        assert!(matches!(lexer.next_token(), Ok(Token::Eof(_))));
    }
}
