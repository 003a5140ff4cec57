//! Textual preprocessing ahead of the lexer.
//!
//! Two directives are recognised anywhere in the text:
//!
//! - `$inc "file"` splices in the expanded contents of another file
//! - `$def name value` binds `name` to the rest of the line
//!
//! Identifiers bound by `$def` are replaced wherever they appear outside
//! string literals and comments. Definitions live for one [`Preprocessor`]
//! session and are shared with every file it includes.

use rustc_hash::FxHashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Unexpected preprocessor command '${command}' at line {line}")]
    UnknownCommand { command: String, line: usize },

    #[error("Expected file to include at line {line}")]
    MissingIncludeName { line: usize },

    #[error("Expected '\"' when including file at line {line}")]
    UnterminatedIncludeName { line: usize },

    #[error("Expected variable name to be defined at line {line}")]
    MissingDefinitionName { line: usize },

    #[error("Cannot find included file [{name}]: {source}")]
    Include {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("File [{name}] includes itself")]
    IncludeCycle { name: String },
}

/// Supplies the contents of `$inc` targets.
pub trait IncludeResolver {
    fn resolve(&self, name: &str) -> io::Result<String>;
}

/// Resolves include names as paths relative to a base directory.
#[derive(Debug, Clone)]
pub struct FsResolver {
    base_dir: PathBuf,
}

impl FsResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        FsResolver {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl IncludeResolver for FsResolver {
    fn resolve(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.base_dir.join(name))
    }
}

/// One preprocessing session.
pub struct Preprocessor<'r> {
    resolver: &'r dyn IncludeResolver,
    definitions: FxHashMap<String, String>,
    include_stack: Vec<String>,
}

impl<'r> Preprocessor<'r> {
    pub fn new(resolver: &'r dyn IncludeResolver) -> Self {
        Preprocessor {
            resolver,
            definitions: FxHashMap::default(),
            include_stack: Vec::new(),
        }
    }

    /// Bind `name` as if by `$def name value`.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.definitions.insert(name.into(), value.into());
    }

    pub fn definition(&self, name: &str) -> Option<&str> {
        self.definitions.get(name).map(String::as_str)
    }

    pub fn preprocess(&mut self, source: &str) -> Result<String, PreprocessError> {
        let mut out = String::with_capacity(source.len());
        self.expand(source, &mut out)?;
        Ok(out)
    }

    fn expand(&mut self, source: &str, out: &mut String) -> Result<(), PreprocessError> {
        let mut scan = Scanner::new(source);

        while let Some(ch) = scan.peek() {
            match ch {
                '$' => {
                    scan.advance();
                    self.directive(&mut scan, out)?;
                }
                '"' => scan.copy_string(out),
                '#' => scan.copy_comment(out),
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let word = scan.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                    match self.definitions.get(&word) {
                        Some(value) => out.push_str(value),
                        None => out.push_str(&word),
                    }
                }
                // Numeric literals such as 0x1F must not have their tail substituted.
                c if c.is_ascii_digit() => {
                    let number = scan.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
                    out.push_str(&number);
                }
                c => {
                    scan.advance();
                    out.push(c);
                }
            }
        }

        Ok(())
    }

    fn directive(&mut self, scan: &mut Scanner, out: &mut String) -> Result<(), PreprocessError> {
        let line = scan.line;
        let command = scan.take_while(|c| !c.is_whitespace());

        match command.as_str() {
            "inc" => {
                let name = scan.include_name()?;
                self.include(&name, out)
            }
            "def" => {
                let (name, value) = scan.definition()?;
                tracing::debug!(%name, %value, "preprocessor definition");
                self.definitions.insert(name, value);
                Ok(())
            }
            _ => Err(PreprocessError::UnknownCommand { command, line }),
        }
    }

    fn include(&mut self, name: &str, out: &mut String) -> Result<(), PreprocessError> {
        if self.include_stack.iter().any(|open| open == name) {
            return Err(PreprocessError::IncludeCycle {
                name: name.to_string(),
            });
        }

        let contents = self
            .resolver
            .resolve(name)
            .map_err(|source| PreprocessError::Include {
                name: name.to_string(),
                source,
            })?;
        tracing::debug!(file = name, bytes = contents.len(), "including file");

        self.include_stack.push(name.to_string());
        let result = self.expand(&contents, out);
        self.include_stack.pop();
        result
    }
}

/// Character cursor over one file's text.
struct Scanner {
    chars: Vec<char>,
    position: usize,
    line: usize,
}

impl Scanner {
    fn new(source: &str) -> Self {
        Scanner {
            chars: source.chars().collect(),
            position: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut taken = String::new();
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            taken.push(ch);
            self.advance();
        }
        taken
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn skip_blanks(&mut self) {
        self.take_while(|c| c == ' ' || c == '\t' || c == '\r');
    }

    /// Copies a string literal, escapes included, up to the closing quote or end of line.
    fn copy_string(&mut self, out: &mut String) {
        if let Some(quote) = self.advance() {
            out.push(quote);
        }
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
            out.push(ch);
            match ch {
                '"' => break,
                '\\' => {
                    if let Some(escaped) = self.peek().filter(|&c| c != '\n') {
                        self.advance();
                        out.push(escaped);
                    }
                }
                _ => {}
            }
        }
    }

    /// Copies a `#` line comment or a `## ... ##` block comment.
    fn copy_comment(&mut self, out: &mut String) {
        if self.peek_ahead(1) == Some('#') {
            self.advance();
            self.advance();
            out.push_str("##");
            while let Some(ch) = self.advance() {
                out.push(ch);
                if ch == '#' && self.peek() == Some('#') {
                    self.advance();
                    out.push('#');
                    break;
                }
            }
        } else {
            let comment = self.take_while(|c| c != '\n');
            out.push_str(&comment);
        }
    }

    fn include_name(&mut self) -> Result<String, PreprocessError> {
        self.skip_whitespace();
        let line = self.line;
        if self.peek() != Some('"') {
            return Err(PreprocessError::MissingIncludeName { line });
        }
        self.advance();

        let name = self.take_while(|c| c != '"' && c != '\n');
        if self.advance() != Some('"') {
            return Err(PreprocessError::UnterminatedIncludeName { line });
        }
        Ok(name)
    }

    /// Reads `name value` after `$def`, consuming the rest of the line.
    fn definition(&mut self) -> Result<(String, String), PreprocessError> {
        self.skip_blanks();
        let line = self.line;
        let name = self.take_while(|c| !c.is_whitespace());
        if name.is_empty() {
            return Err(PreprocessError::MissingDefinitionName { line });
        }

        self.skip_blanks();
        let value = self.take_while(|c| c != '\n');
        self.advance();
        Ok((name, value.trim_end().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct MapResolver(FxHashMap<String, String>);

    impl MapResolver {
        fn new(files: &[(&str, &str)]) -> Self {
            MapResolver(
                files
                    .iter()
                    .map(|(name, text)| (name.to_string(), text.to_string()))
                    .collect(),
            )
        }
    }

    impl IncludeResolver for MapResolver {
        fn resolve(&self, name: &str) -> io::Result<String> {
            self.0
                .get(name)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }
    }

    fn run(files: &[(&str, &str)], source: &str) -> Result<String, PreprocessError> {
        let resolver = MapResolver::new(files);
        Preprocessor::new(&resolver).preprocess(source)
    }

    #[test]
    fn test_plain_text_passes_through() {
        let source = "func main() -> void {\n\tint x = 1 + 2;\n}\n";
        assert_eq!(run(&[], source).unwrap(), source);
    }

    #[test]
    fn test_definition_substitutes_identifiers() {
        let out = run(&[], "$def SIZE 16\nint x = SIZE * 2;").unwrap();
        assert_eq!(out, "int x = 16 * 2;");
    }

    #[test]
    fn test_definition_only_matches_whole_identifiers() {
        let out = run(&[], "$def N 3\nint NN = N; int N_2 = 0x1N;").unwrap();
        assert_eq!(out, "int NN = 3; int N_2 = 0x1N;");
    }

    #[test]
    fn test_empty_definition() {
        let out = run(&[], "$def EMPTY\nint x = 1 EMPTY;").unwrap();
        assert_eq!(out, "int x = 1 ;");

        let out = run(&[], "x $def EMPTY").unwrap();
        assert_eq!(out, "x ");
    }

    #[test]
    fn test_redefinition_overwrites() {
        let out = run(&[], "$def A 1\n$def A 2\nA").unwrap();
        assert_eq!(out, "2");
    }

    #[test]
    fn test_strings_and_comments_are_verbatim() {
        let source = "$def X 9\n\"X \\\" X\" # X here\n## X\nX ## X";
        let out = run(&[], source).unwrap();
        assert_eq!(out, "\"X \\\" X\" # X here\n## X\nX ## 9");
    }

    #[test]
    fn test_include_expands_in_place() {
        let files = [("lib.sil", "$def ONE 1\nint one = ONE;\n")];
        let out = run(&files, "$inc \"lib.sil\"\nint two = ONE + ONE;").unwrap();
        assert_eq!(out, "int one = 1;\n\nint two = 1 + 1;");
    }

    #[test]
    fn test_missing_include() {
        let err = run(&[], "$inc \"nope.sil\"").unwrap_err();
        assert!(matches!(err, PreprocessError::Include { ref name, .. } if name == "nope.sil"));
        assert!(err.to_string().contains("Cannot find included file [nope.sil]"));
    }

    #[test]
    fn test_include_syntax_errors() {
        assert!(matches!(
            run(&[], "$inc lib.sil").unwrap_err(),
            PreprocessError::MissingIncludeName { line: 1 }
        ));
        assert!(matches!(
            run(&[], "\n$inc \"lib.sil").unwrap_err(),
            PreprocessError::UnterminatedIncludeName { line: 2 }
        ));
    }

    #[test]
    fn test_include_cycle() {
        let files = [("a.sil", "$inc \"b.sil\""), ("b.sil", "$inc \"a.sil\"")];
        let err = run(&files, "$inc \"a.sil\"").unwrap_err();
        assert!(matches!(err, PreprocessError::IncludeCycle { ref name } if name == "a.sil"));
    }

    #[test]
    fn test_same_file_included_twice_is_not_a_cycle() {
        let files = [("x.sil", "x")];
        let out = run(&files, "$inc \"x.sil\" $inc \"x.sil\"").unwrap();
        assert_eq!(out, "x x");
    }

    #[test]
    fn test_unknown_command() {
        let err = run(&[], "int a;\n$foo bar").unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::UnknownCommand { ref command, line: 2 } if command == "foo"
        ));
    }

    #[test]
    fn test_missing_definition_name() {
        assert!(matches!(
            run(&[], "$def\nX").unwrap_err(),
            PreprocessError::MissingDefinitionName { line: 1 }
        ));
    }

    #[test]
    fn test_sessions_do_not_share_definitions() {
        let resolver = MapResolver::new(&[]);
        let mut first = Preprocessor::new(&resolver);
        first.preprocess("$def K 5\n").unwrap();
        assert_eq!(first.definition("K"), Some("5"));

        let mut second = Preprocessor::new(&resolver);
        assert_eq!(second.preprocess("K").unwrap(), "K");
    }

    #[test]
    fn test_fs_resolver_reads_relative_to_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("consts.sil")).unwrap();
        writeln!(file, "$def LIMIT 10").unwrap();

        let resolver = FsResolver::new(dir.path());
        let mut pre = Preprocessor::new(&resolver);
        let out = pre.preprocess("$inc \"consts.sil\"int x = LIMIT;").unwrap();
        assert_eq!(out, "int x = 10;");
        assert_eq!(resolver.base_dir(), dir.path());
    }
}
