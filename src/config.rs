//! Compiler configuration and fixed defaults.

/// Number of pseudo-registers available to one expression
pub const DEFAULT_REGISTER_COUNT: usize = 16;

/// Output file used when the command line names none
pub const DEFAULT_OUTPUT_FILE: &str = "out.silcode";

/// File name of the preprocessed intermediate inside the temp directory
pub const SCRATCH_FILE_NAME: &str = "tmp.sil";

/// Knobs consulted by the parser and expression compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Pseudo-registers an expression may keep live at once
    pub register_count: usize,
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self {
            register_count: DEFAULT_REGISTER_COUNT,
        }
    }

    pub fn with_register_count(mut self, register_count: usize) -> Self {
        self.register_count = register_count;
        self
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self::new()
    }
}
