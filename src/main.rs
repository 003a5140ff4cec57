//! SILang compiler front end - CLI

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use crossterm::style::Stylize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use silang::config::{CompilerConfig, DEFAULT_OUTPUT_FILE, DEFAULT_REGISTER_COUNT, SCRATCH_FILE_NAME};
use silang::logging::{self, LogLevel};
use silang::parser::parse::Parser;
use silang::preprocessor::{FsResolver, Preprocessor};

/// Compile a SILang source file into a pseudo-instruction listing
#[derive(ClapParser, Debug)]
#[command(name = "silang")]
#[command(version)]
#[command(about, long_about = None)]
struct Args {
    /// Source file to compile
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Where to write the instruction listing
    #[arg(value_name = "OUTPUT", default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Scratch file receiving the preprocessed source
    #[arg(long, value_name = "PATH")]
    scratch: Option<PathBuf>,

    /// Number of pseudo-registers available to one expression
    #[arg(long, value_name = "N", default_value_t = DEFAULT_REGISTER_COUNT)]
    registers: usize,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    logging::init_with_level(if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    });

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("Cannot open input file {}", args.input.display()))?;
    let output = File::create(&args.output)
        .with_context(|| format!("Cannot open output file {}", args.output.display()))?;

    let base_dir = args
        .input
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let resolver = FsResolver::new(base_dir);
    let expanded = Preprocessor::new(&resolver)
        .preprocess(&source)
        .with_context(|| format!("Failed to preprocess {}", args.input.display()))?;

    let scratch = args
        .scratch
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(SCRATCH_FILE_NAME));
    fs::write(&scratch, &expanded)
        .with_context(|| format!("Cannot access scratch file {}", scratch.display()))?;
    let expanded = fs::read_to_string(&scratch)
        .with_context(|| format!("Cannot access scratch file {}", scratch.display()))?;
    tracing::debug!(scratch = %scratch.display(), bytes = expanded.len(), "preprocessed");

    let config = CompilerConfig::new().with_register_count(args.registers);
    let mut writer = BufWriter::new(output);

    let mut parser = match Parser::with_config(&expanded, config) {
        Ok(parser) => parser,
        Err(err) => {
            writer.flush().context("Cannot write output file")?;
            return Err(err).with_context(|| format!("Failed to compile {}", args.input.display()));
        }
    };
    let outcome = parser.parse_program();

    // The partial trace is kept even when compilation fails.
    parser
        .trace()
        .write_to(&mut writer)
        .with_context(|| format!("Cannot write output file {}", args.output.display()))?;

    outcome.with_context(|| format!("Failed to compile {}", args.input.display()))?;
    tracing::info!(
        output = %args.output.display(),
        instructions = parser.trace().len(),
        "compiled"
    );
    Ok(())
}
