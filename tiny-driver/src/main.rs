//! Tiny Compiler Driver
//!
//! Reads a parsed program (the JSON AST produced by the front end), runs
//! validation and code generation, and writes x86-64 assembly.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::thread;
use tiny_codegen::{compile_to_writer, CodegenOptions};
use tiny_common::{CompilerError, Node, DEFAULT_MAX_DEPTH};

/// Stack reserved per AST level for parsing and code generation
const STACK_PER_LEVEL: usize = 16 * 1024;

/// Smallest stack the compiler thread runs on
const MIN_STACK_SIZE: usize = 8 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "tinyc")]
#[command(about = "Tiny compiler backend: JSON AST to x86-64 assembly")]
#[command(version)]
struct Cli {
    /// Input AST in JSON form ("-" reads stdin)
    input: PathBuf,

    /// Output assembly file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit only the program body, without the entry prologue/epilogue
    #[arg(long)]
    fragment: bool,

    /// Annotate folded and strength-reduced expressions
    #[arg(long)]
    comments: bool,

    /// Entry symbol exported by the prologue
    #[arg(long, value_name = "SYMBOL", default_value = "basic_main")]
    entry: String,

    /// Deepest AST accepted; the compiler stack grows with it
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn codegen_options(&self) -> CodegenOptions {
        CodegenOptions {
            emit_prologue: !self.fragment,
            emit_comments: self.comments,
            entry_symbol: self.entry.clone(),
            max_depth: self.max_depth,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .init();
    } else {
        env_logger::init();
    }

    with_compiler_stack(cli.max_depth, move || run(&cli))?
}

fn run(cli: &Cli) -> Result<()> {
    let source = read_source(&cli.input)?;
    let program = parse_program(&source, cli.max_depth)
        .with_context(|| format!("malformed AST in {}", cli.input.display()))?;
    let options = cli.codegen_options();

    match &cli.output {
        Some(path) => {
            let mut file = io::BufWriter::new(
                fs::File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?,
            );
            compile_to_writer(&program, options, &mut file)
                .with_context(|| format!("failed to compile {}", cli.input.display()))?;
            file.flush()?;
            info!("Assembly written to: {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            compile_to_writer(&program, options, &mut out)
                .with_context(|| format!("failed to compile {}", cli.input.display()))?;
        }
    }

    Ok(())
}

/// Run `f` on a thread whose stack fits trees up to `max_depth` levels
fn with_compiler_stack<T, F>(max_depth: usize, f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let stack_size = max_depth.saturating_mul(STACK_PER_LEVEL).max(MIN_STACK_SIZE);
    debug!("compiler thread stack: {stack_size} bytes for depth {max_depth}");

    let worker = thread::Builder::new()
        .name("tinyc".to_string())
        .stack_size(stack_size)
        .spawn(f)
        .with_context(|| format!("failed to start compiler thread with a {stack_size}-byte stack"))?;
    worker.join().map_err(|_| anyhow!("compiler thread panicked"))
}

fn read_source(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read AST from stdin")?;
        Ok(buf)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

/// Deserialize a program, rejecting JSON nested deeper than any tree
/// within `max_depth` can be. A tree level is at most two JSON levels
/// (a `Sequence` object and its `statements` array).
fn parse_program(source: &str, max_depth: usize) -> Result<Node, CompilerError> {
    let depth = json_nesting_depth(source);
    let limit = max_depth.saturating_mul(2);
    if depth > limit {
        return Err(CompilerError::serialization(format!(
            "JSON nesting depth {depth} exceeds {limit} (max depth {max_depth})"
        )));
    }

    let mut de = serde_json::Deserializer::from_str(source);
    de.disable_recursion_limit();
    let program =
        Node::deserialize(&mut de).map_err(|e| CompilerError::serialization(e.to_string()))?;
    de.end()
        .map_err(|e| CompilerError::serialization(e.to_string()))?;
    Ok(program)
}

/// Deepest `{`/`[` nesting in a JSON text, ignoring brackets inside strings
fn json_nesting_depth(source: &str) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for byte in source.bytes() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match byte {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                max = max.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}
