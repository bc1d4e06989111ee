//! limitc: the Limit language front-end CLI.
//!
//! Usage:
//!   limitc [options] <FILE>...
//!
//! Parses every file in parallel, prints diagnostics in input order and
//! exits with 0 (clean), 1 (I/O or usage error) or 2 (syntax errors).

use bumpalo::Bump;
use clap::{Parser as ClapParser, ValueEnum};
use limit_ast::visitor::NodeCounter;
use limit_cst::reconstruct_source;
use limit_diagnostics::{render_plain, render_report, Diagnostic, DiagnosticCategory};
use limit_parser::{Parser, ParserOptions};
use limit_scanner::Scanner;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

/// Parser threads get a large stack; nesting up to the recursion limit
/// needs more than the default.
const PARSER_STACK_SIZE: usize = 64 * 1024 * 1024;

#[derive(ClapParser, Debug)]
#[command(name = "limitc", version, about = "limitc - parse Limit source files and report syntax errors")]
struct Cli {
    /// Limit source files to parse.
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// Build the lossless concrete syntax tree.
    #[arg(long)]
    cst: bool,

    /// Give every expression its own CST node.
    #[arg(long)]
    detailed: bool,

    /// Stop parsing a file after this many errors.
    #[arg(long = "max-errors", value_name = "N")]
    max_errors: Option<usize>,

    /// JSON config file; its `parser` section sets the defaults.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the CST of every file (implies --cst).
    #[arg(long = "print-cst")]
    print_cst: bool,

    /// Fail when the CST does not reproduce the source (implies --cst).
    #[arg(long = "check-roundtrip")]
    check_roundtrip: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Print per-file timing and node counts.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{path}' is not valid UTF-8")]
    InvalidUtf8 { path: String },
    #[error("invalid config file '{path}': {source}")]
    Config {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot start parser threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Layout of a `--config` file. Unknown sections are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    parser: ParserOptions,
}

/// The outcome of parsing one file.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    errors: usize,
    warnings: usize,
    aborted: bool,
    diagnostics: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    roundtrip: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cst: Option<String>,
    #[serde(skip)]
    source: String,
    #[serde(skip)]
    stats: FileStats,
}

#[derive(Debug, Default)]
struct FileStats {
    tokens: usize,
    nodes: NodeCounter,
    cst_nodes: Option<usize>,
    elapsed: Duration,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const GRAY: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };
    process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let options = match load_options(cli) {
        Ok(options) => options,
        Err(e) => {
            print_error(&e.to_string());
            return 1;
        }
    };

    let pool = match rayon::ThreadPoolBuilder::new()
        .stack_size(PARSER_STACK_SIZE)
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            print_error(&CliError::from(e).to_string());
            return 1;
        }
    };

    // `collect` on an indexed parallel iterator keeps input order.
    let results: Vec<Result<FileReport, CliError>> = pool.install(|| {
        cli.files
            .par_iter()
            .map(|path| parse_file(path, options, cli))
            .collect()
    });

    let mut io_failed = false;
    let mut reports = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                print_error(&e.to_string());
                io_failed = true;
            }
        }
    }

    let use_color = stderr_is_terminal();
    match cli.format {
        OutputFormat::Human => print_human(&reports, use_color),
        OutputFormat::Json => {
            if let Err(e) = print_json(&reports) {
                print_error(&e.to_string());
                return 1;
            }
        }
    }

    if cli.verbose {
        for report in &reports {
            print_stats(report, use_color);
        }
    }

    exit_code(io_failed, &reports)
}

fn exit_code(io_failed: bool, reports: &[FileReport]) -> i32 {
    if io_failed {
        1
    } else if reports
        .iter()
        .any(|r| r.errors > 0 || r.roundtrip == Some(false))
    {
        2
    } else {
        0
    }
}

/// Config file values first, then command-line flags on top.
fn load_options(cli: &Cli) -> Result<ParserOptions, CliError> {
    let mut options = match cli.config {
        Some(ref path) => read_config(path)?.parser,
        None => ParserOptions::default(),
    };
    if cli.cst || cli.print_cst || cli.check_roundtrip {
        options.cst_mode = true;
    }
    if cli.detailed {
        options.detailed_expression_nodes = true;
    }
    if let Some(max_errors) = cli.max_errors {
        options.max_errors = max_errors;
    }
    Ok(options)
}

fn read_config(path: &Path) -> Result<ConfigFile, CliError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Config {
        path: display,
        source,
    })
}

fn parse_file(path: &Path, options: ParserOptions, cli: &Cli) -> Result<FileReport, CliError> {
    let file = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| CliError::Io {
        path: file.clone(),
        source,
    })?;
    let source = simdutf8::basic::from_utf8(&bytes)
        .map_err(|_| CliError::InvalidUtf8 { path: file.clone() })?;
    Ok(parse_text(file, source, options, cli))
}

fn parse_text(file: String, source: &str, options: ParserOptions, cli: &Cli) -> FileReport {
    let start = Instant::now();
    let arena = Bump::new();
    let (tokens, mut diagnostics) = Scanner::new(source)
        .with_file_name(file.clone())
        .scan_tokens();
    let token_count = tokens.len().saturating_sub(1);
    let result = Parser::new(&arena, &file, source, tokens, options).parse();
    let elapsed = start.elapsed();

    let nodes = NodeCounter::count(&result.program);
    let roundtrip = match result.cst {
        Some(ref cst) if cli.check_roundtrip => Some(reconstruct_source(cst, true) == source),
        _ => None,
    };
    let cst = match result.cst {
        Some(ref cst) if cli.print_cst => Some(cst.to_tree_string()),
        _ => None,
    };
    let cst_nodes = result.cst.as_ref().map(|cst| cst.node_count());
    let aborted = result.aborted;

    diagnostics.extend(result.diagnostics);
    let diagnostics = diagnostics.into_diagnostics();
    let errors = diagnostics.iter().filter(|d| d.is_error()).count();
    let warnings = diagnostics
        .iter()
        .filter(|d| d.category == DiagnosticCategory::Warning)
        .count();

    FileReport {
        file,
        errors,
        warnings,
        aborted,
        diagnostics,
        roundtrip,
        cst,
        source: source.to_string(),
        stats: FileStats {
            tokens: token_count,
            nodes,
            cst_nodes,
            elapsed,
        },
    }
}

// ============================================================================
// Output
// ============================================================================

fn print_human(reports: &[FileReport], use_color: bool) {
    let mut error_count = 0;
    let mut failed_files = 0;

    for report in reports {
        for diag in &report.diagnostics {
            print_diagnostic(diag, &report.source, use_color);
        }
        if let Some(ref tree) = report.cst {
            println!("{}", report.file);
            println!("{}", tree);
        }
        if report.roundtrip == Some(false) {
            print_error(&format!(
                "{}: reconstructed source differs from the input",
                report.file
            ));
        }
        if report.errors > 0 {
            error_count += report.errors;
            failed_files += 1;
        }
    }

    if error_count > 0 {
        let summary = format!(
            "Found {} error{} in {} file{}.",
            error_count,
            if error_count == 1 { "" } else { "s" },
            failed_files,
            if failed_files == 1 { "" } else { "s" }
        );
        if use_color {
            eprintln!("\n{}{}{}", RED, summary, RESET);
        } else {
            eprintln!("\n{}", summary);
        }
    }
}

fn print_diagnostic(diag: &Diagnostic, source: &str, use_color: bool) {
    if use_color {
        eprint!("{}", render_report(diag, source, true));
    } else {
        eprintln!("{}", render_plain(diag));
    }
}

fn print_json(reports: &[FileReport]) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(reports)?);
    Ok(())
}

fn print_stats(report: &FileReport, use_color: bool) {
    let stats = &report.stats;
    let cst = stats
        .cst_nodes
        .map(|n| format!(", {} CST nodes", n))
        .unwrap_or_default();
    let line = format!(
        "{}: {} tokens, {} statements, {} expressions, {} types{} in {:.2}ms",
        report.file,
        stats.tokens,
        stats.nodes.statements,
        stats.nodes.expressions,
        stats.nodes.types,
        cst,
        stats.elapsed.as_secs_f64() * 1000.0
    );
    if use_color {
        eprintln!("{}{}{}", GRAY, line, RESET);
    } else {
        eprintln!("{}", line);
    }
}

fn print_error(msg: &str) {
    if stderr_is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

fn stderr_is_terminal() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(2) != 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
