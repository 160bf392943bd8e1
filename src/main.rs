//! jspy Translator
//!
//! Command-line front end: translates a JavaScript-subset file into Python.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use jspy::feedback::Report;
use jspy::frontend::lexer::Lexer;
use jspy::{Mode, Options, Translation};

/// jspy Translator
#[derive(Parser, Debug)]
#[command(name = "jspyc")]
#[command(version = "0.1.0")]
#[command(about = "Translates a small JavaScript subset into Python")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a source file
    Build {
        /// Input source file
        input: PathBuf,

        /// Output file, "-" for stdout (default: input with .py extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not generate code when semantic errors were found
        #[arg(long)]
        strict: bool,

        /// Spaces per indentation level
        #[arg(long, default_value = "4")]
        indent: usize,

        /// Print a JSON report instead of plain diagnostics
        #[arg(long)]
        json: bool,
    },
    /// Check a source file for errors
    Check {
        /// Input source file
        input: PathBuf,

        #[arg(long)]
        json: bool,
    },
    /// Dump the token stream as JSON
    Tokens {
        input: PathBuf,
    },
    /// Dump the syntax tree as JSON
    Ast {
        input: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Commands::Build { input, output, strict, indent, json } => {
            let options = Options {
                mode: if *strict { Mode::Strict } else { Mode::Lenient },
                indent_width: *indent,
            };
            build_file(input, output.as_deref(), &options, *json)
        }
        Commands::Check { input, json } => check_file(input, *json),
        Commands::Tokens { input } => {
            let source = read_source(input)?;
            let mut lexer = Lexer::new(&source);
            let tokens = lexer.tokenize();
            println!("{}", serde_json::to_string_pretty(&tokens)?);
            print_diagnostics(lexer.errors());
            Ok(0)
        }
        Commands::Ast { input } => {
            let source = read_source(input)?;
            match jspy::parse(&source) {
                Ok((program, warnings)) => {
                    println!("{}", serde_json::to_string_pretty(&program)?);
                    print_diagnostics(&warnings);
                    Ok(0)
                }
                Err(e) => {
                    print_diagnostics(std::slice::from_ref(&e));
                    Ok(1)
                }
            }
        }
    }
}

/// Translate a source file and write the result
fn build_file(input: &Path, output: Option<&Path>, options: &Options, json: bool) -> Result<i32> {
    log::info!("translating {}", input.display());

    let source = read_source(input)?;
    let translation = jspy::translate(&source, options);

    if json {
        print_report(input, &translation);
    } else {
        print_diagnostics(&translation.diagnostics);
    }

    let Some(code) = &translation.output else {
        return Ok(1);
    };

    match output {
        Some(path) if path == Path::new("-") => {
            if !json {
                println!("{}", code);
            }
        }
        _ => {
            let out_path = output
                .map(Path::to_path_buf)
                .unwrap_or_else(|| input.with_extension("py"));
            fs::write(&out_path, format!("{}\n", code))
                .with_context(|| format!("writing {}", out_path.display()))?;
            log::info!("wrote {} lines to {}", translation.stats.line_count, out_path.display());
        }
    }

    Ok(0)
}

/// Check a source file for errors without generating code
fn check_file(input: &Path, json: bool) -> Result<i32> {
    let source = read_source(input)?;
    let translation = jspy::check(&source);

    if json {
        print_report(input, &translation);
    } else {
        print_diagnostics(&translation.diagnostics);
    }

    if !translation.is_success() {
        return Ok(1);
    }
    if !json {
        println!("No errors found");
    }
    Ok(0)
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(jspy::Error::from)
        .with_context(|| format!("reading {}", path.display()))
}

fn print_report(input: &Path, translation: &Translation) {
    let report = Report::new(&input.to_string_lossy(), translation);
    println!("{}", report.to_json());
}

fn print_diagnostics(diagnostics: &[jspy::Error]) {
    for diagnostic in diagnostics {
        eprintln!("{}[{}]: {}", diagnostic.severity(), diagnostic.code(), diagnostic);
    }
}
