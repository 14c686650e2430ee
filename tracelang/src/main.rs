//! TraceLang CLI

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracelang::run::{run_file, RunConfig, DEFAULT_TRACE_FILE};

#[derive(Parser)]
#[command(name = "tracelang", version, about = "TraceLang interpreter with variable tracing")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a TraceLang program and write its trace report
    Run {
        /// Source file to run
        file: PathBuf,
        /// Where to write the trace report
        #[arg(long, default_value = DEFAULT_TRACE_FILE)]
        trace_file: PathBuf,
        /// Also print the trace report after the program output
        #[arg(long)]
        echo_trace: bool,
        /// Maximum nesting of function calls
        #[arg(long, default_value_t = tracelang::interp::DEFAULT_MAX_CALL_DEPTH)]
        max_depth: usize,
    },
    /// Parse and dump AST as JSON (debug)
    Parse {
        /// Source file to parse
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
    /// Start an interactive session
    Repl,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Run {
            file,
            trace_file,
            echo_trace,
            max_depth,
        } => {
            let config = RunConfig::new(file)
                .trace_path(trace_file)
                .echo_trace(echo_trace)
                .max_call_depth(max_depth);
            // diagnostics are already rendered by the pipeline
            if run_file(&config).is_err() {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Parse { file } => parse_file(&file),
        Command::Tokens { file } => tokenize_file(&file),
        Command::Repl => tracelang::repl::Repl::new()
            .and_then(|mut repl| repl.run())
            .map_err(Into::into),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn parse_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    let lexed = tracelang::lexer::tokenize(&source);
    for err in &lexed.errors {
        tracelang::error::report_error(&filename, &source, err);
    }
    let ast = match tracelang::parser::parse(&filename, &source, lexed.tokens) {
        Ok(ast) => ast,
        Err(err) => {
            tracelang::error::report_error(&filename, &source, &err);
            std::process::exit(1);
        }
    };

    println!("{}", serde_json::to_string_pretty(&ast)?);
    Ok(())
}

fn tokenize_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    let lexed = tracelang::lexer::tokenize(&source);
    for tok in &lexed.tokens {
        println!("{:>4}  {:<12} {}", tok.line, tok.span.to_string(), tok.token);
    }
    for err in &lexed.errors {
        tracelang::error::report_error(&filename, &source, err);
    }

    Ok(())
}
