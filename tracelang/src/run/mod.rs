//! Run pipeline
//!
//! Source text → tokens → AST → evaluation → trace report.
//!
//! Lex diagnostics are reported and the run continues; a syntax error or a
//! runtime error is reported once and ends the run. The trace report is only
//! written after a successful run, and only if something was traced.

use std::io::{self, Write};
use std::path::PathBuf;

use thiserror::Error;

use crate::error::{report_error, report_runtime_error, CompileError};
use crate::interp::{Environment, Interpreter, RuntimeError, DEFAULT_MAX_CALL_DEPTH};
use crate::lexer::tokenize;
use crate::parser::parse;

/// Report file written next to the working directory unless configured otherwise
pub const DEFAULT_TRACE_FILE: &str = "Trace.txt";

/// Run configuration
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Input source file
    pub input: PathBuf,
    /// Where the trace report goes
    pub trace_path: PathBuf,
    /// Also print the trace report to the program output after writing it
    pub echo_trace: bool,
    /// Maximum nesting of user function calls
    pub max_call_depth: usize,
}

impl RunConfig {
    /// Create a new run configuration with defaults
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            trace_path: PathBuf::from(DEFAULT_TRACE_FILE),
            echo_trace: false,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Set trace report path
    pub fn trace_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.trace_path = path.into();
        self
    }

    pub fn echo_trace(mut self, echo: bool) -> Self {
        self.echo_trace = echo;
        self
    }

    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}

/// Run error
#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Syntax(#[from] CompileError),

    #[error("{0}")]
    Runtime(#[from] RuntimeError),

    #[error("cannot write trace report to {path}: {source}")]
    TraceReport {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Run result
pub type RunResult<T> = Result<T, RunError>;

/// What a successful run leaves behind
pub struct RunOutcome<W: Write> {
    pub interpreter: Interpreter<W>,
    /// Number of non-fatal lex diagnostics
    pub lex_errors: usize,
    pub report_written: bool,
}

/// Read `config.input` and run it, printing to stdout
pub fn run_file(config: &RunConfig) -> RunResult<RunOutcome<io::Stdout>> {
    let source = std::fs::read_to_string(&config.input).map_err(|source| {
        let err = RunError::Read {
            path: config.input.clone(),
            source,
        };
        eprintln!("Error: {err}");
        err
    })?;
    let filename = config.input.display().to_string();
    run_source(&filename, &source, config, io::stdout())
}

/// Run `source`, printing program output to `out`.
///
/// Every diagnostic is rendered to stderr before this returns.
pub fn run_source<W: Write>(
    filename: &str,
    source: &str,
    config: &RunConfig,
    out: W,
) -> RunResult<RunOutcome<W>> {
    log::info!("running {filename}");

    let lexed = tokenize(source);
    for err in &lexed.errors {
        report_error(filename, source, err);
    }
    let lex_errors = lexed.errors.len();

    let program = parse(filename, source, lexed.tokens).map_err(|err| {
        report_error(filename, source, &err);
        RunError::Syntax(err)
    })?;
    log::debug!("parsed {} top-level statements", program.stmts.len());

    let mut interpreter = Interpreter::with_output(out).with_max_call_depth(config.max_call_depth);
    let env = Environment::new().into_ref();
    if let Err(err) = interpreter.run(&program, &env) {
        report_runtime_error(filename, source, &err);
        return Err(err.into());
    }

    let report_written = interpreter
        .trace()
        .write_report(&config.trace_path)
        .map_err(|source| {
            let err = RunError::TraceReport {
                path: config.trace_path.clone(),
                source,
            };
            eprintln!("Error: {err}");
            err
        })?;

    if report_written && config.echo_trace {
        if let Some(report) = interpreter.trace().report() {
            let out = interpreter.output_mut();
            out.write_all(report.as_bytes())
                .and_then(|()| out.flush())
                .map_err(RuntimeError::from)?;
        }
    }

    Ok(RunOutcome {
        interpreter,
        lex_errors,
        report_written,
    })
}
