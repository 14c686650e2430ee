//! Error types and reporting

use crate::ast::Span;
use crate::interp::RuntimeError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CompileError>;

/// Error raised before evaluation starts
#[derive(Debug, Error)]
pub enum CompileError {
    /// Unrecognized character; reported and skipped, never fatal on its own
    #[error("Lexer error at line {line}: {message}")]
    Lexer {
        message: String,
        span: Span,
        line: usize,
    },

    /// Grammar violation; aborts the parse
    #[error("Syntax error at line {line}: {message}")]
    Parser {
        message: String,
        span: Span,
        line: usize,
    },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span, line: usize) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
            line,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span, line: usize) -> Self {
        Self::Parser {
            message: message.into(),
            span,
            line,
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lexer { span, .. } | Self::Parser { span, .. } => Some(*span),
            Self::Io { .. } => None,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Lexer { line, .. } | Self::Parser { line, .. } => Some(*line),
            Self::Io { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Lexer { message, .. } => message,
            Self::Parser { message, .. } => message,
            Self::Io { message } => message,
        }
    }

    fn kind_label(&self) -> &'static str {
        match self {
            Self::Lexer { .. } => "Lex",
            Self::Parser { .. } => "Syntax",
            Self::Io { .. } => "IO",
        }
    }
}

impl From<std::io::Error> for CompileError {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

/// Report a compile error with ariadne
pub fn report_error(filename: &str, source: &str, error: &CompileError) {
    let title = match error.line() {
        Some(line) => format!("{} error at line {line}", error.kind_label()),
        None => format!("{} error: {}", error.kind_label(), error.message()),
    };
    emit(filename, source, title, error.span(), error.message());
}

/// Report a fatal runtime error with ariadne, pointing at the failing statement when known
pub fn report_runtime_error(filename: &str, source: &str, error: &RuntimeError) {
    let title = match error.span {
        Some(span) => {
            let line = crate::ast::LineIndex::new(source).line_of(span.start);
            format!("Runtime error at line {line}: {}", error.kind.name())
        }
        None => format!("Runtime error: {}", error.kind.name()),
    };
    emit(filename, source, title, error.span, &error.message);
}

fn emit(filename: &str, source: &str, title: String, span: Option<Span>, message: &str) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let range = span.map(|s| s.start..s.end.max(s.start)).unwrap_or(0..0);
    let mut report = Report::build(ReportKind::Error, (filename, range.clone())).with_message(&title);
    if span.is_some() {
        report = report.with_label(
            Label::new((filename, range))
                .with_message(message)
                .with_color(Color::Red),
        );
    }

    if report
        .finish()
        .eprint((filename, Source::from(source)))
        .is_err()
    {
        // stderr itself is unusable; fall back to the plain rendering
        eprintln!("{title}: {message}");
    }
}
