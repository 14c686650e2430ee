//! Runtime errors for the interpreter

use crate::ast::Span;
use std::fmt;

/// Fatal error raised while evaluating a program
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    /// Statement being executed when the error was raised, once known
    pub span: Option<Span>,
}

/// Kinds of runtime errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown variable or function name
    UndefinedReference,
    /// Operand of the wrong kind, bad index type, or call arity mismatch
    TypeMismatch,
    /// Array index outside `[0, length)`
    IndexOutOfBounds,
    /// `/` or `%` with a zero divisor
    DivisionByZero,
    /// Call nesting exceeded the configured limit
    StackOverflow,
    /// Writing program output failed
    Io,
}

impl ErrorKind {
    /// Name used when reporting the error to the user
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::UndefinedReference => "UndefinedReferenceError",
            ErrorKind::TypeMismatch => "TypeMismatchError",
            ErrorKind::IndexOutOfBounds => "IndexOutOfBoundsError",
            ErrorKind::DivisionByZero => "DivisionByZeroError",
            ErrorKind::StackOverflow => "StackOverflowError",
            ErrorKind::Io => "IOError",
        }
    }
}

impl RuntimeError {
    fn new(kind: ErrorKind, message: String) -> Self {
        RuntimeError {
            kind,
            message,
            span: None,
        }
    }

    pub fn undefined_variable(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedReference, format!("undefined variable: {name}"))
    }

    pub fn undefined_function(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedReference, format!("undefined function: {name}"))
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("expected {expected}, got {got}"),
        )
    }

    pub fn invalid_operands(op: impl fmt::Display, left: &str, right: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("cannot apply `{op}` to {left} and {right}"),
        )
    }

    pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("function {name} expects {expected} argument(s), got {got}"),
        )
    }

    pub fn index_out_of_bounds(index: i64, len: usize) -> Self {
        Self::new(
            ErrorKind::IndexOutOfBounds,
            format!("index {index} out of bounds for length {len}"),
        )
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "division by zero".to_string())
    }

    pub fn stack_overflow(limit: usize) -> Self {
        Self::new(
            ErrorKind::StackOverflow,
            format!("call depth exceeded the limit of {limit}"),
        )
    }

    pub fn io_error(msg: &str) -> Self {
        Self::new(ErrorKind::Io, msg.to_string())
    }

    /// Attach a span unless a more precise one is already present
    pub fn with_span(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

impl std::error::Error for RuntimeError {}

impl From<std::io::Error> for RuntimeError {
    fn from(err: std::io::Error) -> Self {
        RuntimeError::io_error(&err.to_string())
    }
}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;
