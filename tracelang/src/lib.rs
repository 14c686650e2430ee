//! TraceLang
//!
//! A small imperative language whose interpreter records the history of
//! variables declared with `trace`, annotated with the call context of every
//! write, and reports it when the program ends.

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod run;

pub use ast::Span;
pub use error::{CompileError, Result};
pub use interp::{Interpreter, RuntimeError, TraceRecorder, Value};
