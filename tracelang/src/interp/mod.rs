//! Tree-walking interpreter for TraceLang
//!
//! Executes the AST directly, writing `print` output to a sink and feeding
//! every write to a traced variable into a [`TraceRecorder`].

mod env;
mod error;
mod eval;
mod trace;
mod value;

pub use env::{child_env, EnvRef, Environment};
pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::{binary, Flow, Interpreter, DEFAULT_MAX_CALL_DEPTH};
pub use trace::{call_label, CallFrame, CallStack, TraceRecorder, ROOT_LABEL};
pub use value::Value;
