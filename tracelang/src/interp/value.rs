//! Runtime values for the interpreter

use crate::ast::TypeName;
use std::fmt;

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// 64-bit integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// String
    Str(String),
    /// Boolean
    Bool(bool),
    /// Ordered sequence; element kinds are not enforced
    Array(Vec<Value>),
    /// Result of a call without an explicit return value
    Unit,
}

impl Value {
    /// Default value for a declaration without initializer
    pub fn default_for(ty: &TypeName) -> Self {
        match ty {
            TypeName::Int => Value::Int(0),
            TypeName::Float => Value::Float(0.0),
            TypeName::String => Value::Str(String::new()),
            TypeName::Bool => Value::Bool(false),
            TypeName::Array(_) => Value::Array(Vec::new()),
        }
    }

    /// Check if value is truthy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Unit => false,
        }
    }

    /// Get type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Array(_) => "array",
            Value::Unit => "()",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view; ints widen to f64
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write_float(f, *x),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match v {
                        Value::Str(s) => write!(f, "{s:?}")?,
                        other => write!(f, "{other}")?,
                    }
                }
                write!(f, "]")
            }
            Value::Unit => write!(f, "()"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Unit, Value::Unit) => true,
            _ => false,
        }
    }
}

/// Positional notation with at least one fractional digit: `3.0`, `1e20` as
/// `100000000000000000000.0`. `NaN` and `inf` print as is.
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    let digits = x.to_string();
    if x.is_finite() && !digits.contains('.') {
        write!(f, "{digits}.0")
    } else {
        write!(f, "{digits}")
    }
}
