//! Declared type names

use serde::Serialize;

/// Type written in a declaration, parameter list or function signature.
///
/// Types are never checked ahead of execution; they only choose the default
/// value of an uninitialized declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeName {
    Int,
    Float,
    String,
    Bool,
    /// `array<T>`
    Array(Box<TypeName>),
}

impl std::fmt::Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeName::Int => write!(f, "int"),
            TypeName::Float => write!(f, "float"),
            TypeName::String => write!(f, "string"),
            TypeName::Bool => write!(f, "bool"),
            TypeName::Array(elem) => write!(f, "array<{elem}>"),
        }
    }
}
