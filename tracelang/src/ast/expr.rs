//! Expression AST nodes

use serde::Serialize;

/// Expression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// Integer literal
    IntLit(i64),
    /// Float literal
    FloatLit(f64),
    /// String literal (escapes already decoded)
    StringLit(String),
    /// Boolean literal
    BoolLit(bool),

    /// Variable reference
    Var(String),

    /// Array literal: [e1, e2, ...]
    ArrayLit(Vec<Expr>),

    /// Array element read: name[index]
    Index {
        name: String,
        index: Box<Expr>,
    },

    /// Binary operation
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },

    /// Unary operation
    Unary {
        op: UnOp,
        expr: Box<Expr>,
    },

    /// Function call (user-defined or the `length` builtin)
    Call {
        func: String,
        args: Vec<Expr>,
    },
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,

    // Logical (both sides always evaluated)
    And,
    Or,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Mul => write!(f, "*"),
            BinOp::Div => write!(f, "/"),
            BinOp::Mod => write!(f, "%"),
            BinOp::Eq => write!(f, "=="),
            BinOp::Ne => write!(f, "!="),
            BinOp::Lt => write!(f, "<"),
            BinOp::Gt => write!(f, ">"),
            BinOp::Le => write!(f, "<="),
            BinOp::Ge => write!(f, ">="),
            BinOp::And => write!(f, "&&"),
            BinOp::Or => write!(f, "||"),
        }
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnOp {
    /// Negation (-)
    Neg,
    /// Logical not (!)
    Not,
}

impl std::fmt::Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnOp::Neg => write!(f, "-"),
            UnOp::Not => write!(f, "!"),
        }
    }
}

/// Operator of a compound assignment (`+=`, `-=`, `*=`, `/=`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompoundOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl CompoundOp {
    /// The binary operator applied between the current value and the operand
    pub fn bin_op(self) -> BinOp {
        match self {
            CompoundOp::Add => BinOp::Add,
            CompoundOp::Sub => BinOp::Sub,
            CompoundOp::Mul => BinOp::Mul,
            CompoundOp::Div => BinOp::Div,
        }
    }
}

impl std::fmt::Display for CompoundOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}=", self.bin_op())
    }
}

/// `++` or `--`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IncDecOp {
    Inc,
    Dec,
}

impl std::fmt::Display for IncDecOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncDecOp::Inc => write!(f, "++"),
            IncDecOp::Dec => write!(f, "--"),
        }
    }
}
